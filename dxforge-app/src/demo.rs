use std::error::Error;
use std::fmt::{Display, Formatter};

use dxforge_core::document::Document;
use dxforge_core::entity::{DimensionKind, Entity, EntityKind};
use dxforge_core::geometry::{Point2, Vector2};
use dxforge_core::tables::{Layer, LineType};

/// 演示图形引用的填充图案名。
pub const DEMO_PATTERN: &str = "ANSI31";
/// 演示图形引用的线型名。
pub const DEMO_LINE_TYPE: &str = "CENTER";

/// 在文档里铺一张覆盖全部实体种类的演示图。
pub fn populate_demo_document(document: &mut Document) -> Result<(), DemoError> {
    let layer = document
        .layers()
        .get("0")
        .cloned()
        .ok_or_else(|| DemoError::missing("图层", "0"))?;
    let text_style = document
        .text_styles()
        .get("STANDARD")
        .cloned()
        .ok_or_else(|| DemoError::missing("文字样式", "STANDARD"))?;
    let dim_style = document
        .dim_styles()
        .get("STANDARD")
        .cloned()
        .ok_or_else(|| DemoError::missing("标注样式", "STANDARD"))?;
    let pattern = document
        .pattern_resource()
        .get(DEMO_PATTERN)
        .cloned()
        .ok_or_else(|| DemoError::missing("填充图案", DEMO_PATTERN))?;
    let center_record = document
        .line_type_resource()
        .get(DEMO_LINE_TYPE)
        .cloned()
        .ok_or_else(|| DemoError::missing("线型", DEMO_LINE_TYPE))?;

    place_on(document, &layer, Entity::arc(Point2::new(50.0, 50.0), 25.0, 0.0, 180.0));
    place_on(document, &layer, Entity::circle(Point2::new(25.0, 25.0), 10.0));
    place_on(
        document,
        &layer,
        Entity::ellipse(Point2::new(75.0, 75.0), Vector2::new(25.0, 0.0), 0.5),
    );
    place_on(
        document,
        &layer,
        Entity::ellipse_arc(Point2::new(100.0, 100.0), Vector2::new(25.0, 0.0), 0.5, 45.0, 135.0),
    );
    place_on(
        document,
        &layer,
        Entity::ellipse_arc(Point2::new(100.0, 100.0), Vector2::new(25.0, 0.0), 0.5, 135.0, 205.0),
    );
    place_on(
        document,
        &layer,
        Entity::line(Point2::new(0.0, 0.0), Point2::new(100.0, 100.0)),
    );
    place_on(
        document,
        &layer,
        Entity::polyline(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(50.0, 0.0),
                Point2::new(50.0, 50.0),
                Point2::new(0.0, 50.0),
                Point2::new(0.0, 0.0),
            ],
            Some(vec![0.5, 0.5, 0.5, 0.5, 0.0]),
        ),
    );

    let mut text = Entity::text("hello world", Point2::new(100.0, 100.0), 10.0);
    text.set_text_style(&text_style);
    place_on(document, &layer, text);

    let mut mtext = Entity::mtext("hello world".repeat(10), Point2::new(50.0, 50.0), 5.0, Some(100.0));
    mtext.set_text_style(&text_style);
    place_on(document, &layer, mtext);

    let dimension_kinds = [
        DimensionKind::ArcLength {
            center: Point2::new(50.0, 50.0),
            line_insert: Point2::new(0.0, 0.0),
            arc_start: Point2::new(25.0, 25.0),
            arc_end: Point2::new(50.0, 25.0),
        },
        DimensionKind::Diametric {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(100.0, 100.0),
            leader_length: None,
        },
        DimensionKind::LineAngular {
            line_point: Point2::new(50.0, 50.0),
            first_start: Point2::new(0.0, 50.0),
            first_end: Point2::new(80.0, 90.0),
            second_start: Point2::new(0.0, 50.0),
            second_end: Point2::new(100.0, 0.0),
        },
        DimensionKind::PointAngular {
            line_point: Point2::new(100.0, 100.0),
            center: Point2::new(0.0, 0.0),
            first: Point2::new(50.0, 0.0),
            second: Point2::new(0.0, 50.0),
        },
        DimensionKind::Radial {
            center: Point2::new(0.0, 0.0),
            start: Point2::new(50.0, 20.0),
            leader_length: 0.0,
        },
        DimensionKind::Rotated {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(150.0, 0.0),
            text_insert: Point2::new(75.0, 50.0),
            rotation: 0.0,
        },
        DimensionKind::Aligned {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(100.0, 100.0),
            text_insert: Point2::new(45.0, 55.0),
        },
    ];
    for kind in dimension_kinds {
        let mut dimension = Entity::dimension(kind);
        dimension.set_dimension_style(&dim_style);
        place_on(document, &layer, dimension);
    }

    place_on(
        document,
        &layer,
        Entity::hatch(
            &pattern,
            vec![
                Point2::new(100.0, 100.0),
                Point2::new(120.0, 100.0),
                Point2::new(120.0, 120.0),
                Point2::new(100.0, 120.0),
                Point2::new(100.0, 100.0),
            ],
        ),
    );
    place_on(
        document,
        &layer,
        Entity::wipeout(vec![
            Point2::new(105.0, 100.0),
            Point2::new(115.0, 100.0),
            Point2::new(115.0, 110.0),
            Point2::new(105.0, 100.0),
        ]),
    );

    // 中心线图层走外部可覆盖的线型定义
    document.add_line_type(LineType::with_record(DEMO_LINE_TYPE, &center_record));
    let mut axis = Layer::new("AXIS");
    axis.color = 1;
    axis.line_type = Some(DEMO_LINE_TYPE.to_string());
    let axis = document.add_layer(axis).clone();
    place_on(
        document,
        &axis,
        Entity::line(Point2::new(0.0, 25.0), Point2::new(50.0, 25.0)),
    );

    let door = document.new_block(Some("DOOR"));
    let mut leaf = Entity::polyline(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.9, 0.0),
            Point2::new(0.9, 0.05),
            Point2::new(0.0, 0.05),
            Point2::new(0.0, 0.0),
        ],
        None,
    );
    leaf.set_layer(&layer);
    document.append_to_block(door, leaf);
    let mut swing = Entity::arc(Point2::new(0.0, 0.0), 0.9, 0.0, 90.0);
    swing.set_layer(&layer);
    document.append_to_block(door, swing);

    place_on(
        document,
        &layer,
        Entity::block_reference(Point2::new(30.0, 60.0), "DOOR"),
    );
    let mut turned = Entity::block_reference(Point2::new(70.0, 30.0), "DOOR");
    if let EntityKind::BlockReference(door_reference) = turned.kind_mut() {
        door_reference.rotate_angle = 90.0;
    }
    place_on(document, &layer, turned);

    let mut paper_arc = Entity::arc(Point2::new(50.0, 50.0), 25.0, 0.0, 180.0);
    paper_arc.set_layer(&layer);
    document.append_to_paper(paper_arc);
    document.append_to_paper(Entity::viewport(
        Point2::new(50.0, 50.0),
        Point2::new(100.0, 100.0),
        50.0,
        50.0,
    ));
    document.append_to_paper(Entity::viewport(
        Point2::new(100.0, 50.0),
        Point2::new(100.0, 100.0),
        50.0,
        50.0,
    ));
    Ok(())
}

fn place_on(document: &mut Document, layer: &Layer, mut entity: Entity) {
    entity.set_layer(layer);
    document.append_to_model(entity);
}

#[derive(Debug)]
pub enum DemoError {
    MissingResource { kind: &'static str, name: String },
}

impl DemoError {
    fn missing(kind: &'static str, name: &str) -> Self {
        DemoError::MissingResource {
            kind,
            name: name.to_string(),
        }
    }
}

impl Display for DemoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DemoError::MissingResource { kind, name } => {
                write!(f, "演示图形需要的{kind} {name:?} 不存在")
            }
        }
    }
}

impl Error for DemoError {}
