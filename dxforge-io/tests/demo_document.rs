use std::fs;

use dxforge_core::document::Document;
use dxforge_core::entity::{DimensionKind, Entity};
use dxforge_core::geometry::{Point2, Vector2};
use dxforge_core::resource::ResourceRecord;
use dxforge_core::tables::Layer;
use dxforge_io::{DocumentSaver, DxfSaver};
use glam::DVec2;

/// 一张覆盖全部实体种类的演示图。
fn build_demo_document() -> Document {
    let mut document = Document::new();
    let layer = document
        .layers()
        .get("0")
        .cloned()
        .expect("default layer 0 should exist");
    let text_style = document
        .text_styles()
        .get("STANDARD")
        .cloned()
        .expect("STANDARD text style should exist");
    let dim_style = document
        .dim_styles()
        .get("STANDARD")
        .cloned()
        .expect("STANDARD dimension style should exist");
    let pattern = document
        .pattern_resource()
        .get("ANSI31")
        .cloned()
        .expect("ANSI31 pattern should be builtin");

    let mut arc = Entity::arc(Point2::new(50.0, 50.0), 25.0, 0.0, 180.0);
    arc.set_layer(&layer);
    document.append_to_model(arc);

    let mut circle = Entity::circle(Point2::from_vec(DVec2::new(25.0, 25.0)), 10.0);
    circle.set_layer(&layer);
    document.append_to_model(circle);

    let mut line = Entity::line(Point2::new(0.0, 0.0), Point2::new(100.0, 100.0));
    line.set_layer(&layer);
    document.append_to_model(line);

    let mut ellipse = Entity::ellipse(Point2::new(75.0, 75.0), Vector2::new(25.0, 0.0), 0.5);
    ellipse.set_layer(&layer);
    document.append_to_model(ellipse);

    let mut polyline = Entity::polyline(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ],
        None,
    );
    polyline.set_layer(&layer);
    document.append_to_model(polyline);

    let mut text = Entity::text("hello world", Point2::new(100.0, 100.0), 10.0);
    text.set_layer(&layer);
    text.set_text_style(&text_style);
    document.append_to_model(text);

    let mut dimension = Entity::dimension(DimensionKind::Rotated {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(100.0, 0.0),
        text_insert: Point2::new(50.0, 10.0),
        rotation: 0.0,
    });
    dimension.set_layer(&layer);
    dimension.set_dimension_style(&dim_style);
    document.append_to_model(dimension);

    let mut hatch = Entity::hatch(
        &pattern,
        vec![
            Point2::new(100.0, 100.0),
            Point2::new(120.0, 100.0),
            Point2::new(120.0, 120.0),
            Point2::new(100.0, 120.0),
            Point2::new(100.0, 100.0),
        ],
    );
    hatch.set_layer(&layer);
    document.append_to_model(hatch);

    let mut wipeout = Entity::wipeout(vec![
        Point2::new(105.0, 100.0),
        Point2::new(115.0, 100.0),
        Point2::new(115.0, 110.0),
        Point2::new(105.0, 100.0),
    ]);
    wipeout.set_layer(&layer);
    document.append_to_model(wipeout);

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
    let mut reference = Entity::block_reference(Point2::new(30.0, 60.0), "DOOR");
    reference.set_layer(&layer);
    document.append_to_model(reference);

    document.append_to_paper(Entity::viewport(
        Point2::new(50.0, 50.0),
        Point2::new(100.0, 100.0),
        50.0,
        50.0,
    ));

    document
}

#[test]
fn demo_document_renders_every_entity_kind() {
    let mut document = build_demo_document();
    let rendered = DxfSaver::new().render(&mut document);

    for record in [
        "0\nARC", "0\nCIRCLE", "0\nLINE", "0\nELLIPSE", "0\nLWPOLYLINE", "0\nTEXT",
        "0\nDIMENSION", "0\nHATCH", "0\nWIPEOUT", "0\nINSERT",
    ] {
        assert!(rendered.contains(record), "missing {record:?}");
    }
    assert_eq!(rendered.matches("0\nVIEWPORT").count(), 2);
    assert!(rendered.contains("2\nDOOR"));
    assert!(rendered.ends_with("0\nEOF"));
}

#[test]
fn section_order_is_stable() {
    let mut document = build_demo_document();
    let rendered = DxfSaver::new().render(&mut document);

    let mut cursor = 0;
    for section in ["HEADER", "CLASSES", "TABLES", "BLOCKS", "ENTITIES", "OBJECTS"] {
        let marker = format!("2\n{section}");
        let found = rendered[cursor..]
            .find(&marker)
            .unwrap_or_else(|| panic!("section {section} out of order"));
        cursor += found + marker.len();
    }
}

#[test]
fn saved_file_round_trips_rendered_text() {
    let directory = tempfile::tempdir().expect("create temp directory");
    let path = directory.path().join("demo.dxf");

    let mut document = build_demo_document();
    let saver = DxfSaver::new();
    saver
        .save_document(&mut document, &path)
        .expect("save demo document");

    let written = fs::read_to_string(&path).expect("read saved file");
    // 句柄在首次生成时固定，重复渲染得到同一文本
    assert_eq!(written, saver.render(&mut document));
    assert!(!directory.path().join("demo.dxf.tmp").exists());
}

#[test]
fn save_into_missing_directory_reports_write_error() {
    let directory = tempfile::tempdir().expect("create temp directory");
    let path = directory.path().join("no_such_dir").join("demo.dxf");

    let mut document = build_demo_document();
    let error = DxfSaver::new()
        .save_document(&mut document, &path)
        .expect_err("save into missing directory should fail");
    assert!(error.to_string().contains("demo.dxf"));
}

#[test]
fn resource_record_snapshot_is_stable() {
    let record = ResourceRecord {
        name: "CENTER".to_string(),
        inform: "Center ____ _ ____ _ ____ _ ____ _ ____ _ ____".to_string(),
        content: vec![vec![1.25, -0.25, 0.25, -0.25]],
    };
    let serialized = serde_json::to_string(&record).expect("serialize resource record");
    assert_eq!(
        serialized,
        r#"{"name":"CENTER","inform":"Center ____ _ ____ _ ____ _ ____ _ ____ _ ____","content":[[1.25,-0.25,0.25,-0.25]]}"#
    );
    let parsed: ResourceRecord = serde_json::from_str(&serialized).expect("parse resource record");
    assert_eq!(parsed, record);
}

#[test]
fn default_layer_survives_clone_into_entities() {
    let document = Document::new();
    let layer: Layer = document
        .layers()
        .get("Defpoints")
        .cloned()
        .expect("Defpoints should exist");
    let mut circle = Entity::circle(Point2::new(0.0, 0.0), 1.0);
    circle.set_layer(&layer);
    assert_eq!(circle.layer(), Some("Defpoints"));
}
