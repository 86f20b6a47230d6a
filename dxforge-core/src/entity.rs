use crate::geometry::{
    ellipse_parameter_angle, normalize_closed_polygon, rotate_scale_deg, Point2, Vector2,
};
use crate::handle::Handle;
use crate::resource::ResourceRecord;
use crate::tables::{DimStyle, Layer, TableItem, TextStyle};
use crate::tags::TagStream;

/// 多行文字按此字符数分段换组码。
const MTEXT_CHUNK: usize = 250;

/// 生成组码时由外壳传入的挂接信息。
struct EmitContext<'a> {
    handle: &'a Handle,
    layer: &'a str,
    owner: &'a Handle,
    space_status: i32,
}

/// 圆弧，角度以度计，逆时针为正。
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Arc {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "ARC");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbCircle");
        code.push(67, ctx.space_status);
        code.push_pairs(&[10, 20, 30], &[self.center.x(), self.center.y(), 0.0]);
        code.push(40, self.radius);
        code.push(100, "AcDbArc");
        code.push_pairs(&[50, 51], &[self.start_angle, self.end_angle]);
        code
    }
}

/// 圆。
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "CIRCLE");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbCircle");
        code.push(67, ctx.space_status);
        code.push_pairs(&[10, 20, 30], &[self.center.x(), self.center.y(), 0.0]);
        code.push(40, self.radius);
        code
    }
}

/// 椭圆或椭圆弧。长轴以向量给出，角度是真实角而非参数角。
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub center: Point2,
    pub long_axis: Vector2,
    pub ratio: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Ellipse {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "ELLIPSE");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbEllipse");
        code.push(67, ctx.space_status);
        code.push_pairs(&[10, 20, 30], &[self.center.x(), self.center.y(), 0.0]);
        code.push_pairs(
            &[11, 21, 31],
            &[self.long_axis.x(), self.long_axis.y(), 0.0],
        );
        code.push(40, self.ratio);
        code.push(41, ellipse_parameter_angle(self.start_angle, self.ratio));
        code.push(42, ellipse_parameter_angle(self.end_angle, self.ratio));
        code
    }
}

/// 直线段。
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
    pub line_type_scale: f64,
}

impl Line {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "LINE");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(48, self.line_type_scale);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbLine");
        code.push(67, ctx.space_status);
        code.push_pairs(&[10, 20, 30], &[self.start.x(), self.start.y(), 0.0]);
        code.push_pairs(&[11, 21, 31], &[self.end.x(), self.end.y(), 0.0]);
        code
    }
}

/// 轻量折线。凸度与顶点一一对应。
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point2>,
    pub bulges: Vec<f64>,
}

impl Polyline {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "LWPOLYLINE");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbPolyline");
        code.push(67, ctx.space_status);
        code.push(90, self.points.len());
        for (point, bulge) in self.points.iter().zip(&self.bulges) {
            code.push_pairs(&[10, 20, 42], &[point.x(), point.y(), *bulge]);
        }
        code
    }
}

/// 单行文字。
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub insert: Point2,
    pub height: f64,
    pub h_justify: i32,
    pub v_justify: i32,
    pub width_factor: f64,
    pub angle: f64,
    pub style: Option<String>,
}

impl Text {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let style = self.style.as_deref().unwrap_or("STANDARD");
        let mut code = TagStream::new();
        code.push(0, "TEXT");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbText");
        code.push(67, ctx.space_status);
        code.push(1, &self.content);
        code.push(50, self.angle);
        code.push(40, self.height);
        code.push(41, self.width_factor);
        code.push(72, self.h_justify);
        code.push_pairs(&[10, 20, 30], &[self.insert.x(), self.insert.y(), 0.0]);
        code.push_pairs(&[11, 21, 31], &[self.insert.x(), self.insert.y(), 0.0]);
        // 文字样式必须夹在两个 AcDbText 标记之间，否则 CAD 不显示
        code.push(7, style);
        code.push(100, "AcDbText");
        code.push(73, self.v_justify);
        code
    }
}

/// 多行文字。超长内容按固定字符数分段写出。
#[derive(Debug, Clone, PartialEq)]
pub struct MText {
    pub content: String,
    pub insert: Point2,
    pub height: f64,
    pub width: Option<f64>,
    pub attach_point: i32,
    pub style: Option<String>,
}

impl MText {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let style = self.style.as_deref().unwrap_or("STANDARD");
        let mut code = TagStream::new();
        code.push(0, "MTEXT");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(7, style);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbMText");
        code.push(40, self.height);
        code.push(67, ctx.space_status);
        code.push_pairs(&[10, 20, 30], &[self.insert.x(), self.insert.y(), 0.0]);
        if let Some(width) = self.width {
            code.push(41, width);
        }
        code.push(71, self.attach_point);

        let characters: Vec<char> = self.content.chars().collect();
        if characters.len() < MTEXT_CHUNK {
            code.push(1, &self.content);
        } else {
            // 前面的段落用 3，收尾一段用 1
            let chunks: Vec<String> = characters
                .chunks(MTEXT_CHUNK)
                .map(|chunk| chunk.iter().collect())
                .collect();
            for chunk in &chunks[..chunks.len() - 1] {
                code.push(3, chunk);
            }
            code.push(1, &chunks[chunks.len() - 1]);
        }
        code
    }
}

/// 标注的几何形态。
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionKind {
    /// 对齐标注，尺寸线与两定义点连线平行。
    Aligned {
        start: Point2,
        end: Point2,
        text_insert: Point2,
    },
    /// 弧长标注。
    ArcLength {
        center: Point2,
        line_insert: Point2,
        arc_start: Point2,
        arc_end: Point2,
    },
    /// 直径标注。
    Diametric {
        start: Point2,
        end: Point2,
        leader_length: Option<f64>,
    },
    /// 两线夹角标注。
    LineAngular {
        line_point: Point2,
        first_start: Point2,
        first_end: Point2,
        second_start: Point2,
        second_end: Point2,
    },
    /// 三点夹角标注。
    PointAngular {
        line_point: Point2,
        center: Point2,
        first: Point2,
        second: Point2,
    },
    /// 半径标注。
    Radial {
        center: Point2,
        start: Point2,
        leader_length: f64,
    },
    /// 旋转标注，尺寸线固定在给定角度上。
    Rotated {
        start: Point2,
        end: Point2,
        text_insert: Point2,
        rotation: f64,
    },
}

/// 标注实体。生成组码前必须绑定标注样式。
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub style: Option<String>,
    pub kind: DimensionKind,
}

impl Dimension {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let Some(style) = self.style.as_deref() else {
            panic!("标注实体尚未指定标注样式");
        };
        let record_name = match &self.kind {
            DimensionKind::ArcLength { .. } => "ARC_DIMENSION",
            _ => "DIMENSION",
        };
        let mut code = TagStream::new();
        code.push(0, record_name);
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbDimension");
        match &self.kind {
            DimensionKind::Aligned {
                start,
                end,
                text_insert,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[text_insert.x(), text_insert.y(), 0.0]);
                code.push(70, 33);
                code.push(100, "AcDbAlignedDimension");
                code.push_pairs(&[13, 23, 33], &[start.x(), start.y(), 0.0]);
                code.push_pairs(&[14, 24, 34], &[end.x(), end.y(), 0.0]);
            }
            DimensionKind::ArcLength {
                center,
                line_insert,
                arc_start,
                arc_end,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[line_insert.x(), line_insert.y(), 0.0]);
                code.push(70, 37);
                code.push(100, "AcDbArcDimension");
                code.push_pairs(&[15, 25, 35], &[center.x(), center.y(), 0.0]);
                code.push_pairs(&[13, 23, 33], &[arc_start.x(), arc_start.y(), 0.0]);
                code.push_pairs(&[16, 26, 36], &[arc_start.x(), arc_start.y(), 0.0]);
                code.push_pairs(&[14, 24, 34], &[arc_end.x(), arc_end.y(), 0.0]);
                code.push_pairs(&[17, 27, 37], &[arc_end.x(), arc_end.y(), 0.0]);
            }
            DimensionKind::Diametric {
                start,
                end,
                leader_length,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[end.x(), end.y(), 0.0]);
                code.push(70, 35);
                code.push(100, "AcDbDiametricDimension");
                if let Some(leader_length) = leader_length {
                    code.push(40, *leader_length);
                }
                code.push_pairs(&[15, 25, 35], &[start.x(), start.y(), 0.0]);
            }
            DimensionKind::LineAngular {
                line_point,
                first_start,
                first_end,
                second_start,
                second_end,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push(70, 34);
                code.push_pairs(&[10, 20, 30], &[second_start.x(), second_start.y(), 0.0]);
                code.push(100, "AcDb2LineAngularDimension");
                code.push_pairs(&[13, 23, 33], &[first_end.x(), first_end.y(), 0.0]);
                code.push_pairs(&[14, 24, 34], &[first_start.x(), first_start.y(), 0.0]);
                code.push_pairs(&[15, 25, 35], &[second_end.x(), second_end.y(), 0.0]);
                code.push_pairs(&[16, 26, 36], &[line_point.x(), line_point.y(), 0.0]);
            }
            DimensionKind::PointAngular {
                line_point,
                center,
                first,
                second,
            } => {
                code.push(70, 37);
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[line_point.x(), line_point.y(), 0.0]);
                code.push(100, "AcDb3PointAngularDimension");
                code.push_pairs(&[13, 23, 33], &[first.x(), first.y(), 0.0]);
                code.push_pairs(&[14, 24, 34], &[second.x(), second.y(), 0.0]);
                code.push_pairs(&[15, 25, 35], &[center.x(), center.y(), 0.0]);
            }
            DimensionKind::Radial {
                center,
                start,
                leader_length,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[center.x(), center.y(), 0.0]);
                code.push(70, 36);
                code.push(100, "AcDbRadialDimension");
                code.push(40, *leader_length);
                code.push_pairs(&[15, 25, 35], &[start.x(), start.y(), 0.0]);
            }
            DimensionKind::Rotated {
                start,
                end,
                text_insert,
                rotation,
            } => {
                code.push(67, ctx.space_status);
                code.push(3, style);
                code.push_pairs(&[10, 20, 30], &[text_insert.x(), text_insert.y(), 0.0]);
                code.push(70, 32);
                code.push(100, "AcDbAlignedDimension");
                code.push(50, *rotation);
                code.push_pairs(&[13, 23, 33], &[start.x(), start.y(), 0.0]);
                code.push_pairs(&[14, 24, 34], &[end.x(), end.y(), 0.0]);
                code.push(100, "AcDbRotatedDimension");
            }
        }
        code
    }
}

/// 图案填充。边界折线必须闭合。
#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    pub pattern: ResourceRecord,
    pub points: Vec<Point2>,
    pub bulges: Vec<f64>,
    pub rotate_angle: f64,
    pub scale: f64,
    pub fill_type: i32,
}

impl Hatch {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        assert_eq!(
            self.points.len(),
            self.bulges.len(),
            "填充边界的顶点与凸度数量不一致"
        );
        let mut code = TagStream::new();
        code.push(0, "HATCH");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbHatch");
        code.push_pairs(&[10, 20, 30], &[0.0, 0.0, 0.0]);
        code.push_pairs(&[210, 220, 230], &[0.0, 0.0, 1.0]);
        code.push(2, self.pattern.name.to_uppercase());
        code.push(70, self.fill_type);
        code.push(71, 1);
        code.push(91, 1);
        code.push(92, 7);
        code.push(72, 1);
        code.push(73, 1);
        code.push(93, self.points.len());
        for (point, bulge) in self.points.iter().zip(&self.bulges) {
            code.push_pairs(&[10, 20, 42], &[point.x(), point.y(), *bulge]);
        }
        code.push(97, 1);
        // 关联边界指回填充自身
        code.push(330, ctx.handle);
        code.push(75, 0);
        code.push(76, 1);
        code.push(52, self.rotate_angle);
        code.push(41, self.scale);
        code.push(77, 0);
        code.push(78, self.pattern.content.len());
        for row in &self.pattern.content {
            assert!(row.len() >= 5, "填充图案行至少需要五个数值");
            let row_angle = row[0] + self.rotate_angle;
            let origin = rotate_scale_deg(Vector2::new(row[1], row[2]), self.rotate_angle, self.scale);
            // 偏移向量按叠加后的行角旋转
            let delta = rotate_scale_deg(Vector2::new(row[3], row[4]), row_angle, self.scale);
            code.push_pairs(
                &[53, 43, 44, 45, 46],
                &[row_angle, origin.x(), origin.y(), delta.x(), delta.y()],
            );
            let dashes = &row[5..];
            code.push(79, dashes.len());
            for dash in dashes {
                code.push(40, self.scale * dash);
            }
        }
        code.push(47, 1);
        code.push(98, 1);
        let Some(seed) = self.points.first() else {
            panic!("填充边界不能为空");
        };
        code.push_pairs(&[10, 20], &[seed.x(), seed.y()]);
        code
    }
}

/// 遮罩区域。边界装入包围盒后按相对坐标写出。
#[derive(Debug, Clone, PartialEq)]
pub struct Wipeout {
    pub points: Vec<Point2>,
}

impl Wipeout {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let frame = normalize_closed_polygon(&self.points);
        let mut code = TagStream::new();
        code.push(0, "WIPEOUT");
        code.push(5, ctx.handle);
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(100, "AcDbEntity");
        code.push(67, ctx.space_status);
        code.push(100, "AcDbWipeout");
        code.push(90, 0);
        code.push_pairs(&[10, 20, 30], &[frame.insert.x(), frame.insert.y(), 0.0]);
        code.push_pairs(&[11, 21, 31], &[frame.u_vector.x(), frame.u_vector.y(), 0.0]);
        code.push_pairs(&[12, 22, 32], &[frame.v_vector.x(), frame.v_vector.y(), 0.0]);
        code.push_pairs(&[13, 23], &[1.0, 1.0]);
        code.push(340, 0);
        code.push(70, 7);
        code.push_pairs(&[280, 281, 282, 283], &[1.0, 50.0, 50.0, 0.0]);
        code.push(360, 0);
        code.push(71, 2);
        code.push(91, frame.relative_points.len());
        for point in &frame.relative_points {
            code.push_pairs(&[14, 24], &[point.x(), point.y()]);
        }
        code
    }
}

/// 块引用。所在图层取块内实体自带的设置，故不写图层组码。
#[derive(Debug, Clone, PartialEq)]
pub struct BlockReference {
    pub insert: Point2,
    pub block_name: String,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotate_angle: f64,
}

impl BlockReference {
    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "INSERT");
        code.push(5, ctx.handle);
        code.push(330, ctx.owner);
        code.push(67, ctx.space_status);
        code.push(100, "AcDbEntity");
        code.push(100, "AcDbBlockReference");
        code.push_pairs(&[10, 20, 30], &[self.insert.x(), self.insert.y(), 0.0]);
        code.push(2, &self.block_name);
        code.push_pairs(&[41, 42, 43], &[self.scale_x, self.scale_y, 1.0]);
        code.push(50, self.rotate_angle);
        code
    }
}

/// 图纸空间视口。图层固定为 Defpoints，编号由所在空间指派。
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub model_center: Point2,
    pub paper_center: Point2,
    pub width: f64,
    pub height: f64,
    pub port_id: Handle,
    pub scale: f64,
    pub twist_angle: f64,
}

impl Viewport {
    pub(crate) fn set_port_id(&mut self, port_id: Handle) {
        self.port_id = port_id;
    }

    fn emit(&self, ctx: &EmitContext<'_>) -> TagStream {
        let mut code = TagStream::new();
        code.push(0, "VIEWPORT");
        code.push(5, ctx.handle);
        code.push(100, "AcDbEntity");
        code.push(8, ctx.layer);
        code.push(330, ctx.owner);
        code.push(67, ctx.space_status);
        code.push(100, "AcDbViewport");
        code.push(67, 1);
        code.push_pairs(&[40, 41], &[self.width, self.height]);
        code.push(68, 2);
        code.push(69, &self.port_id);
        code.push_pairs(
            &[10, 20, 30],
            &[self.model_center.x(), self.model_center.y(), 0.0],
        );
        if self.twist_angle == 0.0 {
            code.push_pairs(&[12, 22], &[self.paper_center.x(), self.paper_center.y()]);
        } else {
            code.push_pairs(&[12, 22], &[0.0, 0.0]);
            code.push_pairs(
                &[17, 27, 37],
                &[self.paper_center.x(), self.paper_center.y(), 0.0],
            );
        }
        code.push(45, self.height * self.scale);
        code.push(51, self.twist_angle);
        code.push(71, 1);
        code.push(90, 16384);
        code.push_pairs(&[110, 120, 130], &[0.0, 0.0, 0.0]);
        code.push_pairs(&[111, 121, 131], &[1.0, 0.0, 0.0]);
        code.push_pairs(&[112, 122, 132], &[0.0, 1.0, 0.0]);
        code
    }
}

/// 实体数据。
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Line(Line),
    Polyline(Polyline),
    Text(Text),
    MText(MText),
    Dimension(Dimension),
    Hatch(Hatch),
    Wipeout(Wipeout),
    BlockReference(BlockReference),
    Viewport(Viewport),
}

/// 图元外壳：几何数据加挂接状态。
/// 实体先指定图层，随后由容器收纳取得句柄与属主，之后才能生成组码。
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    layer: Option<String>,
    handle: Option<Handle>,
    owner_handle: Option<Handle>,
    space_status: i32,
    kind: EntityKind,
}

impl Entity {
    fn with_kind(kind: EntityKind) -> Self {
        Self {
            layer: None,
            handle: None,
            owner_handle: None,
            space_status: 0,
            kind,
        }
    }

    pub fn arc(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self::with_kind(EntityKind::Arc(Arc {
            center,
            radius,
            start_angle,
            end_angle,
        }))
    }

    pub fn circle(center: Point2, radius: f64) -> Self {
        Self::with_kind(EntityKind::Circle(Circle { center, radius }))
    }

    /// 整椭圆。
    pub fn ellipse(center: Point2, long_axis: Vector2, ratio: f64) -> Self {
        Self::ellipse_arc(center, long_axis, ratio, 0.0, 360.0)
    }

    /// 椭圆弧，角度是真实角。
    pub fn ellipse_arc(
        center: Point2,
        long_axis: Vector2,
        ratio: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        assert!(ratio < 1.0, "椭圆短长轴比必须小于 1");
        assert!(
            start_angle >= 0.0 && end_angle <= 360.0,
            "椭圆弧角度必须落在 0 到 360 度之间"
        );
        Self::with_kind(EntityKind::Ellipse(Ellipse {
            center,
            long_axis,
            ratio,
            start_angle,
            end_angle,
        }))
    }

    pub fn line(start: Point2, end: Point2) -> Self {
        Self::with_kind(EntityKind::Line(Line {
            start,
            end,
            line_type_scale: 1.0,
        }))
    }

    /// 凸度缺省时按零填齐。
    pub fn polyline(points: Vec<Point2>, bulges: Option<Vec<f64>>) -> Self {
        let bulges = match bulges {
            Some(bulges) => {
                assert_eq!(points.len(), bulges.len(), "折线顶点与凸度的数量不一致");
                bulges
            }
            None => vec![0.0; points.len()],
        };
        Self::with_kind(EntityKind::Polyline(Polyline { points, bulges }))
    }

    pub fn text(content: impl Into<String>, insert: Point2, height: f64) -> Self {
        Self::with_kind(EntityKind::Text(Text {
            content: content.into(),
            insert,
            height,
            h_justify: 0,
            v_justify: 0,
            width_factor: 0.7,
            angle: 0.0,
            style: None,
        }))
    }

    pub fn mtext(content: impl Into<String>, insert: Point2, height: f64, width: Option<f64>) -> Self {
        Self::with_kind(EntityKind::MText(MText {
            content: content.into(),
            insert,
            height,
            width,
            attach_point: 1,
            style: None,
        }))
    }

    pub fn dimension(kind: DimensionKind) -> Self {
        Self::with_kind(EntityKind::Dimension(Dimension { style: None, kind }))
    }

    pub fn hatch(pattern: &ResourceRecord, points: Vec<Point2>) -> Self {
        assert!(
            points.len() >= 2 && points.first() == points.last(),
            "填充边界必须闭合"
        );
        let bulges = vec![0.0; points.len()];
        Self::with_kind(EntityKind::Hatch(Hatch {
            pattern: pattern.clone(),
            points,
            bulges,
            rotate_angle: 0.0,
            scale: 1.0,
            fill_type: 0,
        }))
    }

    pub fn wipeout(points: Vec<Point2>) -> Self {
        assert!(
            points.len() >= 2 && points.first() == points.last(),
            "遮罩边界必须闭合"
        );
        Self::with_kind(EntityKind::Wipeout(Wipeout { points }))
    }

    pub fn block_reference(insert: Point2, block_name: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::BlockReference(BlockReference {
            insert,
            block_name: block_name.into(),
            scale_x: 1.0,
            scale_y: 1.0,
            rotate_angle: 0.0,
        }))
    }

    pub fn viewport(model_center: Point2, paper_center: Point2, width: f64, height: f64) -> Self {
        let mut entity = Self::with_kind(EntityKind::Viewport(Viewport {
            model_center,
            paper_center,
            width,
            height,
            port_id: Handle::decimal(1),
            scale: 1.0,
            twist_angle: 0.0,
        }));
        entity.layer = Some("Defpoints".to_string());
        entity
    }

    pub fn set_layer(&mut self, layer: &Layer) {
        self.layer = Some(layer.name().to_string());
    }

    pub fn set_text_style(&mut self, style: &TextStyle) {
        match &mut self.kind {
            EntityKind::Text(text) => text.style = Some(style.name().to_string()),
            EntityKind::MText(mtext) => mtext.style = Some(style.name().to_string()),
            _ => panic!("只有文字类实体可以设置文字样式"),
        }
    }

    pub fn set_dimension_style(&mut self, style: &DimStyle) {
        match &mut self.kind {
            EntityKind::Dimension(dimension) => {
                dimension.style = Some(style.name().to_string());
            }
            _ => panic!("只有标注实体可以设置标注样式"),
        }
    }

    #[inline]
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    #[inline]
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    #[inline]
    pub fn owner_handle(&self) -> Option<&Handle> {
        self.owner_handle.as_ref()
    }

    #[inline]
    pub fn space_status(&self) -> i32 {
        self.space_status
    }

    #[inline]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    #[inline]
    pub fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    #[inline]
    pub fn is_viewport(&self) -> bool {
        matches!(self.kind, EntityKind::Viewport(_))
    }

    pub(crate) fn attach(&mut self, handle: Handle, owner: Handle) {
        assert!(self.handle.is_none(), "实体已经挂接过");
        self.handle = Some(handle);
        self.owner_handle = Some(owner);
    }

    pub(crate) fn set_space_status(&mut self, status: i32) {
        self.space_status = status;
    }

    pub fn to_tags(&self) -> TagStream {
        let (Some(handle), Some(layer), Some(owner)) =
            (self.handle.as_ref(), self.layer.as_deref(), self.owner_handle.as_ref())
        else {
            panic!("实体尚未完成挂接，无法生成组码");
        };
        let ctx = EmitContext {
            handle,
            layer,
            owner,
            space_status: self.space_status,
        };
        match &self.kind {
            EntityKind::Arc(arc) => arc.emit(&ctx),
            EntityKind::Circle(circle) => circle.emit(&ctx),
            EntityKind::Ellipse(ellipse) => ellipse.emit(&ctx),
            EntityKind::Line(line) => line.emit(&ctx),
            EntityKind::Polyline(polyline) => polyline.emit(&ctx),
            EntityKind::Text(text) => text.emit(&ctx),
            EntityKind::MText(mtext) => mtext.emit(&ctx),
            EntityKind::Dimension(dimension) => dimension.emit(&ctx),
            EntityKind::Hatch(hatch) => hatch.emit(&ctx),
            EntityKind::Wipeout(wipeout) => wipeout.emit(&ctx),
            EntityKind::BlockReference(reference) => reference.emit(&ctx),
            EntityKind::Viewport(viewport) => viewport.emit(&ctx),
        }
    }
}
