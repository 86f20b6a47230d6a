pub mod entity;

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，与图形数据库的双精度坐标一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐包围盒。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    /// 把椭圆上的真实角（度）换算为参数角（弧度）。
    /// 轴端点 90/270 度直接取半 π 的倍数，其余落在 atan 的对应象限。
    pub fn ellipse_parameter_angle(angle_deg: f64, ratio: f64) -> f64 {
        use std::f64::consts::PI;

        if angle_deg == 90.0 {
            return 0.5 * PI;
        }
        if angle_deg == 270.0 {
            return 1.5 * PI;
        }
        let raw = (angle_deg.to_radians().tan() / ratio).atan();
        if angle_deg < 90.0 {
            raw
        } else if angle_deg < 270.0 {
            PI + raw
        } else {
            2.0 * PI + raw
        }
    }

    /// 向量逆时针旋转 `angle_deg` 度后按 `scale` 缩放。
    pub fn rotate_scale_deg(vector: Vector2, angle_deg: f64, scale: f64) -> Vector2 {
        let radians = angle_deg.to_radians();
        let (sin, cos) = radians.sin_cos();
        Vector2::new(
            (vector.x() * cos - vector.y() * sin) * scale,
            (vector.y() * cos + vector.x() * sin) * scale,
        )
    }

    /// 闭合多边形归一化后的边框：插入点、两条边向量与相对坐标点列。
    #[derive(Debug, Clone)]
    pub struct BoundaryFrame {
        pub insert: Point2,
        pub u_vector: Vector2,
        pub v_vector: Vector2,
        pub relative_points: Vec<Point2>,
    }

    /// 将闭合多边形装入其包围盒：相对坐标以盒中心为原点，
    /// 横向按宽度、纵向按高度归一，纵向取负号翻转。
    pub fn normalize_closed_polygon(points: &[Point2]) -> BoundaryFrame {
        assert!(
            points.len() >= 2 && points.first() == points.last(),
            "边界多边形必须闭合"
        );
        let mut bounds = Bounds2D::empty();
        for point in points {
            bounds.include_point(*point);
        }
        let width = bounds.width();
        let height = bounds.height();
        assert!(
            width > 0.0 && height > 0.0,
            "边界多边形在两个方向上都必须有宽度"
        );
        let center = bounds.center();
        let relative_points = points
            .iter()
            .map(|point| {
                Point2::new(
                    (point.x() - center.x()) / width,
                    -((point.y() - center.y()) / height),
                )
            })
            .collect();
        BoundaryFrame {
            insert: bounds.min(),
            u_vector: Vector2::new(width, 0.0),
            v_vector: Vector2::new(0.0, height),
            relative_points,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::f64::consts::PI;

        #[test]
        fn ellipse_parameter_angle_handles_axis_points() {
            assert!((ellipse_parameter_angle(90.0, 0.5) - 0.5 * PI).abs() < 1e-12);
            assert!((ellipse_parameter_angle(270.0, 0.5) - 1.5 * PI).abs() < 1e-12);
        }

        #[test]
        fn ellipse_parameter_angle_selects_quadrant() {
            let first = ellipse_parameter_angle(45.0, 0.5);
            assert!((first - 2.0f64.atan()).abs() < 1e-12);
            let second = ellipse_parameter_angle(135.0, 0.5);
            assert!((second - (PI + (-2.0f64).atan())).abs() < 1e-12);
            let fourth = ellipse_parameter_angle(315.0, 0.5);
            assert!((fourth - (2.0 * PI + (-2.0f64).atan())).abs() < 1e-12);
        }

        #[test]
        fn ellipse_parameter_angle_is_monotonic() {
            for ratio in [0.25, 0.5, 0.9] {
                let mut previous = ellipse_parameter_angle(0.0, ratio);
                let mut angle = 5.0;
                while angle <= 360.0 {
                    let current = ellipse_parameter_angle(angle, ratio);
                    assert!(
                        current > previous,
                        "ratio {ratio} angle {angle} should keep increasing"
                    );
                    previous = current;
                    angle += 5.0;
                }
            }
        }

        #[test]
        fn rotate_scale_deg_rotates_counter_clockwise() {
            let rotated = rotate_scale_deg(Vector2::new(1.0, 0.0), 90.0, 2.0);
            assert!(rotated.x().abs() < 1e-12);
            assert!((rotated.y() - 2.0).abs() < 1e-12);
        }

        #[test]
        fn bounds_grow_with_points() {
            let mut bounds = Bounds2D::empty();
            assert!(bounds.is_empty());
            bounds.include_point(Point2::new(1.0, 4.0));
            bounds.include_point(Point2::new(-2.0, 3.0));
            assert!((bounds.width() - 3.0).abs() < 1e-12);
            assert!((bounds.height() - 1.0).abs() < 1e-12);
            assert!((bounds.center().x() + 0.5).abs() < 1e-12);
        }

        #[test]
        fn normalize_unit_square() {
            let points = [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
                Point2::new(0.0, 0.0),
            ];
            let frame = normalize_closed_polygon(&points);
            assert!(frame.insert.x().abs() < 1e-12 && frame.insert.y().abs() < 1e-12);
            assert!((frame.u_vector.x() - 1.0).abs() < 1e-12);
            assert!(frame.u_vector.y().abs() < 1e-12);
            assert!((frame.v_vector.y() - 1.0).abs() < 1e-12);
            let expected = [(-0.5, 0.5), (0.5, 0.5), (0.5, -0.5), (-0.5, -0.5), (-0.5, 0.5)];
            for (point, (x, y)) in frame.relative_points.iter().zip(expected) {
                assert!((point.x() - x).abs() < 1e-12);
                assert!((point.y() - y).abs() < 1e-12);
            }
        }

        #[test]
        #[should_panic(expected = "闭合")]
        fn normalize_rejects_open_polygon() {
            let points = [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ];
            normalize_closed_polygon(&points);
        }

        #[test]
        #[should_panic(expected = "宽度")]
        fn normalize_rejects_degenerate_bounds() {
            let points = [
                Point2::new(0.0, 0.0),
                Point2::new(5.0, 0.0),
                Point2::new(0.0, 0.0),
            ];
            normalize_closed_polygon(&points);
        }
    }
}

pub mod tags {
    use std::fmt::Display;

    /// 组码流。每个值占两行文本，组码在前，值在后。
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct TagStream {
        lines: Vec<String>,
    }

    impl TagStream {
        pub fn new() -> Self {
            Self { lines: Vec::new() }
        }

        /// 追加一对组码与值。
        pub fn push(&mut self, code: i32, value: impl Display) {
            self.lines.push(code.to_string());
            self.lines.push(value.to_string());
        }

        /// 按并行数组追加，两侧长度必须一致。
        pub fn push_pairs(&mut self, codes: &[i32], values: &[f64]) {
            assert_eq!(codes.len(), values.len(), "组码与数值的数量不一致");
            for (code, value) in codes.iter().zip(values) {
                self.push(*code, value);
            }
        }

        /// 把另一段组码流接到末尾。
        pub fn extend(&mut self, other: TagStream) {
            self.lines.extend(other.lines);
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.lines.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.lines.is_empty()
        }

        /// 渲染为输出文本，行间以换行符连接，结尾不带换行。
        pub fn render(&self) -> String {
            self.lines.join("\n")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn render_joins_code_value_lines() {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "HEADER");
            code.push(0, "ENDSEC");
            assert_eq!(code.render(), "0\nSECTION\n2\nHEADER\n0\nENDSEC");
        }

        #[test]
        fn push_pairs_interleaves_codes_and_values() {
            let mut code = TagStream::new();
            code.push_pairs(&[10, 20, 30], &[1.5, -2.0, 0.0]);
            assert_eq!(code.render(), "10\n1.5\n20\n-2\n30\n0");
        }

        #[test]
        #[should_panic(expected = "数量不一致")]
        fn push_pairs_rejects_length_mismatch() {
            let mut code = TagStream::new();
            code.push_pairs(&[10, 20], &[1.0]);
        }

        #[test]
        fn extend_appends_in_order() {
            let mut head = TagStream::new();
            head.push(0, "SECTION");
            let mut tail = TagStream::new();
            tail.push(0, "ENDSEC");
            head.extend(tail);
            assert_eq!(head.render(), "0\nSECTION\n0\nENDSEC");
            assert_eq!(head.len(), 4);
        }
    }
}

pub mod handle {
    use std::fmt;

    /// 句柄计数的上限，同时也是 $HANDSEED 的取值。
    pub const HANDLE_CEILING: u64 = 0xFFFFF;

    /// 图形数据库对象句柄，内容为不带前缀的十六进制大写或十进制文本。
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Handle(String);

    impl Handle {
        /// 空属主使用的零句柄。
        #[inline]
        pub fn null() -> Self {
            Self("0".to_string())
        }

        /// 以十进制文本构造，用于视口编号这类子计数。
        #[inline]
        pub fn decimal(value: u64) -> Self {
            Self(value.to_string())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for Handle {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// 句柄分配器。单调递增，永不回收。
    #[derive(Debug, Clone)]
    pub struct HandleAllocator {
        index: u64,
    }

    impl HandleAllocator {
        pub fn new() -> Self {
            Self::with_start(1)
        }

        pub fn with_start(start: u64) -> Self {
            Self { index: start }
        }

        /// 取下一枚十六进制句柄，触及上限视为编程错误。
        pub fn next_hex(&mut self) -> Handle {
            assert!(self.index < HANDLE_CEILING, "句柄耗尽，已到达 HANDSEED 上限");
            let handle = Handle(format!("{:X}", self.index));
            self.index += 1;
            handle
        }

        /// 取下一枚十进制句柄。
        pub fn next_dec(&mut self) -> Handle {
            let handle = Handle(self.index.to_string());
            self.index += 1;
            handle
        }

        /// 上限的十六进制形式，写入 $HANDSEED。
        pub fn ceiling_hex() -> Handle {
            Handle(format!("{HANDLE_CEILING:X}"))
        }
    }

    impl Default for HandleAllocator {
        fn default() -> Self {
            Self::new()
        }
    }

}

pub mod resource {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    /// 一条图案或线型定义：名称、说明与若干数值行。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ResourceRecord {
        pub name: String,
        pub inform: String,
        pub content: Vec<Vec<f64>>,
    }

    /// 内存资源库。内置少量常用记录，可由词典文件补充。
    #[derive(Debug, Clone, Default)]
    pub struct ResourceLibrary {
        records: HashMap<String, ResourceRecord>,
    }

    impl ResourceLibrary {
        pub fn new() -> Self {
            Self::default()
        }

        /// 填充图案内置库。
        pub fn builtin_patterns() -> Self {
            let mut library = Self::new();
            library.insert(ResourceRecord {
                name: "SOLID".to_string(),
                inform: "Solid fill".to_string(),
                content: vec![vec![45.0, 0.0, 0.0, 0.0, 0.125]],
            });
            library.insert(ResourceRecord {
                name: "ANSI31".to_string(),
                inform: "ANSI Iron, Brick, Stone masonry".to_string(),
                content: vec![vec![45.0, 0.0, 0.0, 0.0, 3.175]],
            });
            library
        }

        /// 线型内置库。
        pub fn builtin_line_types() -> Self {
            let mut library = Self::new();
            library.insert(ResourceRecord {
                name: "CENTER".to_string(),
                inform: "Center ____ _ ____ _ ____ _ ____ _ ____ _ ____".to_string(),
                content: vec![vec![1.25, -0.25, 0.25, -0.25]],
            });
            library
        }

        /// 同名记录直接覆盖。
        pub fn insert(&mut self, record: ResourceRecord) {
            self.records.insert(record.name.clone(), record);
        }

        pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
            self.records.get(name)
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.records.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.records.is_empty()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn builtin_patterns_cover_solid_and_ansi31() {
            let library = ResourceLibrary::builtin_patterns();
            let solid = library.get("SOLID").expect("SOLID should be builtin");
            assert_eq!(solid.content, vec![vec![45.0, 0.0, 0.0, 0.0, 0.125]]);
            let ansi31 = library.get("ANSI31").expect("ANSI31 should be builtin");
            assert_eq!(ansi31.inform, "ANSI Iron, Brick, Stone masonry");
            assert_eq!(ansi31.content, vec![vec![45.0, 0.0, 0.0, 0.0, 3.175]]);
        }

        #[test]
        fn builtin_line_types_cover_center() {
            let library = ResourceLibrary::builtin_line_types();
            let center = library.get("CENTER").expect("CENTER should be builtin");
            assert_eq!(center.content, vec![vec![1.25, -0.25, 0.25, -0.25]]);
            assert!(library.get("DASHED").is_none());
        }

        #[test]
        fn insert_replaces_same_name() {
            let mut library = ResourceLibrary::new();
            library.insert(ResourceRecord {
                name: "X".to_string(),
                inform: "first".to_string(),
                content: vec![],
            });
            library.insert(ResourceRecord {
                name: "X".to_string(),
                inform: "second".to_string(),
                content: vec![],
            });
            assert_eq!(library.len(), 1);
            assert_eq!(library.get("X").map(|record| record.inform.as_str()), Some("second"));
        }
    }
}

pub mod tables {
    use std::collections::HashMap;

    use crate::handle::{Handle, HandleAllocator};
    use crate::resource::ResourceRecord;
    use crate::tags::TagStream;

    /// 符号表记录的公共行为：有名字，句柄只指派一次。
    pub trait TableItem {
        fn name(&self) -> &str;
        fn handle(&self) -> Option<&Handle>;
        /// 由所属符号表调用，重复指派视为编程错误。
        fn assign_handle(&mut self, handle: Handle);
    }

    /// 应用注册表记录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct AppId {
        name: String,
        handle: Option<Handle>,
    }

    impl AppId {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("APPID 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "APPID");
            code.push(5, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbRegAppTableRecord");
            code.push(2, &self.name);
            code.push(70, 0);
            code
        }
    }

    impl TableItem for AppId {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 块记录。块本体与空间背衬块都以它为属主。
    #[derive(Debug, Clone, PartialEq)]
    pub struct BlockRecord {
        name: String,
        handle: Option<Handle>,
    }

    impl BlockRecord {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("BLOCK_RECORD 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "BLOCK_RECORD");
            code.push(5, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbBlockTableRecord");
            code.push(2, &self.name);
            code.push(70, 0);
            code.push(280, 1);
            code.push(281, 0);
            code
        }
    }

    impl TableItem for BlockRecord {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 标注样式记录。构造时就绑定文字样式的句柄。
    #[derive(Debug, Clone, PartialEq)]
    pub struct DimStyle {
        name: String,
        handle: Option<Handle>,
        text_style_handle: Handle,
        pub dim_scale: f64,
        pub measure_scale: f64,
        pub text_height: f64,
        pub arrow_size: f64,
        pub angle_precision: i32,
        pub dec_precision: i32,
    }

    impl DimStyle {
        pub fn new(name: impl Into<String>, text_style: &TextStyle) -> Self {
            let Some(text_style_handle) = text_style.handle() else {
                panic!("标注样式引用的文字样式尚未登记句柄");
            };
            Self {
                name: name.into(),
                handle: None,
                text_style_handle: text_style_handle.clone(),
                dim_scale: 1.0,
                measure_scale: 1.0,
                text_height: 2.5,
                arrow_size: 2.0,
                angle_precision: 1,
                dec_precision: 0,
            }
        }

        #[inline]
        pub fn text_style_handle(&self) -> &Handle {
            &self.text_style_handle
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("DIMSTYLE 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "DIMSTYLE");
            code.push(105, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbDimStyleTableRecord");
            code.push(2, &self.name);

            code.push(70, 0);
            code.push(41, self.arrow_size); // DIMASZ，箭头尺寸
            code.push(42, 0.0); // DIMEXO，尺寸界限延伸
            code.push(44, 2.0); // DIMEXE，尺寸界限偏移

            code.push(73, 0); // DIMTIH，非零时将文字水平放在内侧
            code.push(77, 1); // DIMTAD

            code.push(140, self.text_height); // DIMTXT，标注文字高度
            code.push(147, 1.0); // DIMCEN，中心标记大小

            code.push(144, self.measure_scale); // DIMLFAC，线性测量的比例因子
            code.push(40, self.dim_scale); // DIMSCALE，全局标注比例因子
            code.push(279, 1); // DIMTMOVE，标注文字移动规则

            code.push(280, 0); // DIMJUST，水平文字位置，0 为上方居中
            code.push(289, 3); // DIMATFIT，文字与箭头取较合适的一个移出
            code.push(179, self.angle_precision); // DIMADEC，角度标注精度位数

            code.push(172, 1); // DIMTOFL，强制在尺寸界线间绘制直线

            code.push(174, 1); // DIMTIX，文字强制放在尺寸界线内侧
            code.push(176, 256); // DIMCLRD，尺寸线颜色，256 随层
            code.push(177, 256); // DIMCLRE，尺寸界限颜色，256 随层
            code.push(178, 256); // DIMCLRT，标注文字颜色，256 随层

            code.push(271, self.dec_precision); // DIMDEC，标注值小数位数

            code.push(340, &self.text_style_handle);
            code
        }
    }

    impl TableItem for DimStyle {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 图层记录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct Layer {
        name: String,
        handle: Option<Handle>,
        pub line_type: Option<String>,
        pub color: i32,
        pub no_print: bool,
    }

    impl Layer {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
                line_type: None,
                color: 7,
                no_print: false,
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("LAYER 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "LAYER");
            code.push(5, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbLayerTableRecord");
            code.push(2, &self.name);

            code.push(70, 0);
            code.push(62, self.color);
            match &self.line_type {
                Some(line_type) => code.push(6, line_type),
                None => code.push(6, "CONTINUOUS"),
            }

            if self.no_print {
                code.push(290, 0);
            }

            code.push(370, -3);
            // 打印样式与材质指针按句柄派生
            code.push(390, format!("{handle}0"));
            code.push(347, format!("{handle}1"));
            code
        }
    }

    impl TableItem for Layer {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 线型记录。内置名走空定义，其余必须携带数值行。
    #[derive(Debug, Clone, PartialEq)]
    pub struct LineType {
        name: String,
        handle: Option<Handle>,
        data: Option<ResourceRecord>,
    }

    impl LineType {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
                data: None,
            }
        }

        pub fn with_record(name: impl Into<String>, record: &ResourceRecord) -> Self {
            Self {
                name: name.into(),
                handle: None,
                data: Some(record.clone()),
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("LTYPE 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "LTYPE");
            code.push(5, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbLinetypeTableRecord");
            code.push(2, &self.name);

            code.push(70, 0);

            let lowered = self.name.to_lowercase();
            if matches!(lowered.as_str(), "continuous" | "byblock" | "bylayer") {
                code.push(3, "");
                code.push(72, 65);
                code.push(73, 0);
                code.push(40, 0.0);
            } else {
                let Some(data) = &self.data else {
                    panic!("非内置线型必须携带定义数据");
                };
                let Some(content) = data.content.first() else {
                    panic!("线型定义缺少数值行");
                };
                code.push(3, &data.inform);
                code.push(72, 5);
                code.push(73, content.len());
                code.push(40, content.iter().map(|item| item.abs()).sum::<f64>());
                for item in content {
                    code.push_pairs(&[49, 74], &[*item, 0.0]);
                }
            }
            code
        }
    }

    impl TableItem for LineType {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 文字样式记录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct TextStyle {
        name: String,
        handle: Option<Handle>,
        pub font_name: String,
        pub big_font_name: String,
        pub width_factor: f64,
        pub oblique_angle: f64,
        pub system_font: Option<String>,
        pub ext_data: i64,
    }

    impl TextStyle {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
                font_name: "simp1.shx".to_string(),
                big_font_name: "hz.shx".to_string(),
                width_factor: 0.7,
                oblique_angle: 0.0,
                system_font: None,
                ext_data: 0,
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let Some(handle) = &self.handle else {
                panic!("STYLE 记录尚未登记句柄");
            };
            let mut code = TagStream::new();
            code.push(0, "STYLE");
            code.push(5, handle);
            code.push(100, "AcDbSymbolTableRecord");
            code.push(100, "AcDbTextStyleTableRecord");
            code.push(2, &self.name);

            code.push(70, 0);
            code.push(40, 0);
            code.push(41, self.width_factor);
            code.push(50, self.oblique_angle);

            code.push(71, 0);
            code.push(3, &self.font_name);
            code.push(4, &self.big_font_name);

            if let Some(system_font) = &self.system_font {
                code.push(1001, "ACAD");
                code.push(1000, system_font);
                code.push(1071, self.ext_data);
            }
            code
        }
    }

    impl TableItem for TextStyle {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "符号表记录的句柄只能指派一次");
            self.handle = Some(handle);
        }
    }

    /// 按插入顺序保存的符号表，名字重复时原位替换并换发新句柄。
    #[derive(Debug, Clone)]
    pub struct SymbolTable<T> {
        items: Vec<T>,
        index: HashMap<String, usize>,
    }

    impl<T> SymbolTable<T> {
        pub fn new() -> Self {
            Self {
                items: Vec::new(),
                index: HashMap::new(),
            }
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.items.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }

        pub fn iter(&self) -> std::slice::Iter<'_, T> {
            self.items.iter()
        }
    }

    impl<T: TableItem> SymbolTable<T> {
        /// 插入并登记句柄，返回表内记录的引用。
        pub fn insert(&mut self, mut item: T, allocator: &mut HandleAllocator) -> &T {
            item.assign_handle(allocator.next_hex());
            let existing = self.index.get(item.name()).copied();
            match existing {
                Some(position) => {
                    self.items[position] = item;
                    &self.items[position]
                }
                None => {
                    let position = self.items.len();
                    self.index.insert(item.name().to_string(), position);
                    self.items.push(item);
                    &self.items[position]
                }
            }
        }

        pub fn get(&self, name: &str) -> Option<&T> {
            self.index.get(name).map(|&position| &self.items[position])
        }
    }

    impl<T> Default for SymbolTable<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::resource::ResourceLibrary;

        #[test]
        fn symbol_table_keeps_order_and_replaces_by_name() {
            let mut allocator = HandleAllocator::new();
            let mut table = SymbolTable::new();
            table.insert(Layer::new("0"), &mut allocator);
            table.insert(Layer::new("WALL"), &mut allocator);
            let mut replacement = Layer::new("0");
            replacement.color = 3;
            table.insert(replacement, &mut allocator);

            let names: Vec<&str> = table.iter().map(|layer| layer.name()).collect();
            assert_eq!(names, ["0", "WALL"]);
            assert_eq!(table.get("0").map(|layer| layer.color), Some(3));
            // 替换记录领取新句柄
            assert_eq!(
                table.get("0").and_then(|layer| layer.handle()).map(Handle::as_str),
                Some("3")
            );
            assert!(table.get("ROOF").is_none());
        }

        #[test]
        fn layer_emits_plot_and_material_links() {
            let mut allocator = HandleAllocator::with_start(0xE);
            let mut layer = Layer::new("0");
            layer.assign_handle(allocator.next_hex());
            let expected = [
                "0", "LAYER", "5", "E", "100", "AcDbSymbolTableRecord", "100",
                "AcDbLayerTableRecord", "2", "0", "70", "0", "62", "7", "6", "CONTINUOUS",
                "370", "-3", "390", "E0", "347", "E1",
            ]
            .join("\n");
            assert_eq!(layer.to_tags().render(), expected);
        }

        #[test]
        fn no_print_layer_carries_plot_flag() {
            let mut allocator = HandleAllocator::with_start(0xF);
            let mut layer = Layer::new("Defpoints");
            layer.no_print = true;
            layer.assign_handle(allocator.next_hex());
            let rendered = layer.to_tags().render();
            assert!(rendered.contains("6\nCONTINUOUS\n290\n0\n370\n-3"));
        }

        #[test]
        fn builtin_line_type_uses_empty_pattern() {
            let mut allocator = HandleAllocator::new();
            let mut line_type = LineType::new("ByBlock");
            line_type.assign_handle(allocator.next_hex());
            let rendered = line_type.to_tags().render();
            assert!(rendered.ends_with("70\n0\n3\n\n72\n65\n73\n0\n40\n0"));
        }

        #[test]
        fn line_type_with_record_emits_dash_rows() {
            let library = ResourceLibrary::builtin_line_types();
            let record = library.get("CENTER").expect("CENTER should be builtin");
            let mut allocator = HandleAllocator::new();
            let mut line_type = LineType::with_record("CENTER", record);
            line_type.assign_handle(allocator.next_hex());
            let rendered = line_type.to_tags().render();
            assert!(rendered.contains("72\n5\n73\n4\n40\n2\n49\n1.25\n74\n0\n49\n-0.25\n74\n0"));
        }

        #[test]
        #[should_panic(expected = "尚未登记句柄")]
        fn unregistered_record_cannot_emit() {
            Layer::new("0").to_tags();
        }

        #[test]
        #[should_panic(expected = "只能指派一次")]
        fn handle_cannot_be_reassigned() {
            let mut allocator = HandleAllocator::new();
            let mut app_id = AppId::new("ACAD");
            app_id.assign_handle(allocator.next_hex());
            app_id.assign_handle(allocator.next_hex());
        }

        #[test]
        fn dim_style_binds_text_style_handle() {
            let mut allocator = HandleAllocator::with_start(0xC);
            let mut style = TextStyle::new("STANDARD");
            style.assign_handle(allocator.next_hex());
            let mut dim_style = DimStyle::new("STANDARD", &style);
            dim_style.assign_handle(allocator.next_hex());
            let rendered = dim_style.to_tags().render();
            assert!(rendered.starts_with("0\nDIMSTYLE\n105\nD\n100\nAcDbSymbolTableRecord"));
            assert!(rendered.ends_with("340\nC"));
            assert!(rendered.contains("140\n2.5"));
        }

        #[test]
        #[should_panic(expected = "文字样式尚未登记")]
        fn dim_style_requires_registered_text_style() {
            let style = TextStyle::new("STANDARD");
            DimStyle::new("STANDARD", &style);
        }

        #[test]
        fn text_style_appends_extended_data_after_system_font() {
            let mut allocator = HandleAllocator::new();
            let mut style = TextStyle::new("GB");
            style.system_font = Some("SimSun".to_string());
            style.ext_data = 2;
            style.assign_handle(allocator.next_hex());
            let rendered = style.to_tags().render();
            assert!(rendered.ends_with("1001\nACAD\n1000\nSimSun\n1071\n2"));
        }
    }
}

pub mod block {
    use crate::entity::Entity;
    use crate::geometry::Point2;
    use crate::handle::{Handle, HandleAllocator};
    use crate::tables::{BlockRecord, Layer, TableItem};
    use crate::tags::TagStream;

    /// 块定义。先登记三枚句柄（起始、结束、块记录），之后才能填充实体。
    #[derive(Debug, Clone)]
    pub struct Block {
        name: String,
        layer: Option<String>,
        pub base_point: Point2,
        begin_handle: Option<Handle>,
        end_handle: Option<Handle>,
        record: BlockRecord,
        entities: Vec<Entity>,
    }

    impl Block {
        pub fn new(name: impl Into<String>) -> Self {
            let name = name.into();
            Self {
                record: BlockRecord::new(name.clone()),
                name,
                layer: None,
                base_point: Point2::new(0.0, 0.0),
                begin_handle: None,
                end_handle: None,
                entities: Vec::new(),
            }
        }

        /// 登记块：依次取得起始、结束与块记录句柄。
        pub fn attach(&mut self, allocator: &mut HandleAllocator) {
            assert!(self.begin_handle.is_none(), "块只能登记一次");
            self.begin_handle = Some(allocator.next_hex());
            self.end_handle = Some(allocator.next_hex());
            self.record.assign_handle(allocator.next_hex());
        }

        #[inline]
        pub fn name(&self) -> &str {
            &self.name
        }

        pub fn set_layer(&mut self, layer: &Layer) {
            self.layer = Some(layer.name().to_string());
        }

        #[inline]
        pub fn record(&self) -> &BlockRecord {
            &self.record
        }

        #[inline]
        pub fn record_handle(&self) -> Option<&Handle> {
            self.record.handle()
        }

        #[inline]
        pub fn begin_handle(&self) -> Option<&Handle> {
            self.begin_handle.as_ref()
        }

        #[inline]
        pub fn end_handle(&self) -> Option<&Handle> {
            self.end_handle.as_ref()
        }

        #[inline]
        pub fn entities(&self) -> &[Entity] {
            &self.entities
        }

        pub(crate) fn attached_record_handle(&self) -> &Handle {
            match self.record.handle() {
                Some(handle) => handle,
                None => panic!("块记录尚未登记句柄"),
            }
        }

        /// 追加实体，属主指向块记录。
        pub fn append(&mut self, allocator: &mut HandleAllocator, mut entity: Entity) {
            let owner = self.attached_record_handle().clone();
            entity.attach(allocator.next_hex(), owner);
            self.entities.push(entity);
        }

        pub fn to_tags(&self) -> TagStream {
            let (Some(begin), Some(end)) = (&self.begin_handle, &self.end_handle) else {
                panic!("块尚未登记，无法生成组码");
            };
            let layer = self.layer.as_deref().unwrap_or("0");
            let mut code = TagStream::new();
            code.push(0, "BLOCK");
            code.push(5, begin);
            code.push(100, "AcDbEntity");
            code.push(8, layer);
            code.push(100, "AcDbBlockBegin");
            code.push(2, &self.name);
            code.push(70, 0);
            code.push_pairs(&[10, 20, 30], &[self.base_point.x(), self.base_point.y(), 0.0]);
            code.push(3, &self.name);
            for entity in &self.entities {
                code.extend(entity.to_tags());
            }
            code.push(0, "ENDBLK");
            code.push(5, end);
            code.push(100, "AcDbEntity");
            code.push(8, layer);
            code.push(100, "AcDbBlockEnd");
            code
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::entity::Entity;
        use crate::geometry::Point2;

        #[test]
        #[should_panic(expected = "尚未登记句柄")]
        fn append_before_attach_is_rejected() {
            let mut allocator = HandleAllocator::new();
            let mut block = Block::new("DOOR");
            block.append(&mut allocator, Entity::circle(Point2::new(0.0, 0.0), 1.0));
        }

        #[test]
        #[should_panic(expected = "只能登记一次")]
        fn attach_twice_is_rejected() {
            let mut allocator = HandleAllocator::new();
            let mut block = Block::new("DOOR");
            block.attach(&mut allocator);
            block.attach(&mut allocator);
        }

        #[test]
        fn append_assigns_owner_from_block_record() {
            let mut allocator = HandleAllocator::new();
            let mut block = Block::new("DOOR");
            block.attach(&mut allocator);
            let mut circle = Entity::circle(Point2::new(0.0, 0.0), 1.0);
            circle.set_layer(&Layer::new("0"));
            block.append(&mut allocator, circle);

            let entity = &block.entities()[0];
            assert_eq!(entity.handle().map(Handle::as_str), Some("4"));
            assert_eq!(entity.owner_handle(), block.record_handle());
        }

        #[test]
        fn tags_wrap_entities_between_markers() {
            let mut allocator = HandleAllocator::new();
            let mut block = Block::new("DOOR");
            block.attach(&mut allocator);
            let mut circle = Entity::circle(Point2::new(0.0, 0.0), 1.0);
            circle.set_layer(&Layer::new("0"));
            block.append(&mut allocator, circle);

            let rendered = block.to_tags().render();
            assert!(rendered.starts_with("0\nBLOCK\n5\n1\n100\nAcDbEntity\n8\n0"));
            assert!(rendered.contains("2\nDOOR\n70\n0\n10\n0\n20\n0\n30\n0\n3\nDOOR"));
            assert!(rendered.contains("0\nCIRCLE"));
            assert!(rendered.ends_with("0\nENDBLK\n5\n2\n100\nAcDbEntity\n8\n0\n100\nAcDbBlockEnd"));
        }
    }
}

pub mod space {
    use crate::block::Block;
    use crate::entity::{Entity, EntityKind};
    use crate::geometry::Point2;
    use crate::handle::HandleAllocator;
    use crate::objects::Layout;

    /// 模型空间。实体单独保存，背衬块始终为空。
    #[derive(Debug, Clone)]
    pub struct ModelSpace {
        block: Block,
        entities: Vec<Entity>,
    }

    impl ModelSpace {
        pub fn new(allocator: &mut HandleAllocator) -> Self {
            let mut block = Block::new("*MODEL_SPACE");
            block.attach(allocator);
            Self {
                block,
                entities: Vec::new(),
            }
        }

        #[inline]
        pub fn name(&self) -> &str {
            self.block.name()
        }

        /// 模型空间不接受视口实体。
        pub fn append(&mut self, allocator: &mut HandleAllocator, mut entity: Entity) {
            assert!(!entity.is_viewport(), "视口实体只能放入图纸空间");
            entity.attach(
                allocator.next_hex(),
                self.block.attached_record_handle().clone(),
            );
            self.entities.push(entity);
        }

        #[inline]
        pub fn block(&self) -> &Block {
            &self.block
        }

        #[inline]
        pub fn entities(&self) -> &[Entity] {
            &self.entities
        }
    }

    /// 图纸空间：背衬块、布局与独立的视口编号计数。
    #[derive(Debug, Clone)]
    pub struct PaperSpace {
        block: Block,
        entities: Vec<Entity>,
        layout: Layout,
        viewport_ids: HandleAllocator,
    }

    impl PaperSpace {
        /// `index` 是文档内的图纸空间序号，决定空间名与布局名。
        /// 新空间自动带一个覆盖整幅图纸的视口。
        pub fn new(allocator: &mut HandleAllocator, index: usize, width: f64, height: f64) -> Self {
            let name = if index == 0 {
                "*PAPER_SPACE".to_string()
            } else {
                format!("*PAPER_SPACE{index}")
            };
            let mut block = Block::new(name);
            block.attach(allocator);
            let mut layout = Layout::new(
                format!("Layout{}", index + 1),
                Point2::new(0.0, 0.0),
                Point2::new(width, height),
            );
            layout.set_space_handle(block.attached_record_handle().clone());
            let mut space = Self {
                block,
                entities: Vec::new(),
                layout,
                viewport_ids: HandleAllocator::new(),
            };
            space.append(
                allocator,
                Entity::viewport(
                    Point2::new(0.0, 0.0),
                    Point2::new(0.0, height / 2.0),
                    width,
                    height,
                ),
            );
            space
        }

        #[inline]
        pub fn name(&self) -> &str {
            self.block.name()
        }

        /// 空间状态置 1，视口实体顺带领取下一枚十进制编号。
        pub fn append(&mut self, allocator: &mut HandleAllocator, mut entity: Entity) {
            entity.attach(
                allocator.next_hex(),
                self.block.attached_record_handle().clone(),
            );
            entity.set_space_status(1);
            if let EntityKind::Viewport(viewport) = entity.kind_mut() {
                viewport.set_port_id(self.viewport_ids.next_dec());
            }
            self.entities.push(entity);
        }

        #[inline]
        pub fn block(&self) -> &Block {
            &self.block
        }

        #[inline]
        pub fn entities(&self) -> &[Entity] {
            &self.entities
        }

        #[inline]
        pub fn layout(&self) -> &Layout {
            &self.layout
        }

        pub(crate) fn layout_mut(&mut self) -> &mut Layout {
            &mut self.layout
        }
    }

}

pub mod objects {
    use crate::geometry::Point2;
    use crate::handle::{Handle, HandleAllocator};
    use crate::tags::TagStream;

    /// OBJECTS 段成员的公共行为：句柄与属主由收纳方指派。
    pub trait ObjectItem {
        fn name(&self) -> &str;
        fn handle(&self) -> Option<&Handle>;
        fn owner_handle(&self) -> Option<&Handle>;
        fn assign_handle(&mut self, handle: Handle);
        fn set_owner_handle(&mut self, handle: Handle);
    }

    /// 字典对象，保存名字到句柄的条目。
    #[derive(Debug, Clone)]
    pub struct Dictionary {
        name: String,
        handle: Option<Handle>,
        owner_handle: Option<Handle>,
        entries: Vec<(String, Handle)>,
    }

    impl Dictionary {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                handle: None,
                owner_handle: None,
                entries: Vec::new(),
            }
        }

        /// 收纳子对象：指派句柄、回填属主并登记条目。
        pub fn append_child(
            &mut self,
            allocator: &mut HandleAllocator,
            child: &mut impl ObjectItem,
        ) {
            let owner = match &self.handle {
                Some(handle) => handle.clone(),
                None => panic!("字典尚未登记句柄"),
            };
            let handle = allocator.next_hex();
            child.assign_handle(handle.clone());
            child.set_owner_handle(owner);
            self.entries.push((child.name().to_string(), handle));
        }

        #[inline]
        pub fn entries(&self) -> &[(String, Handle)] {
            &self.entries
        }

        pub fn to_tags(&self) -> TagStream {
            let (Some(handle), Some(owner)) = (&self.handle, &self.owner_handle) else {
                panic!("字典尚未完成挂接，无法生成组码");
            };
            let mut code = TagStream::new();
            code.push(0, "DICTIONARY");
            code.push(5, handle);
            code.push(330, owner);
            code.push(100, "AcDbDictionary");
            for (name, child_handle) in &self.entries {
                code.push(3, name);
                code.push(350, child_handle);
            }
            code
        }
    }

    impl ObjectItem for Dictionary {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn owner_handle(&self) -> Option<&Handle> {
            self.owner_handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "对象句柄只能指派一次");
            self.handle = Some(handle);
        }

        fn set_owner_handle(&mut self, handle: Handle) {
            self.owner_handle = Some(handle);
        }
    }

    /// 布局对象：图纸空间的打印描述。
    #[derive(Debug, Clone)]
    pub struct Layout {
        name: String,
        handle: Option<Handle>,
        owner_handle: Option<Handle>,
        space_handle: Option<Handle>,
        pub lower_left: Point2,
        pub upper_right: Point2,
    }

    impl Layout {
        pub fn new(name: impl Into<String>, lower_left: Point2, upper_right: Point2) -> Self {
            Self {
                name: name.into(),
                handle: None,
                owner_handle: None,
                space_handle: None,
                lower_left,
                upper_right,
            }
        }

        pub fn set_space_handle(&mut self, handle: Handle) {
            self.space_handle = Some(handle);
        }

        #[inline]
        pub fn space_handle(&self) -> Option<&Handle> {
            self.space_handle.as_ref()
        }

        pub fn to_tags(&self) -> TagStream {
            let (Some(handle), Some(owner), Some(space)) =
                (&self.handle, &self.owner_handle, &self.space_handle)
            else {
                panic!("布局尚未完成挂接，无法生成组码");
            };
            let width = self.upper_right.x() - self.lower_left.x();
            let height = self.upper_right.y() - self.lower_left.y();

            let mut code = TagStream::new();
            code.push(0, "LAYOUT");
            code.push(5, handle);
            code.push(330, owner);
            // 打印设置
            code.push(100, "AcDbPlotSettings");
            code.push(1, "");
            code.push(2, "none_device");
            code.push(4, format!("ISO_A2_({width:.2}_x_{height:.2}_MM)"));
            code.push(6, "");
            code.push_pairs(&[40, 41, 42, 43], &[5.0, 5.0, 5.0, 5.0]);
            code.push_pairs(&[44, 45], &[height, width]);
            code.push_pairs(&[46, 47], &[0.0, 0.0]);
            code.push_pairs(&[142, 143], &[1.0, 1.0]);
            code.push(70, 1);
            code.push(72, 1);
            code.push(73, 1);
            code.push(74, 5);
            code.push(75, 16);
            code.push(77, 2);
            code.push_pairs(&[148, 149], &[0.0, 0.0]);
            // 布局主体
            code.push(100, "AcDbLayout");
            code.push(1, &self.name);
            code.push_pairs(&[10, 20], &[self.lower_left.x(), self.lower_left.y()]);
            code.push_pairs(&[11, 21], &[self.upper_right.x(), self.upper_right.y()]);
            code.push_pairs(
                &[14, 24, 34],
                &[self.lower_left.x() - 100.0, self.lower_left.y() - 100.0, 0.0],
            );
            code.push_pairs(
                &[15, 25, 35],
                &[self.upper_right.x() + 100.0, self.upper_right.y() + 100.0, 0.0],
            );
            code.push(330, space);
            code
        }
    }

    impl ObjectItem for Layout {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self) -> Option<&Handle> {
            self.handle.as_ref()
        }

        fn owner_handle(&self) -> Option<&Handle> {
            self.owner_handle.as_ref()
        }

        fn assign_handle(&mut self, handle: Handle) {
            assert!(self.handle.is_none(), "对象句柄只能指派一次");
            self.handle = Some(handle);
        }

        fn set_owner_handle(&mut self, handle: Handle) {
            self.owner_handle = Some(handle);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn dictionary_lists_children_in_order() {
            let mut allocator = HandleAllocator::with_start(0x10);
            let mut root = Dictionary::new("root");
            root.assign_handle(allocator.next_hex());
            root.set_owner_handle(Handle::null());
            let mut group = Dictionary::new("ACAD_GROUP");
            let mut layouts = Dictionary::new("ACAD_LAYOUT");
            root.append_child(&mut allocator, &mut group);
            root.append_child(&mut allocator, &mut layouts);

            assert_eq!(group.owner_handle().map(Handle::as_str), Some("10"));
            let rendered = root.to_tags().render();
            assert_eq!(
                rendered,
                "0\nDICTIONARY\n5\n10\n330\n0\n100\nAcDbDictionary\n3\nACAD_GROUP\n350\n11\n3\nACAD_LAYOUT\n350\n12"
            );
        }

        #[test]
        #[should_panic(expected = "字典尚未登记句柄")]
        fn unregistered_dictionary_cannot_take_children() {
            let mut allocator = HandleAllocator::new();
            let mut root = Dictionary::new("root");
            let mut child = Dictionary::new("ACAD_GROUP");
            root.append_child(&mut allocator, &mut child);
        }

        #[test]
        fn layout_margins_frame_plot_area() {
            let mut layout = Layout::new(
                "Layout1",
                Point2::new(0.0, 0.0),
                Point2::new(594.0, 420.0),
            );
            layout.assign_handle(Handle::decimal(19));
            layout.set_owner_handle(Handle::decimal(18));
            layout.set_space_handle(Handle::decimal(7));
            let rendered = layout.to_tags().render();
            assert!(rendered.contains("4\nISO_A2_(594.00_x_420.00_MM)"));
            assert!(rendered.contains("44\n420\n45\n594"));
            assert!(rendered.contains("14\n-100\n24\n-100\n34\n0"));
            assert!(rendered.contains("15\n694\n25\n520\n35\n0"));
            assert!(rendered.ends_with("330\n7"));
        }

        #[test]
        #[should_panic(expected = "布局尚未完成挂接")]
        fn layout_requires_space_handle() {
            let mut layout = Layout::new("Layout1", Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
            layout.assign_handle(Handle::decimal(19));
            layout.set_owner_handle(Handle::decimal(18));
            layout.to_tags();
        }
    }
}

pub mod document {
    use crate::block::Block;
    use crate::entity::Entity;
    use crate::handle::{Handle, HandleAllocator};
    use crate::objects::{Dictionary, ObjectItem};
    use crate::resource::ResourceLibrary;
    use crate::space::{ModelSpace, PaperSpace};
    use crate::tables::{AppId, DimStyle, Layer, LineType, SymbolTable, TableItem, TextStyle};
    use crate::tags::TagStream;

    /// HEADER 段变量。
    #[derive(Debug, Clone, PartialEq)]
    pub struct HeaderVariable {
        pub name: String,
        pub code: i32,
        pub value: String,
    }

    impl HeaderVariable {
        pub fn new(name: impl Into<String>, code: i32, value: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                code,
                value: value.into(),
            }
        }

        pub fn to_tags(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(9, format!("${}", self.name));
            code.push(self.code, &self.value);
            code
        }
    }

    /// CLASSES 段记录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct ClassDef {
        pub record_name: String,
        pub class_name: String,
        pub application_name: String,
        pub proxy_flags: i32,
        pub instance_count: i32,
        pub was_proxy: i32,
        pub is_entity: i32,
    }

    impl ClassDef {
        pub fn to_tags(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "CLASS");
            code.push(1, &self.record_name);
            code.push(2, &self.class_name);
            code.push(3, &self.application_name);
            code.push(90, self.proxy_flags);
            code.push(91, self.instance_count);
            code.push(280, self.was_proxy);
            code.push(281, self.is_entity);
            code
        }
    }

    /// 九张符号表外壳的句柄。首次生成时一次性分配，之后复用。
    #[derive(Debug, Clone)]
    struct SectionHandles {
        app_id: Handle,
        block_record: Handle,
        dim_style: Handle,
        layer: Handle,
        line_type: Handle,
        text_style: Handle,
        ucs: Handle,
        view: Handle,
        vport: Handle,
    }

    /// 单张图形的完整数据库。新文档即带有标准配置：
    /// ACAD 应用注册、默认线型与样式、图层 0 和 Defpoints、
    /// 模型空间加一个 A2 图纸空间，以及布局字典树。
    #[derive(Debug, Clone)]
    pub struct Document {
        handles: HandleAllocator,
        variables: Vec<HeaderVariable>,
        classes: Vec<ClassDef>,
        app_id: AppId,
        dim_styles: SymbolTable<DimStyle>,
        layers: SymbolTable<Layer>,
        line_types: SymbolTable<LineType>,
        text_styles: SymbolTable<TextStyle>,
        blocks: Vec<Block>,
        model_space: ModelSpace,
        paper_spaces: Vec<PaperSpace>,
        dictionaries: Vec<Dictionary>,
        pattern_resource: ResourceLibrary,
        line_type_resource: ResourceLibrary,
        unnamed_blocks: usize,
        section_handles: Option<SectionHandles>,
    }

    impl Document {
        pub fn new() -> Self {
            let mut handles = HandleAllocator::new();

            let mut app_id = AppId::new("ACAD");
            app_id.assign_handle(handles.next_hex());

            let model_space = ModelSpace::new(&mut handles);
            let mut paper_space = PaperSpace::new(&mut handles, 0, 594.0, 420.0);

            let variables = vec![
                HeaderVariable::new("ACADVER", 1, "AC1021"),
                HeaderVariable::new("HANDSEED", 5, HandleAllocator::ceiling_hex().to_string()),
            ];
            let classes = vec![ClassDef {
                record_name: "WIPEOUTVARIABLES".to_string(),
                class_name: "AcDbWipeoutVariables".to_string(),
                application_name: "WipeOut|Product Desc:     WipeOut Dbx Application|Company:          Autodesk, Inc.|WEB Address:      www.autodesk.com".to_string(),
                proxy_flags: 0,
                instance_count: 1,
                was_proxy: 0,
                is_entity: 0,
            }];

            let mut line_types = SymbolTable::new();
            line_types.insert(LineType::new("CONTINUOUS"), &mut handles);
            line_types.insert(LineType::new("ByBlock"), &mut handles);
            line_types.insert(LineType::new("ByLayer"), &mut handles);

            let mut text_styles = SymbolTable::new();
            let standard_style = text_styles.insert(TextStyle::new("STANDARD"), &mut handles);

            let mut dim_styles = SymbolTable::new();
            dim_styles.insert(DimStyle::new("STANDARD", standard_style), &mut handles);

            let mut layers = SymbolTable::new();
            layers.insert(Layer::new("0"), &mut handles);
            let mut defpoints = Layer::new("Defpoints");
            defpoints.no_print = true;
            layers.insert(defpoints, &mut handles);

            let mut root = Dictionary::new("root");
            root.assign_handle(handles.next_hex());
            root.set_owner_handle(Handle::null());
            let mut group = Dictionary::new("ACAD_GROUP");
            let mut layout_dict = Dictionary::new("ACAD_LAYOUT");
            root.append_child(&mut handles, &mut group);
            root.append_child(&mut handles, &mut layout_dict);
            layout_dict.append_child(&mut handles, paper_space.layout_mut());

            Self {
                handles,
                variables,
                classes,
                app_id,
                dim_styles,
                layers,
                line_types,
                text_styles,
                blocks: Vec::new(),
                model_space,
                paper_spaces: vec![paper_space],
                dictionaries: vec![root, group, layout_dict],
                pattern_resource: ResourceLibrary::builtin_patterns(),
                line_type_resource: ResourceLibrary::builtin_line_types(),
                unnamed_blocks: 0,
                section_handles: None,
            }
        }

        #[inline]
        pub fn app_id(&self) -> &AppId {
            &self.app_id
        }

        #[inline]
        pub fn layers(&self) -> &SymbolTable<Layer> {
            &self.layers
        }

        #[inline]
        pub fn line_types(&self) -> &SymbolTable<LineType> {
            &self.line_types
        }

        #[inline]
        pub fn text_styles(&self) -> &SymbolTable<TextStyle> {
            &self.text_styles
        }

        #[inline]
        pub fn dim_styles(&self) -> &SymbolTable<DimStyle> {
            &self.dim_styles
        }

        pub fn add_layer(&mut self, layer: Layer) -> &Layer {
            self.layers.insert(layer, &mut self.handles)
        }

        pub fn add_line_type(&mut self, line_type: LineType) -> &LineType {
            self.line_types.insert(line_type, &mut self.handles)
        }

        pub fn add_text_style(&mut self, style: TextStyle) -> &TextStyle {
            self.text_styles.insert(style, &mut self.handles)
        }

        pub fn add_dim_style(&mut self, style: DimStyle) -> &DimStyle {
            self.dim_styles.insert(style, &mut self.handles)
        }

        #[inline]
        pub fn model_space(&self) -> &ModelSpace {
            &self.model_space
        }

        /// 首个图纸空间。文档始终至少有一个。
        pub fn paper_space(&self) -> &PaperSpace {
            match self.paper_spaces.first() {
                Some(space) => space,
                None => panic!("图纸空间列表为空"),
            }
        }

        #[inline]
        pub fn paper_spaces(&self) -> &[PaperSpace] {
            &self.paper_spaces
        }

        #[inline]
        pub fn blocks(&self) -> &[Block] {
            &self.blocks
        }

        #[inline]
        pub fn dictionaries(&self) -> &[Dictionary] {
            &self.dictionaries
        }

        #[inline]
        pub fn pattern_resource(&self) -> &ResourceLibrary {
            &self.pattern_resource
        }

        #[inline]
        pub fn pattern_resource_mut(&mut self) -> &mut ResourceLibrary {
            &mut self.pattern_resource
        }

        #[inline]
        pub fn line_type_resource(&self) -> &ResourceLibrary {
            &self.line_type_resource
        }

        #[inline]
        pub fn line_type_resource_mut(&mut self) -> &mut ResourceLibrary {
            &mut self.line_type_resource
        }

        pub fn append_to_model(&mut self, entity: Entity) {
            self.model_space.append(&mut self.handles, entity);
        }

        /// 追加到首个图纸空间。
        pub fn append_to_paper(&mut self, entity: Entity) {
            self.append_to_paper_at(0, entity);
        }

        pub fn append_to_paper_at(&mut self, index: usize, entity: Entity) {
            let Some(space) = self.paper_spaces.get_mut(index) else {
                panic!("图纸空间索引 {index} 越界");
            };
            space.append(&mut self.handles, entity);
        }

        /// 新开一个图纸空间，布局随之挂入 ACAD_LAYOUT 字典。
        pub fn add_paper_space(&mut self, width: f64, height: f64) -> usize {
            let index = self.paper_spaces.len();
            let mut space = PaperSpace::new(&mut self.handles, index, width, height);
            let Some(layout_dict) = self
                .dictionaries
                .iter_mut()
                .find(|dictionary| dictionary.name() == "ACAD_LAYOUT")
            else {
                panic!("缺少 ACAD_LAYOUT 字典");
            };
            layout_dict.append_child(&mut self.handles, space.layout_mut());
            self.paper_spaces.push(space);
            index
        }

        /// 登记一个用户块并返回索引。名字留空时按 BLOCK{n} 自动编号。
        pub fn new_block(&mut self, name: Option<&str>) -> usize {
            let name = match name {
                Some(name) => name.to_string(),
                None => {
                    let name = format!("BLOCK{}", self.unnamed_blocks);
                    self.unnamed_blocks += 1;
                    name
                }
            };
            let mut block = Block::new(name);
            block.attach(&mut self.handles);
            self.blocks.push(block);
            self.blocks.len() - 1
        }

        pub fn block(&self, index: usize) -> &Block {
            match self.blocks.get(index) {
                Some(block) => block,
                None => panic!("块索引 {index} 越界"),
            }
        }

        pub fn block_mut(&mut self, index: usize) -> &mut Block {
            match self.blocks.get_mut(index) {
                Some(block) => block,
                None => panic!("块索引 {index} 越界"),
            }
        }

        pub fn append_to_block(&mut self, index: usize, entity: Entity) {
            let Some(block) = self.blocks.get_mut(index) else {
                panic!("块索引 {index} 越界");
            };
            block.append(&mut self.handles, entity);
        }

        /// 生成整张图的组码。重复调用产出完全一致的文本。
        pub fn build(&mut self) -> TagStream {
            if self.section_handles.is_none() {
                let allocator = &mut self.handles;
                self.section_handles = Some(SectionHandles {
                    app_id: allocator.next_hex(),
                    block_record: allocator.next_hex(),
                    dim_style: allocator.next_hex(),
                    layer: allocator.next_hex(),
                    line_type: allocator.next_hex(),
                    text_style: allocator.next_hex(),
                    ucs: allocator.next_hex(),
                    view: allocator.next_hex(),
                    vport: allocator.next_hex(),
                });
            }
            let mut code = TagStream::new();
            code.extend(self.build_header());
            code.extend(self.build_classes());
            code.extend(self.build_tables());
            code.extend(self.build_blocks());
            code.extend(self.build_entities());
            code.extend(self.build_objects());
            code.push(0, "EOF");
            code
        }

        fn build_header(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "HEADER");
            for variable in &self.variables {
                code.extend(variable.to_tags());
            }
            code.push(0, "ENDSEC");
            code
        }

        fn build_classes(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "CLASSES");
            for class in &self.classes {
                code.extend(class.to_tags());
            }
            code.push(0, "ENDSEC");
            code
        }

        fn table_head(name: &str, handle: &Handle) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "TABLE");
            code.push(2, name);
            code.push(5, handle);
            code.push(100, "AcDbSymbolTable");
            code.push(70, 0);
            code
        }

        fn build_empty_table(name: &str, handle: &Handle) -> TagStream {
            let mut code = Self::table_head(name, handle);
            code.push(0, "ENDTAB");
            code
        }

        fn build_tables(&self) -> TagStream {
            let Some(sections) = &self.section_handles else {
                panic!("符号表外壳句柄尚未分配");
            };
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "TABLES");

            let mut table = Self::table_head("APPID", &sections.app_id);
            table.extend(self.app_id.to_tags());
            table.push(0, "ENDTAB");
            code.extend(table);

            // 块记录按模型空间、各图纸空间、用户块的次序排列
            let mut table = Self::table_head("BLOCK_RECORD", &sections.block_record);
            table.extend(self.model_space.block().record().to_tags());
            for space in &self.paper_spaces {
                table.extend(space.block().record().to_tags());
            }
            for block in &self.blocks {
                table.extend(block.record().to_tags());
            }
            table.push(0, "ENDTAB");
            code.extend(table);

            let mut table = Self::table_head("DIMSTYLE", &sections.dim_style);
            table.push(100, "AcDbDimStyleTable");
            table.push(71, 1);
            for style in self.dim_styles.iter() {
                table.extend(style.to_tags());
            }
            table.push(0, "ENDTAB");
            code.extend(table);

            let mut table = Self::table_head("LAYER", &sections.layer);
            for layer in self.layers.iter() {
                table.extend(layer.to_tags());
            }
            table.push(0, "ENDTAB");
            code.extend(table);

            let mut table = Self::table_head("LTYPE", &sections.line_type);
            for line_type in self.line_types.iter() {
                table.extend(line_type.to_tags());
            }
            table.push(0, "ENDTAB");
            code.extend(table);

            let mut table = Self::table_head("STYLE", &sections.text_style);
            for style in self.text_styles.iter() {
                table.extend(style.to_tags());
            }
            table.push(0, "ENDTAB");
            code.extend(table);

            code.extend(Self::build_empty_table("UCS", &sections.ucs));
            code.extend(Self::build_empty_table("VIEW", &sections.view));
            code.extend(Self::build_empty_table("VPORT", &sections.vport));

            code.push(0, "ENDSEC");
            code
        }

        fn build_blocks(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "BLOCKS");
            code.extend(self.model_space.block().to_tags());
            for space in &self.paper_spaces {
                code.extend(space.block().to_tags());
            }
            for block in &self.blocks {
                code.extend(block.to_tags());
            }
            code.push(0, "ENDSEC");
            code
        }

        fn build_entities(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "ENTITIES");
            for entity in self.model_space.entities() {
                code.extend(entity.to_tags());
            }
            for space in &self.paper_spaces {
                for entity in space.entities() {
                    code.extend(entity.to_tags());
                }
            }
            code.push(0, "ENDSEC");
            code
        }

        fn build_objects(&self) -> TagStream {
            let mut code = TagStream::new();
            code.push(0, "SECTION");
            code.push(2, "OBJECTS");
            for dictionary in &self.dictionaries {
                code.extend(dictionary.to_tags());
            }
            for space in &self.paper_spaces {
                code.extend(space.layout().to_tags());
            }
            code.push(0, "ENDSEC");
            code
        }
    }

    impl Default for Document {
        fn default() -> Self {
            Self::new()
        }
    }

}
