//! 日/月图形几何：路径数据模型、SVG 路径解析、逐命令插值、颜色插值、
//! 弧长测量、旋转变换后端、lyon 网格化
//!
//! 太阳与月亮两条路径的命令结构完全一致（同序同类），才能逐坐标插值；
//! 不一致时中间形状无定义，由测试在构建期保证。

use egui::{Color32, Pos2, pos2};
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::PathEvent;

/// 太阳圆盘（viewBox 96×96）
pub const SUN_D: &str = "M48 66.6667C58.3093 66.6667 66.6667 58.3093 66.6667 48C66.6667 37.6907 58.3093 29.3333 48 29.3333C37.6907 29.3333 29.3333 37.6907 29.3333 48C29.3333 58.3093 37.6907 66.6667 48 66.6667Z";

/// 月牙：与太阳同构（4 段三次曲线 + 闭合），仅坐标不同
pub const MOON_D: &str = "M48 66.6667C58.3093 66.6667 66.6667 58.3093 66.6667 48C47.6753 56.3448 38.6168 48.6759 48 29.3333C37.6907 29.3333 29.3333 37.6907 29.3333 48C29.3333 58.3093 37.6907 66.6667 48 66.6667Z";

/// 八条光线，数组顺序即显隐的视觉顺序（0 最先）
pub const RAYS_D: [&str; 8] = [
    "M48 1.33333V10.6667",
    "M80.9933 15.0067L74.4133 21.5867",
    "M85.3333 48H94.6667",
    "M74.4133 74.4133L80.9933 80.9933",
    "M48 85.3333V94.6667",
    "M21.5867 74.4133L15.0067 80.9933",
    "M1.33333 48H10.6667",
    "M15.0067 15.0067L21.5867 21.5867",
];

/// 三次曲线折线化采样段数（测弧长用）
const CURVE_STEPS: usize = 16;

/// 绘图命令。H/V 在解析时归一成 LineTo，插值与渲染只处理这四种。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Pos2),
    CurveTo { c1: Pos2, c2: Pos2, to: Pos2 },
    LineTo(Pos2),
    Close,
}

/// 路径数据解析错误。路径都是编译进制品的常量，这里只会在改错常量时触发
#[derive(Clone, Debug, PartialEq)]
pub enum PathError {
    /// 不支持的命令字母（只支持绝对坐标 M/C/L/H/V/Z）
    UnsupportedCommand(char),
    /// 命令后数字个数不够
    MissingNumber(char),
    /// 数字本身解析失败
    BadNumber(String),
    /// 数字出现在任何命令之前
    StrayNumber,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::UnsupportedCommand(c) => write!(f, "unsupported path command '{c}'"),
            PathError::MissingNumber(c) => write!(f, "missing coordinate after '{c}'"),
            PathError::BadNumber(s) => write!(f, "bad number '{s}'"),
            PathError::StrayNumber => write!(f, "coordinate before any command"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Clone, Copy)]
enum Tok {
    Cmd(char),
    Num(f32),
}

fn tokenize(d: &str) -> Result<Vec<Tok>, PathError> {
    let mut toks = Vec::new();
    let bytes = d.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() {
            toks.push(Tok::Cmd(c));
            i += 1;
        } else {
            let start = i;
            while i < bytes.len() {
                let b = bytes[i] as char;
                let in_num = b.is_ascii_digit()
                    || b == '.'
                    || ((b == '-' || b == '+') && i == start);
                if !in_num {
                    break;
                }
                i += 1;
            }
            let s = &d[start..i];
            let n = s.parse::<f32>().map_err(|_| PathError::BadNumber(s.to_owned()))?;
            toks.push(Tok::Num(n));
        }
    }
    Ok(toks)
}

/// 解析 SVG path data 的绝对命令子集 M/C/L/H/V/Z，H/V 归一为 LineTo
pub fn parse_path(d: &str) -> Result<Vec<PathCmd>, PathError> {
    let toks = tokenize(d)?;
    let mut cmds = Vec::new();
    let mut cur = pos2(0.0, 0.0);
    let mut i = 0;

    let num = |toks: &[Tok], i: &mut usize, cmd: char| -> Result<f32, PathError> {
        match toks.get(*i) {
            Some(Tok::Num(n)) => {
                *i += 1;
                Ok(*n)
            }
            _ => Err(PathError::MissingNumber(cmd)),
        }
    };
    let has_num = |toks: &[Tok], i: usize| matches!(toks.get(i), Some(Tok::Num(_)));

    while i < toks.len() {
        let Tok::Cmd(c) = toks[i] else {
            return Err(PathError::StrayNumber);
        };
        i += 1;
        match c {
            'M' => {
                cur = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                cmds.push(PathCmd::MoveTo(cur));
                // M 后的多余坐标对按 SVG 规则当作 L
                while has_num(&toks, i) {
                    cur = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                    cmds.push(PathCmd::LineTo(cur));
                }
            }
            'C' => {
                while has_num(&toks, i) {
                    let c1 = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                    let c2 = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                    let to = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                    cmds.push(PathCmd::CurveTo { c1, c2, to });
                    cur = to;
                }
            }
            'L' => {
                while has_num(&toks, i) {
                    cur = pos2(num(&toks, &mut i, c)?, num(&toks, &mut i, c)?);
                    cmds.push(PathCmd::LineTo(cur));
                }
            }
            'H' => {
                while has_num(&toks, i) {
                    cur = pos2(num(&toks, &mut i, c)?, cur.y);
                    cmds.push(PathCmd::LineTo(cur));
                }
            }
            'V' => {
                while has_num(&toks, i) {
                    cur = pos2(cur.x, num(&toks, &mut i, c)?);
                    cmds.push(PathCmd::LineTo(cur));
                }
            }
            'Z' | 'z' => cmds.push(PathCmd::Close),
            other => return Err(PathError::UnsupportedCommand(other)),
        }
    }
    Ok(cmds)
}

fn lerp(a: Pos2, b: Pos2, t: f32) -> Pos2 {
    pos2(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// 逐命令、逐坐标线性插值：p=0 完全是 a，p=1 完全是 b，命令结构不变
pub fn mix_path(p: f32, a: &[PathCmd], b: &[PathCmd]) -> Vec<PathCmd> {
    debug_assert_eq!(a.len(), b.len(), "paths must be structurally compatible");
    a.iter()
        .zip(b.iter())
        .map(|(ca, cb)| match (ca, cb) {
            (PathCmd::MoveTo(pa), PathCmd::MoveTo(pb)) => PathCmd::MoveTo(lerp(*pa, *pb, p)),
            (PathCmd::LineTo(pa), PathCmd::LineTo(pb)) => PathCmd::LineTo(lerp(*pa, *pb, p)),
            (
                PathCmd::CurveTo { c1: a1, c2: a2, to: at },
                PathCmd::CurveTo { c1: b1, c2: b2, to: bt },
            ) => PathCmd::CurveTo {
                c1: lerp(*a1, *b1, p),
                c2: lerp(*a2, *b2, p),
                to: lerp(*at, *bt, p),
            },
            (PathCmd::Close, PathCmd::Close) => PathCmd::Close,
            _ => {
                debug_assert!(false, "command kind mismatch");
                *ca
            }
        })
        .collect()
}

/// RGB 空间线性插值，填充与描边共用同一结果。端点处精确等于端点色
pub fn mix_color(p: f32, a: Color32, b: Color32) -> Color32 {
    let p = p.clamp(0.0, 1.0);
    let ch = |x: u8, y: u8| -> u8 { (x as f32 + (y as f32 - x as f32) * p).round() as u8 };
    Color32::from_rgb(ch(a.r(), b.r()), ch(a.g(), b.g()), ch(a.b(), b.b()))
}

fn cubic_at(p0: Pos2, c1: Pos2, c2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    pos2(
        w0 * p0.x + w1 * c1.x + w2 * c2.x + w3 * p3.x,
        w0 * p0.y + w1 * c1.y + w2 * c2.y + w3 * p3.y,
    )
}

/// 折线化后的弧长。光线挂载时各测一次，之后只读
pub fn path_length(cmds: &[PathCmd]) -> f32 {
    let mut len = 0.0;
    let mut cur = pos2(0.0, 0.0);
    let mut first = cur;
    for cmd in cmds {
        match *cmd {
            PathCmd::MoveTo(p) => {
                cur = p;
                first = p;
            }
            PathCmd::LineTo(p) => {
                len += cur.distance(p);
                cur = p;
            }
            PathCmd::CurveTo { c1, c2, to } => {
                let mut prev = cur;
                for s in 1..=CURVE_STEPS {
                    let t = s as f32 / CURVE_STEPS as f32;
                    let q = cubic_at(cur, c1, c2, to, t);
                    len += prev.distance(q);
                    prev = q;
                }
                cur = to;
            }
            PathCmd::Close => {
                len += cur.distance(first);
                cur = first;
            }
        }
    }
    len
}

/// 光线两端点（M + 一段直线）。结构异常时返回 None，调用方跳过该条
pub fn ray_endpoints(cmds: &[PathCmd]) -> Option<(Pos2, Pos2)> {
    let mut it = cmds.iter();
    let PathCmd::MoveTo(a) = it.next()? else { return None };
    let PathCmd::LineTo(b) = it.next()? else { return None };
    Some((*a, *b))
}

/// strokeDashoffset = 长度 × (1 − reveal)。长度未测出时用兜底值，不报错
pub fn dash_offset(reveal: f32, measured: Option<f32>, fallback: f32) -> f32 {
    measured.unwrap_or(fallback) * (1.0 - reveal.clamp(0.0, 1.0))
}

/// 2×3 仿射矩阵（SVG 形式：x' = a·x + c·y + tx）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat2x3 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Mat2x3 {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    fn translate(tx: f32, ty: f32) -> Self {
        Self { tx, ty, ..Self::IDENTITY }
    }

    fn rotate(angle_deg: f32) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    /// self ∘ rhs：先作用 rhs 再作用 self
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }

    pub fn apply(&self, p: Pos2) -> Pos2 {
        pos2(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }
}

/// 同一种视觉旋转在不同原生后端上的两种表达：
/// 一种后端直接接受"角度 + 锚点"，另一种要求显式的平移·旋转·平移分解。
/// 两个变体必须产出完全相同的变换，由测试保证。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationBackend {
    /// 一步到位：绕锚点旋转
    PivotOrigin,
    /// 显式分解：T(pivot) · R(angle) · T(−pivot)
    MatrixDecomposition,
}

impl RotationBackend {
    /// 当前目标平台的后端：Apple 系走锚点形式，其余平台走矩阵分解
    pub fn for_platform() -> Self {
        if cfg!(target_vendor = "apple") {
            RotationBackend::PivotOrigin
        } else {
            RotationBackend::MatrixDecomposition
        }
    }

    /// 绕 pivot 旋转 angle_deg 的仿射矩阵
    pub fn transform(&self, angle_deg: f32, pivot: Pos2) -> Mat2x3 {
        match self {
            RotationBackend::PivotOrigin => {
                let (sin, cos) = angle_deg.to_radians().sin_cos();
                Mat2x3 {
                    a: cos,
                    b: sin,
                    c: -sin,
                    d: cos,
                    tx: pivot.x - cos * pivot.x + sin * pivot.y,
                    ty: pivot.y - sin * pivot.x - cos * pivot.y,
                }
            }
            RotationBackend::MatrixDecomposition => Mat2x3::translate(pivot.x, pivot.y)
                .mul(Mat2x3::rotate(angle_deg))
                .mul(Mat2x3::translate(-pivot.x, -pivot.y)),
        }
    }
}

/// 对路径所有坐标施加同一点变换（旋转、映射到屏幕坐标都走这里）
pub fn transform_path(cmds: &[PathCmd], f: impl Fn(Pos2) -> Pos2) -> Vec<PathCmd> {
    cmds.iter()
        .map(|cmd| match *cmd {
            PathCmd::MoveTo(p) => PathCmd::MoveTo(f(p)),
            PathCmd::LineTo(p) => PathCmd::LineTo(f(p)),
            PathCmd::CurveTo { c1, c2, to } => PathCmd::CurveTo {
                c1: f(c1),
                c2: f(c2),
                to: f(to),
            },
            PathCmd::Close => PathCmd::Close,
        })
        .collect()
}

/// PathCmd 序列转 lyon 事件流
fn to_lyon_events(cmds: &[PathCmd]) -> Vec<PathEvent> {
    let mut events = Vec::with_capacity(cmds.len() + 1);
    let mut first: Option<Pos2> = None;
    let mut cur = pos2(0.0, 0.0);
    for cmd in cmds {
        match *cmd {
            PathCmd::MoveTo(p) => {
                if let Some(f) = first {
                    events.push(PathEvent::End {
                        last: point(cur.x, cur.y),
                        first: point(f.x, f.y),
                        close: false,
                    });
                }
                events.push(PathEvent::Begin { at: point(p.x, p.y) });
                first = Some(p);
                cur = p;
            }
            PathCmd::LineTo(p) => {
                events.push(PathEvent::Line {
                    from: point(cur.x, cur.y),
                    to: point(p.x, p.y),
                });
                cur = p;
            }
            PathCmd::CurveTo { c1, c2, to } => {
                events.push(PathEvent::Cubic {
                    from: point(cur.x, cur.y),
                    ctrl1: point(c1.x, c1.y),
                    ctrl2: point(c2.x, c2.y),
                    to: point(to.x, to.y),
                });
                cur = to;
            }
            PathCmd::Close => {
                if let Some(f) = first.take() {
                    events.push(PathEvent::End {
                        last: point(cur.x, cur.y),
                        first: point(f.x, f.y),
                        close: true,
                    });
                    cur = f;
                }
            }
        }
    }
    if let Some(f) = first {
        events.push(PathEvent::End {
            last: point(cur.x, cur.y),
            first: point(f.x, f.y),
            close: false,
        });
    }
    events
}

fn buffers_to_mesh(geometry: VertexBuffers<Pos2, u32>, color: Color32) -> egui::Mesh {
    let mut mesh = egui::Mesh::default();
    mesh.indices = geometry.indices;
    mesh.vertices = geometry
        .vertices
        .into_iter()
        .map(|p| egui::epaint::Vertex {
            pos: p,
            uv: egui::epaint::WHITE_UV,
            color,
        })
        .collect();
    mesh
}

/// 填充网格化。月牙是凹多边形，epaint 填不了，交给 lyon。
/// 失败时返回空网格（这一帧不画主体），不向用户暴露
pub fn fill_mesh(cmds: &[PathCmd], color: Color32) -> egui::Mesh {
    let events = to_lyon_events(cmds);
    if events.is_empty() {
        return egui::Mesh::default();
    }
    let mut geometry: VertexBuffers<Pos2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    let options = FillOptions::default().with_tolerance(0.1);
    let result = tessellator.tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |v: FillVertex| {
            pos2(v.position().x, v.position().y)
        }),
    );
    if result.is_err() {
        return egui::Mesh::default();
    }
    buffers_to_mesh(geometry, color)
}

/// 描边网格化（主体轮廓，宽 10 个规范单位）
pub fn stroke_mesh(cmds: &[PathCmd], width: f32, color: Color32) -> egui::Mesh {
    let events = to_lyon_events(cmds);
    if events.is_empty() {
        return egui::Mesh::default();
    }
    let mut geometry: VertexBuffers<Pos2, u32> = VertexBuffers::new();
    let mut tessellator = StrokeTessellator::new();
    let options = StrokeOptions::default()
        .with_line_width(width)
        .with_tolerance(0.1);
    let result = tessellator.tessellate(
        events.iter().cloned(),
        &options,
        &mut BuffersBuilder::new(&mut geometry, |v: StrokeVertex| {
            pos2(v.position().x, v.position().y)
        }),
    );
    if result.is_err() {
        return egui::Mesh::default();
    }
    buffers_to_mesh(geometry, color)
}
