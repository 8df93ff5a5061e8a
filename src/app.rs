//! egui 主界面：整窗即点按区，日/月图形随切换旋转、变形、变色，八条光线依次显隐

use eframe::egui;

use crate::animation::{DelayedTiming, Spring, SpringConfig};
use crate::glyph::{self, PathCmd, PathError, RotationBackend};
use crate::theme::ThemeConfig;

/// 标题文字
const TITLE: &str = "SVG 动画";
const TITLE_SIZE: f32 = 20.0;
/// 分隔线上下留白（逻辑像素）
const SEPARATOR_MARGIN: f32 = 30.0;

/// 设置中文字体，避免标题中文乱码。优先使用系统自带字体
fn setup_cjk_fonts(ctx: &egui::Context) {
    #[cfg(windows)]
    {
        use std::sync::Arc;

        let mut fonts = egui::FontDefinitions::default();
        let system_font_paths = [
            r"C:\Windows\Fonts\msyh.ttc",   // 微软雅黑
            r"C:\Windows\Fonts\simhei.ttf", // 黑体
            r"C:\Windows\Fonts\simsun.ttc", // 宋体
        ];
        for path in system_font_paths {
            if let Ok(bytes) = std::fs::read(path) {
                let leaked: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                fonts.font_data.insert(
                    "cjk".to_owned(),
                    Arc::new(egui::FontData::from_static(leaked)),
                );
                fonts
                    .families
                    .entry(egui::FontFamily::Proportional)
                    .or_default()
                    .insert(0, "cjk".to_owned());
                ctx.set_fonts(fonts);
                return;
            }
        }
    }
    // 其他平台交给 egui 内置字体与系统回退
    #[cfg(not(windows))]
    let _ = ctx;
}

pub struct SunMoonApp {
    theme: ThemeConfig,
    /// 切换状态，所有派生动画值的唯一事实来源。true = 暗色/月亮
    is_dark: bool,
    /// 是否已用系统外观播种过。只播一次，之后用户点按说了算
    seeded: bool,
    sun: Vec<PathCmd>,
    moon: Vec<PathCmd>,
    rays: Vec<Vec<PathCmd>>,
    /// 各光线弧长，首帧测一次；读取方始终容忍 None（回退兜底长度）
    ray_lengths: Vec<Option<f32>>,
    /// 形变进度 0↔1
    morph: Spring,
    /// 旋转角 0↔360 度。与形变用同一组弹簧参数，保证视觉同步
    rotation: Spring,
    /// 八条光线的显隐进度，各带 index×50ms 起始延迟
    ray_reveals: Vec<DelayedTiming>,
    rotation_backend: RotationBackend,
}

impl SunMoonApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, PathError> {
        setup_cjk_fonts(&cc.egui_ctx);
        // 标题不可选中，否则会截走整窗点按区域上的点击
        cc.egui_ctx
            .style_mut(|s| s.interaction.selectable_labels = false);
        Self::with_theme(ThemeConfig::default())
    }

    /// 不依赖窗口环境的构造，测试里也用它
    pub fn with_theme(theme: ThemeConfig) -> Result<Self, PathError> {
        let sun = glyph::parse_path(glyph::SUN_D)?;
        let moon = glyph::parse_path(glyph::MOON_D)?;
        let rays = glyph::RAYS_D
            .iter()
            .map(|d| glyph::parse_path(d))
            .collect::<Result<Vec<_>, _>>()?;
        let ray_reveals = (0..rays.len())
            .map(|i| DelayedTiming::new(0.0, i as f64 * theme.ray_stagger_ms, theme.ray_duration_ms))
            .collect();
        let ray_lengths = vec![None; rays.len()];
        Ok(Self {
            theme,
            is_dark: false,
            seeded: false,
            sun,
            moon,
            rays,
            ray_lengths,
            morph: Spring::new(0.0, SpringConfig::default()),
            rotation: Spring::new(0.0, SpringConfig::default()),
            ray_reveals,
            rotation_backend: RotationBackend::for_platform(),
        })
    }

    /// 点按翻转：无条件、无防抖。每次翻转都让所有动画值改朝最新目标
    fn toggle(&mut self) {
        self.is_dark = !self.is_dark;
        self.retarget();
    }

    /// 系统外观只在首帧读一次做播种；读不到偏好时默认浅色。
    /// 之后系统外观再变不会覆盖用户的手动切换
    fn seed(&mut self, scheme: Option<egui::Theme>) {
        self.seeded = true;
        self.is_dark = scheme == Some(egui::Theme::Dark);
        self.retarget();
    }

    fn retarget(&mut self) {
        let t = if self.is_dark { 1.0 } else { 0.0 };
        self.morph.set_target(t);
        self.rotation.set_target(t * 360.0);
        // 光线只在太阳（浅色）态可见
        let ray_target = 1.0 - t;
        for reveal in &mut self.ray_reveals {
            reveal.set_target(ray_target);
        }
    }

    /// 推进所有动画值 dt 秒
    fn tick(&mut self, dt: f32) {
        self.morph.tick(dt);
        self.rotation.tick(dt);
        for reveal in &mut self.ray_reveals {
            reveal.tick(dt);
        }
    }

    fn is_animating(&self) -> bool {
        !self.morph.is_settled()
            || !self.rotation.is_settled()
            || self.ray_reveals.iter().any(|r| !r.is_settled())
    }

    fn paint_separator(&self, ui: &mut egui::Ui) {
        ui.add_space(SEPARATOR_MARGIN);
        let width = ui.available_width() * 0.8;
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 1.0), egui::Sense::hover());
        ui.painter()
            .rect_filled(rect, egui::CornerRadius::ZERO, self.theme.separator);
        ui.add_space(SEPARATOR_MARGIN);
    }

    fn paint_glyph(&self, ui: &mut egui::Ui) {
        let side = self.theme.canvas_px;
        let (response, painter) = ui.allocate_painter(egui::vec2(side, side), egui::Sense::hover());
        let units = self.theme.canvas_units;
        let to_screen = egui::emath::RectTransform::from_to(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(units, units)),
            response.rect,
        );
        let scale = side / units;

        // 主体：逐命令插值 → 绕图形中心旋转 → 映射到屏幕 → lyon 网格。
        // 弹簧会过冲到 [0,1] 之外，形状照常外推，颜色在 mix_color 里截断
        let p = self.morph.value();
        let mixed = glyph::mix_path(p, &self.sun, &self.moon);
        let pivot = egui::pos2(units / 2.0, units / 2.0);
        let rot = self.rotation_backend.transform(self.rotation.value(), pivot);
        let on_screen = glyph::transform_path(&mixed, |q| to_screen.transform_pos(rot.apply(q)));
        let color = glyph::mix_color(p, self.theme.sun_color, self.theme.moon_color);
        painter.add(egui::Shape::mesh(glyph::fill_mesh(&on_screen, color)));
        painter.add(egui::Shape::mesh(glyph::stroke_mesh(
            &on_screen,
            self.theme.glyph_stroke_width * scale,
            color,
        )));

        // 光线：不随主体旋转。透明度 = 显隐进度；
        // 目标是月亮态时描边强制全透明，避免月亮后面闪出半截光线
        for (i, ray) in self.rays.iter().enumerate() {
            let Some((a, b)) = glyph::ray_endpoints(ray) else {
                continue;
            };
            let r = self.ray_reveals[i].value().clamp(0.0, 1.0);
            let alpha = if self.is_dark { 0.0 } else { r };
            if alpha <= 0.0 {
                continue;
            }
            // 描边按 dash 长度从起点"画入"：可见长 = dash 长 − dashoffset
            let measured = self.ray_lengths[i];
            let dash = measured.unwrap_or(self.theme.ray_fallback_len);
            let offset = glyph::dash_offset(r, measured, self.theme.ray_fallback_len);
            let actual = a.distance(b).max(f32::EPSILON);
            let visible = ((dash - offset) / actual).clamp(0.0, 1.0);
            if visible <= 0.0 {
                continue;
            }
            let end = a + (b - a) * visible;
            let stroke = egui::Stroke::new(
                self.theme.ray_stroke_width * scale,
                self.theme.sun_color.gamma_multiply(alpha),
            );
            painter.line_segment([to_screen.transform_pos(a), to_screen.transform_pos(end)], stroke);
        }
    }
}

impl eframe::App for SunMoonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 首帧：读一次系统外观播种初始状态
        if !self.seeded {
            let scheme = ctx.input(|i| i.raw.system_theme);
            self.seed(scheme);
        }

        // 光线弧长只测一次，之后只读
        if self.ray_lengths.iter().any(|l| l.is_none()) {
            for (slot, ray) in self.ray_lengths.iter_mut().zip(&self.rays) {
                *slot = Some(glyph::path_length(ray));
            }
        }

        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        self.tick(dt);
        if self.is_animating() {
            ctx.request_repaint();
        }

        // 背景直接按布尔硬切，不渐变
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(self.theme.background(self.is_dark)))
            .show(ctx, |ui| {
                // 整个容器就是点按区：先在全区域注册点击，再往上画内容
                let full = ui.max_rect();
                let response = ui.interact(full, ui.id().with("toggle"), egui::Sense::click());
                if response.clicked() {
                    self.toggle();
                    ui.ctx().request_repaint();
                }

                ui.vertical_centered(|ui| {
                    // 内容整体垂直居中（标题 + 分隔线 + 图形）
                    let content_h =
                        TITLE_SIZE * 1.4 + SEPARATOR_MARGIN * 2.0 + 1.0 + self.theme.canvas_px;
                    ui.add_space(((ui.available_height() - content_h) * 0.5).max(0.0));

                    ui.label(
                        egui::RichText::new(TITLE)
                            .size(TITLE_SIZE)
                            .strong()
                            .color(self.theme.text_color(self.is_dark)),
                    );
                    self.paint_separator(ui);
                    self.paint_glyph(ui);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(app: &mut SunMoonApp) {
        let mut steps = 0;
        while app.is_animating() {
            app.tick(1.0 / 120.0);
            steps += 1;
            assert!(steps < 100_000, "animation never settled");
        }
    }

    #[test]
    fn seed_defaults_to_light_when_scheme_unknown() {
        let mut app = SunMoonApp::with_theme(ThemeConfig::default()).unwrap();
        app.seed(None);
        assert!(!app.is_dark);
        app.seed(Some(egui::Theme::Light));
        assert!(!app.is_dark);
        app.seed(Some(egui::Theme::Dark));
        assert!(app.is_dark);
    }

    #[test]
    fn mount_light_shows_sun_with_rays() {
        let mut app = SunMoonApp::with_theme(ThemeConfig::default()).unwrap();
        app.seed(Some(egui::Theme::Light));
        settle(&mut app);
        assert!(!app.is_dark);
        assert_eq!(app.morph.value(), 0.0);
        assert_eq!(app.rotation.value(), 0.0);
        // 光线从 0 错峰入场，最终全可见
        for r in &app.ray_reveals {
            assert_eq!(r.value(), 1.0);
        }
    }

    #[test]
    fn single_tap_reaches_moon_state() {
        let mut app = SunMoonApp::with_theme(ThemeConfig::default()).unwrap();
        app.seed(Some(egui::Theme::Light));
        settle(&mut app);
        app.toggle();
        assert!(app.is_dark);
        settle(&mut app);
        assert_eq!(app.morph.value(), 1.0);
        assert_eq!(app.rotation.value(), 360.0);
        for r in &app.ray_reveals {
            assert_eq!(r.value(), 0.0);
        }
    }

    #[test]
    fn rapid_double_tap_lands_back_on_sun() {
        let mut app = SunMoonApp::with_theme(ThemeConfig::default()).unwrap();
        app.seed(Some(egui::Theme::Light));
        settle(&mut app);
        // 第一次点按后不等收敛立刻再点：净效果为偶数次 = 原状态
        app.toggle();
        for _ in 0..10 {
            app.tick(1.0 / 120.0);
        }
        app.toggle();
        settle(&mut app);
        assert!(!app.is_dark);
        assert_eq!(app.morph.value(), 0.0);
        assert_eq!(app.rotation.value(), 0.0);
        for r in &app.ray_reveals {
            assert_eq!(r.value(), 1.0);
        }
    }

    #[test]
    fn measured_lengths_fill_once_and_match_geometry() {
        let mut app = SunMoonApp::with_theme(ThemeConfig::default()).unwrap();
        assert!(app.ray_lengths.iter().all(|l| l.is_none()));
        for (slot, ray) in app.ray_lengths.iter_mut().zip(&app.rays) {
            *slot = Some(glyph::path_length(ray));
        }
        let (a, b) = glyph::ray_endpoints(&app.rays[0]).unwrap();
        let len = app.ray_lengths[0].unwrap();
        assert!((len - a.distance(b)).abs() < 1e-3);
    }
}
