//! 主题与尺寸配置：颜色、画布尺寸、动画节奏，构造时一次性传入

use egui::Color32;

/// 不可变的主题配置。不用模块级常量，换色/换尺寸时只改这一处，
/// 也方便测试里构造替代主题。
#[derive(Clone, Debug)]
pub struct ThemeConfig {
    /// 太阳填充/描边色（#DBBC79）
    pub sun_color: Color32,
    /// 月亮填充/描边色（#60A5FA）
    pub moon_color: Color32,
    /// 浅色模式容器背景（#f9fafb）
    pub light_bg: Color32,
    /// 深色模式容器背景（#111827）
    pub dark_bg: Color32,
    /// 浅色模式文字（深灰）
    pub light_text: Color32,
    /// 深色模式文字（近白）
    pub dark_text: Color32,
    /// 分隔线颜色（#d1d5db）
    pub separator: Color32,
    /// 图形规范坐标空间边长（viewBox 96×96）
    pub canvas_units: f32,
    /// 屏幕上图形的显示边长（逻辑像素）
    pub canvas_px: f32,
    /// 日/月主体描边宽度（规范坐标单位）
    pub glyph_stroke_width: f32,
    /// 光线描边宽度（规范坐标单位）
    pub ray_stroke_width: f32,
    /// 相邻两条光线动画的起始间隔（毫秒）
    pub ray_stagger_ms: f64,
    /// 单条光线显隐动画时长（毫秒）
    pub ray_duration_ms: f64,
    /// 光线长度未测出时的兜底值（规范坐标单位）
    pub ray_fallback_len: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            sun_color: Color32::from_rgb(0xDB, 0xBC, 0x79),
            moon_color: Color32::from_rgb(0x60, 0xA5, 0xFA),
            light_bg: Color32::from_rgb(0xF9, 0xFA, 0xFB),
            dark_bg: Color32::from_rgb(0x11, 0x18, 0x27),
            light_text: Color32::from_rgb(0x11, 0x18, 0x27),
            dark_text: Color32::from_rgb(0xF9, 0xFA, 0xFB),
            separator: Color32::from_rgb(0xD1, 0xD5, 0xDB),
            canvas_units: 96.0,
            canvas_px: 192.0,
            glyph_stroke_width: 10.0,
            ray_stroke_width: 2.5,
            ray_stagger_ms: 50.0,
            ray_duration_ms: 20.0,
            ray_fallback_len: 20.0,
        }
    }
}

impl ThemeConfig {
    /// 背景色：直接按布尔切换，不做渐变（硬切）
    pub fn background(&self, dark: bool) -> Color32 {
        if dark { self.dark_bg } else { self.light_bg }
    }

    /// 标题文字颜色，随背景切换保证对比度
    pub fn text_color(&self, dark: bool) -> Color32 {
        if dark { self.dark_text } else { self.light_text }
    }
}
