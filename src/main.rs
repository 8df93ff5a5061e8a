//! Sun Moon — 日月切换的 SVG 形变动画（Rust + egui）

mod animation;
mod app;
mod glyph;
mod theme;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([380.0, 420.0])
            .with_title("日月")
            .with_icon(egui::IconData::default()),
        ..Default::default()
    };
    eframe::run_native(
        "日月",
        options,
        Box::new(|cc| Ok(Box::new(app::SunMoonApp::new(cc)?))),
    )
}
