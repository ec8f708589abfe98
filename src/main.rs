use fluid_backdrop::app::FluidApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fluid Backdrop",
        options,
        Box::new(|cc| Ok(Box::new(FluidApp::new(cc)))),
    )
}
