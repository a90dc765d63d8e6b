mod app;
mod audio;
mod cancel;
mod clock;
mod config;
mod controller;
mod messages;
mod morse;
mod playback;
mod reveal;
mod store;
#[cfg(test)]
mod testing;
mod ui;
mod worker;

use app::MorseApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 360.0])
            .with_min_inner_size([400.0, 280.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Morse Code Translator",
        options,
        Box::new(|cc| Ok(Box::new(MorseApp::new(cc)?))),
    )
}
