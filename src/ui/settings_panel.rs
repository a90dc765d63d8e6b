use crate::config::AppSettings;
use egui::RichText;

pub fn render_settings_panel(
    ui: &mut egui::Ui,
    settings: &mut AppSettings,
    settings_changed: &mut bool,
) {
    egui::CollapsingHeader::new(RichText::new("Display").strong())
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Font Size:");
                if ui
                    .add(
                        egui::Slider::new(&mut settings.user.font_size, 10.0..=24.0)
                            .fixed_decimals(0),
                    )
                    .changed()
                {
                    *settings_changed = true;
                }
            });
        });

    egui::CollapsingHeader::new(RichText::new("Audio").strong())
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Volume:");
                if ui
                    .add(egui::Slider::new(&mut settings.audio.master_volume, 0.0..=1.0))
                    .changed()
                {
                    *settings_changed = true;
                }
            });

            ui.horizontal(|ui| {
                ui.label("Key Ramp (ms):");
                if ui
                    .add(egui::Slider::new(&mut settings.audio.ramp_ms, 1.0..=10.0).fixed_decimals(1))
                    .changed()
                {
                    *settings_changed = true;
                }
            });
        });
}
