use crate::app::MorseApp;
use egui::{Color32, RichText, Vec2};

const PLACEHOLDER: &str = "Morse code will appear here";
const CURSOR: &str = "│";

pub fn render_main_panel(ui: &mut egui::Ui, app: &mut MorseApp) {
    ui.heading("Morse Code Translator");

    ui.add_space(4.0);

    if let Some(notice) = app.settings_notice.clone() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(notice).color(Color32::YELLOW));
            if ui.button("Dismiss").clicked() {
                app.settings_notice = None;
            }
        });
        ui.add_space(4.0);
    }

    render_morse_display(ui, app);

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    render_controls(ui, app);
}

fn render_morse_display(ui: &mut egui::Ui, app: &MorseApp) {
    let state = app.controller.state();
    let display = state.display();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_size(Vec2::new(ui.available_width(), 100.0));

        egui::ScrollArea::vertical()
            .max_height(300.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if display.morse_text.is_empty() {
                    ui.label(RichText::new(PLACEHOLDER).color(Color32::GRAY));
                    return;
                }

                let mut text = display.visible_text.to_string();
                if state.is_revealing() {
                    text.push_str(CURSOR);
                }
                ui.add(
                    egui::Label::new(RichText::new(text).monospace().color(Color32::LIGHT_BLUE))
                        .wrap(),
                );
            });
    });
}

fn render_controls(ui: &mut egui::Ui, app: &mut MorseApp) {
    let is_playing = app.controller.state().display().is_playing;
    let has_morse_code = app.controller.state().has_morse_code();

    ui.horizontal(|ui| {
        let mut input = app.input.clone();
        let response = ui.add_sized(
            Vec2::new((ui.available_width() - 160.0).max(120.0), 24.0),
            egui::TextEdit::singleline(&mut input).hint_text("Enter text"),
        );
        if response.changed() {
            app.set_input(input);
        }

        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Convert").clicked() || submitted {
            app.convert();
        }

        ui.add_space(10.0);

        let play_label = if is_playing { "Stop" } else { "Play" };
        if ui
            .add_enabled(has_morse_code, egui::Button::new(play_label))
            .clicked()
        {
            app.toggle_playback();
        }
    });
}
