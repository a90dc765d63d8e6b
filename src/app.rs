use crate::audio::CpalOutput;
use crate::clock::SystemClock;
use crate::config::AppSettings;
use crate::messages::ControllerCommand;
use crate::ui::{render_main_panel, render_settings_panel};
use crate::worker::{ControllerHandle, WorkerError};

pub struct MorseApp {
    pub settings: AppSettings,
    pub settings_notice: Option<String>,
    pub controller: ControllerHandle,

    // Edit buffer for the text field, pushed to the controller on change
    pub input: String,

    // UI state
    pub show_settings: bool,
    settings_changed: bool,
}

impl MorseApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, WorkerError> {
        let loaded = AppSettings::load_with_notice();
        let settings = loaded.settings;

        let output = CpalOutput::new(settings.audio.clone());
        let ctx = cc.egui_ctx.clone();
        let controller =
            ControllerHandle::spawn(output, SystemClock, move || ctx.request_repaint())?;

        Ok(Self {
            settings,
            settings_notice: loaded.notice,
            controller,
            input: String::new(),
            show_settings: false,
            settings_changed: false,
        })
    }

    pub fn set_input(&mut self, text: String) {
        self.controller.send(ControllerCommand::UpdateText(text.clone()));
        self.input = text;
    }

    pub fn convert(&mut self) {
        self.controller.send(ControllerCommand::Convert);
    }

    pub fn toggle_playback(&mut self) {
        self.controller.send(ControllerCommand::TogglePlayback);
    }

    fn apply_settings_changes(&mut self) {
        if self.settings_changed {
            self.controller
                .send(ControllerCommand::UpdateAudioSettings(self.settings.audio.clone()));

            if let Err(e) = self.settings.save() {
                log::warn!("Failed to save settings: {}", e);
            }

            self.settings_changed = false;
        }
    }
}

impl eframe::App for MorseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size
        ctx.style_mut(|style| {
            style.text_styles.iter_mut().for_each(|(_, font_id)| {
                font_id.size = self.settings.user.font_size;
            });
        });

        self.apply_settings_changes();

        // Latest snapshot from the controller thread
        self.controller.refresh();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings = !self.show_settings;
                        ui.close();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Settings window (separate OS window)
        if self.show_settings {
            let settings = &mut self.settings;
            let settings_changed = &mut self.settings_changed;
            let show_settings = &mut self.show_settings;

            ctx.show_viewport_immediate(
                egui::ViewportId::from_hash_of("settings_viewport"),
                egui::ViewportBuilder::default()
                    .with_title("Settings")
                    .with_inner_size([320.0, 180.0]),
                |ctx, _class| {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        render_settings_panel(ui, settings, settings_changed);
                    });

                    if ctx.input(|i| i.viewport().close_requested()) {
                        *show_settings = false;
                    }
                },
            );
        }

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            render_main_panel(ui, self);
        });
    }
}
