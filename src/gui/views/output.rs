use crate::gui::GuiApp;
use eframe::{egui, egui::RichText};

impl GuiApp {
    pub(crate) fn view_output(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "Calldata");
        self.theme.frame_panel().show(ui, |ui| {
            let mut shown: &str = self.form.calldata().unwrap_or("");
            ui.add(
                egui::TextEdit::multiline(&mut shown)
                    .hint_text("Calldata will be shown here once all fields are filled up...")
                    .font(egui::TextStyle::Monospace)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );
            if self.form.is_building() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Building calldata...").color(self.theme.text_secondary));
                });
            }
        });

        if let Some(calldata) = self.form.calldata().map(str::to_string) {
            let mut copied = false;
            let mut open_explorer = false;
            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                if ui.add(self.theme.button_primary("📋 Copy Calldata")).clicked() {
                    ui.output_mut(|o| o.copied_text = calldata.clone());
                    copied = true;
                }
                if ui
                    .add(self.theme.button_secondary("🔗 Open Calldata in Polkadot.js Apps"))
                    .on_hover_text(format!("Decodes against {}", self.config.ws_url))
                    .clicked()
                {
                    open_explorer = true;
                }
            });
            if copied {
                self.notify("Calldata copied to clipboard");
            }
            if open_explorer {
                self.open_in_explorer(&calldata);
            }
        }

        self.render_section_header(ui, "Error");
        let mut error: &str = self.form.error().unwrap_or("");
        ui.add(
            egui::TextEdit::multiline(&mut error)
                .text_color(self.theme.error)
                .desired_rows(2)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(self.theme.spacing_md);
        egui::CollapsingHeader::new(format!("Notifications ({})", self.notifications.len()))
            .id_source("notifications")
            .show(ui, |ui| {
                if self.notifications.is_empty() {
                    ui.label(RichText::new("Nothing yet").color(self.theme.text_secondary));
                }
                for entry in self.notifications.iter().rev() {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(entry.time_ago())
                                .small()
                                .color(self.theme.text_secondary),
                        );
                        let color = if entry.message.starts_with("[OK]") {
                            self.theme.success
                        } else if entry.message.starts_with("[!!]") {
                            self.theme.warning
                        } else {
                            self.theme.text_primary
                        };
                        ui.label(RichText::new(&entry.message).color(color));
                    });
                }
            });
    }

    fn open_in_explorer(&mut self, calldata: &str) {
        match self.config.explorer_decode_url(calldata) {
            Ok(url) => {
                if let Err(e) = open::that(url.as_str()) {
                    self.notify(format!("[!!] Failed to open browser: {}", e));
                }
            }
            Err(e) => self.notify(format!("[!!] Failed to build explorer link: {}", e)),
        }
    }
}
