use crate::csv_import::{ACCEPTED_EXTENSIONS, LINE_FORMAT};
use crate::gui::GuiApp;
use eframe::{egui, egui::RichText};
use egui_extras::{Column, TableBuilder};
use std::time::Instant;

impl GuiApp {
    pub(crate) fn view_transfers(&mut self, ui: &mut egui::Ui, now: Instant) {
        self.render_section_header(ui, "Proxy Account");
        let response = ui.add(
            egui::TextEdit::singleline(self.proxy_input.draft_mut())
                .hint_text("Enter Proxy Account...")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.proxy_input.mark_edited(now);
        }

        self.render_section_header(ui, "Transfers");
        self.theme.frame_panel().show(ui, |ui| {
            self.render_transfer_table(ui, now);
        });

        ui.add_space(self.theme.spacing_sm);
        ui.horizontal(|ui| {
            if ui.add(self.theme.button_secondary("➕ Add Transfer")).clicked() {
                let id = self.form.list_mut().add();
                tracing::debug!("Added transfer row {}", id);
            }

            let importing = self.csv_job.is_some();
            let upload = ui.add_enabled(!importing, self.theme.button_primary("📄 Upload CSV"));
            if upload.clicked() {
                let mut dialog = rfd::FileDialog::new().add_filter("CSV files", ACCEPTED_EXTENSIONS);
                if let Some(dir) = dirs::document_dir() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.start_csv_import(path);
                }
            }
            if importing {
                ui.spinner();
            }

            if ui.add(self.theme.button_secondary("🧹 Clear All")).clicked() {
                self.form.list_mut().clear();
                self.import_error = None;
                self.notify("Cleared all transfers");
            }
        });

        ui.label(
            RichText::new(format!(
                "CSV format: {} per line, header optional",
                LINE_FORMAT
            ))
            .italics()
            .size(11.0)
            .color(self.theme.text_secondary),
        );
        if let Some(error) = &self.import_error {
            ui.colored_label(self.theme.error, format!("[!!] {}", error));
        }
    }

    fn render_transfer_table(&mut self, ui: &mut egui::Ui, now: Instant) {
        let amount_header = format!("Amount ({})", self.config.native_token);
        let ids: Vec<u64> = self.form.list().entries().iter().map(|e| e.id).collect();
        let can_remove = ids.len() > 1;
        let theme = self.theme;
        let row_inputs = &mut self.row_inputs;
        let mut remove_id = None;

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(32.0))
            .column(Column::remainder().at_least(260.0).clip(true))
            .column(Column::initial(180.0).at_least(120.0))
            .column(Column::exact(40.0))
            .header(24.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Destination Account");
                });
                header.col(|ui| {
                    ui.strong(amount_header.as_str());
                });
                header.col(|_ui| {});
            })
            .body(|mut body| {
                for (position, id) in ids.iter().enumerate() {
                    let Some(inputs) = row_inputs.get_mut(id) else {
                        continue;
                    };
                    body.row(30.0, |mut row| {
                        row.col(|ui| {
                            ui.label(RichText::new((position + 1).to_string()).color(theme.text_secondary));
                        });
                        row.col(|ui| {
                            let response = ui.add(
                                egui::TextEdit::singleline(inputs.destination.draft_mut())
                                    .hint_text("Enter Destination Account...")
                                    .desired_width(f32::INFINITY),
                            );
                            if response.changed() {
                                inputs.destination.mark_edited(now);
                            }
                        });
                        row.col(|ui| {
                            let response = ui.add(
                                egui::TextEdit::singleline(inputs.amount.draft_mut())
                                    .hint_text("Enter Amount...")
                                    .desired_width(f32::INFINITY),
                            );
                            if response.changed() {
                                inputs.amount.mark_edited(now);
                            }
                        });
                        row.col(|ui| {
                            let remove = ui
                                .add_enabled(can_remove, theme.button_icon("🗑"))
                                .on_hover_text("Remove transfer");
                            if remove.clicked() {
                                remove_id = Some(*id);
                            }
                        });
                    });
                }
            });

        if let Some(id) = remove_id {
            if self.form.list_mut().remove(id) {
                self.row_inputs.remove(&id);
            }
        }
    }
}
