//! Form panels of the main window.
//!
//! - `transfers` - proxy account, transfer rows, CSV upload and clear
//! - `output` - calldata, error and notification panels

mod output;
mod transfers;

use super::GuiApp;
use eframe::{egui, egui::RichText};

impl GuiApp {
    pub(crate) fn render_section_header(&self, ui: &mut egui::Ui, title: &str) {
        ui.add_space(self.theme.spacing_sm);
        ui.label(RichText::new(title).size(17.0).strong().color(self.theme.primary));
        ui.add_space(self.theme.spacing_xs);
    }
}
