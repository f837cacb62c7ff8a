//! Theme and styling for the GUI.

use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    pub primary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
    pub accent: egui::Color32,

    pub spacing_xs: f32,
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            // Slate background with teal and magenta accents
            background: egui::Color32::from_rgb(14, 16, 22),
            surface: egui::Color32::from_rgb(22, 25, 33),
            surface_hover: egui::Color32::from_rgb(32, 36, 46),
            surface_active: egui::Color32::from_rgb(42, 47, 60),
            panel_fill: egui::Color32::from_rgb(18, 20, 27),
            text_primary: egui::Color32::from_rgb(226, 232, 240),
            text_secondary: egui::Color32::from_rgb(148, 158, 175),

            primary: egui::Color32::from_rgb(56, 214, 196),
            success: egui::Color32::from_rgb(72, 199, 116),
            warning: egui::Color32::from_rgb(240, 180, 60),
            error: egui::Color32::from_rgb(240, 90, 100),
            accent: egui::Color32::from_rgb(230, 0, 122),

            spacing_xs: 4.0,
            spacing_sm: 8.0,
            spacing_md: 16.0,
            spacing_lg: 24.0,

            button_small: egui::vec2(28.0, 24.0),
            button_medium: egui::vec2(130.0, 30.0),
        }
    }
}

impl AppTheme {
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.surface)
            .stroke(egui::Stroke::new(2.0, self.primary))
            .min_size(self.button_medium)
    }

    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.0, self.surface_active))
            .min_size(self.button_medium)
    }

    /// Square icon button for row actions
    pub fn button_icon(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface_hover)
            .min_size(self.button_small)
    }

    pub fn frame_panel(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.panel_fill)
            .rounding(6.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(1.0, self.surface_active))
    }
}

pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.background;
    visuals.override_text_color = Some(theme.text_primary);
    visuals.selection.bg_fill = theme.accent;

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;

    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, theme.surface_active);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, theme.primary);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(2.0, theme.primary);
    visuals.extreme_bg_color = theme.surface;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(20.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::new(13.0, egui::FontFamily::Monospace),
    );
    ctx.set_style(style);
}
