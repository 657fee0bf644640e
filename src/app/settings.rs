//! Preferences side panel for `FeedApp`.
//!
//! Widgets edit a local copy; a changed value is written through the
//! `Settings` setter, and a failed write is reported instead of applied.

use eframe::egui;

use clipfeed::settings::{FeedTab, MarginSize, SettingsError};

use super::FeedApp;

impl FeedApp {
    pub fn draw_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.separator();

        let mut result: Result<(), SettingsError> = Ok(());

        ui.label(egui::RichText::new("Sound").strong());
        let mut muted = self.settings.muted();
        if ui.checkbox(&mut muted, "Mute").changed() {
            result = result.and_then(|_| self.settings.set_muted(muted));
        }
        let mut volume = self.settings.volume();
        let slider = ui.add_enabled(
            !self.settings.muted(),
            egui::Slider::new(&mut volume, 0.0..=1.0).text("Volume"),
        );
        if slider.changed() {
            result = result.and_then(|_| self.settings.set_volume(volume));
        }
        ui.label(
            egui::RichText::new(format!(
                "Playback at {:.0}%",
                self.settings.effective_volume() * 100.0
            ))
            .small()
            .weak(),
        );

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Feed").strong());
        let mut default_feed = self.settings.default_feed();
        egui::ComboBox::from_id_salt("default_feed")
            .selected_text(default_feed.label())
            .show_ui(ui, |ui| {
                for tab in [FeedTab::ForYou, FeedTab::Following] {
                    ui.selectable_value(&mut default_feed, tab, tab.label());
                }
            });
        if default_feed != self.settings.default_feed() {
            result = result.and_then(|_| self.settings.set_default_feed(default_feed));
        }

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Layout").strong());
        let mut auto_hide = self.settings.nav_auto_hide();
        if ui.checkbox(&mut auto_hide, "Hide tabs while swiping").changed() {
            result = result.and_then(|_| self.settings.set_nav_auto_hide(auto_hide));
        }
        let mut margin = self.settings.ui_margin();
        ui.horizontal(|ui| {
            ui.label("Margin");
            for (size, label) in [
                (MarginSize::Small, "S"),
                (MarginSize::Medium, "M"),
                (MarginSize::Large, "L"),
            ] {
                ui.selectable_value(&mut margin, size, label);
            }
        });
        if margin != self.settings.ui_margin() {
            result = result.and_then(|_| self.settings.set_ui_margin(margin));
        }

        ui.add_space(12.0);
        if ui.button("Reset to defaults").clicked() {
            result = result.and_then(|_| self.settings.reset());
            if result.is_ok() {
                self.tab = self.settings.default_feed();
            }
        }

        if let Err(e) = result {
            log::error!("settings write failed: {}", e);
            self.report(format!("Could not save settings: {}", e));
        }
    }
}
