//! Standalone application wrapper.
//!
//! [`ViewerApp`] wraps a [`ViewerPanel`](super::ViewerPanel) and implements
//! [`eframe::App`] so the viewer can run as a native window.

use eframe::egui;

use crate::config::ViewerConfig;

use super::ViewerPanel;

/// Standalone viewer application that implements [`eframe::App`].
pub struct ViewerApp {
    /// The inner panel widget that owns all data and UI state.
    pub main_panel: ViewerPanel,
    /// Flag so we only apply the color scheme on the very first frame.
    color_scheme_applied: bool,
}

impl ViewerApp {
    /// Create the app and start loading the configured assets.
    ///
    /// `ctx` is woken when the background load finishes.
    pub fn new(cfg: &ViewerConfig, ctx: Option<egui::Context>) -> Self {
        let mut main_panel = ViewerPanel::new(cfg);
        main_panel.start_load(cfg.assets.clone(), ctx);
        Self {
            main_panel,
            color_scheme_applied: false,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply color scheme once on the first frame (after egui context is available).
        if !self.color_scheme_applied {
            self.main_panel.color_scheme.apply(ctx);
            self.color_scheme_applied = true;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.main_panel.update(ui);
            });
    }
}
