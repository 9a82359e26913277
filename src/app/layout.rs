//! Side panel layout and application of panel requests.

use eframe::egui;

use crate::color_scheme::ColorScheme;
use crate::data::view::ViewerData;
use crate::events::EventKind;

use super::ViewerPanel;

/// Requests collected from the panels during one frame.
#[derive(Debug, Default)]
pub(crate) struct PanelRequests {
    pub open_model: Option<std::path::PathBuf>,
    pub open_texture: Option<std::path::PathBuf>,
    pub reset_camera: bool,
    pub color_scheme: Option<ColorScheme>,
}

impl ViewerPanel {
    /// Render the full widget (side panel and viewport) into `ui`.
    pub fn update(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        if self.poll_load(&ctx) {
            ctx.request_repaint();
        }

        let requests = self.render_panels(ui);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show_inside(ui, |ui| {
                self.show_viewport(ui);
            });

        self.apply_requests(requests, &ctx);
    }

    fn render_panels(&mut self, ui: &mut egui::Ui) -> PanelRequests {
        let show_right = self
            .right_side_panels
            .iter()
            .any(|p| p.state().visible);
        if !show_right {
            return PanelRequests::default();
        }

        let mut list = std::mem::take(&mut self.right_side_panels);
        let mut data = ViewerData {
            scene: &self.scene,
            camera: &self.camera,
            picks: self.measurement.state(),
            metadata: &self.metadata,
            style: &self.style,
            features: &self.features,
            color_scheme: self.color_scheme,
            request_open_model: None,
            request_open_texture: None,
            request_reset_camera: false,
            request_color_scheme: None,
        };

        egui::SidePanel::right("viewer_right_sidebar")
            .resizable(true)
            .default_width(300.0)
            .min_width(220.0)
            .show_inside(ui, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for panel in list.iter_mut() {
                        panel.show(ui, &mut data);
                    }
                });
            });

        let requests = PanelRequests {
            open_model: data.request_open_model,
            open_texture: data.request_open_texture,
            reset_camera: data.request_reset_camera,
            color_scheme: data.request_color_scheme,
        };
        self.right_side_panels = list;
        requests
    }

    pub(crate) fn apply_requests(&mut self, requests: PanelRequests, ctx: &egui::Context) {
        if requests.reset_camera {
            self.camera.reset();
            self.emit_view_change(EventKind::CAMERA_RESET);
        }
        if let Some(scheme) = requests.color_scheme {
            tracing::debug!(scheme = scheme.label(), "Color scheme changed");
            self.color_scheme = scheme;
            self.color_scheme.apply(ctx);
        }
        if requests.open_model.is_some() || requests.open_texture.is_some() {
            let mut paths = self.scene.paths.clone();
            if let Some(model) = requests.open_model {
                paths.model = model;
            }
            if let Some(texture) = requests.open_texture {
                paths.texture = texture;
            }
            self.start_load(paths, Some(ctx.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::events::{EventController, EventFilter};

    #[test]
    fn reset_request_restores_camera_and_notifies() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe(EventFilter::only(EventKind::CAMERA_RESET));
        let mut cfg = ViewerConfig::default();
        cfg.controllers.event = Some(ctrl);
        let mut panel = ViewerPanel::new(&cfg);

        panel.camera.orbit(120.0, 40.0);
        while panel.camera.update() {}
        assert!(panel.camera.yaw.abs() > 0.1);

        let ctx = egui::Context::default();
        panel.apply_requests(
            PanelRequests {
                reset_camera: true,
                ..Default::default()
            },
            &ctx,
        );
        assert!(panel.camera.yaw.abs() < 1e-6);
        let evt = rx.try_recv().unwrap();
        assert!((evt.view_change.unwrap().distance - 10.0).abs() < 1e-4);
    }
}
