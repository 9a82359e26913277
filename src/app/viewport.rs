//! Central 3D viewport: orbit/zoom input, click picking and painting.

use eframe::egui;
use egui::{Align2, Color32, FontId, PointerButton, Sense};
use glam::Vec2;

use crate::data::measurement::MeasurementChange;
use crate::data::view::LoadStatus;
use crate::events::{ClickMeta, EventKind, ResizeMeta, ScreenPos, ViewChangeMeta, ViewerEvent};
use crate::overlay::build_primitives;
use crate::picking::{pick, pointer_to_ndc};
use crate::render::{paint_model, paint_overlay, Projector, Shader};

use super::ViewerPanel;

impl ViewerPanel {
    /// Resolve a click at `pointer` (relative to the viewport's top-left
    /// corner) and feed the result to the measurement tool.
    ///
    /// A miss, or a click before the model is loaded, changes nothing.
    pub fn handle_click(&mut self, pointer: Vec2, viewport_size: Vec2) -> Option<MeasurementChange> {
        let hit = pick(self.scene.model(), &self.camera, pointer, viewport_size);

        let mut kinds = EventKind::CLICK;
        kinds |= if hit.is_some() {
            EventKind::PICK_HIT
        } else {
            EventKind::PICK_MISS
        };
        let mut evt = ViewerEvent::new(kinds);
        evt.click = Some(ClickMeta {
            screen_pos: ScreenPos {
                x: pointer.x,
                y: pointer.y,
            },
            ndc: pointer_to_ndc(pointer, viewport_size)
                .map_or([0.0, 0.0], |n| n.to_array()),
            hit,
        });
        self.emit(evt);

        if hit.is_none() {
            tracing::debug!(x = pointer.x, y = pointer.y, "Click missed the model");
        }
        self.measurement.handle_pick(hit)
    }

    fn view_change(&self) -> ViewChangeMeta {
        ViewChangeMeta {
            yaw: self.camera.yaw,
            pitch: self.camera.pitch,
            distance: self.camera.distance,
        }
    }

    pub(crate) fn emit_view_change(&self, kinds: EventKind) {
        let mut evt = ViewerEvent::new(kinds);
        evt.view_change = Some(self.view_change());
        self.emit(evt);
    }

    pub(crate) fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.color_scheme.viewport_background());

        if self.last_viewport_size != Some(rect.size()) {
            self.last_viewport_size = Some(rect.size());
            let mut evt = ViewerEvent::new(EventKind::RESIZE);
            evt.resize = Some(ResizeMeta {
                width: rect.width(),
                height: rect.height(),
            });
            self.emit(evt);
        }

        match &self.scene.status {
            LoadStatus::Failed { message, .. } => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    *message,
                    FontId::proportional(20.0),
                    Color32::RED,
                );
                return;
            }
            LoadStatus::Loading => {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Loading model…",
                    FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
                return;
            }
            LoadStatus::Ready => {}
        }
        if rect.width() < 1.0 || rect.height() < 1.0 {
            return;
        }

        // ── Input ───────────────────────────────────────────────────────────
        if response.dragged_by(PointerButton::Primary) {
            let d = response.drag_delta();
            if d != egui::Vec2::ZERO {
                self.camera.orbit(d.x, d.y);
                self.emit_view_change(EventKind::ORBIT);
            }
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom(scroll);
                self.emit_view_change(EventKind::ZOOM);
            }
        }
        if self.features.measurement && response.clicked_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                self.handle_click(
                    Vec2::new(local.x, local.y),
                    Vec2::new(rect.width(), rect.height()),
                );
            }
        }
        if self.camera.update() {
            ui.ctx().request_repaint();
        }

        // ── Paint ───────────────────────────────────────────────────────────
        let Some(model) = self.scene.model() else {
            return;
        };
        let projector = Projector::new(&self.camera, rect);
        let eye = self.camera.eye();
        let shader = Shader::new(&self.lighting, eye);
        paint_model(&painter, &projector, &shader, model);

        let primitives = build_primitives(
            self.measurement.state().points(),
            &self.style,
            self.color_scheme.measurement_colors(),
        );
        paint_overlay(&painter, &projector, eye, &primitives, self.style.tube_segments);
    }
}
