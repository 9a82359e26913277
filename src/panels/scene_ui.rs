use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;

use super::panel_trait::{Panel, PanelState};
use crate::color_scheme::ColorScheme;
use crate::data::measurement::PickPhase;
use crate::data::view::{LoadStatus, ViewerData};

/// Load status, camera readout and scene actions.
pub struct ScenePanel {
    state: PanelState,
}

impl Default for ScenePanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Scene", icons::CUBE),
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Panel for ScenePanel {
    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut ViewerData<'_>) {
        let scene = data.scene;
        ui.label(format!(
            "{}  {}",
            file_name(&scene.paths.model),
            file_name(&scene.paths.texture)
        ));
        match &scene.status {
            LoadStatus::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading…");
                });
            }
            LoadStatus::Ready => {
                if let Some(model) = scene.model() {
                    ui.label(format!(
                        "{} mesh nodes, {} triangles",
                        model.drawable_count(),
                        model.triangle_count()
                    ));
                }
            }
            LoadStatus::Failed { message, details } => {
                ui.label(RichText::new(*message).color(Color32::RED))
                    .on_hover_text(details.as_str());
            }
        }

        if data.features.open_dialogs {
            ui.horizontal(|ui| {
                if ui
                    .button(format!("{} Open OBJ…", icons::FOLDER_OPEN))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Wavefront OBJ", &["obj"])
                        .pick_file()
                    {
                        data.request_open_model = Some(path);
                    }
                }
                if ui
                    .button(format!("{} Open texture…", icons::IMAGE))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["jpg", "jpeg", "png"])
                        .pick_file()
                    {
                        data.request_open_texture = Some(path);
                    }
                }
            });
        }

        ui.separator();
        let cam = data.camera;
        egui::Grid::new("scene_camera_grid")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Yaw");
                ui.label(format!("{:.1}°", cam.yaw.to_degrees()));
                ui.end_row();
                ui.label("Pitch");
                ui.label(format!("{:.1}°", cam.pitch.to_degrees()));
                ui.end_row();
                ui.label("Distance");
                ui.label(format!("{:.2}", cam.distance));
                ui.end_row();
            });
        if ui
            .button(format!("{} Reset view", icons::ARROW_COUNTER_CLOCKWISE))
            .clicked()
        {
            data.request_reset_camera = true;
        }

        if data.features.measurement {
            ui.separator();
            let hint = match data.picks.phase() {
                PickPhase::Empty => "Click the model to place P1.",
                PickPhase::OnePoint => "Click the model to place P2.",
                PickPhase::Complete => "Click again to start a new measurement.",
            };
            ui.label(RichText::new(hint).weak());
        }

        ui.separator();
        let mut scheme = data.color_scheme;
        egui::ComboBox::from_label(format!("{} Theme", icons::PALETTE))
            .selected_text(scheme.label())
            .show_ui(ui, |ui| {
                for s in ColorScheme::all() {
                    ui.selectable_value(&mut scheme, *s, s.label());
                }
            });
        if scheme != data.color_scheme {
            data.request_color_scheme = Some(scheme);
        }
    }
}
