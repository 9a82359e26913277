use egui::{RichText, Ui};

use super::panel_trait::{Panel, PanelState};
use crate::data::measurement::Point3;
use crate::data::view::ViewerData;

/// Distance with a fixed number of decimals, e.g. `5.0000`.
pub fn format_distance(distance: f64, decimals: usize) -> String {
    format!("{distance:.decimals$}")
}

/// `(x, y, z)` with a fixed number of decimals per component.
pub fn format_point(p: &Point3, decimals: usize) -> String {
    format!(
        "({:.d$}, {:.d$}, {:.d$})",
        p.x,
        p.y,
        p.z,
        d = decimals
    )
}

/// Model metadata plus the current measurement.
pub struct InfoPanel {
    state: PanelState,
}

impl Default for InfoPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Model Info", egui_phosphor::regular::INFO),
        }
    }
}

impl Panel for InfoPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut ViewerData<'_>) {
        egui::Grid::new("model_info_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for (label, value) in data.metadata.rows() {
                    ui.label(RichText::new(format!("{label}:")).strong());
                    ui.add(egui::Label::new(value).wrap());
                    ui.end_row();
                }
            });

        // Only a complete pair has anything to show.
        let Some(m) = data.measurement() else {
            return;
        };
        let colors = data.colors();
        let decimals = data.style.coordinate_decimals;

        ui.separator();
        ui.label(RichText::new("Measurement").strong());
        ui.label(
            RichText::new(format!("P1 {}", format_point(&m.points[0], decimals)))
                .color(colors.first)
                .monospace(),
        );
        ui.label(
            RichText::new(format!("P2 {}", format_point(&m.points[1], decimals)))
                .color(colors.second)
                .monospace(),
        );
        ui.label(
            RichText::new(format!(
                "Distance: {} units",
                format_distance(m.distance, data.style.distance_decimals)
            ))
            .color(colors.line)
            .strong(),
        );
        if let Some(native) = data.native_distance() {
            if (data.scene.scale() - 1.0).abs() > f32::EPSILON {
                ui.label(
                    RichText::new(format!(
                        "In file units: {}",
                        format_distance(native, data.style.distance_decimals)
                    ))
                    .weak(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_uses_fixed_decimals() {
        assert_eq!(format_distance(5.0, 4), "5.0000");
        assert_eq!(format_distance(1.23456, 4), "1.2346");
        assert_eq!(format_distance(2.0, 0), "2");
    }

    #[test]
    fn point_components_are_rounded() {
        let p = Point3::new(1.0, -2.5, 0.12345);
        assert_eq!(format_point(&p, 3), "(1.000, -2.500, 0.123)");
    }
}
