//! Color scheme definitions for the viewer
//!
//! A scheme sets the egui visuals, the viewport background and the colours
//! of the measurement overlay.

use eframe::egui::{Color32, Context, Visuals};
use serde::{Deserialize, Serialize};

/// Colours used by the measurement overlay and the info panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementColors {
    /// First picked point (P1).
    pub first: Color32,
    /// Second picked point (P2).
    pub second: Color32,
    /// Connecting line and distance text.
    pub line: Color32,
}

/// Visual theme for the viewer UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// eframe default dark look.
    #[default]
    Dark,
    /// Light theme.
    Light,
    /// Nord: blue-grey dark theme.
    Nord,
    /// High-contrast: pure-black background with saturated overlay colours.
    HighContrast,
}

impl ColorScheme {
    /// All built-in schemes (useful for combo-box UIs).
    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Dark,
            ColorScheme::Light,
            ColorScheme::Nord,
            ColorScheme::HighContrast,
        ]
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ColorScheme::Dark => "Dark",
            ColorScheme::Light => "Light",
            ColorScheme::Nord => "Nord",
            ColorScheme::HighContrast => "High Contrast",
        }
    }

    /// Apply this scheme's visuals to an egui context.
    pub fn apply(&self, ctx: &Context) {
        ctx.set_visuals(self.visuals());
    }

    /// The egui visuals for this scheme.
    pub fn visuals(&self) -> Visuals {
        match self {
            ColorScheme::Dark => Visuals::dark(),
            ColorScheme::Light => Visuals::light(),
            ColorScheme::Nord => {
                let mut v = Visuals::dark();
                let polar0 = Color32::from_rgb(46, 52, 64);
                let polar1 = Color32::from_rgb(59, 66, 82);
                let snow0 = Color32::from_rgb(216, 222, 233);
                let snow1 = Color32::from_rgb(229, 233, 240);
                v.panel_fill = polar0;
                v.window_fill = polar1;
                v.extreme_bg_color = polar0;
                v.faint_bg_color = polar1;
                v.override_text_color = Some(snow0);
                v.widgets.noninteractive.bg_fill = polar1;
                v.widgets.noninteractive.fg_stroke.color = snow0;
                v.widgets.inactive.fg_stroke.color = snow1;
                v.widgets.hovered.bg_fill = Color32::from_rgb(76, 86, 106);
                v
            }
            ColorScheme::HighContrast => {
                let mut v = Visuals::dark();
                let bg = Color32::BLACK;
                let fg = Color32::WHITE;
                v.panel_fill = bg;
                v.window_fill = Color32::from_rgb(10, 10, 10);
                v.extreme_bg_color = bg;
                v.faint_bg_color = Color32::from_rgb(20, 20, 20);
                v.override_text_color = Some(fg);
                v.widgets.noninteractive.bg_fill = Color32::from_rgb(20, 20, 20);
                v.widgets.noninteractive.fg_stroke.color = fg;
                v
            }
        }
    }

    /// Fill colour behind the model.
    pub fn viewport_background(&self) -> Color32 {
        match self {
            ColorScheme::Dark => Color32::from_rgb(24, 24, 28),
            ColorScheme::Light => Color32::from_rgb(225, 225, 230),
            ColorScheme::Nord => Color32::from_rgb(46, 52, 64),
            ColorScheme::HighContrast => Color32::BLACK,
        }
    }

    /// Overlay colours. P1 and P2 keep their colour for the lifetime of the scheme.
    pub fn measurement_colors(&self) -> MeasurementColors {
        match self {
            ColorScheme::Dark | ColorScheme::Nord => MeasurementColors {
                first: Color32::YELLOW,
                second: Color32::LIGHT_BLUE,
                line: Color32::LIGHT_GREEN,
            },
            ColorScheme::Light => MeasurementColors {
                first: Color32::from_rgb(200, 140, 0),
                second: Color32::from_rgb(30, 100, 200),
                line: Color32::from_rgb(20, 140, 40),
            },
            ColorScheme::HighContrast => MeasurementColors {
                first: Color32::from_rgb(255, 255, 0),
                second: Color32::from_rgb(0, 255, 255),
                line: Color32::from_rgb(0, 255, 0),
            },
        }
    }
}
