//! Configuration types for the viewer.
//!
//! Everything except the runtime handles (`native_options`, `controllers`)
//! can be loaded from a JSON file. Missing fields fall back to their defaults,
//! so a config file only needs the keys it wants to change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::metadata::ModelMetadata;
use crate::error::{ViewerError, ViewerResult};
use crate::events::EventController;

pub use crate::color_scheme::{ColorScheme, MeasurementColors};

// ─────────────────────────────────────────────────────────────────────────────
// Assets
// ─────────────────────────────────────────────────────────────────────────────

/// Paths of the mesh and texture loaded at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Wavefront OBJ mesh.
    pub model: PathBuf,
    /// Texture image (JPEG) applied to every mesh node.
    pub texture: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from("assets/model.obj"),
            texture: PathBuf::from("assets/capsule0.jpg"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Camera
// ─────────────────────────────────────────────────────────────────────────────

/// Initial camera pose and orbit-control limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space.
    pub position: [f32; 3],
    /// Point the camera orbits around.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Closest allowed orbit distance.
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    pub max_distance: f32,
    /// Fraction of the pending orbit/zoom applied per frame.
    pub damping: f32,
    /// Radians of orbit per dragged pixel.
    pub rotate_speed: f32,
    /// Zoom factor per scrolled point.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 50.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 1.0,
            max_distance: 20.0,
            damping: 0.1,
            rotate_speed: 0.01,
            zoom_speed: 0.002,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Material / lighting
// ─────────────────────────────────────────────────────────────────────────────

/// Surface parameters applied to every drawable node after loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub roughness: f32,
    pub metalness: f32,
    /// Largest dimension of the model after normalization.
    pub normalized_size: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            roughness: 0.5,
            metalness: 0.2,
            normalized_size: 5.0,
        }
    }
}

/// A positional light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub intensity: f32,
}

/// Scene lighting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: f32,
    pub lights: Vec<LightConfig>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: 1.0,
            lights: vec![
                LightConfig {
                    position: [10.0, 10.0, 10.0],
                    intensity: 2.0,
                },
                LightConfig {
                    position: [-10.0, -10.0, -10.0],
                    intensity: 1.0,
                },
            ],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Measurement overlay
// ─────────────────────────────────────────────────────────────────────────────

/// Size and precision of the measurement overlay and readout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementStyle {
    /// Marker sphere radius in world units.
    pub marker_radius: f32,
    /// Connecting tube radius in world units.
    pub line_radius: f32,
    /// Number of sides of the connecting tube.
    pub tube_segments: usize,
    /// Decimals used for the distance.
    pub distance_decimals: usize,
    /// Decimals used for point coordinates.
    pub coordinate_decimals: usize,
}

impl Default for MeasurementStyle {
    fn default() -> Self {
        Self {
            marker_radius: 0.06,
            line_radius: 0.015,
            tube_segments: 8,
            distance_decimals: 4,
            coordinate_decimals: 3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature flags
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle individual UI features on or off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Show the model info panel.
    pub info_panel: bool,
    /// Show the scene panel (load status, camera, open buttons).
    pub scene_panel: bool,
    /// Allow point picking.
    pub measurement: bool,
    /// Allow the "Open…" file dialogs.
    pub open_dialogs: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            info_panel: true,
            scene_panel: true,
            measurement: true,
            open_dialogs: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controllers sub-config
// ─────────────────────────────────────────────────────────────────────────────

/// Optional programmatic controllers attached to the viewer.
#[derive(Clone, Default)]
pub struct Controllers {
    pub event: Option<EventController>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for the viewer.
///
/// | Field            | Purpose |
/// |------------------|---------|
/// | `assets`         | Mesh and texture paths |
/// | `metadata`       | Record shown in the info panel |
/// | `camera`         | Initial pose and orbit limits |
/// | `material`       | Surface parameters and normalization size |
/// | `lighting`       | Ambient and positional lights |
/// | `measurement`    | Overlay sizes and readout precision |
/// | `features`       | Toggle UI features |
/// | `color_scheme`   | Visual theme |
/// | `controllers`    | Programmatic interaction handles |
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Native window title.
    pub title: String,
    pub assets: AssetPaths,
    pub metadata: ModelMetadata,
    pub camera: CameraConfig,
    pub material: MaterialConfig,
    pub lighting: LightingConfig,
    pub measurement: MeasurementStyle,
    pub features: FeatureFlags,
    pub color_scheme: ColorScheme,

    /// Optional eframe native-window options.
    #[serde(skip)]
    pub native_options: Option<eframe::NativeOptions>,
    /// External controllers for programmatic interaction.
    #[serde(skip)]
    pub controllers: Controllers,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "3D Model Viewer".to_string(),
            assets: AssetPaths::default(),
            metadata: ModelMetadata::default(),
            camera: CameraConfig::default(),
            material: MaterialConfig::default(),
            lighting: LightingConfig::default(),
            measurement: MeasurementStyle::default(),
            features: FeatureFlags::default(),
            color_scheme: ColorScheme::default(),
            native_options: None,
            controllers: Controllers::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str, origin: &Path) -> ViewerResult<Self> {
        serde_json::from_str(text).map_err(|source| ViewerError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> ViewerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ViewerError::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_json_str(&text, path)?;
        tracing::info!(path = %path.display(), "Loaded viewer configuration");
        Ok(cfg)
    }
}
