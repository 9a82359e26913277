//! Scene state and the per-frame view handed to panels.

use std::path::PathBuf;

use crate::color_scheme::{ColorScheme, MeasurementColors};
use crate::config::{AssetPaths, FeatureFlags, MaterialConfig, MeasurementStyle};
use crate::data::measurement::{Measurement, PickState};
use crate::data::metadata::ModelMetadata;
use crate::error::ViewerError;
use crate::scene::{LoadedAssets, Material, OrbitCamera, SceneNode};

/// Where the current asset pair is in its load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready,
    /// `message` is shown to the user; `details` goes to the log and panel.
    Failed {
        message: &'static str,
        details: String,
    },
}

/// The loaded model and its texture. The model is only present once a load
/// succeeded, so every reader has to handle `None`.
pub struct SceneState {
    pub paths: AssetPaths,
    pub status: LoadStatus,
    model: Option<SceneNode>,
    texture: Option<egui::TextureHandle>,
    /// Normalization scale applied to the model (scene units per file unit).
    scale: f32,
}

impl SceneState {
    pub fn loading(paths: AssetPaths) -> Self {
        Self {
            paths,
            status: LoadStatus::Loading,
            model: None,
            texture: None,
            scale: 1.0,
        }
    }

    pub fn model(&self) -> Option<&SceneNode> {
        self.model.as_ref()
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready && self.model.is_some()
    }

    /// Install a freshly loaded model: normalize it, then give every mesh
    /// node the texture and surface parameters.
    pub fn install(
        &mut self,
        assets: LoadedAssets,
        texture: Option<egui::TextureHandle>,
        material: &MaterialConfig,
    ) {
        let mut model = assets.model;
        self.scale = model.normalize(material.normalized_size);
        model.apply_material(Material {
            texture: texture.as_ref().map(|t| t.id()),
            roughness: material.roughness,
            metalness: material.metalness,
        });
        self.paths = assets.paths;
        self.model = Some(model);
        self.texture = texture;
        self.status = LoadStatus::Ready;
    }

    /// Drop any model and show the failure instead of the scene.
    pub fn fail(&mut self, err: &ViewerError) {
        self.model = None;
        self.texture = None;
        self.scale = 1.0;
        self.status = LoadStatus::Failed {
            message: err.user_message(),
            details: error_chain(err),
        };
    }

    /// Start over for a new asset pair.
    pub fn restart(&mut self, paths: AssetPaths) {
        *self = Self::loading(paths);
    }
}

/// `err` followed by its sources, joined with `: `.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        text.push_str(": ");
        text.push_str(&s.to_string());
        source = s.source();
    }
    text
}

/// A view struct combining scene, camera and measurement for panel rendering.
pub struct ViewerData<'a> {
    pub scene: &'a SceneState,
    pub camera: &'a OrbitCamera,
    pub picks: &'a PickState,
    pub metadata: &'a ModelMetadata,
    pub style: &'a MeasurementStyle,
    pub features: &'a FeatureFlags,
    pub color_scheme: ColorScheme,
    // Requests set by panel UI, consumed by the app after panel rendering.
    pub request_open_model: Option<PathBuf>,
    pub request_open_texture: Option<PathBuf>,
    pub request_reset_camera: bool,
    pub request_color_scheme: Option<ColorScheme>,
}

impl<'a> ViewerData<'a> {
    pub fn measurement(&self) -> Option<Measurement> {
        self.picks.measurement()
    }

    pub fn colors(&self) -> MeasurementColors {
        self.color_scheme.measurement_colors()
    }

    /// Measured distance converted back to the units of the OBJ file.
    pub fn native_distance(&self) -> Option<f64> {
        let scale = self.scene.scale() as f64;
        self.measurement()
            .filter(|_| scale > 0.0)
            .map(|m| m.distance / scale)
    }
}
