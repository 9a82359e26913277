//! Main application module for the viewer.
//!
//! | Sub-module       | Responsibility |
//! | ---------------- | -------------- |
//! | [`layout`]       | Side panel with the sub-panels and applying their requests |
//! | [`viewport`]     | Central 3D viewport: input, picking and painting |
//! | [`viewer_app`]   | Standalone [`ViewerApp`] (eframe) wrapper |
//! | [`run`]          | Top-level [`run_viewer()`] entry point and icon loading |

mod layout;
mod run;
mod viewer_app;
mod viewport;

pub use run::run_viewer;
pub use viewer_app::ViewerApp;

use eframe::egui;
use tracing::{info, warn};

use crate::color_scheme::ColorScheme;
use crate::config::{
    AssetPaths, FeatureFlags, LightingConfig, MaterialConfig, MeasurementStyle, ViewerConfig,
};
use crate::data::measurement::MeasurementTool;
use crate::data::metadata::ModelMetadata;
use crate::data::view::{error_chain, SceneState};
use crate::events::{EventController, EventKind, LoadMeta, ViewerEvent};
use crate::panels::{InfoPanel, Panel, ScenePanel};
use crate::scene::{LoadOutcome, OrbitCamera, PendingLoad};

// ─────────────────────────────────────────────────────────────────────────────
// ViewerPanel – the central widget type
// ─────────────────────────────────────────────────────────────────────────────

/// The central widget that owns the scene, camera, measurement and panels.
///
/// Used standalone inside [`ViewerApp`], or embedded in a parent egui
/// application through [`ViewerPanel::update`].
pub struct ViewerPanel {
    // ── Data ─────────────────────────────────────────────────────────────────
    pub scene: SceneState,
    pub camera: OrbitCamera,
    pub measurement: MeasurementTool,
    pub metadata: ModelMetadata,

    // ── Settings ─────────────────────────────────────────────────────────────
    pub style: MeasurementStyle,
    pub material: MaterialConfig,
    pub lighting: LightingConfig,
    pub features: FeatureFlags,
    pub color_scheme: ColorScheme,

    // ── Panels ───────────────────────────────────────────────────────────────
    /// Panels docked to the right of the viewport.
    pub right_side_panels: Vec<Box<dyn Panel>>,

    /// In-flight asset load, if any. Replacing or dropping it cancels it.
    pub(crate) pending: Option<PendingLoad>,
    pub(crate) event_ctrl: Option<EventController>,
    /// Viewport size of the previous frame, for resize events.
    pub(crate) last_viewport_size: Option<egui::Vec2>,
}

impl ViewerPanel {
    /// Build the widget from a configuration. Nothing is loaded until
    /// [`start_load`](Self::start_load) is called.
    pub fn new(cfg: &ViewerConfig) -> Self {
        let event_ctrl = cfg.controllers.event.clone();
        let mut right_side_panels: Vec<Box<dyn Panel>> = Vec::new();
        if cfg.features.info_panel {
            right_side_panels.push(Box::new(InfoPanel::default()));
        }
        if cfg.features.scene_panel {
            right_side_panels.push(Box::new(ScenePanel::default()));
        }
        Self {
            scene: SceneState::loading(cfg.assets.clone()),
            camera: OrbitCamera::from_config(&cfg.camera),
            measurement: MeasurementTool::with_events(event_ctrl.clone()),
            metadata: cfg.metadata.clone(),
            style: cfg.measurement.clone(),
            material: cfg.material.clone(),
            lighting: cfg.lighting.clone(),
            features: cfg.features.clone(),
            color_scheme: cfg.color_scheme,
            right_side_panels,
            pending: None,
            event_ctrl,
            last_viewport_size: None,
        }
    }

    /// Attach an event controller for event dispatch.
    pub fn set_event_controller(&mut self, event_ctrl: Option<EventController>) {
        self.measurement.set_event_controller(event_ctrl.clone());
        self.event_ctrl = event_ctrl;
    }

    pub(crate) fn emit(&self, event: ViewerEvent) {
        if let Some(ctrl) = &self.event_ctrl {
            ctrl.emit(event);
        }
    }

    /// Start loading `paths` in the background, replacing the current model.
    ///
    /// A load already in flight is cancelled; its result is never applied.
    /// `repaint` is woken when the result is ready.
    pub fn start_load(&mut self, paths: AssetPaths, repaint: Option<egui::Context>) {
        if let Some(mut old) = self.pending.take() {
            old.cancel();
        }
        info!(
            model = %paths.model.display(),
            texture = %paths.texture.display(),
            "Loading assets"
        );
        self.scene.restart(paths.clone());
        self.measurement.clear();
        self.pending = Some(PendingLoad::spawn(paths, move || {
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        }));
    }

    pub fn is_loading(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.is_live())
    }

    /// Apply a finished load, if any. Returns `true` when the scene changed.
    pub fn poll_load(&mut self, ctx: &egui::Context) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(outcome) = pending.poll() else {
            return false;
        };
        self.pending = None;
        self.apply_load(ctx, outcome);
        true
    }

    fn apply_load(&mut self, ctx: &egui::Context, outcome: LoadOutcome) {
        match outcome {
            Ok(assets) => {
                let texture = ctx.load_texture(
                    "model-texture",
                    assets.texture.to_color_image(),
                    egui::TextureOptions::LINEAR,
                );
                let (model_path, texture_path) =
                    (assets.paths.model.clone(), assets.paths.texture.clone());
                self.scene.install(assets, Some(texture), &self.material);
                self.camera.reset();

                let (mesh_nodes, triangles) = self
                    .scene
                    .model()
                    .map_or((0, 0), |m| (m.drawable_count(), m.triangle_count()));
                info!(
                    mesh_nodes,
                    triangles,
                    scale = self.scene.scale(),
                    "Model ready"
                );
                let mut evt = ViewerEvent::new(EventKind::MODEL_LOADED);
                evt.load = Some(LoadMeta {
                    model: model_path,
                    texture: texture_path,
                    mesh_nodes,
                    triangles,
                    error: None,
                });
                self.emit(evt);
            }
            Err(err) => {
                let details = error_chain(&err);
                warn!(error = %details, "Asset load failed");
                self.scene.fail(&err);
                let mut evt = ViewerEvent::new(EventKind::MODEL_LOAD_FAILED);
                evt.load = Some(LoadMeta {
                    model: self.scene.paths.model.clone(),
                    texture: self.scene.paths.texture.clone(),
                    mesh_nodes: 0,
                    triangles: 0,
                    error: Some(details),
                });
                self.emit(evt);
            }
        }
    }
}
