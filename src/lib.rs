//! meshview crate root: re-exports and module wiring.
//!
//! A native viewer for a single textured OBJ model built on egui/eframe. The
//! user orbits the camera and clicks two points on the surface to measure
//! the distance between them.
//!
//! - `scene`: scene graph, OBJ/texture loading, orbit camera
//! - `picking`: click to world ray to nearest surface hit
//! - `data`: measurement state machine, model metadata, panel view data
//! - `overlay` / `render`: measurement overlay and software rendering
//! - `panels`: info and scene side panels
//! - `app`: the egui widget, eframe wrapper and `run_viewer`
//! - `config`, `events`, `error`, `color_scheme`: ambient plumbing

pub mod app;
pub mod color_scheme;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod overlay;
pub mod panels;
pub mod picking;
pub mod render;
pub mod scene;

// Public re-exports for a compact external API
pub use app::{run_viewer, ViewerApp, ViewerPanel};
pub use color_scheme::{ColorScheme, MeasurementColors};
pub use config::{AssetPaths, ViewerConfig};
pub use data::measurement::{
    Measurement, MeasurementChange, MeasurementTool, PickPhase, PickState, Point3,
};
pub use data::metadata::ModelMetadata;
pub use error::{ViewerError, ViewerResult};
pub use events::{EventController, EventFilter, EventKind, ViewerEvent};
pub use picking::{pick, pointer_to_ndc, Ray};
pub use scene::{OrbitCamera, SceneNode};
