pub mod info_ui;
pub mod panel_trait;
pub mod scene_ui;

pub use info_ui::InfoPanel;
pub use panel_trait::{Panel, PanelState};
pub use scene_ui::ScenePanel;
