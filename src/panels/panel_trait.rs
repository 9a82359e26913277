use egui::Ui;

use crate::data::view::ViewerData;

#[derive(Debug, Clone, Copy)]
pub struct PanelState {
    pub title: &'static str,
    pub icon: &'static str,
    pub visible: bool,
    pub detached: bool,
}

impl PanelState {
    pub fn new(title: &'static str, icon: &'static str) -> Self {
        Self {
            title,
            icon,
            visible: true,
            detached: false,
        }
    }
}

pub trait Panel {
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    fn title(&self) -> &'static str {
        self.state().title
    }

    fn title_and_icon(&self) -> String {
        let state = self.state();
        if state.icon.is_empty() {
            state.title.to_string()
        } else {
            format!("{} {}", state.icon, state.title)
        }
    }

    fn render_panel(&mut self, _ui: &mut Ui, _data: &mut ViewerData<'_>) {}

    /// Draw the panel inside a collapsible section or, when detached, its
    /// own window.
    fn show(&mut self, ui: &mut Ui, data: &mut ViewerData<'_>) {
        if !self.state().visible {
            return;
        }
        if self.state().detached {
            let mut open = true;
            let mut dock = false;
            egui::Window::new(self.title_and_icon())
                .id(egui::Id::new(("detached-panel", self.title())))
                .open(&mut open)
                .show(ui.ctx(), |ui| {
                    if ui.small_button("Dock").clicked() {
                        dock = true;
                    }
                    self.render_panel(ui, data);
                });
            let state = self.state_mut();
            state.visible = open;
            if dock {
                state.detached = false;
            }
            return;
        }

        let mut detach = false;
        egui::CollapsingHeader::new(self.title_and_icon())
            .id_salt(("panel", self.title()))
            .default_open(true)
            .show(ui, |ui| {
                self.render_panel(ui, data);
                if ui.small_button("Pop out").clicked() {
                    detach = true;
                }
            });
        if detach {
            self.state_mut().detached = true;
        }
    }
}
