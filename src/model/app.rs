use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// The application behind an icon, as far as the dock needs to know it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: String,
    pub window_count: usize,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub can_open_new_window: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub focused: bool,
    /// Minimized or otherwise not shown.
    pub hidden: bool,
    pub maximized: bool,
}

/// Window-level request issued after an icon activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationAction {
    MinimizeAll(Vec<WindowId>),
    ToggleMaximize(WindowId),
    /// Unminimize and raise.
    Restore(Vec<WindowId>),
}

pub trait WindowActions {
    fn windows(&self, app_id: &str) -> Vec<WindowInfo>;

    fn perform(&mut self, action: &ActivationAction);
}
