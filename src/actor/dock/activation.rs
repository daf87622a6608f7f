use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ActivationAction, AppRef, WindowInfo};

/// Delay before acting on an activation, so the host's own activation
/// handler runs first.
pub const ACTIVATION_DELAY_MS: f64 = 50.0;

bitflags! {
    /// Modifier and button state at the time of an input event.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 1;
        const BUTTON1 = 1 << 2;
        const BUTTON2 = 1 << 3;
        const BUTTON3 = 1 << 4;
    }
}

impl Modifiers {
    /// Ctrl-click and middle-click ask the app for a new window instead.
    pub fn requests_new_window(self) -> bool {
        self.intersects(Modifiers::CONTROL | Modifiers::BUTTON3)
    }
}

/// Picks the window action for activating `app`, from window state at the
/// moment of activation.
pub fn decide(
    app: &AppRef,
    windows: &[WindowInfo],
    modifiers: Modifiers,
) -> Option<ActivationAction> {
    if windows.is_empty() {
        return None;
    }
    if app.running && app.can_open_new_window && modifiers.requests_new_window() {
        debug!(app = %app.id, "activation opens a new window");
        return None;
    }

    let action = match windows.iter().find(|w| w.focused) {
        Some(focused) if modifiers.contains(Modifiers::SHIFT) => {
            ActivationAction::ToggleMaximize(focused.id)
        }
        Some(_) => ActivationAction::MinimizeAll(windows.iter().map(|w| w.id).collect()),
        None => {
            let hidden: Vec<_> = windows.iter().filter(|w| w.hidden).map(|w| w.id).collect();
            if hidden.is_empty() {
                return None;
            }
            ActivationAction::Restore(hidden)
        }
    };
    debug!(app = %app.id, ?action, "activation decided");
    Some(action)
}
