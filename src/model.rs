pub mod app;
pub mod icon;

pub use app::{ActivationAction, AppRef, WindowActions, WindowId, WindowInfo};
pub use icon::{
    IconEntry, IconId, IconKind, IconSource, IconVisual, VisualHandle, new_visual,
};
