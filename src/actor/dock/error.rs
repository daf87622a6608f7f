use thiserror::Error;

use crate::layout_engine::LayoutError;
use crate::model::IconId;

/// Reasons a dock pass was skipped. None of these are fatal; the next
/// triggering event retries.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DockError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("icon {0:?} is not in the dock")]
    UnknownIcon(IconId),
    #[error("icon {0:?} has no application")]
    NoApp(IconId),
}
