//! Dock geometry. Everything here is a pure function of the config, the
//! monitor snapshot and the icon count; nothing is cached between passes
//! except the preferred icon size table.

mod dock;
pub mod graph;
mod sizes;

pub use dock::{
    DockGeometry, EDGE_DISTANCE, HIDE_REVEAL, LayoutError, MIN_ICON_SIZE, compute_layout,
    layout_on,
};
pub use graph::{DockPosition, Orientation};
pub use sizes::{preferred_icon_size, preferred_icon_sizes};
