use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::graph::{DockPosition, Orientation};
use super::sizes::preferred_icon_size;
use crate::common::config::DockConfig;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{Display, MonitorGeometry, MonitorId};

/// Pixels per `edge_distance` unit.
pub const EDGE_DISTANCE: f64 = 20.0;
/// Sliver of the hidden dock left on screen, before scaling.
pub const HIDE_REVEAL: f64 = 4.0;
/// Smallest icon the shrink correction may produce.
pub const MIN_ICON_SIZE: f64 = 4.0;

const PADDING_RATIO: f64 = 0.1;
const PANEL_MODE_INSET: f64 = 8.0;
const SPACING_RATIO: f64 = 1.2;
const HEADROOM_ICONS: f64 = 4.0;
const ROW_SHRUNK: f64 = 1.8;
const ROW_NORMAL: f64 = 1.6;
const SEPARATOR_RATIO: f64 = 1.0 / 8.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("monitor {0:?} is not connected")]
    NoMonitor(MonitorId),
    #[error("no monitors available")]
    NoMonitors,
}

/// Derived dock geometry, recomputed on every layout pass. Positions and
/// dock sizes are in physical pixels; `icon_size` and `dock_padding` are
/// logical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockGeometry {
    pub monitor: MonitorId,
    pub position: DockPosition,
    pub orientation: Orientation,
    pub scale_factor: f64,
    pub icon_size: f64,
    pub separator_size: f64,
    pub dock_padding: f64,
    /// Thickness of the icon row, without padding or edge gap.
    pub icon_area: f64,
    pub dock_width: f64,
    pub dock_height: f64,
    /// Gap to the screen edge after shrink correction. Negative in panel
    /// mode.
    pub edge_distance: f64,
    pub shown_position: Point,
    pub hidden_position: Point,
    /// Thin strip along the screen edge that reveals a hidden dock.
    pub trigger_area: Rect,
    /// Projected length of the icon run, including magnification headroom.
    pub extent: f64,
    /// The most `extent` may occupy before shrinking.
    pub max_extent: f64,
    /// Uniform factor applied by the shrink correction; 1.0 when it did not
    /// engage.
    pub shrink: f64,
    /// Set when the shrink correction hit the minimum icon size.
    pub shrink_clamped: bool,
    /// A neighbouring monitor sits on the hide side.
    pub autohide_blocked: bool,
}

// Passed by value to every behavior on every event.
static_assertions::assert_impl_all!(DockGeometry: Copy, Send, Sync);

impl DockGeometry {
    pub fn size(&self) -> Size { Size::new(self.dock_width, self.dock_height) }

    /// Dock thickness perpendicular to its edge.
    pub fn thickness(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.dock_height,
            Orientation::Vertical => self.dock_width,
        }
    }

    pub fn rect_at(&self, origin: Point) -> Rect { Rect::new(origin, self.size()) }

    pub fn shown_rect(&self) -> Rect { self.rect_at(self.shown_position) }

    /// Distance between two points along the axis icons are laid out on.
    pub fn primary_axis_distance(&self, a: Point, b: Point) -> f64 {
        match self.orientation {
            Orientation::Horizontal => (a.x - b.x).abs(),
            Orientation::Vertical => (a.y - b.y).abs(),
        }
    }

    pub fn is_shrunk(&self) -> bool { self.shrink < 1.0 }
}

/// Computes the dock geometry for `icon_count` icons on `monitor`.
///
/// The overflow correction is a single linear scale-down: the corrected run
/// is not re-measured, which can leave a little slack or overshoot when
/// padding and edge distance do not scale with the run.
pub fn compute_layout(
    config: &DockConfig,
    monitor: &MonitorGeometry,
    icon_count: usize,
) -> DockGeometry {
    let position = config.position.resolve(config.experimental_features);
    let orientation = position.orientation();
    let scale_factor = if monitor.scale_factor > 0.0 { monitor.scale_factor } else { 1.0 };

    let mut icon_size = (preferred_icon_size(config.icon_size) * config.scale).max(0.0);
    let mut dock_padding = icon_size * PADDING_RATIO;
    let mut distance = if config.panel_mode {
        -PANEL_MODE_INSET
    } else {
        config.edge_distance.max(0.0) * EDGE_DISTANCE * scale_factor
    };

    let spacing = icon_size * (SPACING_RATIO + config.animation_spread / 4.0);
    let available = match orientation {
        Orientation::Horizontal => monitor.width(),
        Orientation::Vertical => monitor.height(),
    };
    let max_extent = (available * orientation.safety_fraction()).max(0.0);
    let headroom = icon_size * config.animation_magnify * scale_factor * HEADROOM_ICONS;
    let mut extent = spacing * scale_factor * icon_count as f64 + headroom;

    let mut shrink = 1.0;
    let mut shrink_clamped = false;
    if extent > max_extent && icon_size > 0.0 {
        let mut factor = (max_extent - icon_size / 2.0 * scale_factor) / extent;
        let floor = MIN_ICON_SIZE.min(icon_size);
        if factor <= 0.0 || icon_size * factor < floor {
            factor = floor / icon_size;
            shrink_clamped = true;
        }
        debug!(icon_count, extent, max_extent, factor, shrink_clamped, "shrinking icons to fit");
        shrink = factor;
        icon_size *= factor;
        dock_padding *= factor;
        distance *= factor;
        extent *= factor;
    }

    let scale = 0.5 + config.scale / 2.0;
    let row = if config.shrink_icons { ROW_SHRUNK } else { ROW_NORMAL };
    let icon_area = icon_size * row * scale * scale_factor;
    let thickness = (((icon_size + dock_padding) * row * scale + distance) * scale_factor).max(0.0);

    let panel = monitor.panel_allowance();
    let (mx, my, mw, mh) = (monitor.x(), monitor.y(), monitor.width(), monitor.height());
    let (dock_width, dock_height) = match orientation {
        Orientation::Horizontal => (mw, thickness),
        Orientation::Vertical => (thickness, (mh - panel).max(0.0)),
    };

    let reveal = HIDE_REVEAL * scale_factor;
    let (shown_position, hidden_position, trigger_area) = match position {
        DockPosition::Bottom => (
            Point::new(mx, my + mh - thickness),
            Point::new(mx, my + mh - reveal),
            Rect::from_xywh(mx, my + mh - reveal, mw, reveal),
        ),
        DockPosition::Top => (
            Point::new(mx, my + panel),
            Point::new(mx, my + panel - thickness + reveal),
            Rect::from_xywh(mx, my + panel, mw, reveal),
        ),
        DockPosition::Left => (
            Point::new(mx, my + panel),
            Point::new(mx - thickness + reveal, my + panel),
            Rect::from_xywh(mx, my + panel, reveal, dock_height),
        ),
        DockPosition::Right => (
            Point::new(mx + mw - thickness, my + panel),
            Point::new(mx + mw - reveal, my + panel),
            Rect::from_xywh(mx + mw - reveal, my + panel, reveal, dock_height),
        ),
    };

    let geometry = DockGeometry {
        monitor: monitor.id,
        position,
        orientation,
        scale_factor,
        icon_size,
        separator_size: icon_size * SEPARATOR_RATIO * scale_factor,
        dock_padding,
        icon_area,
        dock_width,
        dock_height,
        edge_distance: distance,
        shown_position,
        hidden_position,
        trigger_area,
        extent,
        max_extent,
        shrink,
        shrink_clamped,
        autohide_blocked: false,
    };
    trace!(?geometry, "computed layout");
    geometry
}

/// Lays the dock out on `monitor` (or the primary monitor) and checks the
/// hide side for a neighbouring monitor. Autohide is never allowed to slide
/// the dock into another monitor's visible area.
pub fn layout_on(
    display: &dyn Display,
    monitor: Option<MonitorId>,
    config: &DockConfig,
    icon_count: usize,
) -> Result<DockGeometry, LayoutError> {
    let monitor = match monitor {
        Some(id) => display.monitor(id).ok_or(LayoutError::NoMonitor(id))?,
        None => display.primary().ok_or(LayoutError::NoMonitors)?,
    };
    let mut geometry = compute_layout(config, &monitor, icon_count);
    geometry.autohide_blocked =
        display.neighbor(monitor.id, geometry.position.hide_direction()).is_some();
    Ok(geometry)
}
