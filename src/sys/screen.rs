use serde::{Deserialize, Serialize};

use super::geometry::Rect;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MonitorId(u32);

impl MonitorId {
    pub const fn new(id: u32) -> MonitorId { MonitorId(id) }
}

/// Snapshot of one monitor, taken before each layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorGeometry {
    pub id: MonitorId,
    pub frame: Rect,
    pub scale_factor: f64,
    pub is_primary: bool,
    /// Height of the host's top panel. Only reserved on the primary monitor.
    #[serde(default)]
    pub panel_height: f64,
}

impl MonitorGeometry {
    pub fn x(&self) -> f64 { self.frame.origin.x }

    pub fn y(&self) -> f64 { self.frame.origin.y }

    pub fn width(&self) -> f64 { self.frame.size.width }

    pub fn height(&self) -> f64 { self.frame.size.height }

    /// Vertical space taken by the top panel on this monitor.
    pub fn panel_allowance(&self) -> f64 {
        if self.is_primary { self.panel_height.max(0.0) } else { 0.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Monitor/display collaborator. Queries are synchronous and always reflect
/// the current arrangement.
pub trait Display {
    fn monitors(&self) -> Vec<MonitorGeometry>;

    fn monitor(&self, id: MonitorId) -> Option<MonitorGeometry> {
        self.monitors().into_iter().find(|m| m.id == id)
    }

    fn primary(&self) -> Option<MonitorGeometry> {
        let monitors = self.monitors();
        monitors.iter().find(|m| m.is_primary).or(monitors.first()).copied()
    }

    /// The monitor sharing the given edge of `id`, if any.
    fn neighbor(&self, id: MonitorId, direction: DisplayDirection) -> Option<MonitorId> {
        let monitors = self.monitors();
        let this = monitors.iter().find(|m| m.id == id)?;
        monitors
            .iter()
            .filter(|other| other.id != id)
            .find(|other| is_adjacent(&this.frame, &other.frame, direction))
            .map(|other| other.id)
    }
}

const EDGE_EPSILON: f64 = 1.0;

fn is_adjacent(this: &Rect, other: &Rect, direction: DisplayDirection) -> bool {
    let (a_min, a_max) = (this.min(), this.max());
    let (b_min, b_max) = (other.min(), other.max());
    let overlaps_x = a_min.x < b_max.x && b_min.x < a_max.x;
    let overlaps_y = a_min.y < b_max.y && b_min.y < a_max.y;
    match direction {
        DisplayDirection::Down => overlaps_x && (b_min.y - a_max.y).abs() < EDGE_EPSILON,
        DisplayDirection::Up => overlaps_x && (a_min.y - b_max.y).abs() < EDGE_EPSILON,
        DisplayDirection::Left => overlaps_y && (a_min.x - b_max.x).abs() < EDGE_EPSILON,
        DisplayDirection::Right => overlaps_y && (b_min.x - a_max.x).abs() < EDGE_EPSILON,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Stub(Vec<MonitorGeometry>);

    impl Display for Stub {
        fn monitors(&self) -> Vec<MonitorGeometry> { self.0.clone() }
    }

    fn monitor(id: u32, frame: Rect, is_primary: bool) -> MonitorGeometry {
        MonitorGeometry {
            id: MonitorId::new(id),
            frame,
            scale_factor: 1.0,
            is_primary,
            panel_height: 32.0,
        }
    }

    #[test]
    fn it_finds_neighbors_sharing_an_edge() {
        let stub = Stub(vec![
            monitor(1, Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0), true),
            monitor(2, Rect::from_xywh(1920.0, 200.0, 1280.0, 1024.0), false),
            monitor(3, Rect::from_xywh(0.0, 1080.0, 1920.0, 1080.0), false),
        ]);
        let main = MonitorId::new(1);

        assert_eq!(stub.neighbor(main, DisplayDirection::Right), Some(MonitorId::new(2)));
        assert_eq!(stub.neighbor(main, DisplayDirection::Down), Some(MonitorId::new(3)));
        assert_eq!(stub.neighbor(main, DisplayDirection::Left), None);
        assert_eq!(stub.neighbor(main, DisplayDirection::Up), None);
        assert_eq!(
            stub.neighbor(MonitorId::new(3), DisplayDirection::Up),
            Some(main)
        );
    }

    #[test]
    fn corner_touching_monitors_are_not_neighbors() {
        let stub = Stub(vec![
            monitor(1, Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0), true),
            monitor(2, Rect::from_xywh(1920.0, 1080.0, 1920.0, 1080.0), false),
        ]);
        assert_eq!(stub.neighbor(MonitorId::new(1), DisplayDirection::Right), None);
        assert_eq!(stub.neighbor(MonitorId::new(1), DisplayDirection::Down), None);
    }

    #[test]
    fn panel_allowance_applies_to_primary_only() {
        let primary = monitor(1, Rect::from_xywh(0.0, 0.0, 100.0, 100.0), true);
        let secondary = monitor(2, Rect::from_xywh(100.0, 0.0, 100.0, 100.0), false);
        assert_eq!(primary.panel_allowance(), 32.0);
        assert_eq!(secondary.panel_allowance(), 0.0);
    }
}
