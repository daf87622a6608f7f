use serde::{Deserialize, Serialize};

use crate::animation::{Scheduler, interpolate};
use crate::common::config::AnimationEasing;
use crate::model::{ActivationAction, IconId};
use crate::sys::geometry::Point;

/// Owner of a running sequence. Each owner has at most one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimKey {
    AutoHide,
    Magnify,
    Bounce(IconId),
}

/// What a frame drives. Values are derived from elapsed time on each sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Dock position during an autohide transition.
    Slide {
        from: Point,
        to: Point,
        easing: AnimationEasing,
    },
    /// Vertical offset of a single icon.
    Offset {
        from: f64,
        to: f64,
        easing: AnimationEasing,
    },
    /// Magnification of several icons easing towards a common scale.
    Scale {
        from: Vec<(IconId, f64)>,
        to: f64,
        easing: AnimationEasing,
    },
}

/// Payload of a deferred call.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// The hide debounce expired.
    Hide,
    Activate(ActivationAction),
}

pub type DockScheduler = Scheduler<AnimKey, Effect, Deferred>;

impl Effect {
    pub fn slide(from: Point, to: Point, easing: AnimationEasing) -> Self {
        Effect::Slide { from, to, easing }
    }

    pub fn offset(from: f64, to: f64, easing: AnimationEasing) -> Self {
        Effect::Offset { from, to, easing }
    }
}

pub fn slide_at(
    from: Point,
    to: Point,
    easing: AnimationEasing,
    elapsed: f64,
    duration: f64,
) -> Point {
    Point::new(
        interpolate(easing, elapsed, duration, from.x, to.x),
        interpolate(easing, elapsed, duration, from.y, to.y),
    )
}
