use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::sys::screen::DisplayDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Icons run left to right along the top or bottom edge.
    Horizontal,
    /// Icons run top to bottom along the left or right edge.
    Vertical,
}

impl Orientation {
    /// Fraction of the monitor extent the icon run may occupy before the
    /// shrink correction kicks in. Vertical docks get the tighter bound since
    /// monitor height is usually the smaller dimension.
    pub fn safety_fraction(self) -> f64 {
        match self {
            Orientation::Horizontal => 0.98,
            Orientation::Vertical => 0.96,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DockPosition {
    #[default]
    Bottom,
    Left,
    Right,
    Top,
}

impl DockPosition {
    /// Edges other than bottom are only honoured with experimental features
    /// turned on.
    pub fn resolve(self, experimental_features: bool) -> DockPosition {
        if experimental_features { self } else { DockPosition::Bottom }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            DockPosition::Bottom | DockPosition::Top => Orientation::Horizontal,
            DockPosition::Left | DockPosition::Right => Orientation::Vertical,
        }
    }

    /// Direction the dock slides when hiding.
    pub fn hide_direction(self) -> DisplayDirection {
        match self {
            DockPosition::Bottom => DisplayDirection::Down,
            DockPosition::Top => DisplayDirection::Up,
            DockPosition::Left => DisplayDirection::Left,
            DockPosition::Right => DisplayDirection::Right,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_bottom_survives_without_experimental_features() {
        for position in DockPosition::iter() {
            assert_eq!(position.resolve(false), DockPosition::Bottom);
            assert_eq!(position.resolve(true), position);
        }
    }

    #[test]
    fn orientation_follows_edge() {
        assert_eq!(DockPosition::Bottom.orientation(), Orientation::Horizontal);
        assert_eq!(DockPosition::Top.orientation(), Orientation::Horizontal);
        assert_eq!(DockPosition::Left.orientation(), Orientation::Vertical);
        assert_eq!(DockPosition::Right.orientation(), Orientation::Vertical);
    }

    #[test]
    fn display_matches_config_spelling() {
        assert_eq!(DockPosition::Right.to_string(), "right");
    }
}
