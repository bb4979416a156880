//! Navigation intent and direction types.

use serde::{Deserialize, Serialize};

/// A classified, debounced request to move between rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NavigationIntent {
    /// Move to the next row (scrolling down / swiping up).
    Advance,
    /// Move to the previous row.
    Retreat,
    /// No navigation requested.
    #[default]
    None,
}

impl NavigationIntent {
    /// Check if this intent requests any movement.
    pub fn is_some(self) -> bool {
        !matches!(self, NavigationIntent::None)
    }

    /// Direction a transition caused by this intent would take.
    pub fn direction(self) -> Direction {
        match self {
            NavigationIntent::Advance => Direction::Forward,
            NavigationIntent::Retreat => Direction::Backward,
            NavigationIntent::None => Direction::Still,
        }
    }
}

/// Signed unit direction recorded alongside a transition.
///
/// Only used to pick the edge a row enters from and exits toward.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// +1: the new row comes from below.
    Forward,
    /// -1: the new row comes from above.
    Backward,
    #[default]
    Still,
}

impl Direction {
    /// The signed unit value (+1, -1 or 0).
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
            Direction::Still => 0,
        }
    }

    /// Build a direction from any signed value.
    pub fn from_sign(value: i64) -> Self {
        match value.signum() {
            1 => Direction::Forward,
            -1 => Direction::Backward,
            _ => Direction::Still,
        }
    }
}
