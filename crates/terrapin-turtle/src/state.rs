//! Immutable agent snapshots and the history action tags.

use cgmath::Vector3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use terrapin_types::{Block, Point, orient};

/// What kind of step a history entry records.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    /// The origin sentinel — always the first entry, never popped.
    Home,
    /// Position or pose changed without drawing (pen up, or no movement).
    Move,
    /// Cells drawn along the path of a pen-down move.
    Line,
    /// The agent's own visual marker — stripped silently, never counted
    /// as an undoable step.
    Turtle,
}

/// One immutable snapshot of the agent.
///
/// Snapshots are never mutated in place: every operation copies the
/// previous snapshot with specific fields replaced via the `with_*`
/// constructors, and the old snapshot stays on the history stack.
#[derive(Clone, Debug, PartialEq)]
pub struct TurtleState {
    /// Where the agent stands.
    pub position: Point,
    /// Unit heading vector in the ground plane.
    pub heading: Vector3<f64>,
    /// Nose tilt off the ground plane, clamped to [-90, 90] degrees.
    pub elevation: f64,
    /// Whether the marker is drawn.
    pub visible: bool,
    /// Whether movement draws blocks.
    pub pen_down: bool,
    /// The block drawn along pen-down paths.
    pub pen_block: Block,
    /// The block used to fill shapes.
    pub fill_block: Block,
    /// Reverse diff: the prior values of exactly the cells the commit
    /// following this snapshot altered.
    pub changed: IndexMap<Point, Block>,
    /// What kind of step produced this entry.
    pub action: Action,
}

impl TurtleState {
    /// The origin snapshot for an agent spawning at `position`: heading
    /// +Z, level, visible, pen down, stone pen and fill.
    pub fn spawn(position: Point) -> Self {
        Self {
            position,
            heading: Vector3::unit_z(),
            elevation: 0.0,
            visible: true,
            pen_down: true,
            pen_block: Block::STONE,
            fill_block: Block::STONE,
            changed: IndexMap::new(),
            action: Action::Home,
        }
    }

    /// Copy with a new position.
    pub fn with_position(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Copy with a new heading vector.
    pub fn with_heading(&self, heading: Vector3<f64>) -> Self {
        Self {
            heading,
            ..self.clone()
        }
    }

    /// Copy with a new elevation, clamped to the legal range.
    pub fn with_elevation(&self, elevation: f64) -> Self {
        Self {
            elevation: orient::clamp_elevation(elevation),
            ..self.clone()
        }
    }

    /// Copy with new marker visibility.
    pub fn with_visible(&self, visible: bool) -> Self {
        Self {
            visible,
            ..self.clone()
        }
    }

    /// Copy with the pen raised or lowered.
    pub fn with_pen_down(&self, pen_down: bool) -> Self {
        Self {
            pen_down,
            ..self.clone()
        }
    }

    /// Copy with a new pen block.
    pub fn with_pen_block(&self, pen_block: Block) -> Self {
        Self {
            pen_block,
            ..self.clone()
        }
    }

    /// Copy with a new fill block.
    pub fn with_fill_block(&self, fill_block: Block) -> Self {
        Self {
            fill_block,
            ..self.clone()
        }
    }

    /// Copy with a reverse diff and action tag, for pushing to history.
    pub fn with_changes(&self, changed: IndexMap<Point, Block>, action: Action) -> Self {
        Self {
            changed,
            action,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_spawn_defaults() {
        let state = TurtleState::spawn(Point::new(2, -1, 16));
        assert_eq!(state.position, Point::new(2, -1, 16));
        assert_eq!(state.heading, Vector3::unit_z());
        assert_eq!(state.elevation, 0.0);
        assert!(state.visible);
        assert!(state.pen_down);
        assert_eq!(state.pen_block, Block::STONE);
        assert_eq!(state.action, Action::Home);
        assert!(state.changed.is_empty());
    }

    #[test]
    fn test_replace_leaves_original_untouched() {
        let state = TurtleState::spawn(Point::ZERO);
        let moved = state.with_position(Point::new(0, 0, 5));
        assert_eq!(state.position, Point::ZERO);
        assert_eq!(moved.position, Point::new(0, 0, 5));
        assert_eq!(moved.heading, state.heading);
    }

    #[test]
    fn test_elevation_replace_clamps() {
        let state = TurtleState::spawn(Point::ZERO);
        assert_eq!(state.with_elevation(135.0).elevation, 90.0);
        assert_eq!(state.with_elevation(-100.0).elevation, -90.0);
    }

    #[test]
    fn test_action_string_round_trip() {
        assert_eq!(Action::Line.to_string(), "line");
        assert_eq!(Action::from_str("turtle").expect("parse"), Action::Turtle);
        assert_eq!(Action::from_str("HOME").expect("parse"), Action::Home);
    }
}
