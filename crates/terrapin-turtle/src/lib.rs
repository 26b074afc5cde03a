//! Undoable turtle agent for a remote voxel world.
//!
//! A [`Turtle`] walks the grid, drawing blocks as it moves when its pen is
//! down, and can roll back any sequence of its own steps. Every operation
//! produces a fresh immutable [`TurtleState`] snapshot and records the
//! reverse diff needed to undo it on an append-only history stack, so
//! `undo` is a true left inverse: position, orientation, pen state, and
//! every touched cell all come back.
//!
//! # History model
//!
//! The first history entry is the `home` sentinel — the agent's origin
//! state, never popped. Movement pushes `line` entries (pen down) or
//! `move` entries (pen up / orientation-only), and every step ends by
//! redrawing the agent's visual marker as a trailing `turtle` entry.
//! Marker entries are stripped silently before each step and before each
//! undo, so the number of undoable steps a caller sees equals the number
//! of operations it performed — never the number of marker redraws.
//!
//! All of one operation's cache work runs inside a single batch scope on
//! the surface's cache, so a step costs one remote write transaction no
//! matter how many cells it touches.

pub mod state;
pub mod turtle;

pub use state::{Action, TurtleState};
pub use turtle::{Result, Turtle, TurtleError};
