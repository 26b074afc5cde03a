//! The turtle agent state machine.

use std::sync::Arc;

use indexmap::IndexMap;
use terrapin_types::{Block, Point, line, orient};
use terrapin_world::{Player, RemoteError, Surface};
use thiserror::Error;

use crate::state::{Action, TurtleState};

/// The block the agent's visual marker is drawn with (black wool).
const MARKER: Block = Block::wool(15);

/// Errors raised by agent operations.
#[derive(Error, Debug)]
pub enum TurtleError {
    /// A cache or remote operation failed beneath an agent operation.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, TurtleError>;

/// An agent that walks the world grid, drawing as it goes, with full undo.
///
/// Every state-changing operation computes a fresh [`TurtleState`], records
/// the reverse diff of the cells it touches on the history stack, and
/// redraws the agent's marker — all inside one batch scope, so a step is
/// one remote write transaction.
///
/// A transport failure mid-step is best-effort: the in-memory snapshot has
/// already been replaced when the flush fails, so the snapshot and the
/// drawn/undo-history state can diverge. Recover with [`Turtle::undo`] or
/// [`Turtle::reset`].
///
/// The agent itself is not synchronized — callers sharing one `Turtle`
/// across threads must lock it externally. Only the surface's cache is
/// safe for concurrent use.
pub struct Turtle {
    surface: Arc<Surface>,
    state: TurtleState,
    last_position: Point,
    history: Vec<TurtleState>,
}

impl Turtle {
    /// Spawn an agent at `position`, draw its marker, and seed the history
    /// stack with the origin sentinel.
    pub fn new(surface: Arc<Surface>, position: Point) -> Result<Self> {
        let state = TurtleState::spawn(position);
        let mut turtle = Self {
            surface,
            state: state.clone(),
            last_position: position,
            history: vec![state],
        };
        turtle.draw_marker()?;
        Ok(turtle)
    }

    /// Spawn an agent one cell below the controlling player.
    pub fn spawn(surface: Arc<Surface>, player: &Player) -> Result<Self> {
        let below = player.position()? - Point::Y;
        Self::new(surface, below)
    }

    // ── history plumbing ────────────────────────────────────────────────

    /// Push a history entry carrying the prior values of every cell in
    /// `changes`, then draw `changes`. An empty change set still pushes an
    /// entry, so no-op and orientation-only steps stay individually
    /// undoable.
    fn commit(&mut self, changes: IndexMap<Point, Block>, action: Action) -> Result<()> {
        let points: Vec<Point> = changes.keys().copied().collect();
        let reverse = self.surface.blocks().get(&points)?;
        self.history.push(self.state.with_changes(reverse, action));
        if !changes.is_empty() {
            self.surface.draw(&changes)?;
        }
        Ok(())
    }

    /// The marker cells for the current pose: head plus both arms, and the
    /// pen block under the agent when the pen is down.
    fn marker_cells(&self) -> IndexMap<Point, Block> {
        let arm = orient::arm_axis(self.state.heading);
        let head = orient::head_vector(self.state.heading, self.state.elevation);
        let pos = self.state.position.to_vec();

        let mut cells = IndexMap::new();
        cells.insert(Point::round_from(pos + head), MARKER);
        cells.insert(Point::round_from(pos + arm), MARKER);
        cells.insert(Point::round_from(pos - arm), MARKER);
        if self.state.pen_down {
            cells.insert(self.state.position, self.state.pen_block);
        }
        cells
    }

    /// Draw the marker, committed as a `turtle`-tagged entry.
    fn draw_marker(&mut self) -> Result<()> {
        let cells = self.marker_cells();
        self.commit(cells, Action::Turtle)
    }

    /// Strip every trailing `turtle` entry, restoring the cells each one
    /// overwrote.
    fn undraw_marker(&mut self) -> Result<()> {
        let surface = self.surface.clone();
        let batch = surface.batch();
        while let Some(entry) = self.history.pop_if(|s| s.action == Action::Turtle) {
            self.surface.draw(&entry.changed)?;
        }
        batch.commit()?;
        Ok(())
    }

    /// Settle the pending snapshot: undraw the old marker, commit the
    /// step's cells (a `line` when the pen is down and the position moved,
    /// an empty `move` otherwise), redraw the marker, and remember the new
    /// position — all as one remote transaction.
    fn update(&mut self) -> Result<()> {
        let surface = self.surface.clone();
        let batch = surface.batch();
        self.undraw_marker()?;
        if self.state.pen_down && self.state.position != self.last_position {
            let path: IndexMap<Point, Block> = line(self.last_position, self.state.position)
                .into_iter()
                .map(|p| (p, self.state.pen_block))
                .collect();
            self.commit(path, Action::Line)?;
        } else {
            self.commit(IndexMap::new(), Action::Move)?;
        }
        if self.state.visible {
            self.draw_marker()?;
        }
        self.last_position = self.state.position;
        batch.commit()?;
        Ok(())
    }

    // ── undo and friends ────────────────────────────────────────────────

    /// Roll back the most recent step: restore the cells it changed and
    /// return to the previous snapshot. A no-op once only the origin
    /// sentinel remains.
    pub fn undo(&mut self) -> Result<()> {
        let surface = self.surface.clone();
        let batch = surface.batch();
        self.undraw_marker()?;
        if let Some(entry) = self.history.pop_if(|s| s.action != Action::Home) {
            tracing::debug!(action = %entry.action, "undoing step");
            self.surface.draw(&entry.changed)?;
            if let Some(top) = self.history.last() {
                self.state = top.clone();
                self.last_position = self.state.position;
            }
        }
        if self.state.visible {
            self.draw_marker()?;
        }
        batch.commit()?;
        Ok(())
    }

    /// Return to the origin position and orientation. Draws a line on the
    /// way back if the pen is down, and is itself undoable.
    pub fn home(&mut self) -> Result<()> {
        self.state = self
            .state
            .with_position(self.history[0].position)
            .with_heading(cgmath::Vector3::unit_z())
            .with_elevation(0.0);
        self.update()
    }

    /// Undo every drawn step back to the origin sentinel, without moving
    /// the agent.
    pub fn clear(&mut self) -> Result<()> {
        let surface = self.surface.clone();
        let batch = surface.batch();
        while let Some(entry) = self.history.pop_if(|s| s.action != Action::Home) {
            self.surface.draw(&entry.changed)?;
        }
        self.update()?;
        batch.commit()?;
        Ok(())
    }

    /// [`Turtle::clear`], then return to the spawn point without drawing a
    /// line across the freshly cleared canvas.
    pub fn reset(&mut self) -> Result<()> {
        let surface = self.surface.clone();
        let batch = surface.batch();
        self.clear()?;
        self.last_position = self.history[0].position;
        self.home()?;
        batch.commit()?;
        Ok(())
    }

    // ── movement ────────────────────────────────────────────────────────

    /// Move `distance` blocks the way the nose points (heading plus
    /// elevation). Negative distances move backward.
    pub fn forward(&mut self, distance: f64) -> Result<()> {
        let head = orient::head_vector(self.state.heading, self.state.elevation);
        let target = Point::round_from(self.state.position.to_vec() + head * distance);
        self.state = self.state.with_position(target);
        self.update()
    }

    /// Move `distance` blocks opposite the nose, without turning.
    pub fn backward(&mut self, distance: f64) -> Result<()> {
        self.forward(-distance)
    }

    /// Turn right (clockwise in the ground plane) by `angle` degrees.
    pub fn right(&mut self, angle: f64) -> Result<()> {
        self.state = self
            .state
            .with_heading(orient::rotate_about(self.state.heading, orient::UP, angle));
        self.update()
    }

    /// Turn left (counter-clockwise in the ground plane) by `angle` degrees.
    pub fn left(&mut self, angle: f64) -> Result<()> {
        self.right(-angle)
    }

    /// Tilt the nose up by `angle` degrees (clamped at straight up).
    pub fn up(&mut self, angle: f64) -> Result<()> {
        self.state = self.state.with_elevation(self.state.elevation + angle);
        self.update()
    }

    /// Tilt the nose down by `angle` degrees (clamped at straight down).
    pub fn down(&mut self, angle: f64) -> Result<()> {
        self.up(-angle)
    }

    /// Move to an absolute position, drawing a line there if the pen is
    /// down. Does not change the orientation.
    pub fn goto(&mut self, to: Point) -> Result<()> {
        self.state = self.state.with_position(to);
        self.update()
    }

    /// Change only the X coordinate.
    pub fn set_x(&mut self, x: i64) -> Result<()> {
        self.goto(Point { x, ..self.state.position })
    }

    /// Change only the Y coordinate.
    pub fn set_y(&mut self, y: i64) -> Result<()> {
        self.goto(Point { y, ..self.state.position })
    }

    /// Change only the Z coordinate.
    pub fn set_z(&mut self, z: i64) -> Result<()> {
        self.goto(Point { z, ..self.state.position })
    }

    /// Face the heading `angle` in degrees: 0 = +Z, 90 = +X, 180 = −Z,
    /// 270 = −X. Reading [`Turtle::heading`] afterward returns `angle`
    /// (mod 360).
    pub fn set_heading(&mut self, angle: f64) -> Result<()> {
        self.state = self.state.with_heading(orient::heading_vector(angle));
        self.update()
    }

    /// Set the nose tilt in degrees: 0 is level, 90 straight up, −90
    /// straight down. Out-of-range values are clamped.
    pub fn set_elevation(&mut self, angle: f64) -> Result<()> {
        self.state = self.state.with_elevation(angle);
        self.update()
    }

    // ── pen and visibility ──────────────────────────────────────────────

    /// Lower the pen; movement draws blocks.
    pub fn pen_down(&mut self) -> Result<()> {
        self.state = self.state.with_pen_down(true);
        self.update()
    }

    /// Raise the pen; movement stops drawing.
    pub fn pen_up(&mut self) -> Result<()> {
        self.state = self.state.with_pen_down(false);
        self.update()
    }

    /// Show the marker.
    pub fn show(&mut self) -> Result<()> {
        self.state = self.state.with_visible(true);
        self.update()
    }

    /// Hide the marker.
    pub fn hide(&mut self) -> Result<()> {
        self.state = self.state.with_visible(false);
        self.update()
    }

    /// Change the block drawn along pen-down paths.
    pub fn set_pen_block(&mut self, block: Block) -> Result<()> {
        self.state = self.state.with_pen_block(block);
        self.update()
    }

    /// Change the block used to fill shapes.
    pub fn set_fill_block(&mut self, block: Block) -> Result<()> {
        self.state = self.state.with_fill_block(block);
        self.update()
    }

    /// Change pen and fill block together.
    pub fn set_block(&mut self, block: Block) -> Result<()> {
        self.state = self.state.with_pen_block(block).with_fill_block(block);
        self.update()
    }

    // ── read-only projections ───────────────────────────────────────────

    /// Where the agent stands.
    pub fn position(&self) -> Point {
        self.state.position
    }

    /// The agent's X coordinate.
    pub fn xcor(&self) -> i64 {
        self.state.position.x
    }

    /// The agent's Y coordinate.
    pub fn ycor(&self) -> i64 {
        self.state.position.y
    }

    /// The agent's Z coordinate.
    pub fn zcor(&self) -> i64 {
        self.state.position.z
    }

    /// The heading angle in degrees, in [0, 360).
    pub fn heading(&self) -> f64 {
        orient::heading_angle(self.state.heading)
    }

    /// The nose tilt in degrees, in [−90, 90].
    pub fn elevation(&self) -> f64 {
        self.state.elevation
    }

    /// Whether the pen is down.
    pub fn is_pen_down(&self) -> bool {
        self.state.pen_down
    }

    /// Whether the marker is drawn.
    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// The current pen block.
    pub fn pen_block(&self) -> Block {
        self.state.pen_block
    }

    /// The current fill block.
    pub fn fill_block(&self) -> Block {
        self.state.fill_block
    }

    /// The heading angle that would face the agent toward `target` within
    /// the ground plane.
    pub fn towards(&self, target: Point) -> f64 {
        orient::bearing(self.state.position, target)
    }

    /// Distance to `target` in blocks.
    pub fn distance(&self, target: Point) -> f64 {
        self.state.position.distance_to(target)
    }

    /// How many steps [`Turtle::undo`] can roll back: one per operation
    /// performed, regardless of how often the marker was redrawn.
    pub fn undo_depth(&self) -> usize {
        self.history
            .iter()
            .filter(|s| matches!(s.action, Action::Move | Action::Line))
            .count()
    }
}
