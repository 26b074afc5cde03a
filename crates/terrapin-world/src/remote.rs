//! The remote world boundary.
//!
//! [`Remote`] is everything the rest of the workspace knows about the
//! server: bulk block reads and writes (one round trip each), a batch
//! grouping hint for the transport, player position/teleport, and chat.
//! The wire encoding behind it is a transport concern and lives outside
//! this workspace.
//!
//! [`MemoryWorld`] is the in-process implementation — used for offline
//! work and testing, with round-trip counters so callers can see exactly
//! what the cache saved them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use terrapin_types::{Block, Point};

use crate::error::Result;

/// Bulk access to a remote world.
///
/// `fetch` and `store` each cost one request/response round trip.
/// Consecutive `store` calls issued between `batch_start` and `batch_end`
/// may be coalesced by the transport into fewer round trips; the bracket
/// is a hint, not a transaction.
pub trait Remote: Send + Sync {
    /// Read the blocks at `points`, one round trip. The result is aligned
    /// with the input order.
    fn fetch(&self, points: &[Point]) -> Result<Vec<Block>>;

    /// Write all of `changes`, one round trip.
    fn store(&self, changes: &[(Point, Block)]) -> Result<()>;

    /// Open a transport-side write grouping.
    fn batch_start(&self);

    /// Close the transport-side write grouping.
    fn batch_end(&self);

    /// The controlling player's tile position.
    fn player_position(&self) -> Result<Point>;

    /// Move the controlling player to `to`.
    fn teleport_player(&self, to: Point) -> Result<()>;

    /// Post one line to the world's chat console.
    fn post_chat(&self, line: &str) -> Result<()>;
}

/// Round-trip counters for a [`MemoryWorld`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTrips {
    /// Number of `fetch` calls served.
    pub fetches: usize,
    /// Number of `store` calls served.
    pub stores: usize,
    /// Total blocks written across all `store` calls.
    pub blocks_stored: usize,
}

/// In-process world implementation.
///
/// A flat world of [`Block::AIR`] with nothing in it until written.
/// Thread-safe via internal locks; all state is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    blocks: Mutex<HashMap<Point, Block>>,
    player: Mutex<Point>,
    chat: Mutex<Vec<String>>,
    fetches: AtomicUsize,
    stores: AtomicUsize,
    blocks_stored: AtomicUsize,
}

impl MemoryWorld {
    /// Create an empty world with the player at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// The block at `p` (AIR when never written).
    pub fn block(&self, p: Point) -> Block {
        self.blocks.lock().get(&p).copied().unwrap_or_default()
    }

    /// Seed a block directly, bypassing round-trip accounting.
    pub fn put_block(&self, p: Point, b: Block) {
        self.blocks.lock().insert(p, b);
    }

    /// Every non-AIR cell in the world.
    pub fn snapshot(&self) -> HashMap<Point, Block> {
        self.blocks
            .lock()
            .iter()
            .filter(|(_, b)| !b.is_air())
            .map(|(p, b)| (*p, *b))
            .collect()
    }

    /// All chat lines posted so far, in order.
    pub fn chat_log(&self) -> Vec<String> {
        self.chat.lock().clone()
    }

    /// Round-trip counters accumulated since construction.
    pub fn round_trips(&self) -> RoundTrips {
        RoundTrips {
            fetches: self.fetches.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            blocks_stored: self.blocks_stored.load(Ordering::Relaxed),
        }
    }
}

impl Remote for MemoryWorld {
    fn fetch(&self, points: &[Point]) -> Result<Vec<Block>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let blocks = self.blocks.lock();
        Ok(points
            .iter()
            .map(|p| blocks.get(p).copied().unwrap_or_default())
            .collect())
    }

    fn store(&self, changes: &[(Point, Block)]) -> Result<()> {
        self.stores.fetch_add(1, Ordering::Relaxed);
        self.blocks_stored.fetch_add(changes.len(), Ordering::Relaxed);
        let mut blocks = self.blocks.lock();
        for (p, b) in changes {
            blocks.insert(*p, *b);
        }
        Ok(())
    }

    fn batch_start(&self) {}

    fn batch_end(&self) {}

    fn player_position(&self) -> Result<Point> {
        Ok(*self.player.lock())
    }

    fn teleport_player(&self, to: Point) -> Result<()> {
        *self.player.lock() = to;
        Ok(())
    }

    fn post_chat(&self, line: &str) -> Result<()> {
        self.chat.lock().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_world_is_air() {
        let world = MemoryWorld::new();
        assert_eq!(world.block(Point::new(3, -8, 12)), Block::AIR);
        assert!(world.snapshot().is_empty());
    }

    #[test]
    fn test_fetch_alignment() {
        let world = MemoryWorld::new();
        world.put_block(Point::X, Block::STONE);
        let fetched = world
            .fetch(&[Point::ZERO, Point::X, Point::Y])
            .expect("fetch");
        assert_eq!(fetched, vec![Block::AIR, Block::STONE, Block::AIR]);
    }

    #[test]
    fn test_round_trip_accounting() {
        let world = MemoryWorld::new();
        world.fetch(&[Point::ZERO]).expect("fetch");
        world
            .store(&[(Point::ZERO, Block::STONE), (Point::X, Block::STONE)])
            .expect("store");
        assert_eq!(
            world.round_trips(),
            RoundTrips {
                fetches: 1,
                stores: 1,
                blocks_stored: 2,
            }
        );
    }

    #[test]
    fn test_player_and_chat() {
        let world = MemoryWorld::new();
        assert_eq!(world.player_position().expect("pos"), Point::ZERO);
        world.teleport_player(Point::new(4, 64, -2)).expect("tp");
        assert_eq!(world.player_position().expect("pos"), Point::new(4, 64, -2));

        world.post_chat("hello").expect("chat");
        assert_eq!(world.chat_log(), vec!["hello".to_string()]);
    }
}
