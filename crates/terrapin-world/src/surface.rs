//! Drawing surface — the cache paired with the chat side channel.

use std::sync::Arc;

use indexmap::IndexMap;
use terrapin_types::{Block, Point};

use crate::cache::{Batch, BlockCache};
use crate::error::Result;
use crate::remote::Remote;

/// One connection's drawing surface.
///
/// Owns the [`BlockCache`] for the connection and forwards chat to the
/// remote console. Everything an agent draws goes through [`Surface::draw`],
/// so it batches with whatever scope is open on the calling thread.
pub struct Surface {
    remote: Arc<dyn Remote>,
    blocks: BlockCache,
}

impl Surface {
    /// Create a surface (and its cache) in front of `remote`.
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self {
            blocks: BlockCache::new(remote.clone()),
            remote,
        }
    }

    /// The block cache behind this surface.
    pub fn blocks(&self) -> &BlockCache {
        &self.blocks
    }

    /// Open a batch scope on the calling thread.
    pub fn batch(&self) -> Batch<'_> {
        self.blocks.batch()
    }

    /// Write a set of cells in one cache call.
    pub fn draw(&self, changes: &IndexMap<Point, Block>) -> Result<()> {
        self.blocks.set(changes)
    }

    /// Post `message` to the world's chat console, one line at a time.
    pub fn say(&self, message: &str) -> Result<()> {
        for line in message.lines() {
            self.remote.post_chat(line)?;
        }
        Ok(())
    }
}
