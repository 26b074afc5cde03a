//! Write-through batching cache over the remote block grid.
//!
//! [`BlockCache`] presents cell reads and writes as in-memory map
//! operations while keeping remote round trips to a minimum:
//!
//! - Reads fill a shared cache; a coordinate is fetched from the remote at
//!   most once until somebody writes it.
//! - Writes issued while a [`Batch`] scope is open collect in a
//!   thread-local overlay and flush as one remote transaction when the
//!   outermost scope commits.
//! - Non-batched writes are diffed against the shared cache first — values
//!   the remote already holds are never re-sent.
//!
//! The shared cache map and its lock are the only cross-thread state. A
//! batch overlay belongs to exactly one thread: it is keyed by thread id
//! and no other thread ever touches it, which is what makes overlay reads
//! and writes lock-free.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use terrapin_types::{Block, Point};

use crate::error::{RemoteError, Result};
use crate::remote::Remote;

/// One thread's open batch scope: uncommitted writes plus the nesting
/// depth that decides when they flush.
#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    failed: bool,
    writes: IndexMap<Point, Block>,
}

/// Shared, batching cache of remote cell state.
///
/// One instance per connection. Clone-free sharing via `Arc` — the cache
/// is `Sync` and all methods take `&self`.
pub struct BlockCache {
    remote: Arc<dyn Remote>,
    cache: Mutex<HashMap<Point, Block>>,
    batches: DashMap<ThreadId, BatchState>,
}

impl BlockCache {
    /// Create an empty cache in front of `remote`.
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self {
            remote,
            cache: Mutex::new(HashMap::new()),
            batches: DashMap::new(),
        }
    }

    /// Open a batch scope on the calling thread.
    ///
    /// Scopes nest: writes issued while any scope is open collect in the
    /// thread's overlay, and the overlay flushes as one remote transaction
    /// when the outermost scope commits. Dropping a guard without
    /// committing marks the whole overlay failed — it is discarded, not
    /// flushed, when the outermost scope ends.
    pub fn batch(&self) -> Batch<'_> {
        let mut state = self.batches.entry(thread::current().id()).or_default();
        state.depth += 1;
        drop(state);
        tracing::trace!("batch scope entered");
        Batch {
            cache: self,
            committed: false,
            _confined: PhantomData,
        }
    }

    /// Read the blocks at `points`.
    ///
    /// Coordinates known to neither the shared cache nor the calling
    /// thread's overlay are fetched from the remote in one bulk call and
    /// remembered. For every requested coordinate the overlay's value wins
    /// over the shared cache's.
    pub fn get(&self, points: &[Point]) -> Result<IndexMap<Point, Block>> {
        let overlay = self
            .batches
            .get(&thread::current().id())
            .map(|state| state.writes.clone())
            .unwrap_or_default();

        let mut cache = self.cache.lock();
        let unknown: Vec<Point> = points
            .iter()
            .copied()
            .filter(|p| !cache.contains_key(p) && !overlay.contains_key(p))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !unknown.is_empty() {
            tracing::debug!(count = unknown.len(), "fetching blocks unknown to cache");
            let fetched = self.remote.fetch(&unknown)?;
            if fetched.len() != unknown.len() {
                return Err(RemoteError::Protocol(format!(
                    "fetch returned {} blocks for {} coordinates",
                    fetched.len(),
                    unknown.len()
                )));
            }
            cache.extend(unknown.into_iter().zip(fetched));
        }

        Ok(points
            .iter()
            .map(|p| match overlay.get(p) {
                Some(b) => (*p, *b),
                None => (*p, cache[p]),
            })
            .collect())
    }

    /// Write all of `changes`.
    ///
    /// With a batch scope open on the calling thread this only updates the
    /// thread's overlay (last write wins per coordinate) — no lock, no
    /// remote call. Otherwise the changes are diffed against the shared
    /// cache and only the difference is sent, bracketed as one remote
    /// batch; the shared cache is updated only after the send succeeds.
    /// An empty diff performs no remote call at all.
    pub fn set(&self, changes: &IndexMap<Point, Block>) -> Result<()> {
        if let Some(mut state) = self.batches.get_mut(&thread::current().id()) {
            for (p, b) in changes {
                state.writes.insert(*p, *b);
            }
            return Ok(());
        }

        let mut cache = self.cache.lock();
        let diff: Vec<(Point, Block)> = changes
            .iter()
            .filter(|(p, b)| cache.get(p) != Some(b))
            .map(|(p, b)| (*p, *b))
            .collect();
        if diff.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = diff.len(), "flushing block diff to remote");
        self.remote.batch_start();
        let sent = self.remote.store(&diff);
        self.remote.batch_end();
        sent?;
        cache.extend(diff);
        Ok(())
    }

    /// Close one batch scope level for the calling thread.
    ///
    /// At depth zero the overlay is removed and either flushed through
    /// [`Self::set`] (no scope level failed) or discarded (`failed`, or a
    /// guard was dropped without committing).
    fn exit(&self, failed: bool) -> Result<()> {
        let tid = thread::current().id();
        {
            let Some(mut state) = self.batches.get_mut(&tid) else {
                debug_assert!(false, "batch exit without matching enter");
                return Ok(());
            };
            debug_assert!(state.depth > 0, "batch depth underflow");
            state.depth = state.depth.saturating_sub(1);
            state.failed |= failed;
            if state.depth > 0 {
                return Ok(());
            }
        }

        let Some((_, state)) = self.batches.remove(&tid) else {
            return Ok(());
        };
        if state.failed {
            tracing::debug!(
                discarded = state.writes.len(),
                "batch scope failed, discarding overlay"
            );
            return Ok(());
        }
        self.set(&state.writes)
    }
}

/// An open batch scope on the calling thread.
///
/// Obtained from [`BlockCache::batch`]. Call [`Batch::commit`] to close
/// the scope successfully; dropping the guard instead (the error path)
/// closes it as failed. Either way the scope closes exactly once, and the
/// guard is pinned to the thread that opened it.
#[must_use = "a batch scope flushes only when committed"]
pub struct Batch<'a> {
    cache: &'a BlockCache,
    committed: bool,
    // overlay state is keyed by thread id; keep the guard !Send
    _confined: PhantomData<*const ()>,
}

impl Batch<'_> {
    /// Close the scope successfully. On the outermost scope this flushes
    /// the thread's overlay as one remote transaction, unless some inner
    /// scope already failed.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        self.cache.exit(false)
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // discard-only exit: never reaches the remote, cannot fail
            let _ = self.cache.exit(true);
        }
    }
}
