//! Remote world boundary and write-through batching block cache.
//!
//! Every read or write of a single cell on the remote world costs a network
//! round trip, so this crate exists to avoid them: [`BlockCache`] serves
//! repeat reads from a shared in-process cache and collapses writes issued
//! inside a [`Batch`] scope into one remote transaction. [`Surface`] pairs
//! the cache with the chat side channel, and [`Player`] proxies the
//! controlling player entity.
//!
//! # Consistency model
//!
//! - Within one thread, reads inside an open batch scope see that thread's
//!   own uncommitted writes immediately (the overlay wins over the shared
//!   cache).
//! - Across threads, the shared cache is eventually consistent with the
//!   remote store: a write becomes visible to other threads once the
//!   writer's outermost scope commits and the flush merges into the shared
//!   map.
//! - A failed flush leaves the shared cache exactly as it was; the error
//!   surfaces to whichever caller closed the scope.

pub mod cache;
pub mod error;
pub mod player;
pub mod remote;
pub mod surface;

pub use cache::{Batch, BlockCache};
pub use error::{RemoteError, Result};
pub use player::Player;
pub use remote::{MemoryWorld, Remote, RoundTrips};
pub use surface::Surface;
