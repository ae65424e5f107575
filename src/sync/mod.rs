//! Sync core: fingerprinting, cache, chunking, planning, and the push and
//! pull engines.
//!
//! Data flow for a push: `scan` finds files, [`hash`] fingerprints them,
//! [`planner`] compares against the [`cache`], [`compose`] turns content
//! into blocks via [`chunk`], and [`push`] drives the remote store. Pull is
//! the reverse path through [`compose`] and [`pull`]. [`dedupe`] sweeps the
//! remote side for stray duplicate documents.

pub mod cache;
pub mod chunk;
pub mod compose;
pub mod dedupe;
pub mod hash;
pub mod planner;
pub mod pull;
pub mod push;

pub use cache::{SyncCache, SyncRecord};
pub use dedupe::{SweepEngine, SweepReport};
pub use planner::{ProjectStats, SyncAction};
pub use pull::{PullEngine, PullReport};
pub use push::{PushEngine, PushReport};
