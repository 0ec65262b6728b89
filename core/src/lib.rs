//! Streaming reconciliation and visibility core for the live orbital-object feed.
//!
//! Raw transport chunks are decoded into lines, classified into status or frame
//! messages, reconciled into an identity-keyed object cache, and filtered down to a
//! capacity-bounded visible subset. A single-writer session controller owns the cache
//! for the lifetime of one live session.

pub mod catalog;
pub mod geometry;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod telemetry;

pub use prelude::{ObjectId, SessionTag};
