//! Asynchronous content loading pipeline.
//!
//! Orchestrates one tile load across three execution contexts:
//!
//! ```text
//! main thread          I/O context                 worker pool
//! ───────────          ───────────                 ───────────
//! load_content ──────► response callback ────────► decode task
//!                      (status checks)             (decode, texture
//!                                                   coords, load prep)
//! update ◄──────────────────────────────────────── ContentLoaded
//! ```
//!
//! The tile's atomic state cell is the only synchronization primitive:
//! every stage begins by observing it, and the worker publishes its output
//! with the release store that moves the tile to `ContentLoaded`.
//! Cancellation is cooperative; a tile destroyed mid-load is observed as
//! `Destroying` at the next checkpoint and the load terminates as `Failed`
//! without allocating renderer resources.

mod context;
mod error;
mod load;

pub use error::LoadFailure;

pub(crate) use context::{LoadContext, TileShared};
pub(crate) use load::content_response_received;
