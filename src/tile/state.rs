//! Atomic tile lifecycle state.
//!
//! The load state is the only synchronization primitive shared between the
//! main thread, the network callback, and the decode worker. A release
//! store on the cell publishes everything the storing context wrote; the
//! matching acquire load on the reading context makes it visible. No other
//! tile field is atomic.

use std::sync::atomic::{AtomicI8, Ordering};

/// Lifecycle state of a tile's content.
///
/// The discriminants are ordered so that `state >= ContentLoaded` means
/// "the asynchronous part of loading has finished".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum LoadState {
    /// The tile is being destroyed while a load was in flight. Terminal for
    /// the pipeline: the next context to observe it moves to `Failed`.
    Destroying = -2,
    /// The load ended in a network, decode, or cancellation failure.
    Failed = -1,
    /// No content is loaded or loading.
    Unloaded = 0,
    /// An asynchronous fetch/decode is in flight.
    ContentLoading = 1,
    /// The worker finished; main-thread preparation has not yet run.
    ContentLoaded = 2,
    /// Main-thread preparation finished; the tile is fully loaded.
    Done = 3,
}

impl LoadState {
    #[inline]
    fn from_raw(raw: i8) -> Self {
        match raw {
            -2 => LoadState::Destroying,
            -1 => LoadState::Failed,
            0 => LoadState::Unloaded,
            1 => LoadState::ContentLoading,
            2 => LoadState::ContentLoaded,
            3 => LoadState::Done,
            // The cell is only ever written from this enum.
            _ => unreachable!("invalid tile load state {raw}"),
        }
    }
}

/// The atomic cell holding a tile's [`LoadState`].
///
/// Loads are acquire, stores are release, and the compare-exchange is
/// strong. Between transitions, at most one execution context is permitted
/// to mutate the owning tile; the cell's ordering carries those writes to
/// the next context.
#[derive(Debug)]
pub struct TileStateCell(AtomicI8);

impl TileStateCell {
    pub fn new(state: LoadState) -> Self {
        Self(AtomicI8::new(state as i8))
    }

    /// Reads the current state with acquire ordering.
    #[inline]
    pub fn load(&self) -> LoadState {
        LoadState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Writes a new state with release ordering, publishing every write the
    /// calling context made before it.
    #[inline]
    pub fn store(&self, state: LoadState) {
        self.0.store(state as i8, Ordering::Release);
    }

    /// Atomically replaces `current` with `new`.
    ///
    /// Returns `Ok(current)` if the exchange happened, `Err(actual)` with
    /// the observed state otherwise.
    pub fn compare_exchange(
        &self,
        current: LoadState,
        new: LoadState,
    ) -> Result<LoadState, LoadState> {
        self.0
            .compare_exchange(
                current as i8,
                new as i8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(LoadState::from_raw)
            .map_err(LoadState::from_raw)
    }
}

impl Default for TileStateCell {
    fn default() -> Self {
        Self::new(LoadState::Unloaded)
    }
}
