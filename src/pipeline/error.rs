//! Load failure taxonomy.

use thiserror::Error;

/// Why a tile load terminated without content.
///
/// Failures end the load locally: the tile moves to the `Failed` state and
/// the host hears `notify_tile_done_loading`, nothing more. Retry policy
/// belongs to the tileset, which may unload the tile and try again.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    /// The request completed without a response object.
    #[error("request completed without a response")]
    NetworkAbsent,

    /// The response status code was outside the 200 range.
    #[error("request failed with status {0}")]
    NetworkStatus(u16),

    /// The content factory produced nothing. Not fatal by itself; the
    /// tile finishes loading blank and its geometric error is raised so
    /// traversal refines past it.
    #[error("content factory produced no content")]
    DecodeEmpty,

    /// The tile was destroyed while the load was in flight.
    #[error("load cancelled by tile destruction")]
    CancelledByDestroy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            LoadFailure::NetworkAbsent.to_string(),
            "request completed without a response"
        );
        assert_eq!(
            LoadFailure::NetworkStatus(404).to_string(),
            "request failed with status 404"
        );
        assert_eq!(
            LoadFailure::CancelledByDestroy.to_string(),
            "load cancelled by tile destruction"
        );
    }
}
