//! Error types for tile tree construction and mutation.

use thiserror::Error;

/// Programmer errors in tile tree construction.
///
/// These indicate misuse of the API rather than runtime failures; runtime
/// load failures are reported through the tile's `Failed` state instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TileError {
    /// Children may be populated at most once, at construction or from
    /// decoded content.
    #[error("children already created")]
    ChildrenAlreadyCreated,

    /// Tile fields may not change while an asynchronous load is in flight.
    #[error("tile cannot be modified while content is loading")]
    ModifiedWhileLoading,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            TileError::ChildrenAlreadyCreated.to_string(),
            "children already created"
        );
        assert_eq!(
            TileError::ModifiedWhileLoading.to_string(),
            "tile cannot be modified while content is loading"
        );
    }

    #[test]
    fn test_error_trait() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<TileError>();
    }
}
