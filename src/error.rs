//! Error taxonomy for the checked insertion entry points.
//!
//! The unchecked hot paths (`insert_min`, `insert_max`) trust the caller and only
//! `debug_assert!` their ordering precondition. Callers who want the precondition
//! checked at runtime use the `try_insert_min`/`try_insert_max` variants, which
//! return this error type instead of silently corrupting the tree's symmetric order.

use thiserror::Error;

/// Errors produced by the checked tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// `try_insert_min` was called with an element greater than the current minimum.
    #[error("element is not less than or equal to every element already in the tree")]
    NotMinimal,
    /// `try_insert_max` was called with an element less than the current maximum.
    #[error("element is not greater than or equal to every element already in the tree")]
    NotMaximal,
}

/// Convenience alias for the checked tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
