//! Error types for the B-tree crate.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All hard failures the crate can report.
///
/// Absent keys are not errors: lookups and removals signal them through
/// `bool`/`Option` return values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested minimum degree is below 2 or so large that node
    /// capacity `2t - 1` would overflow.
    ///
    /// Raised at construction time; the tree is never created.
    #[error("Invalid minimum degree {0}: must be between 2 and usize::MAX / 2")]
    InvalidMinDegree(usize),

    /// A `copy_to` destination cannot hold every key from the start index.
    #[error("Destination too small: need {needed} slots, {available} available")]
    InsufficientCapacity { needed: usize, available: usize },

    /// The diagnostic pass found a broken structural invariant.
    ///
    /// This indicates a bug in the tree algorithms, never bad input.
    #[error("B-tree invariant violated: {0}")]
    InvariantViolation(String),
}
