use thiserror::Error;
use crate::utils::types::PointId;

/// Central error enum for the vector index.
///
/// Only the checked constructors and operations return it. Looking up or deleting
/// a missing id is not an error, and mismatched vector lengths reaching a metric
/// directly are a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DBError {
    #[error("Vector length mismatch: expected {expected}, got {actual}")]
    VectorLengthMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("Entries not sorted by id: {id:?} at position {position} is not greater than its predecessor")]
    UnsortedEntries {
        position: usize,
        id: PointId,
    },

    #[error("Duplicate entry id: {0:?}")]
    DuplicateId(PointId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DBError>;
