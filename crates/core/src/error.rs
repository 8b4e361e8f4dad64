use crate::domain::EntityKind;
use crate::store::StoreError;

/// Error taxonomy surfaced by every workflow operation.
///
/// All four kinds propagate to the caller unmodified; there is no local
/// recovery or retry. The API layer owns the translation into status codes.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Malformed or missing required input (for example an empty admission
    /// reason).
    #[error("invalid input: {0}")]
    Validation(String),
    /// A referenced entity id does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    /// The requested transition violates a state-machine invariant (bed
    /// already occupied, admission already discharged, duplicate registry
    /// key).
    #[error("conflict: {0}")]
    Conflict(String),
    /// The underlying store was unavailable or a write failed. Any writes
    /// already made inside the same transaction have been rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
