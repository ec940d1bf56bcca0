//! Optimistic update errors

use crate::capabilities::EditableField;

/// Error returned by a [`Persist`](crate::optimistic::Persist) implementation.
///
/// The pipeline does not know about the network; it only needs to know
/// that the remote write did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    /// The backend refused the change.
    #[error("rejected ({status}): {message}")]
    Rejected {
        /// Status code reported by the backend.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The backend could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl PersistError {
    /// Creates a new rejection error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Errors raised by an [`OptimisticCell`](crate::optimistic::OptimisticCell).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimisticError {
    /// A change is already in flight for this cell.
    #[error("an update is already pending")]
    AlreadyPending,

    /// The viewer may not edit this field; nothing was changed.
    #[error("editing {0} is not permitted for this viewer")]
    NotPermitted(EditableField),

    /// There is no pending change to settle.
    #[error("no update is pending")]
    NotPending,

    /// The remote write failed and the cell was rolled back.
    #[error("update rolled back: {0}")]
    Persist(#[from] PersistError),
}
