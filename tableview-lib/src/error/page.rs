//! Pagination errors

/// Errors produced by pagination input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Page size was zero or negative.
    #[error("invalid page size {0}: must be greater than zero")]
    InvalidPageSize(i64),
}
