//! Column definition errors

/// Errors raised while assembling a column set.
///
/// Toggling or sorting by an unknown column is not an error; those are
/// logged and ignored. Only construction-time mistakes end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// Two columns share the same key.
    #[error("duplicate column key: {0}")]
    DuplicateKey(String),

    /// A column was declared with an empty key.
    #[error("column key must not be empty (label: {label})")]
    EmptyKey {
        /// Label of the offending column.
        label: String,
    },
}
