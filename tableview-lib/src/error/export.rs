//! Export errors

/// Errors that can occur while flattening or writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A requested column key does not exist in the column set.
    #[error("unknown export column: {0}")]
    UnknownColumn(String),

    /// A requested column exists but is outside the viewer's allow-list.
    #[error("column '{0}' is not approved for this viewer")]
    ColumnNotApproved(String),

    /// No columns were requested.
    #[error("export requires at least one column")]
    NoColumns,

    /// The viewer is not allowed to export.
    #[error("export is not permitted for this viewer")]
    NotPermitted,

    /// Failed to write the output.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the workbook.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
