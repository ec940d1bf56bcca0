//! Configuration errors

/// Errors found while validating a [`TableConfig`](crate::config::TableConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No page sizes were configured.
    #[error("at least one page size must be configured")]
    NoPageSizes,

    /// A configured page size is zero.
    #[error("page size options must be greater than zero")]
    ZeroPageSize,

    /// The default page size is not one of the offered options.
    #[error("default page size {0} is not one of the configured page sizes")]
    DefaultPageSizeNotListed(usize),
}
