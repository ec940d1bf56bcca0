//! Table configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::query::DEFAULT_PAGE_SIZES;
use crate::query::PageSize;

/// Tunables shared by every table view.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tableview_lib::config::TableConfig;
///
/// let config = TableConfig::default()
///     .with_search_debounce(Duration::from_millis(300))
///     .with_page_sizes(vec![20, 50])
///     .with_default_page_size(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Quiet period before a typed search is applied, in milliseconds.
    ///
    /// Default: 500
    pub search_debounce_ms: u64,

    /// Page sizes offered to the user.
    ///
    /// Default: 10, 25, 50, 100
    pub page_sizes: Vec<usize>,

    /// Page size used when a view is created.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Suffix appended to exported sheet names.
    ///
    /// Default: "Results"
    pub sheet_suffix: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            default_page_size: 10,
            sheet_suffix: "Results".to_string(),
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search debounce.
    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the offered page sizes.
    pub fn with_page_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.page_sizes = sizes;
        self
    }

    /// Sets the initial page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the export sheet suffix.
    pub fn with_sheet_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.sheet_suffix = suffix.into();
        self
    }

    /// Returns the search debounce as a duration.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Returns the initial page size, falling back to the default when the
    /// configured one is zero.
    pub fn initial_page_size(&self) -> PageSize {
        PageSize::new(self.default_page_size).unwrap_or_default()
    }

    /// Checks that the page size options are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_sizes.is_empty() {
            return Err(ConfigError::NoPageSizes);
        }
        if self.page_sizes.contains(&0) {
            return Err(ConfigError::ZeroPageSize);
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(ConfigError::DefaultPageSizeNotListed(self.default_page_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.page_sizes, vec![10, 25, 50, 100]);
        assert_eq!(config.initial_page_size().get(), 10);
        assert_eq!(config.sheet_suffix, "Results");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"default_page_size": 25}"#).unwrap();
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.search_debounce_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let empty = TableConfig::default().with_page_sizes(vec![]);
        assert_eq!(empty.validate(), Err(ConfigError::NoPageSizes));

        let zero = TableConfig::default().with_page_sizes(vec![0, 10]);
        assert_eq!(zero.validate(), Err(ConfigError::ZeroPageSize));

        let unlisted = TableConfig::default().with_default_page_size(15);
        assert_eq!(unlisted.validate(), Err(ConfigError::DefaultPageSizeNotListed(15)));
    }
}
