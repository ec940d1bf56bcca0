//! JSON view definitions.
//!
//! A view definition describes the columns of a record table and the state
//! the viewer starts in:
//!
//! ```json
//! {
//!   "columns": [
//!     { "key": "name", "label": "Name" },
//!     { "key": "followers", "label": "Followers", "paths": ["metrics.followers"], "kind": "compact_number" }
//!   ],
//!   "filters": [{ "field": "status", "type": "select", "options": [{ "value": "active", "label": "Active" }] }],
//!   "approved_columns": ["name", "followers"],
//!   "config": { "default_page_size": 25 },
//!   "capabilities": { "can_export": true }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tableview_lib::TableView;
use tableview_lib::capabilities::ViewerCapabilities;
use tableview_lib::column::ApprovedColumnSet;
use tableview_lib::column::ColumnDescriptor;
use tableview_lib::column::ColumnKind;
use tableview_lib::column::ColumnSet;
use tableview_lib::config::TableConfig;
use tableview_lib::error::ColumnError;
use tableview_lib::model::Record;
use tableview_lib::query::FilterSpec;

use crate::error::CliError;

fn default_true() -> bool {
    true
}

/// One column of a record table.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDefinition {
    /// Unique key.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Dotted paths tried in order; defaults to the key.
    #[serde(default)]
    pub paths: Vec<String>,
    /// How values are formatted and sorted.
    #[serde(default)]
    pub kind: ColumnKind,
    /// Shown before the viewer changes anything.
    #[serde(default = "default_true")]
    pub default_visible: bool,
    /// Header can be clicked to sort.
    #[serde(default = "default_true")]
    pub sortable: bool,
}

impl ColumnDefinition {
    fn descriptor(&self) -> ColumnDescriptor<Record> {
        let paths = if self.paths.is_empty() {
            vec![self.key.clone()]
        } else {
            self.paths.clone()
        };
        let column = ColumnDescriptor::from_paths(self.key.as_str(), self.label.as_str(), paths)
            .with_kind(self.kind)
            .with_default_visible(self.default_visible);
        if self.sortable {
            column
        } else {
            column.unsortable()
        }
    }
}

/// A complete view definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewDefinition {
    /// Column superset, in display order.
    pub columns: Vec<ColumnDefinition>,
    /// Filters offered by the filter panel.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Allow-list; absent means every column may be shown.
    #[serde(default)]
    pub approved_columns: Option<Vec<String>>,
    /// Saved visible-column preference, applied within the allow-list.
    #[serde(default)]
    pub column_preference: Option<Vec<String>>,
    /// Columns the search box looks at; absent means all text columns.
    #[serde(default)]
    pub search_columns: Option<Vec<String>>,
    /// Table configuration.
    #[serde(default)]
    pub config: TableConfig,
    /// Viewer permissions.
    #[serde(default)]
    pub capabilities: ViewerCapabilities,
}

impl ViewDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads a definition from a file.
    pub async fn load(path: &Path) -> Result<Self, CliError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CliError::read(path, e))?;
        Self::from_json(&text).map_err(|e| CliError::json(path, e))
    }

    /// Builds the column superset.
    pub fn column_set(&self) -> Result<ColumnSet<Record>, ColumnError> {
        ColumnSet::new(self.columns.iter().map(ColumnDefinition::descriptor).collect())
    }

    /// Builds a view over `rows`.
    pub fn build_view(&self, rows: Vec<Record>) -> Result<TableView<Record>, CliError> {
        self.config.validate()?;

        let mut view = TableView::new(self.column_set()?, rows)
            .with_config(self.config.clone())
            .with_filters(self.filters.clone())
            .with_capabilities(self.capabilities);

        if let Some(keys) = &self.search_columns {
            view = view.with_search_columns(keys.iter().cloned());
        }

        if let Some(approved) = &self.approved_columns {
            let allow = ApprovedColumnSet::new(approved.iter().cloned());
            view = match &self.column_preference {
                Some(preference) => {
                    let preference: Vec<&str> = preference.iter().map(String::as_str).collect();
                    view.with_allow_list_and_preference(allow, &preference)
                }
                None => view.with_allow_list(allow),
            };
        }

        Ok(view)
    }
}

/// Reads a JSON array of row objects.
pub async fn load_rows(path: &Path) -> Result<Vec<Record>, CliError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::read(path, e))?;
    serde_json::from_str(&text).map_err(|e| CliError::json(path, e))
}
