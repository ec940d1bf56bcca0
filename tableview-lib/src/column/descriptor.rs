//! Column descriptors and the column superset.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ColumnError;
use crate::export::FallbackChain;
use crate::export::NA;
use crate::export::format_compact;
use crate::export::format_plain;
use crate::export::format_rate;
use crate::export::normalize_rate;
use crate::model::Record;
use crate::model::Value;

/// Extracts a cell value from a row.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Custom cell renderer: receives the accessor's value and the row.
pub type Renderer<T> = Arc<dyn Fn(&Value, &T) -> String + Send + Sync>;

/// How a column's values are interpreted for display and sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text.
    #[default]
    Text,
    /// Plain number.
    Number,
    /// Number shown with a magnitude suffix (`12.3K`).
    CompactNumber,
    /// Rate that may arrive as a fraction or a percentage.
    Rate,
    /// Calendar date.
    Date,
}

impl ColumnKind {
    /// Formats a value for display. Empty values render as `N/A`.
    pub fn format(self, value: &Value) -> String {
        if value.is_empty() {
            return NA.to_string();
        }
        let number = value.as_f64();
        match (self, number) {
            (ColumnKind::Number, Some(n)) => format_plain(n),
            (ColumnKind::CompactNumber, Some(n)) => format_compact(n),
            (ColumnKind::Rate, Some(n)) => format_rate(n),
            (ColumnKind::Date, _) => value
                .as_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| value.to_string()),
            _ => value.to_string(),
        }
    }

    /// Maps a raw value to the value used for ordering.
    pub fn sort_value(self, value: Value) -> Value {
        match (self, value.as_f64()) {
            (ColumnKind::Rate, Some(n)) => Value::Float(normalize_rate(n)),
            _ => value,
        }
    }
}

/// Metadata and accessor for one displayable field.
///
/// The key is used both as the sort identifier and as the visibility
/// toggle identifier, so it must be unique within a [`ColumnSet`].
///
/// # Example
///
/// ```
/// use tableview_lib::column::{ColumnDescriptor, ColumnKind};
/// use tableview_lib::model::Value;
///
/// struct User { name: String, followers: Option<u32> }
///
/// let name = ColumnDescriptor::new("name", "Name", |u: &User| Value::from(u.name.as_str()));
/// let followers = ColumnDescriptor::new("followers", "Followers", |u: &User| {
///     Value::from(u.followers)
/// })
/// .with_kind(ColumnKind::CompactNumber);
///
/// let user = User { name: "Jane".into(), followers: Some(12_345) };
/// assert_eq!(name.display(&user), "Jane");
/// assert_eq!(followers.display(&user), "12.3K");
/// ```
pub struct ColumnDescriptor<T> {
    key: String,
    label: String,
    default_visible: bool,
    sortable: bool,
    kind: ColumnKind,
    accessor: Accessor<T>,
    render: Option<Renderer<T>>,
}

impl<T> ColumnDescriptor<T> {
    /// Creates a visible, sortable text column.
    pub fn new<F>(key: impl Into<String>, label: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label: label.into(),
            default_visible: true,
            sortable: true,
            kind: ColumnKind::default(),
            accessor: Arc::new(accessor),
            render: None,
        }
    }

    /// Hides the column until the user toggles it on.
    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    /// Sets whether the column starts visible.
    pub fn with_default_visible(mut self, visible: bool) -> Self {
        self.default_visible = visible;
        self
    }

    /// Disables sorting on this column.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Sets the column kind.
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets a custom renderer used in place of the kind's formatting.
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &T) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Returns the column key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the header label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if the column is shown by default.
    pub fn default_visible(&self) -> bool {
        self.default_visible
    }

    /// Returns `true` if the column can be sorted.
    pub fn sortable(&self) -> bool {
        self.sortable
    }

    /// Returns the column kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Returns `true` if the column has a custom renderer.
    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    /// Applies the accessor.
    pub fn value(&self, row: &T) -> Value {
        (self.accessor)(row)
    }

    /// Returns the value used for ordering.
    pub fn sort_value(&self, row: &T) -> Value {
        self.kind.sort_value(self.value(row))
    }

    /// Returns the displayed cell text.
    pub fn display(&self, row: &T) -> String {
        let value = self.value(row);
        match &self.render {
            Some(render) => render(&value, row),
            None => self.kind.format(&value),
        }
    }
}

impl ColumnDescriptor<Record> {
    /// Builds a record column that reads the first non-empty dotted path.
    pub fn from_paths<I, S>(key: impl Into<String>, label: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chain = FallbackChain::paths(paths);
        Self::new(key, label, move |row: &Record| chain.resolve(row))
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            default_visible: self.default_visible,
            sortable: self.sortable,
            kind: self.kind,
            accessor: Arc::clone(&self.accessor),
            render: self.render.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("default_visible", &self.default_visible)
            .field("sortable", &self.sortable)
            .field("kind", &self.kind)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// The ordered superset of columns a table can show.
pub struct ColumnSet<T> {
    columns: Vec<ColumnDescriptor<T>>,
}

impl<T> ColumnSet<T> {
    /// Creates a column set, rejecting empty or duplicate keys.
    pub fn new(columns: Vec<ColumnDescriptor<T>>) -> Result<Self, ColumnError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.key.is_empty() {
                return Err(ColumnError::EmptyKey {
                    label: column.label.clone(),
                });
            }
            if !seen.insert(column.key.as_str()) {
                return Err(ColumnError::DuplicateKey(column.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Looks up a column by key.
    pub fn get(&self, key: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Returns `true` if a column with this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor<T>> {
        self.columns.iter()
    }

    /// Returns all keys in declaration order.
    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key()).collect()
    }

    /// Returns the keys of columns visible by default.
    pub fn default_visible_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.key())
            .collect()
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T> Clone for ColumnSet<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(key: &str) -> ColumnDescriptor<Record> {
        ColumnDescriptor::from_paths(key, key.to_uppercase(), [key])
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = ColumnSet::new(vec![text("name"), text("name")]).unwrap_err();
        assert_eq!(err, ColumnError::DuplicateKey("name".into()));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = ColumnSet::new(vec![text("")]).unwrap_err();
        assert!(matches!(err, ColumnError::EmptyKey { .. }));
    }

    #[test]
    fn test_default_visible_keys() {
        let set = ColumnSet::new(vec![text("name"), text("email").hidden(), text("city")]).unwrap();
        assert_eq!(set.keys(), vec!["name", "email", "city"]);
        assert_eq!(set.default_visible_keys(), vec!["name", "city"]);
    }

    #[test]
    fn test_display_by_kind() {
        let row: Record =
            serde_json::from_str(r#"{"er": 0.0832, "views": 1250000, "joined": "2024-01-05T08:00:00Z"}"#)
                .unwrap();
        let er = ColumnDescriptor::from_paths("er", "ER", ["er"]).with_kind(ColumnKind::Rate);
        let views = ColumnDescriptor::from_paths("views", "Views", ["views"])
            .with_kind(ColumnKind::CompactNumber);
        let joined =
            ColumnDescriptor::from_paths("joined", "Joined", ["joined"]).with_kind(ColumnKind::Date);
        let missing = ColumnDescriptor::from_paths("bio", "Bio", ["bio"]);

        assert_eq!(er.display(&row), "8.32%");
        assert_eq!(views.display(&row), "1.3M");
        assert_eq!(joined.display(&row), "2024-01-05");
        assert_eq!(missing.display(&row), "N/A");
    }

    #[test]
    fn test_rate_sort_value_is_normalized() {
        let row = Record::new().with("er", 0.05);
        let er = ColumnDescriptor::from_paths("er", "ER", ["er"]).with_kind(ColumnKind::Rate);
        assert_eq!(er.sort_value(&row), Value::Float(5.0));
    }

    #[test]
    fn test_custom_render() {
        let status = ColumnDescriptor::from_paths("active", "Status", ["active"])
            .with_render(|value, _| match value {
                Value::Bool(true) => "Active".into(),
                _ => "Inactive".into(),
            });
        assert_eq!(status.display(&Record::new().with("active", true)), "Active");
        assert_eq!(status.display(&Record::new()), "Inactive");
    }
}
