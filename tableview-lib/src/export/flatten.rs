//! Flattening rows into spreadsheet-ready records.

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use super::format::NA;
use super::format::format_compact;
use super::format::format_plain;
use super::format::normalize_rate;
use crate::column::ColumnDescriptor;
use crate::column::ColumnKind;
use crate::column::ColumnSet;
use crate::error::ExportError;

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
    /// Missing data, written as `N/A`.
    NotAvailable,
}

impl ExportCell {
    fn from_column<T>(column: &ColumnDescriptor<T>, row: &T) -> Self {
        let value = column.value(row);
        if value.is_empty() {
            return ExportCell::NotAvailable;
        }
        if column.has_render() {
            return ExportCell::Text(column.display(row));
        }
        match (column.kind(), value.as_f64()) {
            (ColumnKind::Number, Some(n)) => ExportCell::Number(n),
            (ColumnKind::Rate, Some(n)) => ExportCell::Number(normalize_rate(n)),
            (ColumnKind::CompactNumber, Some(n)) => ExportCell::Text(format_compact(n)),
            _ => ExportCell::Text(column.display(row)),
        }
    }

    /// Returns the cell as display text.
    pub fn as_text(&self) -> String {
        match self {
            ExportCell::Number(n) => format_plain(*n),
            ExportCell::Text(s) => s.clone(),
            ExportCell::NotAvailable => NA.to_string(),
        }
    }
}

impl Serialize for ExportCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExportCell::Number(n) => serializer.serialize_f64(*n),
            ExportCell::Text(s) => serializer.serialize_str(s),
            ExportCell::NotAvailable => serializer.serialize_str(NA),
        }
    }
}

/// One flattened row: `(label, cell)` pairs in the requested column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    cells: Vec<(String, ExportCell)>,
}

impl FlatRecord {
    /// Returns the cells in order.
    pub fn cells(&self) -> &[(String, ExportCell)] {
        &self.cells
    }

    /// Returns the labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.cells.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Looks up a cell by label.
    pub fn get(&self, label: &str) -> Option<&ExportCell> {
        self.cells.iter().find(|(l, _)| l == label).map(|(_, c)| c)
    }
}

// Serialized as a map so key order follows the requested columns.
impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (label, cell) in &self.cells {
            map.serialize_entry(label, cell)?;
        }
        map.end()
    }
}

/// Resolves export keys to columns, refusing unknown keys.
pub(crate) fn resolve_columns<'c, T, K>(
    columns: &'c ColumnSet<T>,
    keys: &[K],
) -> Result<Vec<&'c ColumnDescriptor<T>>, ExportError>
where
    K: AsRef<str>,
{
    if keys.is_empty() {
        return Err(ExportError::NoColumns);
    }
    keys.iter()
        .map(|key| {
            columns
                .get(key.as_ref())
                .ok_or_else(|| ExportError::UnknownColumn(key.as_ref().to_string()))
        })
        .collect()
}

/// Flattens rows into one record per row, with cells in exactly the order
/// of `keys`.
///
/// Columns are never reordered or added; an unknown key is an error rather
/// than a silently missing column.
pub fn flatten<T, K>(
    rows: &[T],
    columns: &ColumnSet<T>,
    keys: &[K],
) -> Result<Vec<FlatRecord>, ExportError>
where
    K: AsRef<str>,
{
    let selected = resolve_columns(columns, keys)?;
    Ok(rows
        .iter()
        .map(|row| FlatRecord {
            cells: selected
                .iter()
                .map(|column| (column.label().to_string(), ExportCell::from_column(column, row)))
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::model::Record;

    fn columns() -> ColumnSet<Record> {
        ColumnSet::new(vec![
            ColumnDescriptor::from_paths("name", "Name", ["name"]),
            ColumnDescriptor::from_paths("followers", "Followers", ["metrics.followers", "followers"])
                .with_kind(ColumnKind::Number),
            ColumnDescriptor::from_paths("views", "Views", ["metrics.views"])
                .with_kind(ColumnKind::CompactNumber),
            ColumnDescriptor::from_paths("er", "Engagement", ["metrics.er"])
                .with_kind(ColumnKind::Rate),
        ])
        .unwrap()
    }

    fn rows() -> Vec<Record> {
        serde_json::from_str(
            r#"[
                {"name": "Jane", "metrics": {"followers": 12345, "views": 1250000, "er": 0.0832}},
                {"name": "Bob", "followers": 300}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_order_follows_requested_keys() {
        let flat = flatten(&rows(), &columns(), &["followers", "name"]).unwrap();
        for record in &flat {
            assert_eq!(record.labels(), vec!["Followers", "Name"]);
        }
        let json = serde_json::to_string(&flat[0]).unwrap();
        assert_eq!(json, r#"{"Followers":12345.0,"Name":"Jane"}"#);
    }

    #[test]
    fn test_missing_data_is_not_available() {
        let flat = flatten(&rows(), &columns(), &["name", "followers", "views", "er"]).unwrap();
        let bob = &flat[1];
        assert_eq!(bob.get("Followers"), Some(&ExportCell::Number(300.0)));
        assert_eq!(bob.get("Views"), Some(&ExportCell::NotAvailable));
        assert_eq!(bob.get("Engagement").map(ExportCell::as_text), Some("N/A".into()));
    }

    #[test]
    fn test_formatting_applies_to_export_only() {
        let flat = flatten(&rows(), &columns(), &["views", "er"]).unwrap();
        assert_eq!(flat[0].get("Views"), Some(&ExportCell::Text("1.3M".into())));
        assert_eq!(flat[0].get("Engagement"), Some(&ExportCell::Number(8.32)));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = flatten(&rows(), &columns(), &["name", "email"]).unwrap_err();
        assert!(matches!(err, ExportError::UnknownColumn(key) if key == "email"));
        let none: [&str; 0] = [];
        assert!(matches!(
            flatten(&rows(), &columns(), &none),
            Err(ExportError::NoColumns)
        ));
    }
}
