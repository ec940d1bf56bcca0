//! Workbook model and writers.

use std::io;

use serde::Serialize;

use super::flatten::FlatRecord;
use super::flatten::flatten;
use super::flatten::resolve_columns;
use super::sheet::sheet_name;
use crate::column::ColumnSet;
use crate::error::ExportError;

/// A single-sheet workbook ready to be encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    /// Sheet name, at most 31 characters.
    pub sheet_name: String,
    /// Header row: column labels in requested order.
    pub headers: Vec<String>,
    /// One record per input row.
    pub rows: Vec<FlatRecord>,
}

impl Workbook {
    /// Flattens `rows` into a workbook named after `context`.
    ///
    /// # Example
    ///
    /// ```
    /// use tableview_lib::column::{ColumnDescriptor, ColumnSet};
    /// use tableview_lib::export::Workbook;
    /// use tableview_lib::model::Record;
    ///
    /// let columns = ColumnSet::new(vec![
    ///     ColumnDescriptor::from_paths("name", "Name", ["name"]),
    ///     ColumnDescriptor::from_paths("followers", "Followers", ["followers"]),
    /// ])?;
    /// let rows = vec![Record::new().with("name", "Jane")];
    ///
    /// let workbook = Workbook::build("Spring Launch", "Results", &rows, &columns, &["followers", "name"])?;
    /// assert_eq!(workbook.sheet_name, "Spring Launch Results");
    /// assert_eq!(workbook.headers, vec!["Followers", "Name"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build<T, K>(
        context: &str,
        suffix: &str,
        rows: &[T],
        columns: &ColumnSet<T>,
        keys: &[K],
    ) -> Result<Self, ExportError>
    where
        K: AsRef<str>,
    {
        let headers = resolve_columns(columns, keys)?
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        Ok(Self {
            sheet_name: sheet_name(context, suffix),
            headers,
            rows: flatten(rows, columns, keys)?,
        })
    }

    /// Returns the body as rows of display strings, in header order.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.cells().iter().map(|(_, cell)| cell.as_text()).collect())
            .collect()
    }
}

/// Encodes a workbook to an output stream.
///
/// Spreadsheet binary formats are produced by an external encoder behind
/// this trait.
pub trait WorkbookWriter {
    /// Writes the workbook.
    fn write(&self, workbook: &Workbook, out: &mut dyn io::Write) -> Result<(), ExportError>;
}

/// Writes the workbook as JSON, one object per row with keys in column order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWorkbookWriter {
    pretty: bool,
}

impl JsonWorkbookWriter {
    /// Creates a compact JSON writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an indented JSON writer.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl WorkbookWriter for JsonWorkbookWriter {
    fn write(&self, workbook: &Workbook, out: &mut dyn io::Write) -> Result<(), ExportError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, workbook)?;
        } else {
            serde_json::to_writer(&mut *out, workbook)?;
        }
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::model::Record;

    #[test]
    fn test_json_writer_preserves_column_order() {
        let columns = ColumnSet::new(vec![
            ColumnDescriptor::from_paths("name", "Name", ["name"]),
            ColumnDescriptor::from_paths("city", "City", ["city"]),
        ])
        .unwrap();
        let rows = vec![Record::new().with("name", "Jane")];
        let workbook = Workbook::build("Q3", "Results", &rows, &columns, &["city", "name"]).unwrap();

        let mut out = Vec::new();
        JsonWorkbookWriter::new().write(&workbook, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.trim_end(),
            r#"{"sheet_name":"Q3 Results","headers":["City","Name"],"rows":[{"City":"N/A","Name":"Jane"}]}"#
        );
        assert_eq!(workbook.text_rows(), vec![vec!["N/A".to_string(), "Jane".to_string()]]);
    }
}
