//! Plain-text rendering of a table view.

use std::io;

use tableview_lib::ViewOutput;
use tableview_lib::ViewState;
use tableview_lib::query::Direction;
use tableview_lib::query::PageItem;

const NO_DATA: &str = "No data available.";
const NO_MATCHES: &str = "No results match your search or filters.";
const ACCESS_RESTRICTED: &str = "You do not have access to any columns in this view.";

/// Writes the table, its summary line and the page control.
pub fn write_view<T, W>(output: &ViewOutput<'_, T>, out: &mut W) -> io::Result<()>
where
    W: io::Write,
{
    if !output.badges.is_empty() {
        let badges: Vec<String> = output.badges.iter().map(ToString::to_string).collect();
        writeln!(out, "Filters: {}", badges.join(", "))?;
    }

    match output.state {
        ViewState::AccessRestricted => return writeln!(out, "{}", ACCESS_RESTRICTED),
        ViewState::NoData => return writeln!(out, "{}", NO_DATA),
        ViewState::NoMatches => return writeln!(out, "{}", NO_MATCHES),
        ViewState::Rows => {}
    }

    let headers: Vec<String> = output
        .columns
        .iter()
        .map(|c| match c.sorted {
            Some(Direction::Asc) => format!("{} ^", c.label),
            Some(Direction::Desc) => format!("{} v", c.label),
            None => c.label.clone(),
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            output
                .cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_line(out, &headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(out, &rule, &widths)?;
    for row in &output.cells {
        write_line(out, row, &widths)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", output.page.summary())?;
    writeln!(out, "{}", page_control(output))
}

fn write_line<W: io::Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())
}

/// `< Prev  1 [2] 3 ... 9  Next >`, with unavailable ends left out.
pub fn page_control<T>(output: &ViewOutput<'_, T>) -> String {
    let mut parts = Vec::new();
    if output.page.has_prev() {
        parts.push("< Prev".to_string());
    }
    let numbers: Vec<String> = output
        .page_numbers
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == output.page.page => format!("[{}]", n),
            other => other.to_string(),
        })
        .collect();
    if !numbers.is_empty() {
        parts.push(numbers.join(" "));
    }
    if output.page.has_next() {
        parts.push("Next >".to_string());
    }
    parts.join("  ")
}

#[cfg(test)]
mod tests {
    use tableview_lib::TableView;
    use tableview_lib::column::ColumnDescriptor;
    use tableview_lib::column::ColumnKind;
    use tableview_lib::column::ColumnSet;
    use tableview_lib::config::TableConfig;
    use tableview_lib::model::Record;

    use super::*;

    fn view(count: i64) -> TableView<Record> {
        let columns = ColumnSet::new(vec![
            ColumnDescriptor::from_paths("name", "Name", ["name"]),
            ColumnDescriptor::from_paths("followers", "Followers", ["followers"])
                .with_kind(ColumnKind::Number),
        ])
        .unwrap();
        let rows = (1..=count)
            .map(|i| Record::new().with("name", format!("c{}", i)).with("followers", i * 10))
            .collect();
        let config = TableConfig::default().with_page_sizes(vec![2]).with_default_page_size(2);
        TableView::new(columns, rows).with_config(config)
    }

    fn render(view: &TableView<Record>) -> String {
        let mut out = Vec::new();
        write_view(&view.render(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_renders_table_and_controls() {
        let mut view = view(5);
        view.toggle_sort("followers");
        view.toggle_sort("followers");
        view.set_page(2);

        let text = render(&view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name  Followers v");
        assert_eq!(lines[1], "----  -----------");
        assert_eq!(lines[2], "c3    30");
        assert_eq!(lines[3], "c2    20");
        assert_eq!(lines[5], "Showing 3 to 4 of 5 results");
        assert_eq!(lines[6], "< Prev  1 [2] 3  Next >");
    }

    #[test]
    fn test_empty_states() {
        assert_eq!(render(&view(0)).trim_end(), NO_DATA);

        let mut filtered = view(3);
        filtered.set_search("zzz");
        assert_eq!(render(&filtered).trim_end(), NO_MATCHES);
    }
}
