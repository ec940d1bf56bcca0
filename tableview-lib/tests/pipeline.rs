//! End-to-end tests for the table pipeline.
//!
//! Run with: `cargo test -p tableview-lib --test pipeline`

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tableview_lib::TableView;
use tableview_lib::ViewState;
use tableview_lib::column::ApprovedColumnSet;
use tableview_lib::column::ColumnDescriptor;
use tableview_lib::column::ColumnKind;
use tableview_lib::column::ColumnSet;
use tableview_lib::column::ColumnVisibility;
use tableview_lib::column::ToggleOutcome;
use tableview_lib::config::TableConfig;
use tableview_lib::export::ExportCell;
use tableview_lib::export::normalize_rate;
use tableview_lib::model::Record;
use tableview_lib::query::PageItem;
use tableview_lib::query::SearchBox;

fn creator_columns() -> ColumnSet<Record> {
    ColumnSet::new(vec![
        ColumnDescriptor::from_paths("rank", "Rank", ["rank"]).with_kind(ColumnKind::Number),
        ColumnDescriptor::from_paths("name", "Name", ["name"]),
        ColumnDescriptor::from_paths("email", "Email", ["contact.email", "email"]),
        ColumnDescriptor::from_paths("followers", "Followers", ["metrics.followers"])
            .with_kind(ColumnKind::CompactNumber),
        ColumnDescriptor::from_paths("er", "Engagement", ["metrics.er"]).with_kind(ColumnKind::Rate),
    ])
    .unwrap()
}

/// Creator `rank` has the `rank`-th highest follower count.
fn creators(count: i64) -> Vec<Record> {
    (1..=count)
        .map(|rank| {
            let metrics = Record::new()
                .with("followers", (count + 1 - rank) * 1_000)
                .with("er", 0.05);
            Record::new()
                .with("rank", rank)
                .with("name", format!("Creator {}", rank))
                .with("email", format!("creator{}@example.com", rank))
                .with("metrics", metrics)
        })
        .collect()
}

fn ranks(view: &TableView<Record>) -> Vec<i64> {
    view.render()
        .page
        .rows
        .iter()
        .filter_map(|r| r.get("rank").and_then(|v| v.as_f64()))
        .map(|n| n as i64)
        .collect()
}

#[test]
fn test_sorted_second_page() {
    let mut view = TableView::new(creator_columns(), creators(23));
    view.toggle_sort("followers");
    view.toggle_sort("followers");
    view.set_page(2);

    let output = view.render();
    assert_eq!(output.state, ViewState::Rows);
    assert_eq!(ranks(&view), (11..=20).collect::<Vec<_>>());
    assert_eq!(output.page.start_item, 11);
    assert_eq!(output.page.end_item, 20);
    assert_eq!(output.page.summary(), "Showing 11 to 20 of 23 results");
    assert_eq!(
        output.page_numbers,
        vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
    );
}

#[test]
fn test_page_size_change_resets_page() {
    let mut view = TableView::new(creator_columns(), creators(23));
    view.set_page(3);
    assert_eq!(view.pagination().page(), 3);

    view.set_page_size(25).unwrap();
    assert_eq!(view.pagination().page(), 1);
    assert_eq!(view.render().page.rows.len(), 23);

    assert!(view.set_page_size(0).is_err());
    assert_eq!(view.pagination().page_size(), 25);
}

#[tokio::test(start_paused = true)]
async fn test_typing_fires_one_search() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&emitted);
    let config = TableConfig::default();
    let mut search = SearchBox::from_config(&config, move |q| sink.lock().unwrap().push(q));

    let start = tokio::time::Instant::now();
    let mut typed = String::new();
    for c in "jane".chars() {
        typed.push(c);
        search.set_query(typed.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let last_keystroke = start + Duration::from_millis(300);

    tokio::time::sleep(Duration::from_millis(399)).await;
    assert!(emitted.lock().unwrap().is_empty());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(*emitted.lock().unwrap(), vec!["jane".to_string()]);
    assert!(tokio::time::Instant::now() >= last_keystroke + config.search_debounce());

    let mut view = TableView::new(creator_columns(), creators(23))
        .with_search_columns(["name", "email"]);
    view.set_page(3);
    let query = emitted.lock().unwrap()[0].clone();
    view.set_search(&query);
    assert_eq!(view.pagination().page(), 1);
    assert_eq!(view.render().state, ViewState::NoMatches);

    view.set_search("creator2@");
    assert_eq!(ranks(&view), vec![2]);
}

#[test]
fn test_export_preserves_requested_order() {
    let view = TableView::new(creator_columns(), creators(2));
    let keys = vec!["followers".to_string(), "name".to_string(), "er".to_string()];
    let workbook = view.export("Creators", Some(&keys)).unwrap();

    assert_eq!(workbook.sheet_name, "Creators Results");
    assert_eq!(workbook.headers, vec!["Followers", "Name", "Engagement"]);
    for row in &workbook.rows {
        assert_eq!(row.labels(), vec!["Followers", "Name", "Engagement"]);
        assert_eq!(row.get("Engagement"), Some(&ExportCell::Number(5.0)));
    }
    assert_eq!(workbook.rows[0].get("Followers"), Some(&ExportCell::Text("2.0K".into())));
}

#[test]
fn test_restricted_toggle_is_rejected() {
    let mut visibility = ColumnVisibility::restricted(
        ["rank", "name", "email", "followers"],
        ApprovedColumnSet::new(["rank", "name", "followers"]),
        None,
    );
    assert_eq!(visibility.toggle("email"), ToggleOutcome::Rejected);
    assert_eq!(visibility.visible_keys(), vec!["rank", "name", "followers"]);

    let mut view = TableView::new(creator_columns(), creators(3))
        .with_allow_list(ApprovedColumnSet::new(["name", "followers"]));
    assert_eq!(view.toggle_column("email"), ToggleOutcome::Rejected);
    let keys: Vec<String> = view.render().columns.into_iter().map(|c| c.key).collect();
    assert_eq!(keys, vec!["name", "followers"]);
}

#[test]
fn test_rates_normalize() {
    assert_eq!(normalize_rate(0.0832), 8.32);
    assert_eq!(normalize_rate(8.32), 8.32);
    assert_eq!(normalize_rate(1.0), 1.0);
    assert_eq!(normalize_rate(0.0), 0.0);
}
