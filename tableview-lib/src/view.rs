//! The table view: search, filter, sort, paginate and project rows.

use log::debug;
use log::warn;

use crate::capabilities::ViewerCapabilities;
use crate::column::ApprovedColumnSet;
use crate::column::ColumnDescriptor;
use crate::column::ColumnKind;
use crate::column::ColumnSet;
use crate::column::ColumnVisibility;
use crate::column::ToggleOutcome;
use crate::config::TableConfig;
use crate::error::ExportError;
use crate::error::PageError;
use crate::export::Workbook;
use crate::model::Row;
use crate::model::Value;
use crate::query::ActiveFilterMap;
use crate::query::Direction;
use crate::query::FilterBadge;
use crate::query::FilterSpec;
use crate::query::PageChange;
use crate::query::PageItem;
use crate::query::PageSlice;
use crate::query::Pagination;
use crate::query::SortState;
use crate::query::contains_ignore_case;
use crate::query::equals_ignore_case;
use crate::query::page_numbers;
use crate::query::paginate;
use crate::query::sort_rows;
use crate::query::toggle_sort;

/// What a rendered view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// There are rows to show.
    Rows,
    /// The collection itself is empty.
    NoData,
    /// Rows exist, but search or filters eliminated all of them.
    NoMatches,
    /// The viewer has no approved columns.
    AccessRestricted,
}

/// One visible column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    /// Column key.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether the header can be clicked to sort.
    pub sortable: bool,
    /// Sort direction if the view is sorted by this column.
    pub sorted: Option<Direction>,
}

/// Result of [`TableView::render`].
#[derive(Debug, Clone)]
pub struct ViewOutput<'a, T> {
    /// Which state to render.
    pub state: ViewState,
    /// Visible columns in display order.
    pub columns: Vec<ColumnHeader>,
    /// The current page of rows with its position metadata.
    pub page: PageSlice<&'a T>,
    /// Displayed cell text: one entry per page row, one cell per visible column.
    pub cells: Vec<Vec<String>>,
    /// Slots for the page-number control.
    pub page_numbers: Vec<PageItem>,
    /// Badges for the applied filters.
    pub badges: Vec<FilterBadge>,
}

/// A single table: raw rows plus every piece of view state.
///
/// Rows flow through search, filters and inline filters, then the sort,
/// then pagination, and finally column projection. Each stage works on the
/// output of the previous one; the raw rows are never modified.
///
/// # Example
///
/// ```
/// use tableview_lib::TableView;
/// use tableview_lib::column::{ColumnDescriptor, ColumnKind, ColumnSet};
/// use tableview_lib::model::Record;
///
/// let columns = ColumnSet::new(vec![
///     ColumnDescriptor::from_paths("name", "Name", ["name"]),
///     ColumnDescriptor::from_paths("followers", "Followers", ["followers"])
///         .with_kind(ColumnKind::CompactNumber),
/// ])?;
/// let rows = vec![
///     Record::new().with("name", "Jane").with("followers", 12_345),
///     Record::new().with("name", "Bob").with("followers", 900),
/// ];
///
/// let mut view = TableView::new(columns, rows);
/// view.set_search("jan");
/// let output = view.render();
/// assert_eq!(output.cells, vec![vec!["Jane".to_string(), "12.3K".to_string()]]);
/// assert_eq!(output.page.summary(), "Showing 1 to 1 of 1 results");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TableView<T> {
    rows: Vec<T>,
    columns: ColumnSet<T>,
    filter_specs: Vec<FilterSpec>,
    filters: ActiveFilterMap,
    inline: ActiveFilterMap,
    search: String,
    search_columns: Vec<String>,
    sort: SortState,
    pagination: Pagination,
    visibility: ColumnVisibility,
    capabilities: ViewerCapabilities,
    config: TableConfig,
}

impl<T: Row> TableView<T> {
    /// Creates an unrestricted view over `rows`.
    ///
    /// Text columns are searchable; every column starts with its default
    /// visibility. The viewer may do everything until
    /// [`with_capabilities`](Self::with_capabilities) says otherwise.
    pub fn new(columns: ColumnSet<T>, rows: Vec<T>) -> Self {
        let visibility = ColumnVisibility::new(columns.keys(), columns.default_visible_keys());
        let search_columns = columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Text)
            .map(|c| c.key().to_string())
            .collect();
        let config = TableConfig::default();
        Self {
            rows,
            filter_specs: Vec::new(),
            filters: ActiveFilterMap::new(),
            inline: ActiveFilterMap::new(),
            search: String::new(),
            search_columns,
            sort: SortState::unsorted(),
            pagination: Pagination::new(config.initial_page_size()),
            visibility,
            capabilities: ViewerCapabilities::admin(),
            config,
            columns,
        }
    }

    /// Declares the filters the panel offers.
    ///
    /// Each filter's field names a column key.
    pub fn with_filters(mut self, specs: Vec<FilterSpec>) -> Self {
        for spec in &specs {
            if !self.columns.contains(&spec.field) {
                warn!("filter '{}' does not name a column and will match nothing", spec.field);
            }
        }
        self.filter_specs = specs;
        self
    }

    /// Restricts the visible columns to an allow-list.
    pub fn with_allow_list(mut self, allow_list: ApprovedColumnSet) -> Self {
        self.visibility = ColumnVisibility::restricted(self.columns.keys(), allow_list, None);
        self
    }

    /// Restricts the visible columns and applies a saved preference.
    pub fn with_allow_list_and_preference(
        mut self,
        allow_list: ApprovedColumnSet,
        preference: &[&str],
    ) -> Self {
        self.visibility =
            ColumnVisibility::restricted(self.columns.keys(), allow_list, Some(preference));
        self
    }

    /// Sets the viewer's permissions.
    pub fn with_capabilities(mut self, capabilities: ViewerCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets which columns the search box looks at. Unknown keys are dropped.
    pub fn with_search_columns<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_columns = keys
            .into_iter()
            .map(Into::into)
            .filter(|key| {
                let known = self.columns.contains(key);
                if !known {
                    warn!("ignoring unknown search column '{}'", key);
                }
                known
            })
            .collect();
        self
    }

    /// Applies a table configuration, resetting the page size.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.pagination = Pagination::new(config.initial_page_size());
        self.config = config;
        self
    }

    /// Returns the column superset.
    pub fn columns(&self) -> &ColumnSet<T> {
        &self.columns
    }

    /// Returns the raw rows.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Returns the declared filters.
    pub fn filter_specs(&self) -> &[FilterSpec] {
        &self.filter_specs
    }

    /// Returns the applied filters.
    pub fn filters(&self) -> &ActiveFilterMap {
        &self.filters
    }

    /// Returns the inline column filters.
    pub fn inline_filters(&self) -> &ActiveFilterMap {
        &self.inline
    }

    /// Returns the applied search query.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns the sort state.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Returns the pagination state.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Returns the column visibility state.
    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    /// Returns the viewer's permissions.
    pub fn capabilities(&self) -> &ViewerCapabilities {
        &self.capabilities
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Replaces the rows, keeping the page in range.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        let total = self.matching_count();
        self.pagination.clamp(total);
    }

    /// Applies a search query and returns to page 1.
    pub fn set_search(&mut self, query: &str) {
        let query = query.trim();
        if query == self.search {
            return;
        }
        debug!("search changed to '{}'", query);
        self.search = query.to_string();
        self.pagination.reset();
    }

    /// Replaces the applied filters and returns to page 1.
    ///
    /// Filters on columns outside the allow-list are kept but match
    /// everything while the restriction lasts.
    pub fn apply_filters(&mut self, filters: ActiveFilterMap) {
        for spec in &self.filter_specs {
            let active = spec.keys().iter().any(|key| filters.get(key).is_some());
            if active && !self.visibility.is_allowed(&spec.field) {
                warn!("ignoring filter on unapproved column '{}'", spec.field);
            }
        }
        self.filters = filters;
        self.pagination.reset();
    }

    /// Sets or clears an inline facet on one column and returns to page 1.
    ///
    /// Facets match by case-insensitive equality.
    ///
    /// Unknown and unapproved columns are logged and ignored.
    pub fn set_inline_filter(&mut self, key: &str, value: &str) {
        if !self.columns.contains(key) {
            warn!("ignoring inline filter on unknown column '{}'", key);
            return;
        }
        if !self.visibility.is_allowed(key) {
            warn!("ignoring inline filter on unapproved column '{}'", key);
            return;
        }
        self.inline.set(key, value);
        self.pagination.reset();
    }

    /// Handles a click on a column header.
    ///
    /// Unknown and unsortable columns are logged and ignored.
    pub fn toggle_sort(&mut self, key: &str) -> &SortState {
        match self.columns.get(key) {
            Some(column) if column.sortable() => {
                self.sort = toggle_sort(&self.sort, key);
            }
            Some(_) => warn!("ignoring sort on unsortable column '{}'", key),
            None => warn!("ignoring sort on unknown column '{}'", key),
        }
        &self.sort
    }

    /// Replaces the sort state outright.
    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Moves to a page, clamped to the filtered row count.
    pub fn set_page(&mut self, page: usize) -> PageChange {
        let total = self.matching_count();
        self.pagination.set_page(page, total)
    }

    /// Changes the page size and returns to page 1.
    ///
    /// Sizes the configuration does not offer are still accepted when
    /// positive, with a warning.
    pub fn set_page_size(&mut self, size: i64) -> Result<(), PageError> {
        let offered = usize::try_from(size).is_ok_and(|s| self.config.page_sizes.contains(&s));
        if !offered {
            warn!("page size {} is not one of the offered sizes", size);
        }
        self.pagination.set_page_size(size)
    }

    /// Shows or hides a column.
    ///
    /// Requires permission to manage columns; otherwise nothing changes.
    pub fn toggle_column(&mut self, key: &str) -> ToggleOutcome {
        if !self.capabilities.can_manage_columns {
            warn!("ignoring visibility toggle for '{}': viewer cannot manage columns", key);
            return ToggleOutcome::Rejected;
        }
        self.visibility.toggle(key)
    }

    /// Replaces the allow-list, dropping columns that are no longer approved.
    pub fn set_allow_list(&mut self, allow_list: Option<ApprovedColumnSet>) {
        self.visibility.set_allow_list(allow_list);
    }

    /// Number of rows that pass search and filters.
    pub fn matching_count(&self) -> usize {
        self.rows.iter().filter(|row| self.matches(row)).count()
    }

    /// Matching rows in sort order, across all pages.
    pub fn matching_rows(&self) -> Vec<&T> {
        let matched = self.rows.iter().filter(|row| self.matches(row));
        sort_rows(matched, &self.sort, &self.columns)
    }

    /// Runs the pipeline and returns what to draw.
    pub fn render(&self) -> ViewOutput<'_, T> {
        let sorted = self.matching_rows();
        let page = paginate(&sorted, &self.pagination);

        let state = if self.visibility.is_access_restricted() {
            ViewState::AccessRestricted
        } else if self.rows.is_empty() {
            ViewState::NoData
        } else if page.total == 0 {
            ViewState::NoMatches
        } else {
            ViewState::Rows
        };

        let visible = self.visible_columns();
        let cells = page
            .rows
            .iter()
            .map(|row| visible.iter().map(|c| c.display(row)).collect())
            .collect();
        let columns = visible
            .iter()
            .map(|c| ColumnHeader {
                key: c.key().to_string(),
                label: c.label().to_string(),
                sortable: c.sortable(),
                sorted: self
                    .sort
                    .is_sorted_by(c.key())
                    .then_some(self.sort.direction)
                    .flatten(),
            })
            .collect();

        ViewOutput {
            state,
            columns,
            page_numbers: page_numbers(page.page, page.total_pages),
            badges: self.filters.badges(&self.filter_specs),
            cells,
            page,
        }
    }

    /// Builds a workbook from every matching row, in sort order.
    ///
    /// `keys` defaults to the visible columns. Explicit keys must be on the
    /// allow-list.
    pub fn export(&self, context: &str, keys: Option<&[String]>) -> Result<Workbook, ExportError> {
        if !self.capabilities.can_export {
            return Err(ExportError::NotPermitted);
        }
        let keys: Vec<String> = match keys {
            Some(keys) => {
                let hidden = keys
                    .iter()
                    .find(|key| self.columns.contains(key) && !self.visibility.is_allowed(key));
                if let Some(key) = hidden {
                    warn!("refusing to export unapproved column '{}'", key);
                    return Err(ExportError::ColumnNotApproved(key.to_string()));
                }
                keys.to_vec()
            }
            None => self
                .visibility
                .visible_keys()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        let rows: Vec<T> = self.matching_rows().into_iter().cloned().collect();
        Workbook::build(context, &self.config.sheet_suffix, &rows, &self.columns, &keys)
    }

    fn visible_columns(&self) -> Vec<&ColumnDescriptor<T>> {
        self.visibility
            .visible_keys()
            .into_iter()
            .filter_map(|key| self.columns.get(key))
            .collect()
    }

    fn value_of(&self, key: &str, row: &T) -> Value {
        self.columns
            .get(key)
            .map(|c| c.value(row))
            .unwrap_or_default()
    }

    /// Value of an approved column; `None` for columns the viewer may not see.
    fn approved_value(&self, key: &str, row: &T) -> Option<Value> {
        self.visibility
            .is_allowed(key)
            .then(|| self.value_of(key, row))
    }

    fn matches(&self, row: &T) -> bool {
        self.matches_search(row) && self.matches_filters(row) && self.matches_inline(row)
    }

    fn matches_search(&self, row: &T) -> bool {
        self.search.is_empty()
            || self
                .search_columns
                .iter()
                .any(|key| {
                    self.approved_value(key, row)
                        .is_some_and(|value| contains_ignore_case(&value, &self.search))
                })
    }

    fn matches_filters(&self, row: &T) -> bool {
        self.filter_specs
            .iter()
            .all(|spec| {
                self.approved_value(&spec.field, row)
                    .is_none_or(|value| spec.matches(&value, &self.filters))
            })
    }

    fn matches_inline(&self, row: &T) -> bool {
        self.inline
            .iter()
            .all(|(key, wanted)| {
                self.approved_value(key, row)
                    .is_none_or(|value| equals_ignore_case(&value, wanted))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterKind;

    #[derive(Debug, Clone)]
    struct Member {
        name: &'static str,
        email: &'static str,
        status: &'static str,
        followers: Option<i64>,
    }

    fn columns() -> ColumnSet<Member> {
        ColumnSet::new(vec![
            ColumnDescriptor::new("name", "Name", |m: &Member| Value::from(m.name)),
            ColumnDescriptor::new("email", "Email", |m: &Member| Value::from(m.email)),
            ColumnDescriptor::new("status", "Status", |m: &Member| Value::from(m.status)),
            ColumnDescriptor::new("followers", "Followers", |m: &Member| Value::from(m.followers))
                .with_kind(ColumnKind::Number),
        ])
        .unwrap()
    }

    fn members() -> Vec<Member> {
        vec![
            Member { name: "Jane", email: "jane@acme.io", status: "active", followers: Some(120) },
            Member { name: "Bob", email: "bob@corp.io", status: "paused", followers: None },
            Member { name: "Janet", email: "janet@acme.io", status: "paused", followers: Some(5) },
        ]
    }

    fn names(output: &ViewOutput<'_, Member>) -> Vec<&'static str> {
        output.page.rows.iter().map(|m| m.name).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_and_resets_page() {
        let mut view = TableView::new(columns(), members())
            .with_config(TableConfig::default().with_page_sizes(vec![1]).with_default_page_size(1));
        view.set_page(2);
        view.set_search("  JAN ");
        assert_eq!(view.pagination().page(), 1);
        assert_eq!(view.search(), "JAN");
        assert_eq!(view.matching_count(), 2);
    }

    #[test]
    fn test_filters_and_inline_filters_combine() {
        let specs = vec![FilterSpec::new("email", FilterKind::Text).with_label("Email")];
        let mut view = TableView::new(columns(), members()).with_filters(specs);
        view.apply_filters([("email", "ACME")].into_iter().collect());
        assert_eq!(view.matching_count(), 2);
        view.set_inline_filter("status", "Paused");

        let output = view.render();
        assert_eq!(names(&output), vec!["Janet"]);
        assert_eq!(output.badges.len(), 1);
        assert_eq!(output.badges[0].to_string(), "Email: ACME");

        view.set_inline_filter("status", "");
        assert_eq!(view.matching_count(), 2);
    }

    #[test]
    fn test_states() {
        let mut view = TableView::new(columns(), Vec::new());
        assert_eq!(view.render().state, ViewState::NoData);

        view.set_rows(members());
        view.set_search("nobody");
        assert_eq!(view.render().state, ViewState::NoMatches);

        view.set_search("");
        assert_eq!(view.render().state, ViewState::Rows);

        view.set_allow_list(Some(ApprovedColumnSet::new(Vec::<String>::new())));
        let output = view.render();
        assert_eq!(output.state, ViewState::AccessRestricted);
        assert!(output.columns.is_empty());
    }

    #[test]
    fn test_sort_header_marks_direction() {
        let mut view = TableView::new(columns(), members());
        view.toggle_sort("followers");
        view.toggle_sort("followers");
        let output = view.render();
        assert_eq!(names(&output), vec!["Jane", "Janet", "Bob"]);
        let header = output.columns.iter().find(|c| c.key == "followers").unwrap();
        assert_eq!(header.sorted, Some(Direction::Desc));
        assert_eq!(output.cells[2], vec!["Bob", "bob@corp.io", "paused", "N/A"]);
    }

    #[test]
    fn test_unknown_sort_key_is_ignored() {
        let mut view = TableView::new(columns(), members());
        assert!(view.toggle_sort("rank").is_unsorted());
    }

    #[test]
    fn test_toggle_column_requires_capability() {
        let mut view = TableView::new(columns(), members())
            .with_capabilities(ViewerCapabilities::read_only());
        assert_eq!(view.toggle_column("email"), ToggleOutcome::Rejected);
        assert!(view.visibility().is_visible("email"));

        let mut view = TableView::new(columns(), members());
        assert_eq!(view.toggle_column("email"), ToggleOutcome::Hidden);
        let keys: Vec<String> = view.render().columns.into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["name", "status", "followers"]);
    }

    #[test]
    fn test_set_rows_clamps_page() {
        let config = TableConfig::default().with_page_sizes(vec![1]).with_default_page_size(1);
        let mut view = TableView::new(columns(), members()).with_config(config);
        assert_eq!(view.set_page(3), PageChange::Moved(3));
        view.set_rows(members().into_iter().take(1).collect());
        assert_eq!(view.pagination().page(), 1);
    }

    #[test]
    fn test_export_uses_all_matching_rows() {
        let config = TableConfig::default().with_page_sizes(vec![1]).with_default_page_size(1);
        let mut view = TableView::new(columns(), members()).with_config(config);
        view.set_search("acme");

        let workbook = view.export("Team", None).unwrap();
        assert_eq!(workbook.sheet_name, "Team Results");
        assert_eq!(workbook.rows.len(), 2);
        assert_eq!(workbook.headers, vec!["Name", "Email", "Status", "Followers"]);

        let read_only = TableView::new(columns(), members())
            .with_capabilities(ViewerCapabilities::read_only());
        assert!(matches!(read_only.export("Team", None), Err(ExportError::NotPermitted)));
    }

    #[test]
    fn test_restricted_view_does_not_export_hidden_columns() {
        let view = TableView::new(columns(), members())
            .with_allow_list(ApprovedColumnSet::new(["name"]));
        let keys = vec!["email".to_string()];
        assert!(matches!(
            view.export("Public", Some(&keys)),
            Err(ExportError::ColumnNotApproved(key)) if key == "email"
        ));
        let keys = vec!["name".to_string()];
        assert_eq!(view.export("Public", Some(&keys)).unwrap().rows.len(), 3);
        let keys = vec!["phone".to_string()];
        assert!(matches!(
            view.export("Public", Some(&keys)),
            Err(ExportError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_restricted_view_does_not_match_on_hidden_columns() {
        let specs = vec![FilterSpec::new("email", FilterKind::Text)];
        let mut view = TableView::new(columns(), members())
            .with_filters(specs)
            .with_allow_list(ApprovedColumnSet::new(["name", "followers"]));

        view.set_search("acme.io");
        assert_eq!(view.render().state, ViewState::NoMatches);
        view.set_search("jan");
        assert_eq!(view.matching_count(), 2);
        view.set_search("");

        view.apply_filters([("email", "corp")].into_iter().collect());
        assert_eq!(view.matching_count(), 3);

        view.set_inline_filter("status", "paused");
        assert!(view.inline_filters().is_empty());
        assert_eq!(view.matching_count(), 3);
    }

    #[test]
    fn test_allow_list_of_unknown_columns_renders_restricted() {
        let view = TableView::new(columns(), members())
            .with_allow_list(ApprovedColumnSet::new(["phone"]));
        let output = view.render();
        assert_eq!(output.state, ViewState::AccessRestricted);
        assert!(output.columns.is_empty());
    }

    #[test]
    fn test_filter_kinds_on_dates() {
        #[derive(Debug, Clone)]
        struct Post {
            title: &'static str,
            published: &'static str,
        }
        let columns = ColumnSet::new(vec![
            ColumnDescriptor::new("title", "Title", |p: &Post| Value::from(p.title)),
            ColumnDescriptor::new("published", "Published", |p: &Post| Value::from(p.published))
                .with_kind(ColumnKind::Date),
        ])
        .unwrap();
        let posts = vec![
            Post { title: "a", published: "2024-03-01" },
            Post { title: "b", published: "2024-03-15" },
            Post { title: "c", published: "2024-04-02" },
        ];
        let mut view = TableView::new(columns, posts)
            .with_filters(vec![FilterSpec::new("published", FilterKind::DateRange)]);
        view.apply_filters(
            [("published_from", "2024-03-10"), ("published_to", "2024-03-31")]
                .into_iter()
                .collect(),
        );
        let output = view.render();
        let titles: Vec<&str> = output.page.rows.iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["b"]);
    }
}
