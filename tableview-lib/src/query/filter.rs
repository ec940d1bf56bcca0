//! Filter specifications and active filter state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;
use crate::model::parse_date;

/// Suffix of the lower bound key of a range filter.
pub const RANGE_FROM: &str = "_from";
/// Suffix of the upper bound key of a range filter.
pub const RANGE_TO: &str = "_to";

/// Kind of filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Text,
    /// Case-insensitive equality against one of the options.
    Select,
    /// Same calendar day.
    Date,
    /// Inclusive date range, stored as `{field}_from` and `{field}_to`.
    DateRange,
}

/// One selectable option of a select filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Stored value.
    pub value: String,
    /// Displayed label.
    pub label: String,
}

impl FilterOption {
    /// Creates a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declares one filterable field.
///
/// The field name is matched against column keys by the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Field (column key) this filter constrains.
    pub field: String,
    /// Optional display label; defaults to the field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Kind of control.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Options for select filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,
}

impl FilterSpec {
    /// Creates a filter spec with no options.
    pub fn new(field: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            field: field.into(),
            label: None,
            kind,
            options: Vec::new(),
        }
    }

    /// Creates a select filter with options.
    pub fn select(field: impl Into<String>, options: Vec<FilterOption>) -> Self {
        Self {
            options,
            ..Self::new(field, FilterKind::Select)
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }

    /// Returns the map keys this filter occupies.
    pub fn keys(&self) -> Vec<String> {
        match self.kind {
            FilterKind::DateRange => vec![self.from_key(), self.to_key()],
            _ => vec![self.field.clone()],
        }
    }

    fn from_key(&self) -> String {
        format!("{}{}", self.field, RANGE_FROM)
    }

    fn to_key(&self) -> String {
        format!("{}{}", self.field, RANGE_TO)
    }

    /// Returns `true` if the cell value satisfies this filter's entries in `filters`.
    ///
    /// Absent entries impose no constraint. Cell values that cannot be read
    /// as dates fail date constraints; filter inputs that cannot be parsed
    /// are ignored.
    pub fn matches(&self, value: &Value, filters: &ActiveFilterMap) -> bool {
        match self.kind {
            FilterKind::Text => filters
                .get(&self.field)
                .is_none_or(|needle| contains_ignore_case(value, needle)),
            FilterKind::Select => filters
                .get(&self.field)
                .is_none_or(|wanted| equals_ignore_case(value, wanted)),
            FilterKind::Date => match filters.get(&self.field).and_then(|d| self.parse_bound(d)) {
                Some(day) => value.as_date() == Some(day),
                None => true,
            },
            FilterKind::DateRange => {
                let from = filters.get(&self.from_key()).and_then(|d| self.parse_bound(d));
                let to = filters.get(&self.to_key()).and_then(|d| self.parse_bound(d));
                if from.is_none() && to.is_none() {
                    return true;
                }
                match value.as_date() {
                    Some(day) => from.is_none_or(|f| day >= f) && to.is_none_or(|t| day <= t),
                    None => false,
                }
            }
        }
    }

    fn parse_bound(&self, input: &str) -> Option<chrono::NaiveDate> {
        let parsed = parse_date(input);
        if parsed.is_none() {
            warn!("ignoring unparseable date '{}' for filter '{}'", input, self.field);
        }
        parsed
    }

    fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value.eq_ignore_ascii_case(value))
            .map(|o| o.label.as_str())
    }
}

/// Case-insensitive substring match on the value's display form.
pub fn contains_ignore_case(value: &Value, needle: &str) -> bool {
    value
        .to_string()
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

/// Case-insensitive equality. Lists match if any element matches.
pub fn equals_ignore_case(value: &Value, wanted: &str) -> bool {
    match value {
        Value::List(items) => items.iter().any(|item| equals_ignore_case(item, wanted)),
        _ => value.to_string().trim().to_lowercase() == wanted.trim().to_lowercase(),
    }
}

/// Active filter values keyed by field (or `{field}_from`/`{field}_to`).
///
/// A missing key means "no constraint"; empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveFilterMap {
    entries: BTreeMap<String, String>,
}

impl ActiveFilterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value; blank values remove the key instead.
    pub fn set(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let key = key.into();
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value.to_string());
        }
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the number of active filters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Builds one badge per active entry.
    pub fn badges(&self, specs: &[FilterSpec]) -> Vec<FilterBadge> {
        self.iter()
            .map(|(key, value)| FilterBadge::describe(key, value, specs))
            .collect()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for ActiveFilterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

/// A displayable chip for one active filter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBadge {
    /// Map key the badge removes when dismissed.
    pub key: String,
    /// Filter label.
    pub label: String,
    /// Displayed value.
    pub display: String,
}

impl FilterBadge {
    fn describe(key: &str, value: &str, specs: &[FilterSpec]) -> Self {
        let spec = specs.iter().find(|s| s.keys().iter().any(|k| k == key));
        let (label, display) = match spec {
            Some(spec) if spec.kind == FilterKind::Select => (
                spec.display_label().to_string(),
                spec.option_label(value).unwrap_or(value).to_string(),
            ),
            Some(spec) if spec.kind == FilterKind::DateRange => {
                let bound = if key.ends_with(RANGE_FROM) { "from" } else { "to" };
                (spec.display_label().to_string(), format!("{} {}", bound, value))
            }
            Some(spec) => (spec.display_label().to_string(), value.to_string()),
            None => (key.to_string(), value.to_string()),
        };
        Self {
            key: key.to_string(),
            label,
            display,
        }
    }
}

impl fmt::Display for FilterBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.display)
    }
}

/// Receives the full filter map when the panel is applied or cleared.
pub type FilterListener = Arc<dyn Fn(&ActiveFilterMap) + Send + Sync>;

/// Receives an inline filter change: the field and its new value (`None` when cleared).
pub type InlineFilterListener = Arc<dyn Fn(&str, Option<&str>) + Send + Sync>;

/// The advanced filter panel.
///
/// Edits accumulate in a draft and only take effect on [`apply`](Self::apply),
/// which emits the whole map at once. [`clear`](Self::clear) empties both the
/// draft and the applied map and emits immediately.
pub struct FilterPanel {
    specs: Vec<FilterSpec>,
    draft: ActiveFilterMap,
    applied: ActiveFilterMap,
    on_filter: Option<FilterListener>,
}

impl FilterPanel {
    /// Creates a panel for the given filters.
    pub fn new(specs: Vec<FilterSpec>) -> Self {
        Self {
            specs,
            draft: ActiveFilterMap::new(),
            applied: ActiveFilterMap::new(),
            on_filter: None,
        }
    }

    /// Registers the listener called on apply and clear.
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&ActiveFilterMap) + Send + Sync + 'static,
    {
        self.on_filter = Some(Arc::new(listener));
        self
    }

    /// Returns the filter declarations.
    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    /// Edits the draft. Keys not declared by any spec are ignored.
    pub fn set_value(&mut self, key: &str, value: &str) {
        if !self.specs.iter().any(|s| s.keys().iter().any(|k| k == key)) {
            warn!("ignoring value for undeclared filter '{}'", key);
            return;
        }
        self.draft.set(key, value);
    }

    /// Commits the draft and emits it.
    pub fn apply(&mut self) -> &ActiveFilterMap {
        self.applied = self.draft.clone();
        debug!("applying {} filter(s)", self.applied.len());
        self.emit();
        &self.applied
    }

    /// Clears every filter and emits the empty map.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.applied.clear();
        self.emit();
    }

    /// Drops unapplied edits.
    pub fn discard(&mut self) {
        self.draft = self.applied.clone();
    }

    /// Removes one applied entry (a dismissed badge) and emits.
    pub fn remove(&mut self, key: &str) {
        if self.applied.remove(key).is_some() {
            self.draft.remove(key);
            self.emit();
        }
    }

    /// Returns the unapplied edits.
    pub fn draft(&self) -> &ActiveFilterMap {
        &self.draft
    }

    /// Returns the applied filters.
    pub fn applied(&self) -> &ActiveFilterMap {
        &self.applied
    }

    /// Returns the number of applied filters.
    pub fn active_count(&self) -> usize {
        self.applied.len()
    }

    /// Returns the badges of the applied filters.
    pub fn badges(&self) -> Vec<FilterBadge> {
        self.applied.badges(&self.specs)
    }

    fn emit(&self) {
        if let Some(listener) = &self.on_filter {
            listener(&self.applied);
        }
    }
}

impl fmt::Debug for FilterPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPanel")
            .field("specs", &self.specs)
            .field("draft", &self.draft)
            .field("applied", &self.applied)
            .finish()
    }
}

/// Always-visible single-select facets such as "status".
///
/// Every change is emitted immediately; there is no apply step.
#[derive(Default)]
pub struct InlineFilters {
    values: ActiveFilterMap,
    on_change: Option<InlineFilterListener>,
}

impl InlineFilters {
    /// Creates an empty set of inline filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the change listener.
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&str, Option<&str>) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(listener));
        self
    }

    /// Sets a facet value and emits it. A blank value clears the facet.
    pub fn set(&mut self, field: &str, value: &str) {
        self.values.set(field, value);
        if let Some(listener) = &self.on_change {
            listener(field, self.values.get(field));
        }
    }

    /// Returns the current facet values.
    pub fn values(&self) -> &ActiveFilterMap {
        &self.values
    }
}

impl fmt::Debug for InlineFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineFilters")
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::new("name", FilterKind::Text),
            FilterSpec::select(
                "status",
                vec![
                    FilterOption::new("active", "Active"),
                    FilterOption::new("paused", "Paused"),
                ],
            ),
            FilterSpec::new("created", FilterKind::DateRange).with_label("Created"),
        ]
    }

    #[test]
    fn test_blank_value_removes_key() {
        let mut map = ActiveFilterMap::new();
        map.set("status", "active");
        assert_eq!(map.len(), 1);
        map.set("status", "  ");
        assert!(map.is_empty());
    }

    #[test]
    fn test_text_and_select_matching() {
        let specs = specs();
        let filters: ActiveFilterMap = [("name", "JAN"), ("status", "Active")].into_iter().collect();
        assert!(specs[0].matches(&Value::from("Jane Doe"), &filters));
        assert!(!specs[0].matches(&Value::from("Bob"), &filters));
        assert!(specs[1].matches(&Value::from("active"), &filters));
        assert!(!specs[1].matches(&Value::from("inactive"), &filters));
        assert!(specs[1].matches(
            &Value::List(vec![Value::from("paused"), Value::from("active")]),
            &filters
        ));
    }

    #[test]
    fn test_date_range_matching() {
        let spec = &specs()[2];
        let filters: ActiveFilterMap =
            [("created_from", "2024-01-01"), ("created_to", "2024-01-31")].into_iter().collect();
        assert!(spec.matches(&Value::from("2024-01-31T23:00:00Z"), &filters));
        assert!(spec.matches(&Value::from("2024-01-01"), &filters));
        assert!(!spec.matches(&Value::from("2024-02-01"), &filters));
        assert!(!spec.matches(&Value::Null, &filters));

        let open_ended: ActiveFilterMap = [("created_from", "2024-01-15")].into_iter().collect();
        assert!(spec.matches(&Value::from("2030-01-01"), &open_ended));
        assert!(spec.matches(&Value::Null, &ActiveFilterMap::new()));
    }

    #[test]
    fn test_badges() {
        let specs = specs();
        let filters: ActiveFilterMap =
            [("status", "paused"), ("created_from", "2024-01-01"), ("other", "x")]
                .into_iter()
                .collect();
        let badges: Vec<String> = filters.badges(&specs).iter().map(|b| b.to_string()).collect();
        assert_eq!(
            badges,
            vec!["Created: from 2024-01-01", "other: x", "status: Paused"]
        );
    }

    #[test]
    fn test_panel_batches_until_apply() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let mut panel = FilterPanel::new(specs())
            .with_listener(move |map| sink.lock().unwrap().push(map.len()));

        panel.set_value("name", "jane");
        panel.set_value("status", "active");
        panel.set_value("unknown", "x");
        assert!(emitted.lock().unwrap().is_empty());
        assert_eq!(panel.active_count(), 0);

        panel.apply();
        assert_eq!(*emitted.lock().unwrap(), vec![2]);

        panel.set_value("name", "");
        panel.discard();
        assert_eq!(panel.draft().get("name"), Some("jane"));

        panel.clear();
        assert_eq!(*emitted.lock().unwrap(), vec![2, 0]);
        assert_eq!(panel.active_count(), 0);
    }

    #[test]
    fn test_inline_filters_emit_immediately() {
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let mut inline = InlineFilters::new().with_listener(move |field, value| {
            sink.lock()
                .unwrap()
                .push((field.to_string(), value.map(str::to_string)))
        });

        inline.set("status", "active");
        inline.set("status", "");
        assert_eq!(
            *emitted.lock().unwrap(),
            vec![
                ("status".to_string(), Some("active".to_string())),
                ("status".to_string(), None),
            ]
        );
        assert!(inline.values().is_empty());
    }
}
