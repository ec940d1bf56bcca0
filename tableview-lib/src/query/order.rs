//! Sort state and the stable, nulls-last row ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnSet;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// The single active sort. A `None` key means insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Column key being sorted on.
    pub key: Option<String>,
    /// Direction of the sort.
    pub direction: Option<Direction>,
}

impl SortState {
    /// Insertion order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Sorts by `key` in `direction`.
    pub fn by(key: impl Into<String>, direction: Direction) -> Self {
        Self {
            key: Some(key.into()),
            direction: Some(direction),
        }
    }

    /// Returns `true` if this sorts on `key`.
    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// Returns `true` if no key is set.
    pub fn is_unsorted(&self) -> bool {
        self.key.is_none()
    }
}

impl FromStr for SortState {
    type Err = String;

    /// Parses `key`, `key:asc` or `key:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = match s.split_once(':') {
            Some((key, "asc")) => (key, Direction::Asc),
            Some((key, "desc")) => (key, Direction::Desc),
            Some((_, other)) => return Err(format!("unknown sort direction '{}'", other)),
            None => (s, Direction::Asc),
        };
        if key.trim().is_empty() {
            return Err("sort key must not be empty".to_string());
        }
        Ok(Self::by(key.trim(), direction))
    }
}

/// Next sort state after clicking the header of `key`.
///
/// A new key starts ascending; the same key flips direction. Once a key
/// has been clicked, header clicks never return to the unsorted state.
///
/// ```
/// use tableview_lib::query::{toggle_sort, Direction, SortState};
///
/// let once = toggle_sort(&SortState::unsorted(), "followers");
/// let twice = toggle_sort(&once, "followers");
/// assert_eq!(twice, SortState::by("followers", Direction::Desc));
/// assert_eq!(toggle_sort(&twice, "followers"), once);
/// ```
pub fn toggle_sort(current: &SortState, key: &str) -> SortState {
    match current.direction {
        Some(direction) if current.is_sorted_by(key) => SortState::by(key, direction.flip()),
        _ => SortState::by(key, Direction::Asc),
    }
}

/// Orders two non-empty values.
///
/// Numbers compare numerically, date-times chronologically, anything else
/// as case-insensitive text. Mixed columns group by class: numbers first,
/// then date-times, then text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => sort_class(a)
                .cmp(&sort_class(b))
                .then_with(|| compare_text(&a.to_string(), &b.to_string())),
        },
    }
}

fn sort_class(value: &Value) -> u8 {
    if value.as_f64().is_some() {
        0
    } else if matches!(value, Value::DateTime(_)) {
        1
    } else {
        2
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Orders two values in `direction`, keeping empty values last either way.
pub fn compare_directed(a: &Value, b: &Value, direction: Direction) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            Direction::Asc => compare_values(a, b),
            Direction::Desc => compare_values(a, b).reverse(),
        },
    }
}

/// Sorts rows by the column named in `sort`.
///
/// The sort is stable. Rows whose value is missing go last in both
/// directions. An unsorted state, an unknown key, or an unsortable column
/// leaves the input order untouched.
pub fn sort_rows<'a, T, I>(rows: I, sort: &SortState, columns: &ColumnSet<T>) -> Vec<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    T: 'a,
{
    let rows: Vec<&'a T> = rows.into_iter().collect();
    let Some(key) = sort.key.as_deref() else {
        return rows;
    };
    let Some(column) = columns.get(key) else {
        warn!("ignoring sort by unknown column '{}'", key);
        return rows;
    };
    if !column.sortable() {
        warn!("ignoring sort by unsortable column '{}'", key);
        return rows;
    }

    let direction = sort.direction.unwrap_or(Direction::Asc);
    let mut keyed: Vec<(Value, &'a T)> = rows
        .into_iter()
        .map(|row| (column.sort_value(row), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_directed(a, b, direction));
    keyed.into_iter().map(|(_, row)| row).collect()
}
