//! Column visibility with an optional allow-list.

use std::collections::BTreeSet;
use std::collections::HashSet;

use log::warn;

/// An externally supplied allow-list of columns.
///
/// Public share-link views receive the set of columns an administrator has
/// approved; nothing outside it may ever be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovedColumnSet {
    keys: BTreeSet<String>,
}

impl ApprovedColumnSet {
    /// Creates an allow-list from keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the key is approved.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns the number of approved keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing is approved.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Whether an allow-list restricts the columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnAccess {
    /// Every column in the superset may be toggled.
    Unrestricted,
    /// Only approved columns may appear.
    Restricted(ApprovedColumnSet),
}

/// Result of a visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The column is now visible.
    Shown,
    /// The column is now hidden.
    Hidden,
    /// The toggle was refused and nothing changed.
    Rejected,
}

/// Tracks which columns out of a known superset are displayed.
///
/// When restricted, the visible set is always a subset of the allow-list;
/// the invariant is re-established whenever the allow-list changes.
///
/// # Example
///
/// ```
/// use tableview_lib::column::{ApprovedColumnSet, ColumnVisibility, ToggleOutcome};
///
/// let mut columns = ColumnVisibility::restricted(
///     ["name", "followers", "email"],
///     ApprovedColumnSet::new(["name", "followers"]),
///     None,
/// );
///
/// assert_eq!(columns.visible_keys(), vec!["name", "followers"]);
/// assert_eq!(columns.toggle("email"), ToggleOutcome::Rejected);
/// assert_eq!(columns.toggle("followers"), ToggleOutcome::Hidden);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnVisibility {
    superset: Vec<String>,
    visible: HashSet<String>,
    initial: HashSet<String>,
    access: ColumnAccess,
}

impl ColumnVisibility {
    /// Creates an unrestricted manager with the given default-visible keys.
    ///
    /// Defaults that are not part of the superset are ignored.
    pub fn new<I, S, D, K>(superset: I, defaults: D) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        D: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let superset: Vec<String> = superset.into_iter().map(Into::into).collect();
        let visible: HashSet<String> = defaults
            .into_iter()
            .map(Into::into)
            .filter(|key| superset.contains(key))
            .collect();
        Self {
            superset,
            initial: visible.clone(),
            visible,
            access: ColumnAccess::Unrestricted,
        }
    }

    /// Creates a restricted manager.
    ///
    /// The initial visible set is every approved column, unless a preference
    /// list is given, in which case it is the preference intersected with the
    /// allow-list.
    pub fn restricted<I, S>(
        superset: I,
        allow_list: ApprovedColumnSet,
        preference: Option<&[&str]>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let superset: Vec<String> = superset.into_iter().map(Into::into).collect();
        let visible: HashSet<String> = superset
            .iter()
            .filter(|key| allow_list.contains(key))
            .filter(|key| preference.is_none_or(|pref| pref.contains(&key.as_str())))
            .cloned()
            .collect();
        Self {
            superset,
            initial: visible.clone(),
            visible,
            access: ColumnAccess::Restricted(allow_list),
        }
    }

    /// Returns the current access mode.
    pub fn access(&self) -> &ColumnAccess {
        &self.access
    }

    /// Returns `true` when restricted and no column is available.
    ///
    /// That covers an empty allow-list as well as one naming only unknown
    /// columns. Callers should render a permission message instead of an
    /// empty table.
    pub fn is_access_restricted(&self) -> bool {
        matches!(self.access, ColumnAccess::Restricted(_)) && self.available().is_empty()
    }

    /// Returns `true` if the key may be shown under the current access mode.
    pub fn is_allowed(&self, key: &str) -> bool {
        if !self.superset.iter().any(|k| k == key) {
            return false;
        }
        match &self.access {
            ColumnAccess::Unrestricted => true,
            ColumnAccess::Restricted(allow) => allow.contains(key),
        }
    }

    /// Returns the keys the UI may offer, in superset order.
    pub fn available(&self) -> Vec<&str> {
        self.superset
            .iter()
            .map(String::as_str)
            .filter(|key| self.is_allowed(key))
            .collect()
    }

    /// Returns the visible keys, in superset order.
    pub fn visible_keys(&self) -> Vec<&str> {
        self.superset
            .iter()
            .map(String::as_str)
            .filter(|key| self.visible.contains(*key))
            .collect()
    }

    /// Returns `true` if the column is currently visible.
    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    /// Flips a column's visibility.
    ///
    /// Unknown or disallowed keys are logged and ignored.
    pub fn toggle(&mut self, key: &str) -> ToggleOutcome {
        if !self.is_allowed(key) {
            warn!("ignoring visibility toggle for column '{}': not available", key);
            return ToggleOutcome::Rejected;
        }
        if self.visible.remove(key) {
            ToggleOutcome::Hidden
        } else {
            self.visible.insert(key.to_string());
            ToggleOutcome::Shown
        }
    }

    /// Shows every available column.
    pub fn show_all(&mut self) {
        self.visible = self.available().into_iter().map(str::to_string).collect();
    }

    /// Restores the initial visible set, minus anything now disallowed.
    pub fn reset(&mut self) {
        self.visible = self.initial.clone();
        self.enforce();
    }

    /// Replaces the allow-list, e.g. after a data reload.
    ///
    /// `None` lifts the restriction. Keys that are no longer approved are
    /// dropped from the visible set.
    pub fn set_allow_list(&mut self, allow_list: Option<ApprovedColumnSet>) {
        self.access = match allow_list {
            Some(allow) => ColumnAccess::Restricted(allow),
            None => ColumnAccess::Unrestricted,
        };
        self.enforce();
    }

    fn enforce(&mut self) {
        if let ColumnAccess::Restricted(allow) = &self.access {
            self.visible.retain(|key| allow.contains(key));
        }
    }
}
