//! Debounced free-text search.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::TableConfig;
use crate::debounce::Debouncer;

/// Receives the normalized search query.
pub type SearchListener = Arc<dyn Fn(String) + Send + Sync>;

/// Holds the search text and emits it after typing pauses.
///
/// The text is stored immediately so it can be displayed; the listener only
/// hears about it once the quiet period has passed since the last keystroke.
/// Clearing the field is reported right away.
///
/// # Example
///
/// ```ignore
/// let mut search = SearchBox::new(Duration::from_millis(500), |query| {
///     println!("searching for {query}");
/// });
/// search.set_query("j");
/// search.set_query("ja");   // cancels "j"
/// search.set_query("");     // emits "" synchronously
/// ```
pub struct SearchBox {
    query: String,
    debouncer: Debouncer,
    on_search: SearchListener,
}

impl SearchBox {
    /// Creates a search box with the given quiet period.
    pub fn new<F>(delay: Duration, on_search: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(delay),
            on_search: Arc::new(on_search),
        }
    }

    /// Creates a search box using the configured debounce.
    pub fn from_config<F>(config: &TableConfig, on_search: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self::new(config.search_debounce(), on_search)
    }

    /// Updates the text and schedules the search.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        let normalized = self.query.trim().to_string();

        if normalized.is_empty() {
            self.debouncer.cancel();
            debug!("search cleared");
            (self.on_search)(String::new());
            return;
        }

        let listener = Arc::clone(&self.on_search);
        self.debouncer.call(move || listener(normalized));
    }

    /// Clears the text, emitting the empty query immediately.
    pub fn clear(&mut self) {
        self.set_query("");
    }

    /// Returns the text as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns `true` while a search is waiting for the quiet period.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl fmt::Debug for SearchBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBox")
            .field("query", &self.query)
            .field("debouncer", &self.debouncer)
            .finish()
    }
}
