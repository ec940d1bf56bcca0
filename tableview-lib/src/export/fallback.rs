//! Ordered accessor strategies.

use std::fmt;
use std::sync::Arc;

use crate::model::Record;
use crate::model::Value;

/// One strategy in a [`FallbackChain`].
pub type Strategy<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// Tries accessors in priority order; the first non-empty result wins.
///
/// Backend payloads often carry the same metric under several shapes
/// (`metrics.followers`, `stats.followers`, `followers`). Rather than
/// branching per field, declare the candidates once:
///
/// ```
/// use tableview_lib::export::FallbackChain;
/// use tableview_lib::model::{Record, Value};
///
/// let chain = FallbackChain::paths(["metrics.followers", "followers"]);
///
/// let flat = Record::new().with("followers", 900i64);
/// assert_eq!(chain.resolve(&flat), Value::Int(900));
///
/// let empty = Record::new();
/// assert_eq!(chain.resolve(&empty), Value::Null);
/// ```
pub struct FallbackChain<T> {
    strategies: Vec<Strategy<T>>,
}

impl<T> FallbackChain<T> {
    /// Creates an empty chain. An empty chain always resolves to `Null`.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy with lower priority than the existing ones.
    pub fn then<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Resolves the first non-empty value, or `Null`.
    pub fn resolve(&self, row: &T) -> Value {
        self.strategies
            .iter()
            .filter_map(|strategy| strategy(row))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// Returns the number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns `true` if the chain has no strategies.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl FallbackChain<Record> {
    /// Builds a chain over dotted record paths.
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().fold(Self::new(), |chain, path| {
            let path: String = path.into();
            chain.then(move |row: &Record| row.get_path(&path).cloned())
        })
    }
}

impl<T> Default for FallbackChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FallbackChain<T> {
    fn clone(&self) -> Self {
        Self {
            strategies: self.strategies.clone(),
        }
    }
}

impl<T> fmt::Debug for FallbackChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}
