//! Row and value types

mod record;
mod value;

pub use record::*;
pub use value::*;

/// Marker for types that can be shown as table rows.
///
/// Rows are opaque to the pipeline: columns reach into them through their
/// accessors, so the only requirement is that a row can be cloned and
/// shared across tasks.
pub trait Row: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Row for T {}
