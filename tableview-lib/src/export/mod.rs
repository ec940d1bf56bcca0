//! Flattening and exporting table data.
//!
//! Rows are flattened into [`FlatRecord`]s using the same column descriptors
//! the table renders with, then handed to a [`WorkbookWriter`].

mod fallback;
mod flatten;
mod format;
mod sheet;
mod writer;

pub use fallback::*;
pub use flatten::*;
pub use format::*;
pub use sheet::*;
pub use writer::*;
