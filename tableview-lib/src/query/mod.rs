//! Search, filtering, sorting and pagination.

mod filter;
mod order;
mod page;
mod search;

pub use filter::*;
pub use order::*;
pub use page::*;
pub use search::*;
