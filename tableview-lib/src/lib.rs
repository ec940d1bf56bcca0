//! Tabular data view library
//!
//! Search, filtering, sorting, pagination, column visibility and export for
//! in-memory row collections.

pub mod capabilities;
pub mod column;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod model;
pub mod optimistic;
pub mod query;

mod view;

pub use view::*;
