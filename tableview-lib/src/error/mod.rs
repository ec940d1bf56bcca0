//! Error types

mod column;
mod config;
mod export;
mod optimistic;
mod page;

pub use column::*;
pub use config::*;
pub use export::*;
pub use optimistic::*;
pub use page::*;
