//! Column descriptors and visibility

mod descriptor;
mod visibility;

pub use descriptor::*;
pub use visibility::*;
