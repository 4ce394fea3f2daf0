//! Domain models for the migration pipeline.

mod legacy;
mod summary;
mod target;

pub use legacy::*;
pub use summary::*;
pub use target::*;
