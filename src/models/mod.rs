//! Data models

pub mod decision;
pub mod importance;

pub use decision::*;
pub use importance::*;
