//! CLI presentation layer

pub mod merge;
pub mod style;
