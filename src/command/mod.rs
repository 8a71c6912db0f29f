//! Command registration and hypothesis matching.

pub mod matcher;
pub mod registry;
pub mod table;
