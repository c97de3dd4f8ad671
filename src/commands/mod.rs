//! CLI command implementations.

pub mod collect;

pub use collect::{CollectCommand, CollectReport};
