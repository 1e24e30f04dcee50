//! Shared identifier types for the command pipeline workspace.

pub mod types;

pub use types::AggregateId;
