//! CLI command implementations

pub mod build;
pub mod clean;
pub mod hydrate;
pub mod list;
pub mod new;
