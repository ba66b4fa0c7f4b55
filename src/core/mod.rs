//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod logging;
pub mod project;
pub mod store;

pub use config::Config;
pub use entity::{Entity, Multilingual};
pub use error::{Result, TaxonomyError, Violation};
pub use identity::{EntityKind, IdParseError, Uid};
pub use project::{Project, ProjectError};
pub use store::Store;
