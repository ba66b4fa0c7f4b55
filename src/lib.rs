//! taxo: machine taxonomy toolkit
//!
//! Categories, specification groups, typed specifications, enum options,
//! models, presets and machines, stored as plain JSON collections and
//! guarded by schema validation and referential-integrity rules.

pub mod catalog;
pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod tools;
