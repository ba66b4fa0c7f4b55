//! CLI command implementations

pub mod common;

pub mod category;
pub mod group;
pub mod init;
pub mod machine;
pub mod model;
pub mod option;
pub mod preset;
pub mod query;
pub mod spec;
pub mod tool;
