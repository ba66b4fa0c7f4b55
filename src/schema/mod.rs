//! Schema system - embedded JSON Schemas and discriminated validation

pub mod registry;
pub mod validator;
pub mod variants;

pub use registry::SchemaRegistry;
pub use validator::{finish, Mode, Validator};
