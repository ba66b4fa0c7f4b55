//! Entity type definitions
//!
//! The taxonomy is made of the following record types:
//!
//! **Category structure:**
//! - [`Category`] - Nodes of the category graph (primary and alternate parent)
//! - [`SpecificationGroup`] - Equipment or technical-detail groups of a category
//! - [`Specification`] - Typed attributes, with type-specific options
//! - [`EnumOption`] - Options of `Enum Plus` specifications
//!
//! **Machines:**
//! - [`Model`] - Machine models of a category
//! - [`Machine`] - Concrete machines built from one or more model instances
//! - [`MachineModelInstance`] - One physical unit inside a machine
//! - [`MachineSpecificationValue`] - Value of a specification for an instance
//!
//! **Constraints:**
//! - [`SpecificationPreset`] - Category- or model-level allowed values

pub mod category;
pub mod enum_option;
pub mod machine;
pub mod model;
pub mod preset;
pub mod specification;
pub mod specification_group;
pub mod value;

pub use category::{Category, CategoryPatch, NewCategory};
pub use enum_option::{EnumOption, EnumOptionPatch, NewEnumOption};
pub use machine::{
    Machine, MachineModelInstance, MachinePatch, MachineStatus, ModelInstancePatch, NewMachine,
    NewModelInstance,
};
pub use model::{Model, ModelPatch, NewModel};
pub use preset::{
    AllowedValues, NewSpecificationPreset, PresetLevel, SpecificationPreset,
    SpecificationPresetPatch,
};
pub use specification::{
    NewSpecification, RangeType, Specification, SpecificationPatch, SpecificationType, TypeOptions,
};
pub use specification_group::{
    GroupType, NewSpecificationGroup, SpecificationGroup, SpecificationGroupPatch,
};
pub use value::{
    MachineSpecificationValue, NewSpecificationValue, SpecificationValue, YesNo,
};
