//! Entity identity: collection kinds and record UIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// The nine collections making up a taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Category (node in the two-parent category graph)
    Category,
    /// Specification group within a category
    SpecificationGroup,
    /// Specification within a group
    Specification,
    /// Selectable option of an `Enum Plus` specification
    EnumOption,
    /// Machine model
    Model,
    /// Category- or model-level constraint on a specification
    SpecificationPreset,
    /// Concrete machine
    Machine,
    /// Physical unit of a model inside a machine
    MachineModelInstance,
    /// Value of one specification for one machine model instance
    MachineSpecificationValue,
}

impl EntityKind {
    /// Collection name, also the stem of the collection file
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Category => "categories",
            EntityKind::SpecificationGroup => "specification-groups",
            EntityKind::Specification => "specifications",
            EntityKind::EnumOption => "enum-options",
            EntityKind::Model => "models",
            EntityKind::SpecificationPreset => "specification-presets",
            EntityKind::Machine => "machines",
            EntityKind::MachineModelInstance => "machine-model-instances",
            EntityKind::MachineSpecificationValue => "machine-specification-values",
        }
    }

    /// Human readable singular noun
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::SpecificationGroup => "specification group",
            EntityKind::Specification => "specification",
            EntityKind::EnumOption => "enum option",
            EntityKind::Model => "model",
            EntityKind::SpecificationPreset => "specification preset",
            EntityKind::Machine => "machine",
            EntityKind::MachineModelInstance => "machine model instance",
            EntityKind::MachineSpecificationValue => "machine specification value",
        }
    }

    /// File name of the collection inside the data directory
    pub fn file_name(&self) -> String {
        format!("{}.json", self.collection())
    }

    /// All collection kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Category,
            EntityKind::SpecificationGroup,
            EntityKind::Specification,
            EntityKind::EnumOption,
            EntityKind::Model,
            EntityKind::SpecificationPreset,
            EntityKind::Machine,
            EntityKind::MachineModelInstance,
            EntityKind::MachineSpecificationValue,
        ]
    }

    /// Kinds whose rows carry their own `uid`
    pub fn identified() -> impl Iterator<Item = EntityKind> {
        Self::all()
            .iter()
            .copied()
            .filter(|k| *k != EntityKind::MachineSpecificationValue)
    }

    /// Kinds searched when the caller does not pick any
    pub fn default_search() -> &'static [EntityKind] {
        &[
            EntityKind::Category,
            EntityKind::SpecificationGroup,
            EntityKind::Specification,
            EntityKind::Model,
            EntityKind::Machine,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.noun())
    }
}

impl FromStr for EntityKind {
    type Err = IdParseError;

    /// Accepts collection names, singular names and the short CLI aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "categories" | "category" | "cat" => Ok(EntityKind::Category),
            "specification-groups" | "specification-group" | "group" | "groups" => {
                Ok(EntityKind::SpecificationGroup)
            }
            "specifications" | "specification" | "spec" | "specs" => Ok(EntityKind::Specification),
            "enum-options" | "enum-option" | "option" | "options" => Ok(EntityKind::EnumOption),
            "models" | "model" => Ok(EntityKind::Model),
            "specification-presets" | "specification-preset" | "preset" | "presets" => {
                Ok(EntityKind::SpecificationPreset)
            }
            "machines" | "machine" => Ok(EntityKind::Machine),
            "machine-model-instances" | "machine-model-instance" | "instance" | "instances" => {
                Ok(EntityKind::MachineModelInstance)
            }
            "machine-specification-values" | "machine-specification-value" | "value" | "values" => {
                Ok(EntityKind::MachineSpecificationValue)
            }
            _ => Err(IdParseError::UnknownKind(s.to_string())),
        }
    }
}

/// Opaque record identifier
///
/// New identifiers are ULIDs; identifiers already present in collection files
/// (for example UUIDs) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Parse a user supplied identifier (ULID or canonical UUID)
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Uid {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Uid {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl FromStr for Uid {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if Ulid::from_string(s).is_ok() || is_uuid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(IdParseError::Malformed(s.to_string()))
        }
    }
}

fn is_uuid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Errors that can occur when parsing kinds or identifiers
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("unknown entity kind: '{0}'")]
    UnknownKind(String),

    #[error("identifier must not be empty")]
    Empty,

    #[error("malformed identifier '{0}' (expected a ULID or UUID)")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_generation_is_ulid() {
        let uid = Uid::new();
        assert_eq!(uid.as_str().len(), 26);
        assert!(Uid::parse(uid.as_str()).is_ok());
    }

    #[test]
    fn test_uid_accepts_uuid() {
        let uid = Uid::parse("3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b").unwrap();
        assert_eq!(uid.as_str(), "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b");
    }

    #[test]
    fn test_uid_rejects_garbage() {
        assert!(matches!(Uid::parse(""), Err(IdParseError::Empty)));
        assert!(matches!(
            Uid::parse("not-an-id"),
            Err(IdParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!("categories".parse::<EntityKind>().unwrap(), EntityKind::Category);
        assert_eq!("spec".parse::<EntityKind>().unwrap(), EntityKind::Specification);
        assert_eq!(
            "specification_groups".parse::<EntityKind>().unwrap(),
            EntityKind::SpecificationGroup
        );
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_every_kind_parses_from_collection_name() {
        for kind in EntityKind::all() {
            assert_eq!(kind.collection().parse::<EntityKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_identified_excludes_values() {
        assert_eq!(EntityKind::identified().count(), 8);
        assert!(!EntityKind::identified().any(|k| k == EntityKind::MachineSpecificationValue));
    }
}
