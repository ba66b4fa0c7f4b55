//! Enum option entity type - a selectable option of an `Enum Plus` specification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity, Multilingual};
use crate::core::identity::{EntityKind, Uid};

/// An EnumOption entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub uid: Uid,
    pub name: String,
    pub specification_uid: Uid,
    pub label: Multilingual,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Multilingual>,

    /// Manufacturers allowed to use this option; empty means all
    #[serde(default)]
    pub manufacturers_using: Vec<Uid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnumOption {
    /// Whether a manufacturer may use this option
    pub fn usable_by(&self, manufacturer: &Uid) -> bool {
        self.manufacturers_using.is_empty() || self.manufacturers_using.contains(manufacturer)
    }
}

impl Entity for EnumOption {
    const KIND: EntityKind = EntityKind::EnumOption;

    fn uid(&self) -> &Uid {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> Option<&Multilingual> {
        Some(&self.label)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEnumOption {
    pub name: String,
    pub specification_uid: Uid,
    pub label: Multilingual,
    #[serde(default)]
    pub internal_description: Option<String>,
    #[serde(default)]
    pub description: Option<Multilingual>,
    #[serde(default)]
    pub manufacturers_using: Vec<Uid>,
}

impl NewEnumOption {
    pub fn into_entity(self) -> EnumOption {
        let ts = now();
        EnumOption {
            uid: Uid::new(),
            name: self.name,
            specification_uid: self.specification_uid,
            label: self.label,
            internal_description: self.internal_description,
            description: self.description,
            manufacturers_using: self.manufacturers_using,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumOptionPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturers_using: Option<Vec<Uid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manufacturer_list_means_everyone() {
        let mut option = NewEnumOption {
            name: "pur".to_string(),
            specification_uid: Uid::new(),
            label: Multilingual::en("PUR"),
            internal_description: None,
            description: None,
            manufacturers_using: Vec::new(),
        }
        .into_entity();
        let maker = Uid::new();
        assert!(option.usable_by(&maker));

        option.manufacturers_using = vec![Uid::new()];
        assert!(!option.usable_by(&maker));
    }
}
