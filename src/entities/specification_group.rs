//! Specification group entity type - groups specifications within a category

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity, Multilingual};
use crate::core::identity::{EntityKind, Uid};

/// Kind of specification group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    Equipment,
    #[serde(rename = "Technical Details", alias = "TechnicalDetails")]
    TechnicalDetails,
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupType::Equipment => write!(f, "Equipment"),
            GroupType::TechnicalDetails => write!(f, "Technical Details"),
        }
    }
}

/// A SpecificationGroup entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationGroup {
    pub uid: Uid,
    pub name: String,
    pub category_uid: Uid,
    pub label: Multilingual,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,

    #[serde(rename = "type")]
    pub group_type: GroupType,

    #[serde(default)]
    pub position_rank: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for SpecificationGroup {
    const KIND: EntityKind = EntityKind::SpecificationGroup;

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
pub struct NewSpecificationGroup {
    pub name: String,
    pub category_uid: Uid,
    pub label: Multilingual,
    #[serde(default)]
    pub internal_description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    #[serde(default)]
    pub position_rank: i64,
}

impl NewSpecificationGroup {
    pub fn into_entity(self) -> SpecificationGroup {
        let ts = now();
        SpecificationGroup {
            uid: Uid::new(),
            name: self.name,
            category_uid: self.category_uid,
            label: self.label,
            internal_description: self.internal_description,
            group_type: self.group_type,
            position_rank: self.position_rank,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationGroupPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<GroupType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_rank: Option<i64>,
}
