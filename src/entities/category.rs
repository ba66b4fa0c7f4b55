//! Category entity type - nodes of the category graph
//!
//! A category has two independent parent pointers: the primary placement
//! (`parent_category_uid`) and an alternate placement
//! (`alt_parent_category_uid`), each with its own position rank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity, Multilingual};
use crate::core::identity::{EntityKind, Uid};

/// A Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub uid: Uid,

    /// Internal name (e.g. "perfect-binders")
    pub name: String,

    /// Public multilingual label
    pub label: Multilingual,

    /// Internal description, never shown publicly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,

    /// Primary parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_uid: Option<Uid>,

    /// Alternate parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_parent_category_uid: Option<Uid>,

    /// Sort rank under the primary parent
    #[serde(default)]
    pub position_rank: i64,

    /// Sort rank under the alternate parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_position_rank: Option<i64>,

    /// Organizational grouping rather than a holder of models
    #[serde(rename = "isMetaCategory", default)]
    pub is_meta_category: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;

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

/// Validated input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub label: Multilingual,
    #[serde(default)]
    pub internal_description: Option<String>,
    #[serde(default)]
    pub parent_category_uid: Option<Uid>,
    #[serde(default)]
    pub alt_parent_category_uid: Option<Uid>,
    #[serde(default)]
    pub position_rank: i64,
    #[serde(default)]
    pub alt_position_rank: Option<i64>,
    #[serde(rename = "isMetaCategory", default)]
    pub is_meta_category: bool,
}

impl NewCategory {
    pub fn into_entity(self) -> Category {
        let ts = now();
        Category {
            uid: Uid::new(),
            name: self.name,
            label: self.label,
            internal_description: self.internal_description,
            parent_category_uid: self.parent_category_uid,
            alt_parent_category_uid: self.alt_parent_category_uid,
            position_rank: self.position_rank,
            alt_position_rank: self.alt_position_rank,
            is_meta_category: self.is_meta_category,
            created_at: ts,
            updated_at: ts,
        }
    }
}

/// Validated partial update of a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_parent_category_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_position_rank: Option<i64>,
    #[serde(
        rename = "isMetaCategory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_meta_category: Option<bool>,
}
