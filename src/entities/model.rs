//! Model entity type - a machine model sold by a manufacturer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity};
use crate::core::identity::{EntityKind, Uid};

/// A Model entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub uid: Uid,
    pub name: String,
    pub category_uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_uid: Option<Uid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Model {
    const KIND: EntityKind = EntityKind::Model;

    fn uid(&self) -> &Uid {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewModel {
    pub name: String,
    pub category_uid: Uid,
    #[serde(default)]
    pub manufacturer_uid: Option<Uid>,
}

impl NewModel {
    pub fn into_entity(self) -> Model {
        let ts = now();
        Model {
            uid: Uid::new(),
            name: self.name,
            category_uid: self.category_uid,
            manufacturer_uid: self.manufacturer_uid,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_uid: Option<Uid>,
}
