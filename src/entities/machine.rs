//! Machine and machine model instance entity types
//!
//! A machine is one or more physical units. Each unit is a
//! [`MachineModelInstance`] bound to a model at a position; position 0 is the
//! primary unit and always carries the machine's primary model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity};
use crate::core::identity::{EntityKind, Uid};

/// Position of the primary instance
pub const PRIMARY_POSITION: u32 = 0;

/// Publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineStatus::Draft => write!(f, "draft"),
            MachineStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for MachineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(MachineStatus::Draft),
            "published" => Ok(MachineStatus::Published),
            _ => Err(format!("Unknown machine status: {}. Use draft or published", s)),
        }
    }
}

/// A Machine entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub uid: Uid,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_construction: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    pub primary_model_uid: Uid,

    #[serde(default)]
    pub status: MachineStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Machine {
    const KIND: EntityKind = EntityKind::Machine;

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
pub struct NewMachine {
    pub name: String,
    #[serde(default)]
    pub year_of_construction: Option<u32>,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub primary_model_uid: Uid,
    #[serde(default)]
    pub status: MachineStatus,
}

impl NewMachine {
    pub fn into_entity(self) -> Machine {
        let ts = now();
        Machine {
            uid: Uid::new(),
            name: self.name,
            year_of_construction: self.year_of_construction,
            serial_number: self.serial_number,
            primary_model_uid: self.primary_model_uid,
            status: self.status,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachinePatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_construction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_model_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MachineStatus>,
}

/// One physical unit of a model inside a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineModelInstance {
    pub uid: Uid,
    pub machine_uid: Uid,
    pub model_uid: Uid,
    pub position: u32,

    /// e.g. "Front Trimmer"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_label: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MachineModelInstance {
    /// Bind a new instance
    pub fn bind(machine_uid: Uid, model_uid: Uid, position: u32, label: Option<String>) -> Self {
        let ts = now();
        Self {
            uid: Uid::new(),
            machine_uid,
            model_uid,
            position,
            instance_label: label,
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Whether this is the primary unit of `machine`
    pub fn is_primary_of(&self, machine: &Machine) -> bool {
        self.machine_uid == machine.uid
            && self.position == PRIMARY_POSITION
            && self.model_uid == machine.primary_model_uid
    }

    /// Label for listings: the instance label or "#<position>"
    pub fn display_label(&self) -> String {
        self.instance_label
            .clone()
            .unwrap_or_else(|| format!("#{}", self.position))
    }
}

impl Entity for MachineModelInstance {
    const KIND: EntityKind = EntityKind::MachineModelInstance;

    fn uid(&self) -> &Uid {
        &self.uid
    }

    fn name(&self) -> &str {
        self.instance_label.as_deref().unwrap_or("")
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewModelInstance {
    pub machine_uid: Uid,
    pub model_uid: Uid,
    pub position: u32,
    #[serde(default)]
    pub instance_label: Option<String>,
}

impl NewModelInstance {
    pub fn into_entity(self) -> MachineModelInstance {
        MachineModelInstance::bind(
            self.machine_uid,
            self.model_uid,
            self.position,
            self.instance_label,
        )
    }
}

/// Only position and label of an instance can change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInstancePatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_defaults_to_draft() {
        let input: NewMachine = serde_json::from_value(json!({
            "name": "Muller Martini Alegro",
            "primary_model_uid": "01J9ZQ3V6W8X9Y0Z1A2B3C4D5E"
        }))
        .unwrap();
        assert_eq!(input.into_entity().status, MachineStatus::Draft);
    }

    #[test]
    fn test_primary_instance_detection() {
        let machine = NewMachine {
            name: "m".to_string(),
            year_of_construction: Some(2004),
            serial_number: None,
            primary_model_uid: Uid::new(),
            status: MachineStatus::Published,
        }
        .into_entity();

        let primary = MachineModelInstance::bind(
            machine.uid.clone(),
            machine.primary_model_uid.clone(),
            0,
            None,
        );
        let secondary =
            MachineModelInstance::bind(machine.uid.clone(), Uid::new(), 1, Some("Folder".into()));
        assert!(primary.is_primary_of(&machine));
        assert!(!secondary.is_primary_of(&machine));
        assert_eq!(primary.display_label(), "#0");
        assert_eq!(secondary.display_label(), "Folder");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "Published".parse::<MachineStatus>().unwrap(),
            MachineStatus::Published
        );
        assert!("archived".parse::<MachineStatus>().is_err());
    }
}
