//! Specification preset entity type
//!
//! A preset narrows the values a specification may take for every machine
//! under a category or a model. `allowed_values` is a sum type keyed by its
//! own `type` field; numerical constraints are keyed by `constraint_type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity};
use crate::core::identity::{EntityKind, Uid};
use crate::entities::specification::{RangeType, TypeOptions};
use crate::entities::value::{FromTo, Pair, Triple};

/// Level a preset applies at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetLevel {
    Category,
    Model,
}

impl PresetLevel {
    /// Collection the preset target lives in
    pub fn target_kind(&self) -> EntityKind {
        match self {
            PresetLevel::Category => EntityKind::Category,
            PresetLevel::Model => EntityKind::Model,
        }
    }
}

impl std::fmt::Display for PresetLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetLevel::Category => write!(f, "category"),
            PresetLevel::Model => write!(f, "model"),
        }
    }
}

impl std::str::FromStr for PresetLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" => Ok(PresetLevel::Category),
            "model" => Ok(PresetLevel::Model),
            _ => Err(format!("Unknown preset level: {}. Use category or model", s)),
        }
    }
}

/// Boolean allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanAllowance {
    Yes,
    No,
    Any,
}

/// Constraint on a single number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "lowercase")]
pub enum NumericalConstraint {
    Exact { exact: f64 },
    Range { min: f64, max: f64 },
    Set { set: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "lowercase")]
pub enum FromToConstraint {
    Exact { exact: FromTo },
    Range { min: FromTo, max: FromTo },
    Set { set: Vec<FromTo> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "lowercase")]
pub enum TwoDimensionalConstraint {
    Exact { exact_2d: Pair },
    Range { min_2d: Pair, max_2d: Pair },
    Set { set_2d: Vec<Pair> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "lowercase")]
pub enum ThreeDimensionalConstraint {
    Exact { exact_3d: Triple },
    Range { min_3d: Triple, max_3d: Triple },
    Set { set_3d: Vec<Triple> },
}

/// Constraint on a range value; the field names carry the dimensionality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeConstraint {
    FromTo(FromToConstraint),
    TwoDimensional(TwoDimensionalConstraint),
    ThreeDimensional(ThreeDimensionalConstraint),
}

impl RangeConstraint {
    pub fn range_type(&self) -> RangeType {
        match self {
            RangeConstraint::FromTo(_) => RangeType::FromTo,
            RangeConstraint::TwoDimensional(_) => RangeType::TwoDimensional,
            RangeConstraint::ThreeDimensional(_) => RangeType::ThreeDimensional,
        }
    }
}

/// Values a preset allows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllowedValues {
    EnumOptions {
        enum_option_uids: Vec<Uid>,
    },
    Boolean {
        boolean_value: BooleanAllowance,
    },
    Numerical {
        numerical: NumericalConstraint,
    },
    NumericalRange {
        range_type: RangeType,
        numerical_range: RangeConstraint,
    },
}

impl AllowedValues {
    pub fn type_name(&self) -> &'static str {
        match self {
            AllowedValues::EnumOptions { .. } => "enum_options",
            AllowedValues::Boolean { .. } => "boolean",
            AllowedValues::Numerical { .. } => "numerical",
            AllowedValues::NumericalRange { .. } => "numerical_range",
        }
    }

    /// Check that these allowed values can constrain a specification with
    /// `options`. Returns the mismatch message otherwise.
    pub fn check_against(&self, options: &TypeOptions) -> Result<(), String> {
        match (self, options) {
            (AllowedValues::EnumOptions { .. }, TypeOptions::EnumPlus(_))
            | (AllowedValues::Boolean { .. }, TypeOptions::BooleanPlus(_))
            | (AllowedValues::Numerical { .. }, TypeOptions::Numerical(_)) => Ok(()),
            (AllowedValues::NumericalRange { range_type, .. }, TypeOptions::NumericalRange(o)) => {
                if *range_type == o.range_type {
                    Ok(())
                } else {
                    Err(format!(
                        "range_type {} does not match the specification's {}",
                        range_type, o.range_type
                    ))
                }
            }
            (allowed, options) => Err(format!(
                "{} allowed values cannot constrain a {} specification",
                allowed.type_name(),
                options.spec_type()
            )),
        }
    }
}

/// A SpecificationPreset entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationPreset {
    pub uid: Uid,
    pub preset_level: PresetLevel,
    pub preset_target_uid: Uid,
    pub specification_uid: Uid,
    pub allowed_values: AllowedValues,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SpecificationPreset {
    /// The (level, target, specification) triple that must be unique
    pub fn key(&self) -> (PresetLevel, &Uid, &Uid) {
        (
            self.preset_level,
            &self.preset_target_uid,
            &self.specification_uid,
        )
    }
}

impl Entity for SpecificationPreset {
    const KIND: EntityKind = EntityKind::SpecificationPreset;

    fn uid(&self) -> &Uid {
        &self.uid
    }

    fn name(&self) -> &str {
        self.allowed_values.type_name()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSpecificationPreset {
    pub preset_level: PresetLevel,
    pub preset_target_uid: Uid,
    pub specification_uid: Uid,
    pub allowed_values: AllowedValues,
}

impl NewSpecificationPreset {
    pub fn into_entity(self) -> SpecificationPreset {
        let ts = now();
        SpecificationPreset {
            uid: Uid::new(),
            preset_level: self.preset_level,
            preset_target_uid: self.preset_target_uid,
            specification_uid: self.specification_uid,
            allowed_values: self.allowed_values,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationPresetPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_level: Option<PresetLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_target_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<AllowedValues>,
}
