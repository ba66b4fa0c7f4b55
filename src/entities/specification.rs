//! Specification entity type - a typed attribute of machines in a category
//!
//! The shape of `type_options` depends on the sibling `type` field; both are
//! carried together by [`TypeOptions`], an adjacently tagged enum flattened
//! into the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Entity, Multilingual};
use crate::core::identity::{EntityKind, Uid};

/// Specification type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecificationType {
    Text,
    #[serde(rename = "Boolean Plus", alias = "BooleanPlus")]
    BooleanPlus,
    #[serde(rename = "Enum Plus", alias = "EnumPlus")]
    EnumPlus,
    Numerical,
    #[serde(rename = "Numerical Range", alias = "NumericalRange")]
    NumericalRange,
}

impl SpecificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecificationType::Text => "Text",
            SpecificationType::BooleanPlus => "Boolean Plus",
            SpecificationType::EnumPlus => "Enum Plus",
            SpecificationType::Numerical => "Numerical",
            SpecificationType::NumericalRange => "Numerical Range",
        }
    }

    pub fn all() -> &'static [SpecificationType] {
        &[
            SpecificationType::Text,
            SpecificationType::BooleanPlus,
            SpecificationType::EnumPlus,
            SpecificationType::Numerical,
            SpecificationType::NumericalRange,
        ]
    }
}

impl std::fmt::Display for SpecificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpecificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_lowercase().as_str() {
            "text" => Ok(SpecificationType::Text),
            "booleanplus" => Ok(SpecificationType::BooleanPlus),
            "enumplus" => Ok(SpecificationType::EnumPlus),
            "numerical" => Ok(SpecificationType::Numerical),
            "numericalrange" => Ok(SpecificationType::NumericalRange),
            _ => Err(format!(
                "Unknown specification type: {}. Use Text, Boolean Plus, Enum Plus, Numerical or Numerical Range",
                s
            )),
        }
    }
}

/// Number representation of numerical specifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumType {
    #[default]
    Float,
    Int,
}

/// Dimensionality of a numerical range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    /// `{from, to}`
    FromTo,
    /// `{a, b}`
    TwoDimensional,
    /// `{a, b, c}`
    ThreeDimensional,
}

impl RangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeType::FromTo => "from_to",
            RangeType::TwoDimensional => "two_dimensional",
            RangeType::ThreeDimensional => "three_dimensional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "from_to" => Some(RangeType::FromTo),
            "two_dimensional" => Some(RangeType::TwoDimensional),
            "three_dimensional" => Some(RangeType::ThreeDimensional),
            _ => None,
        }
    }
}

impl std::fmt::Display for RangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanPlusOptions {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumPlusOptions {
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub hide_name: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericalOptions {
    /// e.g. "cm", "sheets/hour"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub num_type: NumType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalRangeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub num_type: NumType,
    pub range_type: RangeType,
}

/// Type tag plus its matching options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "type_options")]
pub enum TypeOptions {
    Text(TextOptions),
    #[serde(rename = "Boolean Plus", alias = "BooleanPlus")]
    BooleanPlus(BooleanPlusOptions),
    #[serde(rename = "Enum Plus", alias = "EnumPlus")]
    EnumPlus(EnumPlusOptions),
    Numerical(NumericalOptions),
    #[serde(rename = "Numerical Range", alias = "NumericalRange")]
    NumericalRange(NumericalRangeOptions),
}

impl TypeOptions {
    pub fn spec_type(&self) -> SpecificationType {
        match self {
            TypeOptions::Text(_) => SpecificationType::Text,
            TypeOptions::BooleanPlus(_) => SpecificationType::BooleanPlus,
            TypeOptions::EnumPlus(_) => SpecificationType::EnumPlus,
            TypeOptions::Numerical(_) => SpecificationType::Numerical,
            TypeOptions::NumericalRange(_) => SpecificationType::NumericalRange,
        }
    }

    /// Range dimensionality, for numerical range specifications
    pub fn range_type(&self) -> Option<RangeType> {
        match self {
            TypeOptions::NumericalRange(o) => Some(o.range_type),
            _ => None,
        }
    }

    /// Numeric bounds and representation shared by both numerical kinds
    pub fn numeric_bounds(&self) -> Option<(Option<f64>, Option<f64>, NumType)> {
        match self {
            TypeOptions::Numerical(o) => Some((o.min, o.max, o.num_type)),
            TypeOptions::NumericalRange(o) => Some((o.min, o.max, o.num_type)),
            _ => None,
        }
    }
}

/// A Specification entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub uid: Uid,
    pub name: String,
    pub specification_group_uid: Uid,
    pub label: Multilingual,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,

    /// Must be filled before a machine is ready to publish
    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub highlighted: bool,

    /// Pattern English text values must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp_pattern: Option<String>,

    #[serde(flatten)]
    pub options: TypeOptions,

    #[serde(default)]
    pub position_rank: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Specification {
    pub fn spec_type(&self) -> SpecificationType {
        self.options.spec_type()
    }
}

impl Entity for Specification {
    const KIND: EntityKind = EntityKind::Specification;

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
pub struct NewSpecification {
    pub name: String,
    pub specification_group_uid: Uid,
    pub label: Multilingual,
    #[serde(default)]
    pub internal_description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub regexp_pattern: Option<String>,
    #[serde(flatten)]
    pub options: TypeOptions,
    #[serde(default)]
    pub position_rank: i64,
}

impl NewSpecification {
    pub fn into_entity(self) -> Specification {
        let ts = now();
        Specification {
            uid: Uid::new(),
            name: self.name,
            specification_group_uid: self.specification_group_uid,
            label: self.label,
            internal_description: self.internal_description,
            required: self.required,
            highlighted: self.highlighted,
            regexp_pattern: self.regexp_pattern,
            options: self.options,
            position_rank: self.position_rank,
            created_at: ts,
            updated_at: ts,
        }
    }
}

/// Partial update of a specification
///
/// `type` and `type_options` travel separately here; the catalog resolves the
/// effective pair against the stored record before writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationPatch {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_group_uid: Option<Uid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp_pattern: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub spec_type: Option<SpecificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_rank: Option<i64>,
}
