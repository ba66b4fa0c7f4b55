//! Machine specification values
//!
//! A value is keyed by (instance, specification) and has no UID of its own.
//! On disk the payload is a flat object whose fields reveal its shape; in
//! memory it is a [`SpecificationValue`] with one variant per specification
//! type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{now, Multilingual};
use crate::core::identity::Uid;
use crate::entities::specification::{RangeType, SpecificationType};

/// `yes` / `no` answer of Boolean Plus and Enum Plus values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YesNo::Yes => write!(f, "yes"),
            YesNo::No => write!(f, "no"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FromTo {
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// A numerical range value; the variant follows the specification's range type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    ThreeD(Triple),
    TwoD(Pair),
    FromTo(FromTo),
}

impl RangeValue {
    pub fn range_type(&self) -> RangeType {
        match self {
            RangeValue::FromTo(_) => RangeType::FromTo,
            RangeValue::TwoD(_) => RangeType::TwoDimensional,
            RangeValue::ThreeD(_) => RangeType::ThreeDimensional,
        }
    }

    /// Components in declaration order
    pub fn components(&self) -> Vec<f64> {
        match self {
            RangeValue::FromTo(r) => vec![r.from, r.to],
            RangeValue::TwoD(p) => vec![p.a, p.b],
            RangeValue::ThreeD(t) => vec![t.a, t.b, t.c],
        }
    }
}

/// Value payload, one variant per specification type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum SpecificationValue {
    Text {
        text: Multilingual,
    },
    BooleanPlus {
        boolean: YesNo,
        text: Option<Multilingual>,
    },
    EnumPlus {
        boolean: YesNo,
        enum_option_uids: Vec<Uid>,
        text: Option<Multilingual>,
    },
    Numerical {
        numerical: f64,
        text: Option<Multilingual>,
    },
    NumericalRange {
        numerical_range: RangeValue,
        text: Option<Multilingual>,
    },
}

impl SpecificationValue {
    /// Specification type this payload's shape belongs to
    pub fn shape(&self) -> SpecificationType {
        match self {
            SpecificationValue::Text { .. } => SpecificationType::Text,
            SpecificationValue::BooleanPlus { .. } => SpecificationType::BooleanPlus,
            SpecificationValue::EnumPlus { .. } => SpecificationType::EnumPlus,
            SpecificationValue::Numerical { .. } => SpecificationType::Numerical,
            SpecificationValue::NumericalRange { .. } => SpecificationType::NumericalRange,
        }
    }

    /// Whether this payload can be stored for a specification of `spec_type`.
    ///
    /// An Enum Plus value without selected options looks exactly like a
    /// Boolean Plus value, so that shape is accepted for both.
    pub fn fits(&self, spec_type: SpecificationType) -> bool {
        let shape = self.shape();
        shape == spec_type
            || (shape == SpecificationType::BooleanPlus && spec_type == SpecificationType::EnumPlus)
    }

    /// Rewrite a Boolean Plus shaped payload as an Enum Plus one
    pub fn conform_to(self, spec_type: SpecificationType) -> Self {
        match (self, spec_type) {
            (SpecificationValue::BooleanPlus { boolean, text }, SpecificationType::EnumPlus) => {
                SpecificationValue::EnumPlus {
                    boolean,
                    enum_option_uids: Vec::new(),
                    text,
                }
            }
            (value, _) => value,
        }
    }

    pub fn text(&self) -> Option<&Multilingual> {
        match self {
            SpecificationValue::Text { text } => Some(text),
            SpecificationValue::BooleanPlus { text, .. }
            | SpecificationValue::EnumPlus { text, .. }
            | SpecificationValue::Numerical { text, .. }
            | SpecificationValue::NumericalRange { text, .. } => text.as_ref(),
        }
    }

    /// Short human rendering used in listings
    pub fn summary(&self) -> String {
        match self {
            SpecificationValue::Text { text } => text.en.clone(),
            SpecificationValue::BooleanPlus { boolean, .. } => boolean.to_string(),
            SpecificationValue::EnumPlus {
                boolean,
                enum_option_uids,
                ..
            } => {
                if enum_option_uids.is_empty() {
                    boolean.to_string()
                } else {
                    format!("{} [{}]", boolean, enum_option_uids.len())
                }
            }
            SpecificationValue::Numerical { numerical, .. } => numerical.to_string(),
            SpecificationValue::NumericalRange {
                numerical_range, ..
            } => match numerical_range {
                RangeValue::FromTo(r) => format!("{}..{}", r.from, r.to),
                RangeValue::TwoD(p) => format!("{} x {}", p.a, p.b),
                RangeValue::ThreeD(t) => format!("{} x {} x {}", t.a, t.b, t.c),
            },
        }
    }
}

/// On-disk shape of a value payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Multilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_option_uids: Option<Vec<Uid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerical: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerical_range: Option<RangeValue>,
}

impl TryFrom<RawValue> for SpecificationValue {
    type Error = String;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        let RawValue {
            text,
            boolean,
            enum_option_uids,
            numerical,
            numerical_range,
        } = raw;
        if let Some(numerical_range) = numerical_range {
            return Ok(SpecificationValue::NumericalRange {
                numerical_range,
                text,
            });
        }
        if let Some(numerical) = numerical {
            return Ok(SpecificationValue::Numerical { numerical, text });
        }
        match (boolean, enum_option_uids, text) {
            (Some(boolean), Some(enum_option_uids), text) => Ok(SpecificationValue::EnumPlus {
                boolean,
                enum_option_uids,
                text,
            }),
            (Some(boolean), None, text) => Ok(SpecificationValue::BooleanPlus { boolean, text }),
            (None, Some(_), _) => Err("enum_option_uids requires a boolean".to_string()),
            (None, None, Some(text)) => Ok(SpecificationValue::Text { text }),
            (None, None, None) => Err(
                "value must carry text, boolean, numerical or numerical_range".to_string(),
            ),
        }
    }
}

impl From<SpecificationValue> for RawValue {
    fn from(value: SpecificationValue) -> Self {
        match value {
            SpecificationValue::Text { text } => RawValue {
                text: Some(text),
                ..Default::default()
            },
            SpecificationValue::BooleanPlus { boolean, text } => RawValue {
                text,
                boolean: Some(boolean),
                ..Default::default()
            },
            SpecificationValue::EnumPlus {
                boolean,
                enum_option_uids,
                text,
            } => RawValue {
                text,
                boolean: Some(boolean),
                enum_option_uids: Some(enum_option_uids),
                ..Default::default()
            },
            SpecificationValue::Numerical { numerical, text } => RawValue {
                text,
                numerical: Some(numerical),
                ..Default::default()
            },
            SpecificationValue::NumericalRange {
                numerical_range,
                text,
            } => RawValue {
                text,
                numerical_range: Some(numerical_range),
                ..Default::default()
            },
        }
    }
}

/// Value of one specification for one machine model instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpecificationValue {
    pub machine_model_instance_uid: Uid,
    pub specification_uid: Uid,
    pub value: SpecificationValue,

    /// Copied from a preset rather than entered by a user
    #[serde(default)]
    pub is_inherited: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MachineSpecificationValue {
    pub fn is_for(&self, instance_uid: &Uid, specification_uid: &Uid) -> bool {
        &self.machine_model_instance_uid == instance_uid
            && &self.specification_uid == specification_uid
    }
}

/// Validated input for storing a value
#[derive(Debug, Clone, Deserialize)]
pub struct NewSpecificationValue {
    pub machine_model_instance_uid: Uid,
    pub specification_uid: Uid,
    pub value: SpecificationValue,
    #[serde(default)]
    pub is_inherited: bool,
}

impl NewSpecificationValue {
    pub fn into_row(self) -> MachineSpecificationValue {
        let ts = now();
        MachineSpecificationValue {
            machine_model_instance_uid: self.machine_model_instance_uid,
            specification_uid: self.specification_uid,
            value: self.value,
            is_inherited: self.is_inherited,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_is_read_from_fields() {
        let cases = [
            (json!({ "text": { "en": "blue" } }), SpecificationType::Text),
            (json!({ "boolean": "yes" }), SpecificationType::BooleanPlus),
            (
                json!({ "boolean": "yes", "enum_option_uids": [] }),
                SpecificationType::EnumPlus,
            ),
            (json!({ "numerical": 42.5 }), SpecificationType::Numerical),
            (
                json!({ "numerical_range": { "from": 1, "to": 2 } }),
                SpecificationType::NumericalRange,
            ),
        ];
        for (raw, expected) in cases {
            let value: SpecificationValue = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(value.shape(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_range_dimensionality() {
        let value: SpecificationValue =
            serde_json::from_value(json!({ "numerical_range": { "a": 1, "b": 2, "c": 3 } }))
                .unwrap();
        match value {
            SpecificationValue::NumericalRange {
                numerical_range, ..
            } => assert_eq!(numerical_range.range_type(), RangeType::ThreeDimensional),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(serde_json::from_value::<SpecificationValue>(json!({})).is_err());
    }

    #[test]
    fn test_boolean_shape_fits_enum_plus() {
        let value: SpecificationValue = serde_json::from_value(json!({ "boolean": "no" })).unwrap();
        assert!(value.fits(SpecificationType::EnumPlus));
        assert!(!value.fits(SpecificationType::Text));

        let conformed = value.conform_to(SpecificationType::EnumPlus);
        assert_eq!(conformed.shape(), SpecificationType::EnumPlus);
        let json = serde_json::to_value(&conformed).unwrap();
        assert_eq!(json, json!({ "boolean": "no", "enum_option_uids": [] }));
    }

    #[test]
    fn test_row_round_trip() {
        let row = NewSpecificationValue {
            machine_model_instance_uid: Uid::new(),
            specification_uid: Uid::new(),
            value: SpecificationValue::Numerical {
                numerical: 7.0,
                text: Some(Multilingual::en("approx.")),
            },
            is_inherited: false,
        }
        .into_row();
        let text = serde_json::to_string(&row).unwrap();
        let back: MachineSpecificationValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, row);
    }
}
