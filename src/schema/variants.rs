//! Discriminated validation of the polymorphic fields
//!
//! `type_options`, `value` and `allowed_values` have shapes selected by a
//! sibling or inner tag. The static schemas only require them to be objects;
//! the checks here walk the raw JSON for the selected variant and report every
//! violation with its JSON pointer, before any typed deserialization happens.

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::error::Violation;
use crate::core::identity::Uid;
use crate::entities::specification::{
    NumType, RangeType, Specification, SpecificationType, TypeOptions,
};
use crate::entities::value::{RangeValue, SpecificationValue};

const NUM_TYPES: &[&str] = &["float", "int"];
const RANGE_TYPES: &[&str] = &["from_to", "two_dimensional", "three_dimensional"];
const YES_NO: &[&str] = &["yes", "no"];
const YES_NO_ANY: &[&str] = &["yes", "no", "any"];
const CONSTRAINT_TYPES: &[&str] = &["exact", "range", "set"];
const ALLOWED_VALUE_TYPES: &[&str] = &["enum_options", "boolean", "numerical", "numerical_range"];

/// Violation collector rooted at a JSON pointer
struct Check<'a> {
    violations: &'a mut Vec<Violation>,
    path: String,
}

impl<'a> Check<'a> {
    fn new(violations: &'a mut Vec<Violation>, path: impl Into<String>) -> Self {
        Self {
            violations,
            path: path.into(),
        }
    }

    fn at(&self, field: &str) -> String {
        format!("{}/{}", self.path, field)
    }

    fn fail(&mut self, path: String, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    /// Borrow the value as an object, reporting otherwise
    fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                let path = self.path.clone();
                self.fail(path, "must be an object");
                None
            }
        }
    }

    fn only(&mut self, map: &Map<String, Value>, allowed: &[&str]) {
        let mut unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !allowed.contains(k))
            .collect();
        unknown.sort_unstable();
        for key in unknown {
            let path = self.at(key);
            self.fail(path, "unknown field");
        }
    }

    fn required<'v>(&mut self, map: &'v Map<String, Value>, field: &str) -> Option<&'v Value> {
        let found = map.get(field);
        if found.is_none() {
            let path = self.at(field);
            self.fail(path, "is required");
        }
        found
    }

    fn boolean(&mut self, map: &Map<String, Value>, field: &str) {
        if let Some(v) = map.get(field) {
            if !v.is_boolean() {
                let path = self.at(field);
                self.fail(path, "must be a boolean");
            }
        }
    }

    fn string(&mut self, map: &Map<String, Value>, field: &str) {
        if let Some(v) = map.get(field) {
            if !v.is_string() {
                let path = self.at(field);
                self.fail(path, "must be a string");
            }
        }
    }

    fn number(&mut self, map: &Map<String, Value>, field: &str) -> Option<f64> {
        let v = map.get(field)?;
        let n = v.as_f64();
        if n.is_none() {
            let path = self.at(field);
            self.fail(path, "must be a number");
        }
        n
    }

    fn one_of(
        &mut self,
        map: &Map<String, Value>,
        field: &str,
        options: &[&str],
    ) -> Option<String> {
        let v = map.get(field)?;
        match v.as_str() {
            Some(s) if options.contains(&s) => Some(s.to_string()),
            _ => {
                let path = self.at(field);
                self.fail(path, format!("must be one of: {}", options.join(", ")));
                None
            }
        }
    }

    fn multilingual(&mut self, map: &Map<String, Value>, field: &str) {
        let Some(v) = map.get(field) else {
            return;
        };
        let path = self.at(field);
        let mut nested = Check::new(&mut *self.violations, path);
        let Some(text) = nested.object(v) else {
            return;
        };
        nested.only(text, &["en", "de", "es"]);
        nested.required(text, "en");
        for lang in ["en", "de", "es"] {
            nested.string(text, lang);
        }
    }

    fn uid_list(&mut self, map: &Map<String, Value>, field: &str, non_empty: bool) {
        let Some(v) = map.get(field) else {
            return;
        };
        let path = self.at(field);
        let Some(items) = v.as_array() else {
            self.fail(path, "must be an array of UIDs");
            return;
        };
        if non_empty && items.is_empty() {
            self.fail(path.clone(), "must contain at least one UID");
        }
        for (i, item) in items.iter().enumerate() {
            let ok = item.as_str().is_some_and(|s| Uid::parse(s).is_ok());
            if !ok {
                self.fail(format!("{}/{}", path, i), "must be a ULID or UUID");
            }
        }
    }

    /// An object with exactly the numeric `keys`
    fn point(&mut self, map: &Map<String, Value>, field: &str, keys: &[&str]) -> Option<Vec<f64>> {
        let v = map.get(field)?;
        let path = self.at(field);
        point_at(&mut *self.violations, path, v, keys)
    }
}

fn point_at(
    violations: &mut Vec<Violation>,
    path: String,
    value: &Value,
    keys: &[&str],
) -> Option<Vec<f64>> {
    let mut check = Check::new(violations, path);
    let obj = check.object(value)?;
    check.only(obj, keys);
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        if check.required(obj, key).is_some() {
            out.push(check.number(obj, key)?);
        }
    }
    (out.len() == keys.len()).then_some(out)
}

fn dimension_keys(range_type: RangeType) -> &'static [&'static str] {
    match range_type {
        RangeType::FromTo => &["from", "to"],
        RangeType::TwoDimensional => &["a", "b"],
        RangeType::ThreeDimensional => &["a", "b", "c"],
    }
}

fn dimension_suffix(range_type: RangeType) -> &'static str {
    match range_type {
        RangeType::FromTo => "",
        RangeType::TwoDimensional => "_2d",
        RangeType::ThreeDimensional => "_3d",
    }
}

/// Check `type_options` against the specification type it belongs to
pub fn check_type_options(spec_type: SpecificationType, options: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut check = Check::new(&mut violations, "/type_options");
    let Some(map) = check.object(options) else {
        return violations;
    };
    match spec_type {
        SpecificationType::Text => {
            check.only(map, &["max_length"]);
            if let Some(v) = map.get("max_length") {
                if !v.as_u64().is_some_and(|n| n > 0) {
                    let path = check.at("max_length");
                    check.fail(path, "must be a positive integer");
                }
            }
        }
        SpecificationType::BooleanPlus => check.only(map, &[]),
        SpecificationType::EnumPlus => {
            check.only(map, &["allow_multiple", "hide_name"]);
            check.boolean(map, "allow_multiple");
            check.boolean(map, "hide_name");
        }
        SpecificationType::Numerical | SpecificationType::NumericalRange => {
            let is_range = spec_type == SpecificationType::NumericalRange;
            if is_range {
                check.only(map, &["unit", "min", "max", "num_type", "range_type"]);
                if check.required(map, "range_type").is_some() {
                    check.one_of(map, "range_type", RANGE_TYPES);
                }
            } else {
                check.only(map, &["unit", "min", "max", "num_type"]);
            }
            check.string(map, "unit");
            check.one_of(map, "num_type", NUM_TYPES);
            let min = check.number(map, "min");
            let max = check.number(map, "max");
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    let path = check.at("min");
                    check.fail(path, format!("min {} is greater than max {}", min, max));
                }
            }
        }
    }
    violations
}

/// Check a regular expression given for `regexp_pattern`
pub fn check_regexp_pattern(pattern: &str) -> Option<Violation> {
    Regex::new(pattern)
        .err()
        .map(|e| Violation::new("/regexp_pattern", format!("invalid regular expression: {}", e)))
}

/// Check the shape of a `value` payload for a specification with `options`
pub fn check_value_shape(options: &TypeOptions, value: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut check = Check::new(&mut violations, "/value");
    let Some(map) = check.object(value) else {
        return violations;
    };
    match options {
        TypeOptions::Text(_) => {
            check.only(map, &["text"]);
            check.required(map, "text");
        }
        TypeOptions::BooleanPlus(_) => {
            check.only(map, &["boolean", "text"]);
            if check.required(map, "boolean").is_some() {
                check.one_of(map, "boolean", YES_NO);
            }
        }
        TypeOptions::EnumPlus(_) => {
            check.only(map, &["boolean", "enum_option_uids", "text"]);
            if check.required(map, "boolean").is_some() {
                check.one_of(map, "boolean", YES_NO);
            }
            check.uid_list(map, "enum_option_uids", false);
        }
        TypeOptions::Numerical(_) => {
            check.only(map, &["numerical", "text"]);
            if check.required(map, "numerical").is_some() {
                check.number(map, "numerical");
            }
        }
        TypeOptions::NumericalRange(o) => {
            check.only(map, &["numerical_range", "text"]);
            if check.required(map, "numerical_range").is_some() {
                check.point(map, "numerical_range", dimension_keys(o.range_type));
            }
        }
    }
    check.multilingual(map, "text");
    violations
}

/// Check a well-shaped value against the specification's limits
///
/// Covers `max_length` and `regexp_pattern` on the English text, numeric
/// bounds and integrality, range ordering and the single-selection rule of
/// Enum Plus specifications.
pub fn check_value_limits(spec: &Specification, value: &SpecificationValue) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let (TypeOptions::Text(o), SpecificationValue::Text { text }) = (&spec.options, value) {
        if let Some(max) = o.max_length {
            let len = text.en.chars().count() as u64;
            if len > max {
                violations.push(Violation::new(
                    "/value/text/en",
                    format!("is {} characters long, maximum is {}", len, max),
                ));
            }
        }
        if let Some(pattern) = &spec.regexp_pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(&text.en) => violations.push(Violation::new(
                    "/value/text/en",
                    format!("does not match pattern {}", pattern),
                )),
                Ok(_) => {}
                Err(_) => violations.push(Violation::new(
                    "/value",
                    format!("specification has an invalid regexp_pattern {}", pattern),
                )),
            }
        }
    }

    if let (TypeOptions::EnumPlus(o), SpecificationValue::EnumPlus { enum_option_uids, .. }) =
        (&spec.options, value)
    {
        if !o.allow_multiple && enum_option_uids.len() > 1 {
            violations.push(Violation::new(
                "/value/enum_option_uids",
                "specification allows a single option only",
            ));
        }
    }

    if let Some((min, max, num_type)) = spec.options.numeric_bounds() {
        let (numbers, path) = match value {
            SpecificationValue::Numerical { numerical, .. } => {
                (vec![*numerical], "/value/numerical")
            }
            SpecificationValue::NumericalRange {
                numerical_range, ..
            } => (numerical_range.components(), "/value/numerical_range"),
            _ => (Vec::new(), "/value"),
        };
        for n in numbers {
            if num_type == NumType::Int && n.fract() != 0.0 {
                violations.push(Violation::new(path, format!("{} is not an integer", n)));
            }
            if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                violations.push(Violation::new(
                    path,
                    format!("{} is outside {}..{}", n, bound(min), bound(max)),
                ));
            }
        }
        if let SpecificationValue::NumericalRange {
            numerical_range: RangeValue::FromTo(r),
            ..
        } = value
        {
            if r.from > r.to {
                violations.push(Violation::new(
                    "/value/numerical_range",
                    format!("from {} is greater than to {}", r.from, r.to),
                ));
            }
        }
    }

    violations
}

fn bound(b: Option<f64>) -> String {
    b.map(|v| v.to_string()).unwrap_or_default()
}

/// Check an `allowed_values` object, keyed by its own `type`
pub fn check_allowed_values(allowed: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut check = Check::new(&mut violations, "/allowed_values");
    let Some(map) = check.object(allowed) else {
        return violations;
    };
    if check.required(map, "type").is_none() {
        return violations;
    }
    let Some(kind) = check.one_of(map, "type", ALLOWED_VALUE_TYPES) else {
        return violations;
    };
    match kind.as_str() {
        "enum_options" => {
            check.only(map, &["type", "enum_option_uids"]);
            if check.required(map, "enum_option_uids").is_some() {
                check.uid_list(map, "enum_option_uids", true);
            }
        }
        "boolean" => {
            check.only(map, &["type", "boolean_value"]);
            if check.required(map, "boolean_value").is_some() {
                check.one_of(map, "boolean_value", YES_NO_ANY);
            }
        }
        "numerical" => {
            check.only(map, &["type", "numerical"]);
            if let Some(inner) = check.required(map, "numerical") {
                let path = check.at("numerical");
                check_constraint(&mut *check.violations, path, inner, None);
            }
        }
        _ => {
            check.only(map, &["type", "range_type", "numerical_range"]);
            let range_type = match check.required(map, "range_type") {
                Some(_) => check
                    .one_of(map, "range_type", RANGE_TYPES)
                    .and_then(|s| RangeType::parse(&s)),
                None => None,
            };
            if let Some(inner) = check.required(map, "numerical_range") {
                if let Some(range_type) = range_type {
                    let path = check.at("numerical_range");
                    check_constraint(&mut *check.violations, path, inner, Some(range_type));
                }
            }
        }
    }
    violations
}

/// One numerical constraint; `range_type` selects the dimensional field names
fn check_constraint(
    violations: &mut Vec<Violation>,
    path: String,
    constraint: &Value,
    range_type: Option<RangeType>,
) {
    let mut check = Check::new(violations, path);
    let Some(map) = check.object(constraint) else {
        return;
    };
    if check.required(map, "constraint_type").is_none() {
        return;
    }
    let Some(kind) = check.one_of(map, "constraint_type", CONSTRAINT_TYPES) else {
        return;
    };
    let suffix = range_type.map(dimension_suffix).unwrap_or("");
    let exact = format!("exact{}", suffix);
    let min = format!("min{}", suffix);
    let max = format!("max{}", suffix);
    let set = format!("set{}", suffix);

    let read = |check: &mut Check<'_>, field: &str| -> Option<Vec<f64>> {
        check.required(map, field)?;
        match range_type {
            Some(rt) => check.point(map, field, dimension_keys(rt)),
            None => check.number(map, field).map(|n| vec![n]),
        }
    };

    match kind.as_str() {
        "exact" => {
            check.only(map, &["constraint_type", exact.as_str()]);
            read(&mut check, &exact);
        }
        "range" => {
            check.only(map, &["constraint_type", min.as_str(), max.as_str()]);
            let lo = read(&mut check, &min);
            let hi = read(&mut check, &max);
            if let (Some(lo), Some(hi)) = (lo, hi) {
                if lo.iter().zip(&hi).any(|(l, h)| l > h) {
                    let path = check.at(&min);
                    check.fail(path, format!("must not exceed {}", max));
                }
            }
        }
        _ => {
            check.only(map, &["constraint_type", set.as_str()]);
            let Some(items) = check.required(map, &set) else {
                return;
            };
            let path = check.at(&set);
            let Some(items) = items.as_array() else {
                check.fail(path, "must be an array");
                return;
            };
            if items.is_empty() {
                check.fail(path.clone(), "must contain at least one entry");
            }
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}/{}", path, i);
                match range_type {
                    Some(rt) => {
                        point_at(&mut *check.violations, item_path, item, dimension_keys(rt));
                    }
                    None if !item.is_number() => check.fail(item_path, "must be a number"),
                    None => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::specification::{
        EnumPlusOptions, NumericalOptions, NumericalRangeOptions, TextOptions,
    };
    use serde_json::json;

    fn paths(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.path.as_str()).collect()
    }

    fn spec_with(options: TypeOptions, pattern: Option<&str>) -> Specification {
        let ts = crate::core::entity::now();
        Specification {
            uid: Uid::new(),
            name: "s".to_string(),
            specification_group_uid: Uid::new(),
            label: crate::core::entity::Multilingual::en("S"),
            internal_description: None,
            required: false,
            highlighted: false,
            regexp_pattern: pattern.map(String::from),
            options,
            position_rank: 0,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_type_options_per_variant() {
        assert!(check_type_options(SpecificationType::BooleanPlus, &json!({})).is_empty());
        assert!(
            check_type_options(SpecificationType::Text, &json!({ "max_length": 40 })).is_empty()
        );

        let v = check_type_options(SpecificationType::Text, &json!({ "max_length": 0 }));
        assert_eq!(paths(&v), vec!["/type_options/max_length"]);

        let v = check_type_options(SpecificationType::BooleanPlus, &json!({ "unit": "mm" }));
        assert_eq!(paths(&v), vec!["/type_options/unit"]);
    }

    #[test]
    fn test_numerical_range_options_report_everything() {
        let v = check_type_options(
            SpecificationType::NumericalRange,
            &json!({ "num_type": "double", "min": 10, "max": 1 }),
        );
        let p = paths(&v);
        assert!(p.contains(&"/type_options/range_type"));
        assert!(p.contains(&"/type_options/num_type"));
        assert!(p.contains(&"/type_options/min"));
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn test_value_shape_follows_spec_type() {
        let text = TypeOptions::Text(TextOptions::default());
        assert!(check_value_shape(&text, &json!({ "text": { "en": "blue" } })).is_empty());
        let v = check_value_shape(&text, &json!({ "numerical": 3 }));
        assert_eq!(paths(&v), vec!["/value/numerical", "/value/text"]);

        let range = TypeOptions::NumericalRange(NumericalRangeOptions {
            unit: None,
            min: None,
            max: None,
            num_type: NumType::Float,
            range_type: RangeType::TwoDimensional,
        });
        assert!(
            check_value_shape(&range, &json!({ "numerical_range": { "a": 1, "b": 2 } })).is_empty()
        );
        let v = check_value_shape(&range, &json!({ "numerical_range": { "from": 1, "to": 2 } }));
        assert!(paths(&v).contains(&"/value/numerical_range/a"));
        assert!(paths(&v).contains(&"/value/numerical_range/from"));
    }

    #[test]
    fn test_enum_plus_value_accepts_missing_options() {
        let options = TypeOptions::EnumPlus(EnumPlusOptions::default());
        assert!(check_value_shape(&options, &json!({ "boolean": "yes" })).is_empty());
        let v = check_value_shape(
            &options,
            &json!({ "boolean": "maybe", "enum_option_uids": ["x"] }),
        );
        assert_eq!(paths(&v), vec!["/value/boolean", "/value/enum_option_uids/0"]);
    }

    #[test]
    fn test_value_limits() {
        let spec = spec_with(
            TypeOptions::Numerical(NumericalOptions {
                unit: Some("mm".into()),
                min: Some(0.0),
                max: Some(100.0),
                num_type: NumType::Int,
            }),
            None,
        );
        let ok = SpecificationValue::Numerical {
            numerical: 42.0,
            text: None,
        };
        assert!(check_value_limits(&spec, &ok).is_empty());
        let bad = SpecificationValue::Numerical {
            numerical: 120.5,
            text: None,
        };
        assert_eq!(check_value_limits(&spec, &bad).len(), 2);
    }

    #[test]
    fn test_text_pattern_and_length() {
        let spec = spec_with(
            TypeOptions::Text(TextOptions { max_length: Some(4) }),
            Some("^[A-Z]+$"),
        );
        let value = SpecificationValue::Text {
            text: crate::core::entity::Multilingual::en("abcdef"),
        };
        let v = check_value_limits(&spec, &value);
        assert_eq!(v.len(), 2);
        assert!(v.iter().all(|v| v.path == "/value/text/en"));
    }

    #[test]
    fn test_single_selection_enum() {
        let spec = spec_with(TypeOptions::EnumPlus(EnumPlusOptions::default()), None);
        let value = SpecificationValue::EnumPlus {
            boolean: crate::entities::value::YesNo::Yes,
            enum_option_uids: vec![Uid::new(), Uid::new()],
            text: None,
        };
        assert_eq!(
            paths(&check_value_limits(&spec, &value)),
            vec!["/value/enum_option_uids"]
        );
    }

    #[test]
    fn test_allowed_values_variants() {
        assert!(
            check_allowed_values(&json!({ "type": "boolean", "boolean_value": "any" })).is_empty()
        );
        assert!(check_allowed_values(&json!({
            "type": "numerical",
            "numerical": { "constraint_type": "range", "min": 1, "max": 5 }
        }))
        .is_empty());

        let v = check_allowed_values(&json!({ "type": "enum_options", "enum_option_uids": [] }));
        assert_eq!(paths(&v), vec!["/allowed_values/enum_option_uids"]);

        let v = check_allowed_values(&json!({ "type": "colour" }));
        assert_eq!(paths(&v), vec!["/allowed_values/type"]);
    }

    #[test]
    fn test_dimensional_constraints_use_suffixed_fields() {
        let ok = json!({
            "type": "numerical_range",
            "range_type": "three_dimensional",
            "numerical_range": {
                "constraint_type": "set",
                "set_3d": [{ "a": 1, "b": 2, "c": 3 }]
            }
        });
        assert!(check_allowed_values(&ok).is_empty());

        let wrong = json!({
            "type": "numerical_range",
            "range_type": "two_dimensional",
            "numerical_range": {
                "constraint_type": "range",
                "min_2d": { "a": 5, "b": 5 },
                "max": { "a": 1, "b": 1 }
            }
        });
        let v = check_allowed_values(&wrong);
        let p = paths(&v);
        assert!(p.contains(&"/allowed_values/numerical_range/max"));
        assert!(p.contains(&"/allowed_values/numerical_range/max_2d"));
    }

    #[test]
    fn test_inverted_range_constraint() {
        let v = check_allowed_values(&json!({
            "type": "numerical_range",
            "range_type": "from_to",
            "numerical_range": {
                "constraint_type": "range",
                "min": { "from": 10, "to": 20 },
                "max": { "from": 5, "to": 30 }
            }
        }));
        assert_eq!(paths(&v), vec!["/allowed_values/numerical_range/min"]);
    }

    #[test]
    fn test_regexp_pattern() {
        assert!(check_regexp_pattern("^[0-9]+$").is_none());
        assert!(check_regexp_pattern("([").is_some());
    }
}
