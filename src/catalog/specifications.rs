//! Specifications and their enum options

use serde_json::{json, Value};

use crate::catalog::{patch_fields, Catalog};
use crate::core::error::{Result, TaxonomyError, Violation};
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{
    EnumOption, EnumOptionPatch, MachineSpecificationValue, NewEnumOption, NewSpecification,
    Specification, SpecificationGroup, SpecificationPatch, SpecificationPreset, SpecificationType,
    TypeOptions,
};
use crate::schema::{finish, variants, Mode};

impl Catalog {
    pub fn create_specification(&self, input: &Value) -> Result<Specification> {
        let new: NewSpecification = self.parse(EntityKind::Specification, Mode::Create, input)?;
        self.referenced::<SpecificationGroup>(
            "specification_group_uid",
            &new.specification_group_uid,
        )?;
        self.store.create(new.into_entity())
    }

    /// Update a specification.
    ///
    /// `type` and `type_options` are resolved against the stored record: a new
    /// type without options re-checks the stored options under the new type.
    /// Leaving `Enum Plus` is refused while the specification has options, and
    /// changing the type or range type while values or presets exist.
    pub fn update_specification(&self, input: &Value) -> Result<Specification> {
        let patch: SpecificationPatch = self.parse(EntityKind::Specification, Mode::Update, input)?;
        let current: Specification = self.get(patch.uid.as_str())?;
        if let Some(group) = &patch.specification_group_uid {
            self.referenced::<SpecificationGroup>("specification_group_uid", group)?;
        }

        let mut fields = patch_fields(&patch)?;
        if patch.spec_type.is_some() || patch.type_options.is_some() {
            let options = self.resolve_type_options(&current, &patch)?;
            fields.remove("type");
            fields.remove("type_options");
            let resolved = serde_json::to_value(&options).map_err(|e| {
                let message = format!("type options could not be serialized: {}", e);
                TaxonomyError::InvalidOperation(message)
            })?;
            if let Value::Object(resolved) = resolved {
                fields.extend(resolved);
            }
        }

        self.store
            .update::<Specification>(patch.uid.as_str(), &fields)?
            .ok_or_else(|| TaxonomyError::not_found(EntityKind::Specification, patch.uid.as_str()))
    }

    fn resolve_type_options(
        &self,
        current: &Specification,
        patch: &SpecificationPatch,
    ) -> Result<TypeOptions> {
        let new_type = patch.spec_type.unwrap_or_else(|| current.spec_type());
        let options = match &patch.type_options {
            Some(options) => options.clone(),
            None => serde_json::to_value(&current.options)
                .ok()
                .and_then(|v| v.get("type_options").cloned())
                .unwrap_or_else(|| json!({})),
        };

        if new_type != current.spec_type() && new_type != SpecificationType::EnumPlus {
            let count = self.count(|o: &EnumOption| o.specification_uid == current.uid)?;
            if count > 0 {
                return Err(TaxonomyError::InvalidOperation(format!(
                    "cannot change specification {} to {}: it still has {} enum option(s)",
                    current.uid, new_type, count
                )));
            }
        }

        let violations = variants::check_type_options(new_type, &options);
        let resolved: TypeOptions =
            finish(&json!({ "type": new_type, "type_options": options }), violations)?;
        if resolved.spec_type() != current.spec_type()
            || resolved.range_type() != current.options.range_type()
        {
            self.guard_shape_change(current)?;
        }
        Ok(resolved)
    }

    /// Stored values and presets are shaped by the type and range type; both
    /// stay fixed while any exist.
    fn guard_shape_change(&self, current: &Specification) -> Result<()> {
        let values: Vec<MachineSpecificationValue> =
            self.store.load(EntityKind::MachineSpecificationValue)?;
        let values = values
            .iter()
            .filter(|v| v.specification_uid == current.uid)
            .count();
        let presets = self.count(|p: &SpecificationPreset| p.specification_uid == current.uid)?;
        if values == 0 && presets == 0 {
            return Ok(());
        }
        tracing::warn!(uid = %current.uid, values, presets, "type change rejected");
        Err(TaxonomyError::InvalidOperation(format!(
            "cannot change the type of specification {}: {} stored value(s) and {} preset(s) depend on its shape",
            current.uid, values, presets
        )))
    }

    /// Delete a specification without enum options, presets or stored values
    pub fn delete_specification(&self, uid: &str) -> Result<()> {
        self.get::<Specification>(uid)?;
        let values: Vec<MachineSpecificationValue> =
            self.store.load(EntityKind::MachineSpecificationValue)?;
        let dependents = [
            (
                EntityKind::EnumOption,
                self.count(|o: &EnumOption| o.specification_uid == uid)?,
            ),
            (
                EntityKind::SpecificationPreset,
                self.count(|p: &SpecificationPreset| p.specification_uid == uid)?,
            ),
            (
                EntityKind::MachineSpecificationValue,
                values.iter().filter(|v| v.specification_uid == uid).count(),
            ),
        ];
        self.guard_delete(EntityKind::Specification, uid, &dependents)?;
        self.remove::<Specification>(uid)
    }

    /// Specifications, optionally of one group, ordered by position rank
    pub fn list_specifications(&self, group: Option<&Uid>) -> Result<Vec<Specification>> {
        let mut specs: Vec<Specification> = self
            .list::<Specification>()?
            .into_iter()
            .filter(|s| group.map_or(true, |g| &s.specification_group_uid == g))
            .collect();
        specs.sort_by_key(|s| s.position_rank);
        Ok(specs)
    }

    /// The specification an enum option attaches to, which must be `Enum Plus`
    fn enum_plus_target(&self, uid: &Uid) -> Result<Specification> {
        let spec: Specification = self.referenced("specification_uid", uid)?;
        if spec.spec_type() != SpecificationType::EnumPlus {
            return Err(TaxonomyError::InvalidOperation(format!(
                "specification {} ({}) is of type {}; enum options require an Enum Plus specification",
                spec.name,
                spec.uid,
                spec.spec_type()
            )));
        }
        Ok(spec)
    }

    pub fn create_enum_option(&self, input: &Value) -> Result<EnumOption> {
        let new: NewEnumOption = self.parse(EntityKind::EnumOption, Mode::Create, input)?;
        self.enum_plus_target(&new.specification_uid)?;
        self.store.create(new.into_entity())
    }

    pub fn update_enum_option(&self, input: &Value) -> Result<EnumOption> {
        let patch: EnumOptionPatch = self.parse(EntityKind::EnumOption, Mode::Update, input)?;
        self.get::<EnumOption>(patch.uid.as_str())?;
        if let Some(spec) = &patch.specification_uid {
            self.enum_plus_target(spec)?;
        }
        self.apply_patch(&patch.uid, &patch)
    }

    /// Enum options are leaves; values referencing a deleted option keep its UID
    pub fn delete_enum_option(&self, uid: &str) -> Result<()> {
        self.remove::<EnumOption>(uid)
    }

    pub fn list_enum_options(&self, specification: Option<&Uid>) -> Result<Vec<EnumOption>> {
        Ok(self
            .list::<EnumOption>()?
            .into_iter()
            .filter(|o| specification.map_or(true, |s| &o.specification_uid == s))
            .collect())
    }

    /// Check that every UID names an option of `spec`
    pub(crate) fn foreign_options(
        &self,
        spec: &Specification,
        uids: &[Uid],
        path: &str,
    ) -> Result<Vec<Violation>> {
        let options = self.list_enum_options(Some(&spec.uid))?;
        Ok(uids
            .iter()
            .enumerate()
            .filter(|(_, uid)| !options.iter().any(|o| &o.uid == *uid))
            .map(|(i, uid)| {
                Violation::new(
                    format!("{}/{}", path, i),
                    format!("{} is not an enum option of specification {}", uid, spec.name),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures;
    use crate::core::error::TaxonomyError;
    use crate::core::identity::{EntityKind, Uid};
    use crate::entities::specification::{NumType, RangeType};
    use crate::entities::{Specification, SpecificationType, TypeOptions};
    use serde_json::json;

    #[test]
    fn test_create_specification_with_options() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(
            &group.uid,
            "format",
            "Numerical Range",
            json!({ "unit": "mm", "range_type": "two_dimensional", "num_type": "int" }),
            true,
        );
        let fetched: Specification = fx.catalog.get(spec.uid.as_str()).unwrap();
        assert_eq!(fetched, spec);
        match fetched.options {
            TypeOptions::NumericalRange(o) => {
                assert_eq!(o.range_type, RangeType::TwoDimensional);
                assert_eq!(o.num_type, NumType::Int);
                assert_eq!(o.unit.as_deref(), Some("mm"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_options_mismatch_is_a_validation_error() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let err = fx
            .catalog
            .create_specification(&json!({
                "name": "colour",
                "specification_group_uid": group.uid,
                "label": { "en": "Colour" },
                "type": "Boolean Plus",
                "type_options": { "allow_multiple": true }
            }))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.violations()[0].path, "/type_options/allow_multiple");
    }

    #[test]
    fn test_enum_option_requires_enum_plus() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let text = fx.spec(&group.uid, "notes", "Text", json!({}), false);

        let err = fx
            .catalog
            .create_enum_option(&json!({
                "name": "x",
                "specification_uid": text.uid,
                "label": { "en": "X" }
            }))
            .unwrap_err();
        match err {
            TaxonomyError::InvalidOperation(msg) => assert!(msg.contains("Enum Plus")),
            other => panic!("unexpected {:?}", other),
        }

        let err = fx
            .catalog
            .create_enum_option(&json!({
                "name": "x",
                "specification_uid": Uid::new(),
                "label": { "en": "X" }
            }))
            .unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::ReferenceNotFound { kind: EntityKind::Specification, .. }
        ));

        let binding = fx.spec(&group.uid, "binding", "Enum Plus", json!({}), false);
        let option = fx
            .catalog
            .create_enum_option(&json!({
                "name": "pur",
                "specification_uid": binding.uid,
                "label": { "en": "PUR" }
            }))
            .unwrap();
        assert!(option.manufacturers_using.is_empty());
    }

    #[test]
    fn test_specification_delete_blocked_by_options() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "binding", "Enum Plus", json!({}), false);
        for name in ["pur", "eva"] {
            fx.catalog
                .create_enum_option(&json!({
                    "name": name,
                    "specification_uid": spec.uid,
                    "label": { "en": name }
                }))
                .unwrap();
        }
        let err = fx.catalog.delete_specification(spec.uid.as_str()).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::Dependency { dependent: EntityKind::EnumOption, count: 2, .. }
        ));
    }

    #[test]
    fn test_type_change_rechecks_stored_options() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "width", "Numerical", json!({ "unit": "mm" }), false);

        let err = fx
            .catalog
            .update_specification(&json!({ "uid": spec.uid, "type": "Numerical Range" }))
            .unwrap_err();
        assert_eq!(err.violations()[0].path, "/type_options/range_type");

        let updated = fx
            .catalog
            .update_specification(&json!({
                "uid": spec.uid,
                "type": "Numerical Range",
                "type_options": { "unit": "mm", "range_type": "from_to" }
            }))
            .unwrap();
        assert_eq!(updated.spec_type(), SpecificationType::NumericalRange);
        assert_eq!(updated.created_at, spec.created_at);

        let renamed = fx
            .catalog
            .update_specification(&json!({ "uid": spec.uid, "highlighted": true }))
            .unwrap();
        assert_eq!(renamed.options, updated.options);
        assert!(renamed.highlighted);
    }

    #[test]
    fn test_leaving_enum_plus_with_options_is_refused() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "binding", "Enum Plus", json!({}), false);
        fx.catalog
            .create_enum_option(&json!({
                "name": "pur",
                "specification_uid": spec.uid,
                "label": { "en": "PUR" }
            }))
            .unwrap();
        let err = fx
            .catalog
            .update_specification(&json!({ "uid": spec.uid, "type": "Text", "type_options": {} }))
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidOperation(_)));
    }

    #[test]
    fn test_type_change_refused_while_values_exist() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "speed", "Numerical", json!({ "unit": "cycles/h" }), true);
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);
        let instance = machine.primary().unwrap();
        fx.catalog
            .set_specification_value(&json!({
                "machine_model_instance_uid": instance.uid,
                "specification_uid": spec.uid,
                "value": { "numerical": 5 }
            }))
            .unwrap();

        let err = fx
            .catalog
            .update_specification(&json!({ "uid": spec.uid, "type": "Text", "type_options": {} }))
            .unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::InvalidOperation(ref m) if m.contains("1 stored value(s)")
        ));
        let stored: Specification = fx.catalog.get(spec.uid.as_str()).unwrap();
        assert_eq!(stored.spec_type(), SpecificationType::Numerical);
        assert!(fx.catalog.validate_machine(machine.machine.uid.as_str()).unwrap().valid);

        // options that keep the shape stay editable
        let updated = fx
            .catalog
            .update_specification(&json!({
                "uid": spec.uid,
                "type_options": { "unit": "sheets/h" }
            }))
            .unwrap();
        assert_eq!(updated.spec_type(), SpecificationType::Numerical);
    }

    #[test]
    fn test_type_change_refused_while_presets_exist() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "speed", "Numerical", json!({}), false);
        fx.catalog
            .create_specification_preset(&json!({
                "preset_level": "category",
                "preset_target_uid": cat.uid,
                "specification_uid": spec.uid,
                "allowed_values": {
                    "type": "numerical",
                    "numerical": { "constraint_type": "exact", "exact": 5 }
                }
            }))
            .unwrap();

        let err = fx
            .catalog
            .update_specification(&json!({ "uid": spec.uid, "type": "Text", "type_options": {} }))
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidOperation(ref m) if m.contains("1 preset(s)")));
    }

    #[test]
    fn test_range_type_change_refused_while_values_exist() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(
            &group.uid,
            "format",
            "Numerical Range",
            json!({ "unit": "mm", "range_type": "from_to" }),
            false,
        );
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);
        fx.catalog
            .set_specification_value(&json!({
                "machine_model_instance_uid": machine.primary().unwrap().uid,
                "specification_uid": spec.uid,
                "value": { "numerical_range": { "from": 100, "to": 200 } }
            }))
            .unwrap();

        let err = fx
            .catalog
            .update_specification(&json!({
                "uid": spec.uid,
                "type_options": { "unit": "mm", "range_type": "two_dimensional" }
            }))
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidOperation(_)));
    }

    #[test]
    fn test_specification_delete_blocked_by_values() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "speed", "Numerical", json!({}), false);
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);
        fx.catalog
            .set_specification_value(&json!({
                "machine_model_instance_uid": machine.primary().unwrap().uid,
                "specification_uid": spec.uid,
                "value": { "numerical": 5 }
            }))
            .unwrap();

        assert!(matches!(
            fx.catalog.delete_specification(spec.uid.as_str()).unwrap_err(),
            TaxonomyError::Dependency {
                dependent: EntityKind::MachineSpecificationValue,
                count: 1,
                ..
            }
        ));
    }
}
