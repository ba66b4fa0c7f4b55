//! Specification presets

use serde_json::Value;

use crate::catalog::{patch_fields, Catalog};
use crate::core::error::{Result, TaxonomyError, Violation};
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{
    AllowedValues, Category, Model, NewSpecificationPreset, PresetLevel, Specification,
    SpecificationPreset, SpecificationPresetPatch,
};
use crate::schema::Mode;

/// Filters for [`Catalog::list_specification_presets`]
#[derive(Debug, Default, Clone)]
pub struct PresetFilter {
    pub level: Option<PresetLevel>,
    pub target: Option<Uid>,
    pub specification: Option<Uid>,
}

impl Catalog {
    /// Check references and the compatibility of `allowed_values` with the
    /// specification's type
    fn check_preset(
        &self,
        level: PresetLevel,
        target: &Uid,
        specification: &Uid,
        allowed: &AllowedValues,
    ) -> Result<()> {
        let spec: Specification = self.referenced("specification_uid", specification)?;
        match level {
            PresetLevel::Category => {
                self.referenced::<Category>("preset_target_uid", target)?;
            }
            PresetLevel::Model => {
                self.referenced::<Model>("preset_target_uid", target)?;
            }
        }

        let mut violations = Vec::new();
        if let Err(message) = allowed.check_against(&spec.options) {
            violations.push(Violation::new("/allowed_values/type", message));
        }
        if let AllowedValues::EnumOptions { enum_option_uids } = allowed {
            violations.extend(self.foreign_options(
                &spec,
                enum_option_uids,
                "/allowed_values/enum_option_uids",
            )?);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(TaxonomyError::validation(violations))
        }
    }

    fn duplicate_preset(level: PresetLevel, target: &Uid, specification: &Uid) -> TaxonomyError {
        TaxonomyError::Conflict(format!(
            "a {}-level preset for specification {} on {} already exists",
            level, specification, target
        ))
    }

    pub fn create_specification_preset(&self, input: &Value) -> Result<SpecificationPreset> {
        let new: NewSpecificationPreset =
            self.parse(EntityKind::SpecificationPreset, Mode::Create, input)?;
        self.check_preset(
            new.preset_level,
            &new.preset_target_uid,
            &new.specification_uid,
            &new.allowed_values,
        )?;

        let preset = new.into_entity();
        self.store
            .transact(EntityKind::SpecificationPreset, |rows: &mut Vec<SpecificationPreset>| {
                if rows.iter().any(|p| p.key() == preset.key()) {
                    return Err(Self::duplicate_preset(
                        preset.preset_level,
                        &preset.preset_target_uid,
                        &preset.specification_uid,
                    ));
                }
                rows.push(preset.clone());
                Ok(())
            })?;
        tracing::info!(kind = "specification-presets", uid = %preset.uid, "created");
        Ok(preset)
    }

    /// Update a preset; the resulting (level, target, specification) triple
    /// must stay unique
    pub fn update_specification_preset(&self, input: &Value) -> Result<SpecificationPreset> {
        let patch: SpecificationPresetPatch =
            self.parse(EntityKind::SpecificationPreset, Mode::Update, input)?;
        let current: SpecificationPreset = self.get(patch.uid.as_str())?;

        let level = patch.preset_level.unwrap_or(current.preset_level);
        let target = patch
            .preset_target_uid
            .clone()
            .unwrap_or_else(|| current.preset_target_uid.clone());
        let specification = patch
            .specification_uid
            .clone()
            .unwrap_or_else(|| current.specification_uid.clone());
        let allowed = patch
            .allowed_values
            .clone()
            .unwrap_or_else(|| current.allowed_values.clone());
        self.check_preset(level, &target, &specification, &allowed)?;

        let fields = patch_fields(&patch)?;
        self.store
            .update_checked(
                patch.uid.as_str(),
                &fields,
                |rows: &[SpecificationPreset], updated: &SpecificationPreset| {
                    let taken = rows
                        .iter()
                        .any(|p| p.uid != updated.uid && p.key() == updated.key());
                    if taken {
                        return Err(Self::duplicate_preset(
                            updated.preset_level,
                            &updated.preset_target_uid,
                            &updated.specification_uid,
                        ));
                    }
                    Ok(())
                },
            )?
            .ok_or_else(|| {
                TaxonomyError::not_found(EntityKind::SpecificationPreset, patch.uid.as_str())
            })
    }

    pub fn delete_specification_preset(&self, uid: &str) -> Result<()> {
        self.remove::<SpecificationPreset>(uid)
    }

    pub fn list_specification_presets(
        &self,
        filter: &PresetFilter,
    ) -> Result<Vec<SpecificationPreset>> {
        Ok(self
            .list::<SpecificationPreset>()?
            .into_iter()
            .filter(|p| filter.level.map_or(true, |l| p.preset_level == l))
            .filter(|p| filter.target.as_ref().map_or(true, |t| &p.preset_target_uid == t))
            .filter(|p| {
                filter
                    .specification
                    .as_ref()
                    .map_or(true, |s| &p.specification_uid == s)
            })
            .collect())
    }
}
