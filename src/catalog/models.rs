//! Machine models

use serde_json::Value;

use crate::catalog::Catalog;
use crate::core::error::Result;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{
    Category, Machine, MachineModelInstance, Model, ModelPatch, NewModel, PresetLevel,
    SpecificationPreset,
};
use crate::schema::Mode;

impl Catalog {
    pub fn create_model(&self, input: &Value) -> Result<Model> {
        let new: NewModel = self.parse(EntityKind::Model, Mode::Create, input)?;
        self.referenced::<Category>("category_uid", &new.category_uid)?;
        self.store.create(new.into_entity())
    }

    pub fn update_model(&self, input: &Value) -> Result<Model> {
        let patch: ModelPatch = self.parse(EntityKind::Model, Mode::Update, input)?;
        self.get::<Model>(patch.uid.as_str())?;
        if let Some(category) = &patch.category_uid {
            self.referenced::<Category>("category_uid", category)?;
        }
        self.apply_patch(&patch.uid, &patch)
    }

    /// Delete a model no preset, machine or instance refers to
    pub fn delete_model(&self, uid: &str) -> Result<()> {
        self.get::<Model>(uid)?;
        let dependents = [
            (
                EntityKind::SpecificationPreset,
                self.count(|p: &SpecificationPreset| {
                    p.preset_level == PresetLevel::Model && p.preset_target_uid == uid
                })?,
            ),
            (
                EntityKind::Machine,
                self.count(|m: &Machine| m.primary_model_uid == uid)?,
            ),
            (
                EntityKind::MachineModelInstance,
                self.count(|i: &MachineModelInstance| i.model_uid == uid)?,
            ),
        ];
        self.guard_delete(EntityKind::Model, uid, &dependents)?;
        self.remove::<Model>(uid)
    }

    pub fn list_models(&self, category: Option<&Uid>) -> Result<Vec<Model>> {
        Ok(self
            .list::<Model>()?
            .into_iter()
            .filter(|m| category.map_or(true, |c| &m.category_uid == c))
            .collect())
    }
}
