//! Categories and specification groups

use serde_json::Value;

use crate::catalog::Catalog;
use crate::core::error::Result;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{
    Category, CategoryPatch, Model, NewCategory, NewSpecificationGroup, Specification,
    SpecificationGroup, SpecificationGroupPatch,
};
use crate::schema::Mode;

impl Catalog {
    pub fn create_category(&self, input: &Value) -> Result<Category> {
        let new: NewCategory = self.parse(EntityKind::Category, Mode::Create, input)?;
        if let Some(parent) = &new.parent_category_uid {
            self.referenced::<Category>("parent_category_uid", parent)?;
        }
        if let Some(alt) = &new.alt_parent_category_uid {
            self.referenced::<Category>("alt_parent_category_uid", alt)?;
        }
        self.store.create(new.into_entity())
    }

    pub fn update_category(&self, input: &Value) -> Result<Category> {
        let patch: CategoryPatch = self.parse(EntityKind::Category, Mode::Update, input)?;
        self.get::<Category>(patch.uid.as_str())?;
        if let Some(parent) = &patch.parent_category_uid {
            self.referenced::<Category>("parent_category_uid", parent)?;
        }
        if let Some(alt) = &patch.alt_parent_category_uid {
            self.referenced::<Category>("alt_parent_category_uid", alt)?;
        }
        self.apply_patch(&patch.uid, &patch)
    }

    /// Delete a category without groups, models or child categories
    pub fn delete_category(&self, uid: &str) -> Result<()> {
        self.get::<Category>(uid)?;
        let dependents = [
            (
                EntityKind::SpecificationGroup,
                self.count(|g: &SpecificationGroup| g.category_uid == uid)?,
            ),
            (
                EntityKind::Model,
                self.count(|m: &Model| m.category_uid == uid)?,
            ),
            (
                EntityKind::Category,
                self.count(|c: &Category| {
                    c.parent_category_uid.as_ref().is_some_and(|p| p == uid)
                })?,
            ),
        ];
        self.guard_delete(EntityKind::Category, uid, &dependents)?;
        self.remove::<Category>(uid)
    }

    /// Categories, optionally only the primary children of `parent`,
    /// ordered by position rank
    pub fn list_categories(&self, parent: Option<&Uid>) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .list::<Category>()?
            .into_iter()
            .filter(|c| parent.is_none() || c.parent_category_uid.as_ref() == parent)
            .collect();
        categories.sort_by_key(|c| c.position_rank);
        Ok(categories)
    }

    pub fn create_specification_group(&self, input: &Value) -> Result<SpecificationGroup> {
        let new: NewSpecificationGroup =
            self.parse(EntityKind::SpecificationGroup, Mode::Create, input)?;
        self.referenced::<Category>("category_uid", &new.category_uid)?;
        self.store.create(new.into_entity())
    }

    pub fn update_specification_group(&self, input: &Value) -> Result<SpecificationGroup> {
        let patch: SpecificationGroupPatch =
            self.parse(EntityKind::SpecificationGroup, Mode::Update, input)?;
        self.get::<SpecificationGroup>(patch.uid.as_str())?;
        if let Some(category) = &patch.category_uid {
            self.referenced::<Category>("category_uid", category)?;
        }
        self.apply_patch(&patch.uid, &patch)
    }

    /// Delete a group without specifications
    pub fn delete_specification_group(&self, uid: &str) -> Result<()> {
        self.get::<SpecificationGroup>(uid)?;
        let dependents = [(
            EntityKind::Specification,
            self.count(|s: &Specification| s.specification_group_uid == uid)?,
        )];
        self.guard_delete(EntityKind::SpecificationGroup, uid, &dependents)?;
        self.remove::<SpecificationGroup>(uid)
    }

    /// Groups, optionally of one category, ordered by position rank
    pub fn list_specification_groups(
        &self,
        category: Option<&Uid>,
    ) -> Result<Vec<SpecificationGroup>> {
        let mut groups: Vec<SpecificationGroup> = self
            .list::<SpecificationGroup>()?
            .into_iter()
            .filter(|g| category.map_or(true, |c| &g.category_uid == c))
            .collect();
        groups.sort_by_key(|g| g.position_rank);
        Ok(groups)
    }
}
