//! Relationship lookup by UID
//!
//! Each identified kind registers a resolver that knows its own forward
//! references and the records pointing back at it. A lookup probes the
//! registered kinds in order and answers from the first one owning the UID.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::core::entity::Entity;
use crate::core::error::{Result, TaxonomyError};
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{
    Category, EnumOption, Machine, MachineModelInstance, MachineSpecificationValue, Model,
    PresetLevel, Specification, SpecificationGroup, SpecificationPreset,
};

/// Named groups of related records
pub type Related = BTreeMap<String, Vec<Value>>;

/// An entity with its immediate relations
#[derive(Debug, Clone, Serialize)]
pub struct Relations {
    pub kind: EntityKind,
    pub entity: Value,
    pub related: Related,
}

impl Relations {
    /// Total number of related records across all groups
    pub fn related_count(&self) -> usize {
        self.related.values().map(Vec::len).sum()
    }
}

type Resolver = fn(&Catalog, &str) -> Result<Option<Relations>>;

/// Relation resolvers keyed by the kind they answer for
pub struct RelationRegistry {
    resolvers: Vec<(EntityKind, Resolver)>,
}

impl Default for RelationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(EntityKind::Category, category);
        registry.register(EntityKind::Model, model);
        registry.register(EntityKind::Machine, machine);
        registry.register(EntityKind::SpecificationGroup, specification_group);
        registry.register(EntityKind::Specification, specification);
        registry.register(EntityKind::EnumOption, enum_option);
        registry.register(EntityKind::SpecificationPreset, preset);
        registry.register(EntityKind::MachineModelInstance, instance);
        registry
    }
}

impl RelationRegistry {
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Register a resolver; a kind registered twice keeps its first slot
    /// and takes the new resolver
    pub fn register(&mut self, kind: EntityKind, resolver: Resolver) {
        match self.resolvers.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = resolver,
            None => self.resolvers.push((kind, resolver)),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.resolvers.iter().map(|(k, _)| *k)
    }

    /// Find the owner of `uid` and its relations
    pub fn resolve(&self, catalog: &Catalog, uid: &str) -> Result<Relations> {
        for (kind, resolver) in &self.resolvers {
            if let Some(relations) = resolver(catalog, uid)? {
                tracing::debug!(
                    uid,
                    kind = kind.collection(),
                    related = relations.related_count(),
                    "relations resolved"
                );
                return Ok(relations);
            }
        }
        Err(TaxonomyError::UnknownUid(uid.to_string()))
    }
}

impl Catalog {
    /// Relations of any identified record, probing the default registry
    pub fn relationships(&self, uid: &str) -> Result<Relations> {
        RelationRegistry::default().resolve(self, uid)
    }
}

fn rows<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items.iter().map(to_json).collect()
}

fn to_json<T: Serialize>(item: &T) -> Result<Value> {
    serde_json::to_value(item).map_err(|e| {
        TaxonomyError::InvalidOperation(format!("record could not be serialized: {}", e))
    })
}

/// Records of `D` matching `pred`
fn matching<D: Entity>(catalog: &Catalog, pred: impl Fn(&D) -> bool) -> Result<Vec<Value>> {
    let found: Vec<D> = catalog.list::<D>()?.into_iter().filter(|d| pred(d)).collect();
    rows(&found)
}

/// The record a forward reference points at, if it still exists
fn target<D: Entity>(catalog: &Catalog, uid: Option<&Uid>) -> Result<Vec<Value>> {
    match uid {
        Some(uid) => match catalog.store().get::<D>(uid.as_str())? {
            Some(found) => Ok(vec![to_json(&found)?]),
            None => Ok(Vec::new()),
        },
        None => Ok(Vec::new()),
    }
}

/// Look `uid` up as an `E` and collect its relations with `relate`
fn probe<E: Entity>(
    catalog: &Catalog,
    uid: &str,
    relate: impl Fn(&Catalog, &E) -> Result<Related>,
) -> Result<Option<Relations>> {
    let Some(entity) = catalog.store().get::<E>(uid)? else {
        return Ok(None);
    };
    Ok(Some(Relations {
        kind: E::KIND,
        entity: to_json(&entity)?,
        related: relate(catalog, &entity)?,
    }))
}

fn values_of(
    catalog: &Catalog,
    pred: impl Fn(&MachineSpecificationValue) -> bool,
) -> Result<Vec<Value>> {
    let values: Vec<_> = catalog
        .list_specification_values(None)?
        .into_iter()
        .filter(|v| pred(v))
        .collect();
    rows(&values)
}

fn category(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, c: &Category| {
        let mut related = Related::new();
        related.insert(
            "parent".into(),
            target::<Category>(catalog, c.parent_category_uid.as_ref())?,
        );
        related.insert(
            "alt_parent".into(),
            target::<Category>(catalog, c.alt_parent_category_uid.as_ref())?,
        );
        related.insert(
            "children".into(),
            matching(catalog, |o: &Category| o.parent_category_uid.as_ref() == Some(&c.uid))?,
        );
        related.insert(
            "alt_children".into(),
            matching(catalog, |o: &Category| o.alt_parent_category_uid.as_ref() == Some(&c.uid))?,
        );
        related.insert(
            "specification_groups".into(),
            matching(catalog, |g: &SpecificationGroup| g.category_uid == c.uid)?,
        );
        related.insert("models".into(), matching(catalog, |m: &Model| m.category_uid == c.uid)?);
        related.insert("machines".into(), rows(&catalog.machines_in_category(&c.uid)?)?);
        related.insert(
            "presets".into(),
            matching(catalog, |p: &SpecificationPreset| {
                p.preset_level == PresetLevel::Category && p.preset_target_uid == c.uid
            })?,
        );
        Ok(related)
    })
}

fn model(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, m: &Model| {
        let mut related = Related::new();
        related.insert("category".into(), target::<Category>(catalog, Some(&m.category_uid))?);
        related.insert(
            "presets".into(),
            matching(catalog, |p: &SpecificationPreset| {
                p.preset_level == PresetLevel::Model && p.preset_target_uid == m.uid
            })?,
        );
        related.insert(
            "machines".into(),
            matching(catalog, |x: &Machine| x.primary_model_uid == m.uid)?,
        );
        related.insert(
            "instances".into(),
            matching(catalog, |i: &MachineModelInstance| i.model_uid == m.uid)?,
        );
        Ok(related)
    })
}

fn machine(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, m: &Machine| {
        let instances: Vec<MachineModelInstance> = catalog.get_machine(m.uid.as_str())?.instances;
        let mut related = Related::new();
        related.insert(
            "primary_model".into(),
            target::<Model>(catalog, Some(&m.primary_model_uid))?,
        );
        related.insert(
            "values".into(),
            values_of(catalog, |v| {
                instances.iter().any(|i| i.uid == v.machine_model_instance_uid)
            })?,
        );
        related.insert("instances".into(), rows(&instances)?);
        Ok(related)
    })
}

fn specification_group(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, g: &SpecificationGroup| {
        let mut related = Related::new();
        related.insert("category".into(), target::<Category>(catalog, Some(&g.category_uid))?);
        related.insert("specifications".into(), rows(&catalog.list_specifications(Some(&g.uid))?)?);
        Ok(related)
    })
}

fn specification(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, s: &Specification| {
        let mut related = Related::new();
        related.insert(
            "specification_group".into(),
            target::<SpecificationGroup>(catalog, Some(&s.specification_group_uid))?,
        );
        related.insert("enum_options".into(), rows(&catalog.list_enum_options(Some(&s.uid))?)?);
        related.insert(
            "presets".into(),
            matching(catalog, |p: &SpecificationPreset| p.specification_uid == s.uid)?,
        );
        related.insert("values".into(), values_of(catalog, |v| v.specification_uid == s.uid)?);
        Ok(related)
    })
}

fn enum_option(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, o: &EnumOption| {
        let mut related = Related::new();
        related.insert(
            "specification".into(),
            target::<Specification>(catalog, Some(&o.specification_uid))?,
        );
        Ok(related)
    })
}

fn preset(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, p: &SpecificationPreset| {
        let mut related = Related::new();
        related.insert(
            "specification".into(),
            target::<Specification>(catalog, Some(&p.specification_uid))?,
        );
        let target_rows = match p.preset_level {
            PresetLevel::Category => target::<Category>(catalog, Some(&p.preset_target_uid))?,
            PresetLevel::Model => target::<Model>(catalog, Some(&p.preset_target_uid))?,
        };
        related.insert("target".into(), target_rows);
        Ok(related)
    })
}

fn instance(catalog: &Catalog, uid: &str) -> Result<Option<Relations>> {
    probe(catalog, uid, |catalog, i: &MachineModelInstance| {
        let mut related = Related::new();
        related.insert("machine".into(), target::<Machine>(catalog, Some(&i.machine_uid))?);
        related.insert("model".into(), target::<Model>(catalog, Some(&i.model_uid))?);
        related.insert(
            "values".into(),
            values_of(catalog, |v| v.machine_model_instance_uid == i.uid)?,
        );
        Ok(related)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use serde_json::json;

    #[test]
    fn test_every_identified_kind_is_registered() {
        let registry = RelationRegistry::default();
        let mut kinds: Vec<EntityKind> = registry.kinds().collect();
        kinds.sort();
        let mut expected: Vec<EntityKind> = EntityKind::identified().collect();
        expected.sort();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_category_relations() {
        let fx = fixtures::catalog();
        let root = fx.category("root", None);
        let child = fx.category("child", Some(&root.uid));
        fx.group(&child.uid);
        fx.model(&child.uid);

        let relations = fx.catalog.relationships(child.uid.as_str()).unwrap();
        assert_eq!(relations.kind, EntityKind::Category);
        assert_eq!(relations.entity["name"], "child");
        assert_eq!(relations.related["parent"].len(), 1);
        assert_eq!(relations.related["parent"][0]["uid"], json!(root.uid));
        assert_eq!(relations.related["specification_groups"].len(), 1);
        assert_eq!(relations.related["models"].len(), 1);
        assert!(relations.related["children"].is_empty());
    }

    #[test]
    fn test_kinds_beyond_categories_and_models_resolve() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let spec = fx.spec(&group.uid, "notes", "Text", json!({}), true);
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);
        let instance = machine.primary().unwrap().clone();
        fx.catalog
            .set_specification_value(&json!({
                "machine_model_instance_uid": instance.uid,
                "specification_uid": spec.uid,
                "value": { "text": { "en": "hot melt" } }
            }))
            .unwrap();

        let relations = fx.catalog.relationships(machine.machine.uid.as_str()).unwrap();
        assert_eq!(relations.kind, EntityKind::Machine);
        assert_eq!(relations.related["instances"].len(), 1);
        assert_eq!(relations.related["values"].len(), 1);

        let relations = fx.catalog.relationships(spec.uid.as_str()).unwrap();
        assert_eq!(relations.kind, EntityKind::Specification);
        assert_eq!(relations.related["values"].len(), 1);

        let relations = fx.catalog.relationships(instance.uid.as_str()).unwrap();
        assert_eq!(relations.kind, EntityKind::MachineModelInstance);
        assert_eq!(relations.related["model"][0]["uid"], json!(model.uid));

        let relations = fx.catalog.relationships(model.uid.as_str()).unwrap();
        assert_eq!(relations.related["machines"].len(), 1);
        assert_eq!(relations.related["instances"].len(), 1);
    }

    #[test]
    fn test_unknown_uid() {
        let fx = fixtures::catalog();
        let err = fx.catalog.relationships("01J9ZQ3V6W8X9Y0Z1A2B3C4D5E").unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownUid(_)));
    }
}
