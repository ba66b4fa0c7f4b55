//! Read-only joins across collections: category trees, machine readiness
//! and free-text search

use serde::Serialize;
use std::str::FromStr;

use crate::catalog::Catalog;
use crate::core::entity::Multilingual;
use crate::core::error::Result;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{Category, Machine, Model, Specification, SpecificationGroup};

/// A specification group with its specifications
#[derive(Debug, Clone, Serialize)]
pub struct GroupWithSpecifications {
    #[serde(flatten)]
    pub group: SpecificationGroup,
    pub specifications: Vec<Specification>,
}

/// A category with its groups and their specifications, one level deep
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTree {
    pub category: Category,
    pub specification_groups: Vec<GroupWithSpecifications>,
}

impl CategoryTree {
    pub fn specification_count(&self) -> usize {
        self.specification_groups
            .iter()
            .map(|g| g.specifications.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingSpecification {
    pub uid: Uid,
    pub name: String,
    pub label: Multilingual,
}

/// Required specifications one instance has no value for
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub instance_uid: Uid,
    pub model_uid: Uid,
    pub position: u32,
    pub instance_label: String,
    pub missing: Vec<MissingSpecification>,
}

/// Outcome of [`Catalog::validate_machine`]
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub machine_uid: Uid,
    pub category_uid: Uid,
    pub required_count: usize,
    pub instances: Vec<InstanceReport>,
    pub valid: bool,
}

impl ReadinessReport {
    pub fn missing_count(&self) -> usize {
        self.instances.iter().map(|i| i.missing.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub uid: String,
    pub name: String,
    /// English label, or the name for kinds without labels
    pub label: String,
}

impl Catalog {
    /// The category with its specification groups, each with its
    /// specifications, ordered by position rank. Child categories are not
    /// followed.
    pub fn category_tree(&self, category_uid: &str) -> Result<CategoryTree> {
        let category: Category = self.get(category_uid)?;
        let specifications = self.list_specifications(None)?;
        let specification_groups = self
            .list_specification_groups(Some(&category.uid))?
            .into_iter()
            .map(|group| {
                let specifications = specifications
                    .iter()
                    .filter(|s| s.specification_group_uid == group.uid)
                    .cloned()
                    .collect();
                GroupWithSpecifications {
                    group,
                    specifications,
                }
            })
            .collect();
        Ok(CategoryTree {
            category,
            specification_groups,
        })
    }

    /// Check every instance of a machine against the required
    /// specifications of its primary model's category
    pub fn validate_machine(&self, machine_uid: &str) -> Result<ReadinessReport> {
        let details = self.get_machine(machine_uid)?;
        let model: Model =
            self.referenced("primary_model_uid", &details.machine.primary_model_uid)?;
        let category: Category = self.referenced("category_uid", &model.category_uid)?;

        let mut required = Vec::new();
        for group in self.list_specification_groups(Some(&category.uid))? {
            required.extend(
                self.list_specifications(Some(&group.uid))?
                    .into_iter()
                    .filter(|s| s.required),
            );
        }

        let values = self.list_specification_values(None)?;
        let instances: Vec<InstanceReport> = details
            .instances
            .iter()
            .map(|instance| InstanceReport {
                instance_uid: instance.uid.clone(),
                model_uid: instance.model_uid.clone(),
                position: instance.position,
                instance_label: instance.display_label(),
                missing: required
                    .iter()
                    .filter(|spec| !values.iter().any(|v| v.is_for(&instance.uid, &spec.uid)))
                    .map(|spec| MissingSpecification {
                        uid: spec.uid.clone(),
                        name: spec.name.clone(),
                        label: spec.label.clone(),
                    })
                    .collect(),
            })
            .collect();

        let valid = instances.iter().all(|i| i.missing.is_empty());
        tracing::debug!(
            machine = machine_uid,
            required = required.len(),
            instances = instances.len(),
            valid,
            "machine validated"
        );
        Ok(ReadinessReport {
            machine_uid: details.machine.uid,
            category_uid: category.uid,
            required_count: required.len(),
            instances,
            valid,
        })
    }

    /// Case-insensitive substring search over names and labels.
    ///
    /// `kinds` names collections as accepted by [`EntityKind::from_str`];
    /// names that do not resolve are skipped.
    pub fn search(&self, query: &str, kinds: Option<&[String]>) -> Result<Vec<SearchHit>> {
        let needle = query.to_lowercase();
        let kinds: Vec<EntityKind> = match kinds {
            Some(names) => names
                .iter()
                .filter_map(|n| EntityKind::from_str(n).ok())
                .filter(|k| *k != EntityKind::MachineSpecificationValue)
                .collect(),
            None => EntityKind::default_search().to_vec(),
        };

        let mut hits = Vec::new();
        for kind in kinds {
            for row in self.store.list_values(kind)? {
                let name = row.get("name").and_then(|n| n.as_str()).unwrap_or_default();
                let label = row
                    .get("label")
                    .and_then(|l| serde_json::from_value::<Multilingual>(l.clone()).ok());
                let matched = name.to_lowercase().contains(&needle)
                    || label.as_ref().is_some_and(|l| l.contains_lowercase(&needle));
                if !matched {
                    continue;
                }
                hits.push(SearchHit {
                    kind,
                    uid: row
                        .get("uid")
                        .and_then(|u| u.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    name: name.to_string(),
                    label: label.map(|l| l.en).unwrap_or_else(|| name.to_string()),
                });
            }
        }
        Ok(hits)
    }

    /// Machines whose primary model belongs to `category`
    pub fn machines_in_category(&self, category: &Uid) -> Result<Vec<Machine>> {
        let models: Vec<Uid> = self
            .list_models(Some(category))?
            .into_iter()
            .map(|m| m.uid)
            .collect();
        Ok(self
            .list::<Machine>()?
            .into_iter()
            .filter(|m| models.contains(&m.primary_model_uid))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures;
    use crate::core::error::TaxonomyError;
    use crate::core::identity::EntityKind;
    use serde_json::json;

    #[test]
    fn test_category_tree_two_levels_ordered() {
        let fx = fixtures::catalog();
        let cat = fx.category("binders", None);
        let child = fx.category("perfect-binders", Some(&cat.uid));
        fx.group(&child.uid);
        let equipment = fx
            .catalog
            .create_specification_group(&json!({
                "name": "equipment",
                "category_uid": cat.uid,
                "label": { "en": "Equipment" },
                "type": "Equipment",
                "position_rank": 2
            }))
            .unwrap();
        let technical = fx
            .catalog
            .create_specification_group(&json!({
                "name": "technical",
                "category_uid": cat.uid,
                "label": { "en": "Technical" },
                "type": "Technical Details",
                "position_rank": 1
            }))
            .unwrap();
        fx.spec(&technical.uid, "speed", "Numerical", json!({}), true);
        fx.spec(
            &technical.uid,
            "format",
            "Numerical Range",
            json!({ "range_type": "from_to" }),
            false,
        );
        fx.spec(&equipment.uid, "stacker", "Boolean Plus", json!({}), false);

        let tree = fx.catalog.category_tree(cat.uid.as_str()).unwrap();
        assert_eq!(tree.category.uid, cat.uid);
        let names: Vec<&str> = tree
            .specification_groups
            .iter()
            .map(|g| g.group.name.as_str())
            .collect();
        assert_eq!(names, vec!["technical", "equipment"]);
        assert_eq!(tree.specification_groups[0].specifications.len(), 2);
        assert_eq!(tree.specification_count(), 3);

        let rendered = serde_json::to_value(&tree).unwrap();
        assert_eq!(rendered["specification_groups"][0]["name"], "technical");
        assert!(rendered["specification_groups"][0]["specifications"].is_array());
    }

    #[test]
    fn test_category_tree_unknown_uid() {
        let fx = fixtures::catalog();
        let err = fx.catalog.category_tree("01J9ZQ3V6W8X9Y0Z1A2B3C4D5E").unwrap_err();
        assert!(matches!(err, TaxonomyError::NotFound { kind: EntityKind::Category, .. }));
    }

    #[test]
    fn test_validate_machine_reports_per_instance_until_filled() {
        let fx = fixtures::catalog();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        let speed = fx.spec(&group.uid, "speed", "Numerical", json!({}), true);
        let notes = fx.spec(&group.uid, "notes", "Text", json!({}), true);
        fx.spec(&group.uid, "stacker", "Boolean Plus", json!({}), false);
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);
        let second = fx
            .catalog
            .add_model_instance(&json!({
                "machine_uid": machine.machine.uid,
                "model_uid": model.uid,
                "position": 1,
                "instance_label": "Second station"
            }))
            .unwrap();

        let report = fx.catalog.validate_machine(machine.machine.uid.as_str()).unwrap();
        assert!(!report.valid);
        assert_eq!(report.required_count, 2);
        assert_eq!(report.instances.len(), 2);
        assert_eq!(report.missing_count(), 4);
        assert_eq!(report.instances[0].instance_label, "#0");
        assert_eq!(report.instances[1].instance_label, "Second station");

        let instances = [machine.instances[0].uid.clone(), second.uid.clone()];
        for instance in &instances {
            fx.catalog
                .set_specification_value(&json!({
                    "machine_model_instance_uid": instance,
                    "specification_uid": speed.uid,
                    "value": { "numerical": 4000 }
                }))
                .unwrap();
        }
        let report = fx.catalog.validate_machine(machine.machine.uid.as_str()).unwrap();
        assert_eq!(report.missing_count(), 2);
        assert!(report.instances.iter().all(|i| i.missing[0].uid == notes.uid));

        for instance in &instances {
            fx.catalog
                .set_specification_value(&json!({
                    "machine_model_instance_uid": instance,
                    "specification_uid": notes.uid,
                    "value": { "text": { "en": "ok" } }
                }))
                .unwrap();
        }
        let report = fx.catalog.validate_machine(machine.machine.uid.as_str()).unwrap();
        assert!(report.valid);
        assert_eq!(report.missing_count(), 0);
    }

    #[test]
    fn test_search_matches_name_and_any_label_language() {
        let fx = fixtures::catalog();
        fx.catalog
            .create_category(&json!({
                "name": "saddle-stitchers",
                "label": { "en": "Saddle stitchers", "de": "Sammelhefter" }
            }))
            .unwrap();
        let cat = fx.category("folders", None);
        fx.model(&cat.uid);

        let hits = fx.catalog.search("SAMMEL", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, EntityKind::Category);
        assert_eq!(hits[0].label, "Saddle stitchers");

        let hits = fx.catalog.search("alegro", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, EntityKind::Model);
        assert_eq!(hits[0].label, "Alegro");
    }

    #[test]
    fn test_search_skips_unknown_kinds() {
        let fx = fixtures::catalog();
        let cat = fx.category("folders", None);
        fx.model(&cat.uid);
        let kinds = vec!["widgets".to_string(), "models".to_string()];
        let hits = fx.catalog.search("a", Some(&kinds)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, EntityKind::Model);
    }

    #[test]
    fn test_machines_in_category() {
        let fx = fixtures::catalog();
        let a = fx.category("a", None);
        let b = fx.category("b", None);
        let model_a = fx.model(&a.uid);
        let model_b = fx.model(&b.uid);
        fx.machine(&model_a.uid);
        fx.machine(&model_b.uid);
        fx.machine(&model_b.uid);
        assert_eq!(fx.catalog.machines_in_category(&a.uid).unwrap().len(), 1);
        assert_eq!(fx.catalog.machines_in_category(&b.uid).unwrap().len(), 2);
    }
}
