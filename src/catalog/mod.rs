//! Catalog - referential integrity and domain operations over the store
//!
//! Every mutating operation takes loosely typed JSON input, validates it
//! against the collection's schema and the discriminated variant checks,
//! verifies the references it carries and only then writes. Deletes are
//! refused while dependents exist, except for machines which cascade.

mod categories;
mod machines;
mod models;
mod presets;
pub mod queries;
pub mod relations;
mod specifications;

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::error::{Result, TaxonomyError};
use crate::core::identity::{EntityKind, Uid};
use crate::core::store::Store;
use crate::schema::{Mode, Validator};

pub use machines::{MachineDeletion, MachineDetails, ValueWrite};
pub use presets::PresetFilter;
pub use queries::{
    CategoryTree, GroupWithSpecifications, InstanceReport, MissingSpecification, ReadinessReport,
    SearchHit,
};
pub use relations::{RelationRegistry, Related, Relations};

/// Domain operations over one data directory
pub struct Catalog {
    store: Store,
    validator: &'static Validator,
}

impl Catalog {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            validator: Validator::shared(),
        }
    }

    /// Catalog over the collections in `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Store::open(data_dir))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch a record, failing with `NotFound`
    pub fn get<E: Entity>(&self, uid: &str) -> Result<E> {
        self.store.require(uid)
    }

    /// All records of a kind
    pub fn list<E: Entity>(&self) -> Result<Vec<E>> {
        self.store.list()
    }

    /// Validate `input` and deserialize it
    fn parse<T: serde::de::DeserializeOwned>(
        &self,
        kind: EntityKind,
        mode: Mode,
        input: &Value,
    ) -> Result<T> {
        self.validator.parse(kind, mode, input)
    }

    /// Look up a referenced record, failing with `ReferenceNotFound`
    fn referenced<E: Entity>(&self, field: &str, uid: &Uid) -> Result<E> {
        self.store
            .get::<E>(uid.as_str())?
            .ok_or_else(|| TaxonomyError::reference(field, E::KIND, uid.as_str()))
    }

    /// Number of `D` records matching `pred`
    fn count<D: Entity>(&self, pred: impl Fn(&D) -> bool) -> Result<usize> {
        Ok(self.store.list::<D>()?.iter().filter(|d| pred(d)).count())
    }

    /// Refuse a delete when any dependent count is non-zero.
    ///
    /// Dependents are checked in order; the first non-empty one is reported.
    fn guard_delete(
        &self,
        kind: EntityKind,
        uid: &str,
        dependents: &[(EntityKind, usize)],
    ) -> Result<()> {
        if let Some((dependent, count)) = dependents.iter().find(|(_, count)| *count > 0) {
            tracing::warn!(
                kind = kind.collection(),
                uid,
                dependent = dependent.collection(),
                count,
                "delete refused"
            );
            return Err(TaxonomyError::Dependency {
                kind,
                uid: uid.to_string(),
                dependent: *dependent,
                count: *count,
            });
        }
        Ok(())
    }

    /// Merge a validated patch into the stored record
    fn apply_patch<E: Entity, P: Serialize>(&self, uid: &Uid, patch: &P) -> Result<E> {
        let fields = patch_fields(patch)?;
        self.store
            .update::<E>(uid.as_str(), &fields)?
            .ok_or_else(|| TaxonomyError::not_found(E::KIND, uid.as_str()))
    }

    /// Delete a record that must exist
    fn remove<E: Entity>(&self, uid: &str) -> Result<()> {
        if self.store.delete::<E>(uid)? {
            Ok(())
        } else {
            Err(TaxonomyError::not_found(E::KIND, uid))
        }
    }
}

/// The fields a patch sets, without its `uid`
fn patch_fields<P: Serialize>(patch: &P) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(patch).map_err(|e| {
        TaxonomyError::InvalidOperation(format!("patch could not be serialized: {}", e))
    })?;
    let mut fields = match value {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.remove("uid");
    Ok(fields)
}
