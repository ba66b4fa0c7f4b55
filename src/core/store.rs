//! JSON collection store
//!
//! Every collection is a single pretty-printed JSON array on disk. Reads load
//! the whole array; writes replace the whole file. All mutations go through
//! [`Store::transact`], which holds a per-collection lock for the duration of
//! the read-modify-write and only writes when the closure succeeds.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::core::entity::{now, Entity};
use crate::core::error::{Result, TaxonomyError};
use crate::core::identity::EntityKind;

/// Fields a partial update can never touch
const IMMUTABLE_FIELDS: &[&str] = &["uid", "created_at", "updated_at"];

pub struct Store {
    data_dir: PathBuf,
    locks: HashMap<EntityKind, Mutex<()>>,
}

impl Store {
    /// Open a store rooted at `data_dir`. Nothing is created on disk.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let locks = EntityKind::all()
            .iter()
            .map(|kind| (*kind, Mutex::new(())))
            .collect();
        Self {
            data_dir: data_dir.into(),
            locks,
        }
    }

    /// Create the data directory and an empty array for every missing collection
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|source| TaxonomyError::Io {
            path: self.data_dir.clone(),
            source,
        })?;
        for kind in EntityKind::all() {
            let path = self.path(*kind);
            if !path.exists() {
                self.save::<Value>(*kind, &[])?;
            }
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a collection file
    pub fn path(&self, kind: EntityKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Load a whole collection. A missing or empty file is an empty collection.
    pub fn load<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|source| TaxonomyError::Io {
            path: path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<T> =
            serde_json::from_str(&content).map_err(|source| TaxonomyError::Json { path, source })?;
        tracing::debug!(collection = kind.collection(), rows = rows.len(), "loaded collection");
        Ok(rows)
    }

    /// Replace a whole collection on disk (temp file + rename)
    fn save<T: Serialize>(&self, kind: EntityKind, rows: &[T]) -> Result<()> {
        let path = self.path(kind);
        let content = serde_json::to_string_pretty(rows).map_err(|source| TaxonomyError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|source| TaxonomyError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| TaxonomyError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(collection = kind.collection(), rows = rows.len(), "saved collection");
        Ok(())
    }

    fn lock(&self, kind: EntityKind) -> Option<MutexGuard<'_, ()>> {
        self.locks
            .get(&kind)
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Atomic read-modify-write of one collection.
    ///
    /// The collection is written back only when `f` returns `Ok`.
    pub fn transact<T, R, F>(&self, kind: EntityKind, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.lock(kind);
        let mut rows = self.load::<T>(kind)?;
        let out = f(&mut rows)?;
        self.save(kind, &rows)?;
        Ok(out)
    }

    /// All records of a kind
    pub fn list<E: Entity>(&self) -> Result<Vec<E>> {
        self.load(E::KIND)
    }

    /// Look up a record by UID
    pub fn get<E: Entity>(&self, uid: &str) -> Result<Option<E>> {
        Ok(self.list::<E>()?.into_iter().find(|e| e.uid() == uid))
    }

    /// Look up a record by UID, failing with `NotFound`
    pub fn require<E: Entity>(&self, uid: &str) -> Result<E> {
        self.get::<E>(uid)?
            .ok_or_else(|| TaxonomyError::not_found(E::KIND, uid))
    }

    pub fn exists<E: Entity>(&self, uid: &str) -> Result<bool> {
        Ok(self.get::<E>(uid)?.is_some())
    }

    /// Append a record
    pub fn create<E: Entity>(&self, entity: E) -> Result<E> {
        self.transact(E::KIND, |rows: &mut Vec<E>| {
            if rows.iter().any(|e| e.uid() == entity.uid()) {
                return Err(TaxonomyError::Conflict(format!(
                    "{} with UID {} already exists",
                    E::KIND,
                    entity.uid()
                )));
            }
            rows.push(entity.clone());
            Ok(())
        })?;
        tracing::info!(kind = E::KIND.collection(), uid = %entity.uid(), "created");
        Ok(entity)
    }

    /// Merge `partial` into the record with `uid`.
    ///
    /// `uid` and `created_at` are preserved and `updated_at` is refreshed.
    /// Returns `None` when no such record exists.
    pub fn update<E: Entity>(&self, uid: &str, partial: &Map<String, Value>) -> Result<Option<E>> {
        self.update_checked(uid, partial, |_: &[E], _: &E| Ok(()))
    }

    /// Like [`Store::update`], with `check` run on the merged record against
    /// the whole collection before anything is written.
    pub fn update_checked<E, F>(
        &self,
        uid: &str,
        partial: &Map<String, Value>,
        check: F,
    ) -> Result<Option<E>>
    where
        E: Entity,
        F: FnOnce(&[E], &E) -> Result<()>,
    {
        let path = self.path(E::KIND);
        let updated = self.transact(E::KIND, |rows: &mut Vec<E>| {
            let Some(index) = rows.iter().position(|e| e.uid() == uid) else {
                return Ok(None);
            };
            let mut merged = serde_json::to_value(&rows[index]).map_err(|source| {
                TaxonomyError::Json {
                    path: path.clone(),
                    source,
                }
            })?;
            if let Value::Object(fields) = &mut merged {
                for (key, value) in partial {
                    if !IMMUTABLE_FIELDS.contains(&key.as_str()) {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                fields.insert("updated_at".to_string(), serde_json::json!(now()));
            }
            let entity: E = serde_json::from_value(merged).map_err(|source| TaxonomyError::Json {
                path: path.clone(),
                source,
            })?;
            check(rows, &entity)?;
            rows[index] = entity.clone();
            Ok(Some(entity))
        })?;
        if updated.is_some() {
            tracing::info!(kind = E::KIND.collection(), uid, "updated");
        }
        Ok(updated)
    }

    /// Remove a record. Returns whether it existed.
    pub fn delete<E: Entity>(&self, uid: &str) -> Result<bool> {
        let removed = self.transact(E::KIND, |rows: &mut Vec<E>| {
            let before = rows.len();
            rows.retain(|e| e.uid() != uid);
            Ok(rows.len() != before)
        })?;
        if removed {
            tracing::info!(kind = E::KIND.collection(), uid, "deleted");
        }
        Ok(removed)
    }

    /// Records whose top-level `field` equals `value`
    pub fn find_by<E: Entity>(&self, field: &str, value: &Value) -> Result<Vec<E>> {
        Ok(self
            .list::<E>()?
            .into_iter()
            .filter(|e| field_equals(e, field, value))
            .collect())
    }

    /// Raw JSON rows of any collection, for kind-agnostic callers
    pub fn list_values(&self, kind: EntityKind) -> Result<Vec<Value>> {
        self.load(kind)
    }
}

fn field_equals<T: Serialize>(row: &T, field: &str, value: &Value) -> bool {
    serde_json::to_value(row)
        .ok()
        .and_then(|v| v.get(field).cloned())
        .is_some_and(|v| &v == value)
}
