//! Machines, their model instances and the values stored per instance

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::core::entity::now;
use crate::core::error::{Result, TaxonomyError, Violation};
use crate::core::identity::{EntityKind, Uid};
use crate::entities::machine::PRIMARY_POSITION;
use crate::entities::{
    Machine, MachineModelInstance, MachinePatch, MachineSpecificationValue, MachineStatus, Model,
    ModelInstancePatch, NewMachine, NewModelInstance, NewSpecificationValue, Specification,
    SpecificationValue,
};
use crate::schema::{finish, variants, Mode};

/// A machine with its model instances, ordered by position
#[derive(Debug, Clone, Serialize)]
pub struct MachineDetails {
    pub machine: Machine,
    pub instances: Vec<MachineModelInstance>,
}

impl MachineDetails {
    /// The position-0 instance of the primary model
    pub fn primary(&self) -> Option<&MachineModelInstance> {
        self.instances.iter().find(|i| i.is_primary_of(&self.machine))
    }
}

/// What a machine delete removed alongside the machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MachineDeletion {
    pub instances: usize,
    pub values: usize,
}

/// Outcome of an upsert of a keyed value row
#[derive(Debug, Clone, PartialEq)]
pub enum ValueWrite {
    Created(MachineSpecificationValue),
    Updated(MachineSpecificationValue),
}

impl ValueWrite {
    pub fn row(&self) -> &MachineSpecificationValue {
        match self {
            ValueWrite::Created(row) | ValueWrite::Updated(row) => row,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ValueWrite::Created(_) => "created",
            ValueWrite::Updated(_) => "updated",
        }
    }
}

/// The key of a value row, read before the payload is checked
#[derive(Deserialize)]
struct ValueKey {
    machine_model_instance_uid: Uid,
    specification_uid: Uid,
}

impl Catalog {
    /// Create a machine together with its primary model instance at position 0
    pub fn create_machine(&self, input: &Value) -> Result<MachineDetails> {
        let new: NewMachine = self.parse(EntityKind::Machine, Mode::Create, input)?;
        self.referenced::<Model>("primary_model_uid", &new.primary_model_uid)?;

        let machine = self.store.create(new.into_entity())?;
        let primary = self.store.create(MachineModelInstance::bind(
            machine.uid.clone(),
            machine.primary_model_uid.clone(),
            PRIMARY_POSITION,
            None,
        ))?;
        Ok(MachineDetails {
            machine,
            instances: vec![primary],
        })
    }

    pub fn get_machine(&self, uid: &str) -> Result<MachineDetails> {
        let machine: Machine = self.get(uid)?;
        let instances = self.instances_of(&machine.uid)?;
        Ok(MachineDetails { machine, instances })
    }

    fn instances_of(&self, machine: &Uid) -> Result<Vec<MachineModelInstance>> {
        let mut instances: Vec<MachineModelInstance> = self
            .list::<MachineModelInstance>()?
            .into_iter()
            .filter(|i| &i.machine_uid == machine)
            .collect();
        instances.sort_by_key(|i| i.position);
        Ok(instances)
    }

    /// Update a machine. A new primary model is rebound onto the position-0
    /// instance, which is created if it went missing.
    pub fn update_machine(&self, input: &Value) -> Result<MachineDetails> {
        let patch: MachinePatch = self.parse(EntityKind::Machine, Mode::Update, input)?;
        let current: Machine = self.get(patch.uid.as_str())?;
        let rebind = match &patch.primary_model_uid {
            Some(model) if model != &current.primary_model_uid => {
                self.referenced::<Model>("primary_model_uid", model)?;
                Some(model.clone())
            }
            _ => None,
        };

        let machine: Machine = self.apply_patch(&patch.uid, &patch)?;
        if let Some(model) = rebind {
            let machine_uid = machine.uid.clone();
            self.store.transact(
                EntityKind::MachineModelInstance,
                |rows: &mut Vec<MachineModelInstance>| {
                    let slot = rows
                        .iter_mut()
                        .find(|i| i.machine_uid == machine_uid && i.position == PRIMARY_POSITION);
                    match slot {
                        Some(instance) => {
                            instance.model_uid = model;
                            instance.updated_at = now();
                        }
                        None => rows.push(MachineModelInstance::bind(
                            machine_uid.clone(),
                            model,
                            PRIMARY_POSITION,
                            None,
                        )),
                    }
                    Ok(())
                },
            )?;
            tracing::info!(
                machine = %machine.uid,
                model = %machine.primary_model_uid,
                "primary instance rebound"
            );
        }
        self.get_machine(machine.uid.as_str())
    }

    /// Delete a machine with all its instances and their values
    pub fn delete_machine(&self, uid: &str) -> Result<MachineDeletion> {
        let machine: Machine = self.get(uid)?;
        let instance_uids: HashSet<Uid> = self
            .instances_of(&machine.uid)?
            .into_iter()
            .map(|i| i.uid)
            .collect();

        let values = self.remove_values(|v| instance_uids.contains(&v.machine_model_instance_uid))?;
        let instances = self.store.transact(
            EntityKind::MachineModelInstance,
            |rows: &mut Vec<MachineModelInstance>| {
                let before = rows.len();
                rows.retain(|i| i.machine_uid != machine.uid);
                Ok(before - rows.len())
            },
        )?;
        self.remove::<Machine>(uid)?;
        tracing::info!(uid, instances, values, "machine deleted with dependents");
        Ok(MachineDeletion { instances, values })
    }

    fn remove_values(&self, pred: impl Fn(&MachineSpecificationValue) -> bool) -> Result<usize> {
        self.store.transact(
            EntityKind::MachineSpecificationValue,
            |rows: &mut Vec<MachineSpecificationValue>| {
                let before = rows.len();
                rows.retain(|v| !pred(v));
                Ok(before - rows.len())
            },
        )
    }

    pub fn list_machines(&self, status: Option<MachineStatus>) -> Result<Vec<Machine>> {
        Ok(self
            .list::<Machine>()?
            .into_iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .collect())
    }

    fn position_taken(machine: &Uid, position: u32) -> TaxonomyError {
        TaxonomyError::Conflict(format!(
            "position {} is already taken on machine {}",
            position, machine
        ))
    }

    /// Add a model instance at a free position of a machine
    pub fn add_model_instance(&self, input: &Value) -> Result<MachineModelInstance> {
        let new: NewModelInstance =
            self.parse(EntityKind::MachineModelInstance, Mode::Create, input)?;
        self.referenced::<Machine>("machine_uid", &new.machine_uid)?;
        self.referenced::<Model>("model_uid", &new.model_uid)?;

        let instance = new.into_entity();
        self.store.transact(
            EntityKind::MachineModelInstance,
            |rows: &mut Vec<MachineModelInstance>| {
                let taken = rows.iter().any(|i| {
                    i.machine_uid == instance.machine_uid && i.position == instance.position
                });
                if taken {
                    return Err(Self::position_taken(&instance.machine_uid, instance.position));
                }
                rows.push(instance.clone());
                Ok(())
            },
        )?;
        tracing::info!(kind = "machine-model-instances", uid = %instance.uid, "created");
        Ok(instance)
    }

    /// Move or relabel an instance. The primary instance stays at position 0.
    pub fn update_model_instance(&self, input: &Value) -> Result<MachineModelInstance> {
        let patch: ModelInstancePatch =
            self.parse(EntityKind::MachineModelInstance, Mode::Update, input)?;
        let current: MachineModelInstance = self.get(patch.uid.as_str())?;

        if let Some(position) = patch.position.filter(|p| *p != current.position) {
            let machine = self.store.get::<Machine>(current.machine_uid.as_str())?;
            if machine.is_some_and(|m| current.is_primary_of(&m)) {
                return Err(TaxonomyError::InvalidOperation(format!(
                    "the primary model instance {} must stay at position {}",
                    current.uid, PRIMARY_POSITION
                )));
            }
            let taken = self.list::<MachineModelInstance>()?.iter().any(|i| {
                i.uid != current.uid
                    && i.machine_uid == current.machine_uid
                    && i.position == position
            });
            if taken {
                return Err(Self::position_taken(&current.machine_uid, position));
            }
        }
        self.apply_patch(&patch.uid, &patch)
    }

    /// Remove a secondary instance and its values. Returns how many values
    /// went with it.
    pub fn remove_model_instance(&self, uid: &str) -> Result<usize> {
        let instance: MachineModelInstance = self.get(uid)?;
        let machine = self.store.get::<Machine>(instance.machine_uid.as_str())?;
        if machine.is_some_and(|m| instance.is_primary_of(&m)) {
            return Err(TaxonomyError::InvalidOperation(format!(
                "cannot remove primary model instance {}",
                uid
            )));
        }
        let values = self.remove_values(|v| v.machine_model_instance_uid == instance.uid)?;
        self.remove::<MachineModelInstance>(uid)?;
        Ok(values)
    }

    /// Store the value of one specification for one instance, replacing any
    /// earlier value for the same pair.
    ///
    /// The payload is checked against the specification's type and limits;
    /// Enum Plus selections must name options of that specification.
    pub fn set_specification_value(&self, input: &Value) -> Result<ValueWrite> {
        let violations = self
            .validator
            .check(EntityKind::MachineSpecificationValue, Mode::Create, input);
        let key: ValueKey = finish(input, violations)?;
        self.referenced::<MachineModelInstance>(
            "machine_model_instance_uid",
            &key.machine_model_instance_uid,
        )?;
        let spec: Specification = self.referenced("specification_uid", &key.specification_uid)?;

        let payload = input.get("value").unwrap_or(&Value::Null);
        let shape = variants::check_value_shape(&spec.options, payload);
        let new: NewSpecificationValue = finish(input, shape)?;

        let spec_type = spec.spec_type();
        let value = new.value.clone().conform_to(spec_type);
        if !value.fits(spec_type) {
            return Err(TaxonomyError::validation(vec![Violation::new(
                "/value",
                format!(
                    "a {} value cannot be stored for {} specification {}",
                    value.shape(),
                    spec_type,
                    spec.name
                ),
            )]));
        }
        let mut violations = variants::check_value_limits(&spec, &value);
        if let SpecificationValue::EnumPlus { enum_option_uids, .. } = &value {
            violations.extend(self.foreign_options(
                &spec,
                enum_option_uids,
                "/value/enum_option_uids",
            )?);
        }
        if !violations.is_empty() {
            return Err(TaxonomyError::validation(violations));
        }

        let row = NewSpecificationValue { value, ..new }.into_row();
        let write = self.store.transact(
            EntityKind::MachineSpecificationValue,
            move |rows: &mut Vec<MachineSpecificationValue>| {
                let slot = rows
                    .iter_mut()
                    .find(|r| r.is_for(&row.machine_model_instance_uid, &row.specification_uid));
                match slot {
                    Some(existing) => {
                        existing.value = row.value;
                        existing.is_inherited = row.is_inherited;
                        existing.updated_at = row.updated_at;
                        Ok(ValueWrite::Updated(existing.clone()))
                    }
                    None => {
                        rows.push(row.clone());
                        Ok(ValueWrite::Created(row))
                    }
                }
            },
        )?;
        tracing::info!(
            instance = %key.machine_model_instance_uid,
            specification = %key.specification_uid,
            outcome = write.verb(),
            "specification value stored"
        );
        Ok(write)
    }

    /// Stored values, optionally of one instance
    pub fn list_specification_values(
        &self,
        instance: Option<&Uid>,
    ) -> Result<Vec<MachineSpecificationValue>> {
        let values: Vec<MachineSpecificationValue> =
            self.store.load(EntityKind::MachineSpecificationValue)?;
        Ok(values
            .into_iter()
            .filter(|v| instance.map_or(true, |i| &v.machine_model_instance_uid == i))
            .collect())
    }
}
