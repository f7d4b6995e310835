//! Change-tracked property storage.
//!
//! A [`TrackedProperties`] owns the last known value of every property of one
//! entity ([`PropertyBag`]) and the set of properties changed since they were
//! last delivered to the native library ([`DirtySet`]). Every dirty property is
//! also present in the bag.

use crate::backend::{AlBackend, check_al};
use crate::error::{OpenAlError, Result};
use crate::property::{EntityKind, Property, PropertyValue, ValueKind};
use crate::sys::{AL_NO_ERROR, ALuint};
use std::collections::{BTreeMap, BTreeSet};

pub type PropertyBag = BTreeMap<Property, PropertyValue>;
pub type DirtySet = BTreeSet<Property>;

/// Where a synchronization pass delivers its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Source(ALuint),
    Listener,
}

#[derive(Debug, Clone)]
pub struct TrackedProperties {
    kind: EntityKind,
    values: PropertyBag,
    dirty: DirtySet,
}

impl TrackedProperties {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: PropertyBag::new(),
            dirty: DirtySet::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Stores `value` and marks the property dirty.
    ///
    /// Fails without touching any state if the property is unknown or
    /// read-only for this entity, or if the value has the wrong shape.
    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        self.kind.check_writable(property)?;
        if value.kind() != property.kind() {
            return Err(OpenAlError::PropertyType {
                property,
                expected: property.kind(),
            });
        }
        self.values.insert(property, value);
        self.dirty.insert(property);
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let property = self.kind.lookup(name)?;
        self.set(property, value)
    }

    /// The stored value, or `None` if it was never set nor fetched.
    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        self.values.get(&property).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<PropertyValue>> {
        let property = self.kind.lookup(name)?;
        Ok(self.get(property))
    }

    /// Forgets the stored value and any pending change for it.
    pub fn unset(&mut self, property: Property) -> Result<Option<PropertyValue>> {
        if self.kind.spec(property).is_none() {
            return Err(OpenAlError::InvalidProperty {
                entity: self.kind,
                name: property.name().to_string(),
            });
        }
        self.dirty.remove(&property);
        Ok(self.values.remove(&property))
    }

    /// Stores a value whose property and shape the caller already guarantees.
    pub(crate) fn store(&mut self, property: Property, value: PropertyValue) {
        debug_assert_eq!(value.kind(), property.kind());
        debug_assert!(self.kind.check_writable(property).is_ok());
        self.values.insert(property, value);
        self.dirty.insert(property);
    }

    /// Records a value read back from the library without dirtying it.
    pub(crate) fn store_fetched(&mut self, property: Property, value: PropertyValue) {
        self.values.insert(property, value);
    }

    /// Marks every stored writable property dirty again, except the ones
    /// describing a native source's buffer queue.
    pub(crate) fn mark_all_dirty(&mut self) {
        for spec in self.kind.properties().iter().filter(|spec| spec.writable) {
            if !follows_queue(spec.property) && self.values.contains_key(&spec.property) {
                self.dirty.insert(spec.property);
            }
        }
    }

    pub fn changed(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn is_dirty(&self, property: Property) -> bool {
        self.dirty.contains(&property)
    }

    /// Pending properties in ascending code order.
    pub fn dirty(&self) -> impl Iterator<Item = Property> + '_ {
        self.dirty.iter().copied()
    }

    pub fn values(&self) -> &PropertyBag {
        &self.values
    }

    /// Pushes every dirty property to `target`, in ascending code order.
    ///
    /// A property leaves the dirty set only once its native call reported no
    /// error. On the first failure the remaining properties, including the one
    /// that failed, stay dirty for the next pass.
    pub fn synchronize<B: AlBackend + ?Sized>(
        &mut self,
        backend: &B,
        target: SyncTarget,
    ) -> Result<()> {
        let pending: Vec<Property> = self.dirty.iter().copied().collect();
        if pending.is_empty() {
            return Ok(());
        }
        // Whatever sits in the error slot now was raised by an earlier call.
        let stale = backend.get_error();
        if stale != AL_NO_ERROR {
            log::debug!("Discarding stale OpenAL error {:#x}", stale);
        }
        for property in pending {
            let Some(value) = self.values.get(&property).copied() else {
                self.dirty.remove(&property);
                continue;
            };
            apply(backend, target, property, &value);
            check_al(backend, setter_name(target, property.kind()))?;
            self.dirty.remove(&property);
        }
        Ok(())
    }

    /// Sends the native default of every property this entity holds no value
    /// for, so `target` drops whatever a previous owner configured.
    pub(crate) fn reset_unstored<B: AlBackend + ?Sized>(
        &self,
        backend: &B,
        target: SyncTarget,
    ) -> Result<()> {
        for spec in self.kind.properties().iter().filter(|spec| spec.writable) {
            let property = spec.property;
            if self.values.contains_key(&property) {
                continue;
            }
            let Some(value) = property.source_default() else {
                continue;
            };
            apply(backend, target, property, &value);
            check_al(backend, setter_name(target, property.kind()))?;
        }
        Ok(())
    }

    /// Reads every readable property of `target` from the library.
    pub(crate) fn fetch<B: AlBackend + ?Sized>(
        &mut self,
        backend: &B,
        target: SyncTarget,
    ) -> Result<()> {
        for spec in self.kind.properties() {
            let property = spec.property;
            let value = read(backend, target, property);
            check_al(backend, getter_name(target, property.kind()))?;
            self.store_fetched(property, value);
        }
        Ok(())
    }
}

/// Properties only meaningful for the buffers queued on one native source.
fn follows_queue(property: Property) -> bool {
    matches!(
        property,
        Property::Buffer | Property::SecOffset | Property::SampleOffset | Property::ByteOffset
    )
}

fn apply<B: AlBackend + ?Sized>(
    backend: &B,
    target: SyncTarget,
    property: Property,
    value: &PropertyValue,
) {
    let param = property.code();
    match (target, value) {
        (SyncTarget::Source(id), PropertyValue::Float(v)) => backend.source_f(id, param, *v),
        (SyncTarget::Source(id), PropertyValue::Int(v)) => backend.source_i(id, param, *v),
        (SyncTarget::Source(id), PropertyValue::Vector(v)) => {
            backend.source_fv(id, param, &v.to_array())
        }
        (SyncTarget::Source(id), PropertyValue::Orientation(v)) => backend.source_fv(id, param, v),
        (SyncTarget::Listener, PropertyValue::Float(v)) => backend.listener_f(param, *v),
        (SyncTarget::Listener, PropertyValue::Int(v)) => backend.listener_i(param, *v),
        (SyncTarget::Listener, PropertyValue::Vector(v)) => {
            backend.listener_fv(param, &v.to_array())
        }
        (SyncTarget::Listener, PropertyValue::Orientation(v)) => backend.listener_fv(param, v),
    }
}

fn read<B: AlBackend + ?Sized>(backend: &B, target: SyncTarget, property: Property) -> PropertyValue {
    let param = property.code();
    let kind = property.kind();
    let mut floats = [0.0f32; 6];
    let floats = &mut floats[..kind.components()];
    let mut int = 0;
    match (target, kind) {
        (SyncTarget::Source(id), ValueKind::Int) => int = backend.get_source_i(id, param),
        (SyncTarget::Source(id), ValueKind::Float) => floats[0] = backend.get_source_f(id, param),
        (SyncTarget::Source(id), _) => backend.get_source_fv(id, param, floats),
        (SyncTarget::Listener, ValueKind::Float) => floats[0] = backend.get_listener_f(param),
        (SyncTarget::Listener, _) => backend.get_listener_fv(param, floats),
    }
    PropertyValue::from_components(kind, floats, int)
}

fn setter_name(target: SyncTarget, kind: ValueKind) -> &'static str {
    match (target, kind) {
        (SyncTarget::Source(_), ValueKind::Float) => "alSourcef",
        (SyncTarget::Source(_), ValueKind::Int) => "alSourcei",
        (SyncTarget::Source(_), _) => "alSourcefv",
        (SyncTarget::Listener, ValueKind::Float) => "alListenerf",
        (SyncTarget::Listener, ValueKind::Int) => "alListeneri",
        (SyncTarget::Listener, _) => "alListenerfv",
    }
}

fn getter_name(target: SyncTarget, kind: ValueKind) -> &'static str {
    match (target, kind) {
        (SyncTarget::Source(_), ValueKind::Float) => "alGetSourcef",
        (SyncTarget::Source(_), ValueKind::Int) => "alGetSourcei",
        (SyncTarget::Source(_), _) => "alGetSourcefv",
        (SyncTarget::Listener, ValueKind::Float) => "alGetListenerf",
        (SyncTarget::Listener, _) => "alGetListenerfv",
    }
}
