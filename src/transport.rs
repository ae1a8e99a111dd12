//! Outbound patch shape and the transport contract it is handed to.

use crate::registry::{ObjectId, ObjectType, PropertyId};
use crate::value::PropertyValue;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};

/// One outbound message: a full snapshot of an entity's editable fields with pending edits overlaid.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub object_type: ObjectType,
    pub object_id: ObjectId,
    pub fields: IndexMap<PropertyId, PropertyValue>,
}

impl Patch {
    pub fn new(object_type: ObjectType, object_id: ObjectId) -> Self {
        Self {
            object_type,
            object_id,
            fields: IndexMap::new(),
        }
    }

    pub fn set_field(&mut self, property: PropertyId, value: PropertyValue) {
        self.fields.insert(property, value);
    }

    pub fn field(&self, property: PropertyId) -> Option<&PropertyValue> {
        self.fields.get(&property)
    }
}

/// Sends patches to the authoritative simulation.
///
/// Failures are the transport's business; the editor never retries and never rolls back.
pub trait PatchTransport {
    fn begin_batch(&mut self);

    fn send(&mut self, patch: Patch);

    fn end_batch(&mut self);
}

/// Keeps a transport batch open for its lifetime so every patch sent through it is flushed together.
pub struct BatchGuard<'a, T: PatchTransport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: PatchTransport + ?Sized> BatchGuard<'a, T> {
    pub fn begin(transport: &'a mut T) -> Self {
        transport.begin_batch();
        Self { transport }
    }
}

impl<T: PatchTransport + ?Sized> Deref for BatchGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: PatchTransport + ?Sized> DerefMut for BatchGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: PatchTransport + ?Sized> Drop for BatchGuard<'_, T> {
    fn drop(&mut self) {
        self.transport.end_batch();
    }
}
