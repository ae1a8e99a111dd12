use crate::registry::{ObjectId, ObjectProperty, ObjectType, PropertyId};
use crate::store::EntityStore;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use tracing::{debug, error};

/// Pending (uncommitted) edits for one live entity, keyed by its stable id.
///
/// The entity itself is looked up on every access, so a binding outlives
/// temporary unavailability of its target without dangling.
#[derive(Debug, Clone)]
pub struct ObjectBinding {
    object_type: ObjectType,
    object_id: ObjectId,
    pending: IndexMap<PropertyId, PropertyValue>,
}

impl ObjectBinding {
    pub fn new(object_type: ObjectType, object_id: ObjectId) -> Self {
        Self {
            object_type,
            object_id,
            pending: IndexMap::new(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Whether the bound entity currently resolves in `store`.
    pub fn is_resolved(&self, store: &dyn EntityStore) -> bool {
        store.resolve(self.object_type, self.object_id).is_some()
    }

    /// Reads the live value. Unresolved entities yield [`PropertyValue::None`].
    pub fn current_value(&self, store: &dyn EntityStore, property: &ObjectProperty) -> PropertyValue {
        let Some(object) = store.resolve(self.object_type, self.object_id) else {
            return PropertyValue::None;
        };
        match object.read_field(property.id) {
            Some(value) => value,
            None => {
                error!(
                    object_type = %self.object_type,
                    object_id = self.object_id,
                    property = ?property.id,
                    "live object does not carry a declared property"
                );
                debug_assert!(false, "{:?} not readable on {}", property.id, self.object_type);
                PropertyValue::None
            }
        }
    }

    /// Records `candidate` as a pending edit, or drops the edit if it matches live state.
    pub fn set_pending_value(
        &mut self,
        store: &dyn EntityStore,
        property: &ObjectProperty,
        candidate: &PropertyValue,
    ) {
        if !property.is_editable() {
            return;
        }

        let current = self.current_value(store, property);
        if *candidate == current {
            if self.pending.shift_remove(&property.id).is_some() {
                debug!(
                    object_id = self.object_id,
                    property = ?property.id,
                    "edit collapsed to live value"
                );
            }
            return;
        }

        debug!(
            object_id = self.object_id,
            property = ?property.id,
            value = %candidate,
            "pending edit"
        );
        self.pending.insert(property.id, candidate.to_owned_value());
    }

    pub fn is_dirty(&self, property: &ObjectProperty) -> bool {
        self.pending.contains_key(&property.id)
    }

    pub fn has_any_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_value(&self, property: PropertyId) -> Option<&PropertyValue> {
        self.pending.get(&property)
    }

    pub fn dirty_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.pending.keys().copied()
    }

    pub fn clear_all_pending(&mut self) {
        self.pending.clear();
    }

    /// The value to display: pending if still different from live state, live otherwise.
    ///
    /// A pending edit that live state has caught up with is discarded here; this is
    /// the only place dirtiness is reconciled.
    pub fn effective_value(
        &mut self,
        store: &dyn EntityStore,
        property: &ObjectProperty,
    ) -> PropertyValue {
        let current = self.current_value(store, property);
        let Some(pending) = self.pending.get(&property.id) else {
            return current;
        };

        if *pending == current {
            debug!(
                object_id = self.object_id,
                property = ?property.id,
                "live state caught up with pending edit"
            );
            self.pending.shift_remove(&property.id);
            return current;
        }

        pending.clone()
    }
}
