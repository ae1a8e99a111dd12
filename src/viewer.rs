//! Item-level editing of composite properties (bit-sets, fixed arrays, single-choice references).

use crate::binding::ObjectBinding;
use crate::registry::{ObjectProperty, PropertyId};
use crate::store::EntityStore;
use crate::value::{BuiltTurn, EnumRef, PropertyValue};
use tracing::warn;

/// Caches the last composite value shown so toggles can mutate a working copy.
///
/// Every toggle re-submits the whole value through [`ObjectBinding::set_pending_value`],
/// so composite edits collapse and reconcile exactly like scalar ones.
#[derive(Debug, Clone)]
pub struct ExtendedViewer {
    property: ObjectProperty,
    cached: Option<PropertyValue>,
}

impl ExtendedViewer {
    pub fn new(property: ObjectProperty) -> Self {
        debug_assert!(property.kind().is_composite(), "{:?} is not composite", property.id);
        Self {
            property,
            cached: None,
        }
    }

    pub fn property(&self) -> PropertyId {
        self.property.id
    }

    pub fn cached_value(&self) -> Option<&PropertyValue> {
        self.cached.as_ref()
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }

    pub fn load_for_display(
        &mut self,
        store: &dyn EntityStore,
        binding: &mut ObjectBinding,
    ) -> &PropertyValue {
        self.cached.insert(binding.effective_value(store, &self.property))
    }

    /// Number of toggleable items in the cached value.
    pub fn item_count(&self, store: &dyn EntityStore) -> usize {
        match &self.cached {
            Some(PropertyValue::BitSet(set)) => set.capacity(),
            Some(PropertyValue::TurnArray(turns)) => turns.len(),
            Some(PropertyValue::BoolArray(flags)) => flags.len(),
            Some(PropertyValue::EnumRef(r)) => store.catalog_len(r.catalog),
            Some(PropertyValue::None) => self
                .property
                .catalog
                .map_or(0, |catalog| store.catalog_len(catalog)),
            _ => 0,
        }
    }

    /// Toggles one item and submits the whole composite. Returns false when rejected.
    pub fn toggle_item(
        &mut self,
        store: &dyn EntityStore,
        binding: &mut ObjectBinding,
        item_index: usize,
    ) -> bool {
        if !self.property.is_editable() {
            return false;
        }
        let Some(mut working) = self.cached.clone() else {
            warn!(property = ?self.property.id, "toggle without a loaded value");
            return false;
        };
        // An unset choice starts from the declared catalog.
        if let (PropertyValue::None, Some(catalog)) = (&working, self.property.catalog) {
            working = PropertyValue::EnumRef(EnumRef::new(catalog, item_index));
        }

        let accepted = match &mut working {
            PropertyValue::BitSet(set) => set.toggle(item_index).is_some(),
            PropertyValue::BoolArray(flags) => match flags.get_mut(item_index) {
                Some(flag) => {
                    *flag = !*flag;
                    true
                }
                None => false,
            },
            PropertyValue::TurnArray(turns) => match turns.get_mut(item_index) {
                Some(slot) => {
                    *slot = if slot.is_present() {
                        BuiltTurn::Never
                    } else {
                        BuiltTurn::Turn(store.game_turn())
                    };
                    true
                }
                None => false,
            },
            PropertyValue::EnumRef(r) => {
                if item_index < store.catalog_len(r.catalog) {
                    r.index = item_index;
                    true
                } else {
                    false
                }
            }
            PropertyValue::None
            | PropertyValue::Int(_)
            | PropertyValue::Text(_)
            | PropertyValue::Image(_) => false,
        };

        if !accepted {
            warn!(
                object_id = binding.object_id(),
                property = ?self.property.id,
                item_index,
                "toggle rejected"
            );
            return false;
        }

        binding.set_pending_value(store, &self.property, &working);
        self.load_for_display(store, binding);
        true
    }
}
