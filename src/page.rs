use crate::binding::ObjectBinding;
use crate::filter::PropertyFilter;
use crate::registry::{ObjectId, ObjectProperty, ObjectType, PropertyId, declare_properties};
use crate::store::EntityStore;
use crate::transport::{BatchGuard, Patch, PatchTransport};
use crate::value::PropertyValue;
use crate::viewer::ExtendedViewer;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, error, info, warn};

/// One row of the object list: effective values of the listable properties, by column.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub object_id: ObjectId,
    pub cells: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub property: PropertyId,
    pub value: PropertyValue,
    pub dirty: bool,
}

/// Effective values of every property of the focused object.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub object_id: ObjectId,
    pub entries: Vec<DetailEntry>,
}

impl DetailView {
    pub fn entry(&self, property: PropertyId) -> Option<&DetailEntry> {
        self.entries.iter().find(|e| e.property == property)
    }
}

/// All bindings and property metadata for one object type.
#[derive(Debug, Clone)]
pub struct PropertyPage {
    object_type: ObjectType,
    properties: Vec<ObjectProperty>,
    bindings: IndexMap<ObjectId, ObjectBinding>,
    focused: Option<ObjectId>,
    rows: IndexMap<ObjectId, ListRow>,
    detail: Option<DetailView>,
    viewers: IndexMap<PropertyId, ExtendedViewer>,
    filter: PropertyFilter,
}

fn find_property(
    object_type: ObjectType,
    properties: &[ObjectProperty],
    id: PropertyId,
) -> Option<&ObjectProperty> {
    let found = properties.iter().find(|p| p.id == id);
    if found.is_none() {
        error!(%object_type, property = ?id, "property not declared for object type");
        debug_assert!(false, "{id:?} is not a {object_type} property");
    }
    found
}

/// Live state overlaid with pending edits, over every editable property.
/// `None` when the entity no longer resolves.
fn build_patch(
    store: &dyn EntityStore,
    properties: &[ObjectProperty],
    binding: &ObjectBinding,
) -> Option<Patch> {
    if !binding.is_resolved(store) {
        return None;
    }

    let mut patch = Patch::new(binding.object_type(), binding.object_id());
    for property in properties.iter().filter(|p| p.is_editable()) {
        // A pending `None` clears the field; a live `None` means the field does not apply.
        if let Some(pending) = binding.pending_value(property.id) {
            patch.set_field(property.id, pending.clone());
            continue;
        }
        let live = binding.current_value(store, property);
        if !live.is_none() {
            patch.set_field(property.id, live);
        }
    }
    Some(patch)
}

impl PropertyPage {
    pub fn new(object_type: ObjectType) -> Self {
        let properties = declare_properties(object_type);
        let viewers = properties
            .iter()
            .filter(|p| p.has_widget() && p.kind().is_composite())
            .map(|p| (p.id, ExtendedViewer::new(p.clone())))
            .collect();
        Self {
            object_type,
            properties,
            bindings: IndexMap::new(),
            focused: None,
            rows: IndexMap::new(),
            detail: None,
            viewers,
            filter: PropertyFilter::default(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn properties(&self) -> &[ObjectProperty] {
        &self.properties
    }

    pub fn property(&self, id: PropertyId) -> Option<&ObjectProperty> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn set_filter(&mut self, filter: PropertyFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    /// Properties that pass the page's name filter, in declaration order.
    pub fn visible_properties(&self) -> impl Iterator<Item = &ObjectProperty> {
        self.properties.iter().filter(|p| self.filter.matches(p))
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ObjectBinding> {
        self.bindings.values()
    }

    pub fn binding(&self, object_id: ObjectId) -> Option<&ObjectBinding> {
        self.bindings.get(&object_id)
    }

    pub fn contains(&self, object_id: ObjectId) -> bool {
        self.bindings.contains_key(&object_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// A page with nothing bound has nothing to show.
    pub fn is_visible(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Returns true if a new binding was created.
    pub fn add_binding(&mut self, object_id: ObjectId) -> bool {
        if self.bindings.contains_key(&object_id) {
            return false;
        }
        self.bindings
            .insert(object_id, ObjectBinding::new(self.object_type, object_id));
        true
    }

    /// Drops the binding with its pending edits; clears focus if it was focused.
    pub fn remove_binding(&mut self, object_id: ObjectId) -> bool {
        let removed = self.bindings.shift_remove(&object_id).is_some();
        self.rows.shift_remove(&object_id);
        if self.focused == Some(object_id) {
            self.set_focused(None);
        }
        removed
    }

    /// Drops every binding, row, focus and cached composite.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.rows.clear();
        self.set_focused(None);
    }

    pub fn focused(&self) -> Option<ObjectId> {
        self.focused
    }

    /// Records focus only; call [`PropertyPage::refresh_detail`] to recompute the detail view.
    /// Focusing an id that is not bound clears focus.
    pub fn set_focused(&mut self, object_id: Option<ObjectId>) {
        let object_id = object_id.filter(|id| self.bindings.contains_key(id));
        if self.focused == object_id {
            return;
        }
        self.focused = object_id;
        self.detail = None;
        for viewer in self.viewers.values_mut() {
            viewer.clear();
        }
    }

    /// Drops pending edits. Composite caches of the focused object are invalidated
    /// and reload on the next toggle or [`PropertyPage::load_viewer`].
    pub fn reset_selected(&mut self, object_ids: &[ObjectId]) {
        for id in object_ids {
            if let Some(binding) = self.bindings.get_mut(id) {
                binding.clear_all_pending();
            }
        }
        if self.focused.is_some_and(|f| object_ids.contains(&f)) {
            for viewer in self.viewers.values_mut() {
                viewer.clear();
            }
        }
    }

    /// Returns false when `object_id` is not bound.
    pub fn set_pending_value(
        &mut self,
        store: &dyn EntityStore,
        object_id: ObjectId,
        property: PropertyId,
        value: &PropertyValue,
    ) -> bool {
        let Some(property) = find_property(self.object_type, &self.properties, property) else {
            return false;
        };
        let Some(binding) = self.bindings.get_mut(&object_id) else {
            return false;
        };
        binding.set_pending_value(store, property, value);
        if self.focused == Some(object_id) {
            if let Some(viewer) = self.viewers.get_mut(&property.id) {
                viewer.load_for_display(store, binding);
            }
        }
        true
    }

    /// Applies one edit to every listed binding, e.g. a detail-panel change over a multi-selection.
    pub fn set_pending_value_all(
        &mut self,
        store: &dyn EntityStore,
        object_ids: &[ObjectId],
        property: PropertyId,
        value: &PropertyValue,
    ) {
        let Some(property) = find_property(self.object_type, &self.properties, property) else {
            return;
        };
        for id in object_ids {
            let Some(binding) = self.bindings.get_mut(id) else {
                continue;
            };
            binding.set_pending_value(store, property, value);
            if self.focused == Some(*id) {
                if let Some(viewer) = self.viewers.get_mut(&property.id) {
                    viewer.load_for_display(store, binding);
                }
            }
        }
    }

    /// Effective value of a bound object's property; [`PropertyValue::None`] when unbound.
    pub fn effective_value(
        &mut self,
        store: &dyn EntityStore,
        object_id: ObjectId,
        property: PropertyId,
    ) -> PropertyValue {
        let Some(property) = find_property(self.object_type, &self.properties, property) else {
            return PropertyValue::None;
        };
        match self.bindings.get_mut(&object_id) {
            Some(binding) => binding.effective_value(store, property),
            None => PropertyValue::None,
        }
    }

    pub fn is_dirty(&self, object_id: ObjectId, property: PropertyId) -> bool {
        self.bindings
            .get(&object_id)
            .is_some_and(|b| b.pending_value(property).is_some())
    }

    pub fn viewer(&self, property: PropertyId) -> Option<&ExtendedViewer> {
        self.viewers.get(&property)
    }

    /// Loads the focused object's composite value into the viewer for `property`.
    pub fn load_viewer(
        &mut self,
        store: &dyn EntityStore,
        property: PropertyId,
    ) -> Option<&PropertyValue> {
        let binding = self.bindings.get_mut(&self.focused?)?;
        let viewer = self.viewers.get_mut(&property)?;
        Some(viewer.load_for_display(store, binding))
    }

    /// Toggles one item of a composite property on the focused object.
    pub fn toggle_item(
        &mut self,
        store: &dyn EntityStore,
        property: PropertyId,
        item_index: usize,
    ) -> bool {
        let Some(binding) = self.focused.and_then(|id| self.bindings.get_mut(&id)) else {
            warn!(object_type = %self.object_type, ?property, "toggle without a focused object");
            return false;
        };
        let Some(viewer) = self.viewers.get_mut(&property) else {
            warn!(object_type = %self.object_type, ?property, "property has no extended viewer");
            return false;
        };
        if viewer.cached_value().is_none() {
            viewer.load_for_display(store, binding);
        }
        viewer.toggle_item(store, binding, item_index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &ListRow> {
        self.rows.values()
    }

    pub fn row(&self, object_id: ObjectId) -> Option<&ListRow> {
        self.rows.get(&object_id)
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Recomputes the list cells of one bound object.
    pub fn refresh_row(&mut self, store: &dyn EntityStore, object_id: ObjectId) -> bool {
        let Some(binding) = self.bindings.get_mut(&object_id) else {
            return false;
        };
        let cells = self
            .properties
            .iter()
            .filter(|p| p.is_listable())
            .map(|p| binding.effective_value(store, p))
            .collect();
        self.rows.insert(object_id, ListRow { object_id, cells });
        true
    }

    /// Recomputes the detail view and composite caches for the focused object.
    pub fn refresh_detail(&mut self, store: &dyn EntityStore) -> bool {
        let Some(object_id) = self.focused else {
            self.detail = None;
            return false;
        };
        let Some(binding) = self.bindings.get_mut(&object_id) else {
            self.detail = None;
            return false;
        };

        let entries = self
            .properties
            .iter()
            .map(|p| {
                let value = binding.effective_value(store, p);
                DetailEntry {
                    property: p.id,
                    value,
                    dirty: binding.is_dirty(p),
                }
            })
            .collect();
        for viewer in self.viewers.values_mut() {
            viewer.load_for_display(store, binding);
        }
        self.detail = Some(DetailView { object_id, entries });
        true
    }

    /// Sends one patch per dirty, resolvable binding in `object_ids`, all inside one batch.
    ///
    /// Pending edits are kept; they clear once live state catches up or on reset.
    /// Returns the number of patches sent.
    pub fn commit<T: PatchTransport + ?Sized>(
        &mut self,
        store: &dyn EntityStore,
        transport: &mut T,
        object_ids: &[ObjectId],
    ) -> usize {
        let unique: IndexSet<ObjectId> = object_ids.iter().copied().collect();
        let mut patches = Vec::new();
        for id in unique {
            let Some(binding) = self.bindings.get(&id) else {
                continue;
            };
            if !binding.has_any_dirty() {
                continue;
            }
            match build_patch(store, &self.properties, binding) {
                Some(patch) => patches.push(patch),
                None => debug!(
                    object_type = %self.object_type,
                    object_id = id,
                    "skipping patch for unresolved object"
                ),
            }
        }

        if patches.is_empty() {
            return 0;
        }

        let sent = patches.len();
        let mut batch = BatchGuard::begin(transport);
        for patch in patches {
            batch.send(patch);
        }
        drop(batch);

        info!(object_type = %self.object_type, patches = sent, "committed edits");
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyPage;
    use crate::filter::PropertyFilter;
    use crate::memory::{MemoryWorld, RecordingTransport};
    use crate::registry::{ObjectType, PropertyId};
    use crate::value::{FixedBitSet, PropertyValue};
    use pretty_assertions::assert_eq;

    fn world() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        world.add_unit(1, 10, "Warriors", 3, 10);
        world.add_unit(2, 10, "Archers", 3, 10);
        world.add_unit(3, 11, "Phalanx", 1, 10);
        world
    }

    #[test]
    fn re_adding_a_bound_object_is_a_no_op() {
        let world = world();
        let mut page = PropertyPage::new(ObjectType::Unit);
        assert!(page.add_binding(1));
        page.set_pending_value(&world, 1, PropertyId::UnitHp, &PropertyValue::Int(5));

        assert!(!page.add_binding(1));
        assert_eq!(page.len(), 1);
        assert!(page.is_dirty(1, PropertyId::UnitHp));
    }

    #[test]
    fn removing_the_focused_binding_clears_focus() {
        let world = world();
        let mut page = PropertyPage::new(ObjectType::Unit);
        page.add_binding(1);
        page.add_binding(2);
        page.set_focused(Some(2));
        assert!(page.refresh_detail(&world));

        assert!(page.remove_binding(2));
        assert_eq!(page.focused(), None);
        assert!(page.detail().is_none());
        assert!(!page.contains(2));
    }

    #[test]
    fn focusing_an_unbound_object_clears_focus() {
        let mut page = PropertyPage::new(ObjectType::Unit);
        page.add_binding(1);
        page.set_focused(Some(1));
        page.set_focused(Some(99));
        assert_eq!(page.focused(), None);
    }

    #[test]
    fn batch_edit_touches_every_listed_binding() {
        let world = world();
        let mut page = PropertyPage::new(ObjectType::Unit);
        for id in [1, 2, 3] {
            page.add_binding(id);
        }

        page.set_pending_value_all(&world, &[1, 2, 3], PropertyId::UnitMovesLeft, &PropertyValue::Int(3));
        // Every unit but the Phalanx already has 3 moves.
        assert!(!page.is_dirty(1, PropertyId::UnitMovesLeft));
        assert!(!page.is_dirty(2, PropertyId::UnitMovesLeft));
        assert!(page.is_dirty(3, PropertyId::UnitMovesLeft));

        page.reset_selected(&[3]);
        assert!(!page.is_dirty(3, PropertyId::UnitMovesLeft));
    }

    #[test]
    fn list_rows_show_effective_values() {
        let world = world();
        let mut page = PropertyPage::new(ObjectType::Unit);
        page.add_binding(1);
        page.add_binding(2);
        page.set_pending_value(&world, 1, PropertyId::UnitHp, &PropertyValue::Int(7));
        assert!(page.refresh_row(&world, 1));
        assert!(page.refresh_row(&world, 2));
        assert!(!page.refresh_row(&world, 3));

        let ids: Vec<_> = page.rows().map(|r| r.object_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(page.row(2).unwrap().cells[3].as_int(), Some(10));

        let row = page.row(1).unwrap();
        assert_eq!(
            row.cells,
            vec![
                PropertyValue::Int(1),
                PropertyValue::text("Warriors"),
                PropertyValue::Int(3),
                PropertyValue::Int(7),
            ]
        );
    }

    #[test]
    fn commit_skips_clean_and_unresolved_bindings() {
        let mut world = world();
        let mut transport = RecordingTransport::new();
        let mut page = PropertyPage::new(ObjectType::Unit);
        for id in [1, 2, 3] {
            page.add_binding(id);
        }
        page.set_pending_value(&world, 1, PropertyId::UnitHp, &PropertyValue::Int(1));
        page.set_pending_value(&world, 3, PropertyId::UnitHp, &PropertyValue::Int(2));
        world.remove(ObjectType::Unit, 3);

        let sent = page.commit(&world, &mut transport, &[1, 1, 2, 3]);
        assert_eq!(sent, 1);
        assert_eq!(transport.batches.len(), 1);
        assert_eq!(transport.batches[0][0].object_id, 1);
        // The removed unit keeps its edit until its binding is dropped.
        assert!(page.is_dirty(3, PropertyId::UnitHp));

        assert_eq!(page.commit(&world, &mut transport, &[2]), 0);
        assert_eq!(transport.batches.len(), 1);
    }

    #[test]
    fn visible_properties_follow_the_filter() {
        let mut page = PropertyPage::new(ObjectType::Unit);
        page.set_filter(PropertyFilter::parse("hp|fuel").unwrap());
        let names: Vec<_> = page.visible_properties().map(|p| p.name).collect();
        assert_eq!(names, vec!["Fuel", "HP"]);
    }

    #[test]
    fn toggle_requires_focus_and_a_viewer() {
        let mut world = MemoryWorld::new();
        world.add_tile(4, (4, 0), ("Desert", 3), None);
        let mut page = PropertyPage::new(ObjectType::Tile);
        page.add_binding(4);

        assert!(!page.toggle_item(&world, PropertyId::TileSpecials, 0));
        page.set_focused(Some(4));
        assert!(!page.toggle_item(&world, PropertyId::TileLabel, 0));
        assert!(!page.toggle_item(&world, PropertyId::TileTerrain, 1));

        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 0));
        assert!(page.is_dirty(4, PropertyId::TileSpecials));
        assert_eq!(
            page.viewer(PropertyId::TileSpecials)
                .and_then(|v| v.cached_value())
                .map(|v| v.display_string()),
            Some("1 set".to_string())
        );
    }

    #[test]
    fn direct_edit_of_the_focused_object_reloads_its_viewer() {
        let mut world = MemoryWorld::new();
        world.add_tile(5, (5, 0), ("Hills", 4), None);
        let mut page = PropertyPage::new(ObjectType::Tile);
        page.add_binding(5);
        page.set_focused(Some(5));
        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 0));
        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 0));

        let specials = PropertyValue::BitSet(FixedBitSet::from_indices(8, [1]));
        assert!(page.set_pending_value(&world, 5, PropertyId::TileSpecials, &specials));
        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 2));

        let pending = page
            .binding(5)
            .and_then(|b| b.pending_value(PropertyId::TileSpecials))
            .and_then(|v| v.as_bit_set())
            .map(|set| set.iter().collect::<Vec<_>>());
        assert_eq!(pending, Some(vec![1, 2]));
    }

    #[test]
    fn reset_of_the_focused_object_drops_its_viewer_cache() {
        let mut world = MemoryWorld::new();
        world.add_tile(5, (5, 0), ("Hills", 4), None);
        let mut page = PropertyPage::new(ObjectType::Tile);
        page.add_binding(5);
        page.set_focused(Some(5));
        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 1));

        page.reset_selected(&[5]);
        assert!(page.viewer(PropertyId::TileSpecials).unwrap().cached_value().is_none());
        assert!(page.toggle_item(&world, PropertyId::TileSpecials, 2));

        let binding = page.binding(5).unwrap();
        let dirty: Vec<_> = binding.dirty_properties().collect();
        assert_eq!(dirty, vec![PropertyId::TileSpecials]);
        assert_eq!(
            binding.pending_value(PropertyId::TileSpecials),
            Some(&PropertyValue::BitSet(FixedBitSet::from_indices(8, [2])))
        );
    }
}
