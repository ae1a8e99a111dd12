use crate::filter::{FilterError, PropertyFilter};
use crate::options::EditorOptions;
use crate::page::PropertyPage;
use crate::registry::{ObjectId, ObjectType, PropertyId};
use crate::store::EntityStore;
use crate::transport::{BatchGuard, PatchTransport};
use crate::value::PropertyValue;
use indexmap::IndexMap;
use tracing::{debug, info};

/// What a change notification did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The object was not bound (or its page does not exist).
    Ignored,
    /// The binding was dropped.
    Removed,
    /// The list row was recomputed; `detail` is set when the focused view was refreshed too.
    Refreshed { detail: bool },
}

/// One [`PropertyPage`] per object type, plus the store and transport they work against.
///
/// Constructed once when the editing feature starts and owned by the UI shell.
pub struct PropertyEditor<S: EntityStore, T: PatchTransport> {
    store: S,
    transport: T,
    options: EditorOptions,
    filter: PropertyFilter,
    pages: IndexMap<ObjectType, PropertyPage>,
}

fn ensure_page<'a>(
    pages: &'a mut IndexMap<ObjectType, PropertyPage>,
    options: &EditorOptions,
    filter: &PropertyFilter,
    object_type: ObjectType,
) -> Option<&'a mut PropertyPage> {
    if !options.has_page(object_type) {
        return None;
    }
    Some(pages.entry(object_type).or_insert_with(|| {
        debug!(%object_type, "creating property page");
        let mut page = PropertyPage::new(object_type);
        page.set_filter(filter.clone());
        page
    }))
}

impl<S: EntityStore, T: PatchTransport> PropertyEditor<S, T> {
    pub fn new(store: S, transport: T) -> Self {
        let options = EditorOptions::default();
        let mut editor = Self {
            store,
            transport,
            options,
            filter: PropertyFilter::default(),
            pages: IndexMap::new(),
        };
        editor.create_pages();
        editor
    }

    pub fn with_options(store: S, transport: T, options: EditorOptions) -> Result<Self, FilterError> {
        let filter = options.filter()?;
        let mut editor = Self {
            store,
            transport,
            options,
            filter,
            pages: IndexMap::new(),
        };
        if !editor.options.lazy_pages {
            editor.create_pages();
        }
        Ok(editor)
    }

    fn create_pages(&mut self) {
        for object_type in self.options.pages.clone() {
            ensure_page(&mut self.pages, &self.options, &self.filter, object_type);
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access for the game side to apply inbound updates; follow with [`Self::on_object_changed`].
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn pages(&self) -> impl Iterator<Item = &PropertyPage> {
        self.pages.values()
    }

    pub fn page(&self, object_type: ObjectType) -> Option<&PropertyPage> {
        self.pages.get(&object_type)
    }

    /// The page for `object_type`, created on first use when pages are lazy.
    pub fn page_mut(&mut self, object_type: ObjectType) -> Option<&mut PropertyPage> {
        ensure_page(&mut self.pages, &self.options, &self.filter, object_type)
    }

    /// Replaces the property filter on every page.
    pub fn set_property_filter(&mut self, expression: &str) -> Result<(), FilterError> {
        let filter = PropertyFilter::parse(expression)?;
        for page in self.pages.values_mut() {
            page.set_filter(filter.clone());
        }
        self.options.property_filter = expression.to_string();
        self.filter = filter;
        Ok(())
    }

    pub fn add_binding(&mut self, object_type: ObjectType, object_id: ObjectId) -> bool {
        let Some(page) = ensure_page(&mut self.pages, &self.options, &self.filter, object_type) else {
            return false;
        };
        let added = page.add_binding(object_id);
        if added {
            page.refresh_row(&self.store, object_id);
        }
        added
    }

    /// Binds the given tiles together with every unit and city standing on them.
    /// Any previous selection is dropped.
    pub fn load_selection(&mut self, tiles: &[ObjectId]) {
        self.clear_selection();
        for &tile in tiles {
            if self.store.resolve(ObjectType::Tile, tile).is_none() {
                continue;
            }
            self.add_binding(ObjectType::Tile, tile);
            for unit in self.store.units_on_tile(tile) {
                self.add_binding(ObjectType::Unit, unit);
            }
            if let Some(city) = self.store.city_on_tile(tile) {
                self.add_binding(ObjectType::City, city);
            }
        }
        info!(
            tiles = tiles.len(),
            bound = self.pages.values().map(PropertyPage::len).sum::<usize>(),
            "loaded selection"
        );
    }

    pub fn clear_selection(&mut self) {
        for page in self.pages.values_mut() {
            page.clear();
        }
    }

    pub fn reset_selected(&mut self, object_type: ObjectType, object_ids: &[ObjectId]) {
        let Some(page) = self.pages.get_mut(&object_type) else {
            return;
        };
        page.reset_selected(object_ids);
        for &id in object_ids {
            page.refresh_row(&self.store, id);
        }
        if page.focused().is_some_and(|f| object_ids.contains(&f)) {
            page.refresh_detail(&self.store);
        }
    }

    /// Focuses an object and recomputes the detail view for it.
    pub fn set_focused(&mut self, object_type: ObjectType, object_id: Option<ObjectId>) {
        let Some(page) = self.pages.get_mut(&object_type) else {
            return;
        };
        page.set_focused(object_id);
        page.refresh_detail(&self.store);
    }

    pub fn set_pending_value(
        &mut self,
        object_type: ObjectType,
        object_id: ObjectId,
        property: PropertyId,
        value: &PropertyValue,
    ) -> bool {
        match self.pages.get_mut(&object_type) {
            Some(page) => page.set_pending_value(&self.store, object_id, property, value),
            None => false,
        }
    }

    pub fn effective_value(
        &mut self,
        object_type: ObjectType,
        object_id: ObjectId,
        property: PropertyId,
    ) -> PropertyValue {
        match self.pages.get_mut(&object_type) {
            Some(page) => page.effective_value(&self.store, object_id, property),
            None => PropertyValue::None,
        }
    }

    pub fn is_dirty(&self, object_type: ObjectType, object_id: ObjectId, property: PropertyId) -> bool {
        self.pages
            .get(&object_type)
            .is_some_and(|p| p.is_dirty(object_id, property))
    }

    pub fn toggle_item(&mut self, object_type: ObjectType, property: PropertyId, item_index: usize) -> bool {
        match self.pages.get_mut(&object_type) {
            Some(page) => page.toggle_item(&self.store, property, item_index),
            None => false,
        }
    }

    pub fn commit(&mut self, object_type: ObjectType, object_ids: &[ObjectId]) -> usize {
        match self.pages.get_mut(&object_type) {
            Some(page) => page.commit(&self.store, &mut self.transport, object_ids),
            None => 0,
        }
    }

    /// Commits every bound object of every page inside a single transport batch.
    pub fn commit_all(&mut self) -> usize {
        let mut batch = BatchGuard::begin(&mut self.transport);
        let mut sent = 0;
        for page in self.pages.values_mut() {
            let ids: Vec<ObjectId> = page.bindings().map(|b| b.object_id()).collect();
            sent += page.commit(&self.store, &mut *batch, &ids);
        }
        sent
    }

    /// Entry point for the game's change notifications.
    pub fn on_object_changed(
        &mut self,
        object_type: ObjectType,
        object_id: ObjectId,
        removed: bool,
    ) -> ChangeOutcome {
        let Some(page) = self.pages.get_mut(&object_type) else {
            return ChangeOutcome::Ignored;
        };
        if !page.contains(object_id) {
            return ChangeOutcome::Ignored;
        }

        if removed {
            debug!(%object_type, object_id, "bound object removed");
            page.remove_binding(object_id);
            return ChangeOutcome::Removed;
        }

        page.refresh_row(&self.store, object_id);
        let detail = page.focused() == Some(object_id) && page.refresh_detail(&self.store);
        ChangeOutcome::Refreshed { detail }
    }
}
