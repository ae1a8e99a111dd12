//! Contract for the live game-object store the editor reads from.

use crate::registry::{ObjectId, ObjectType, PropertyId};
use crate::value::{Catalog, PropertyValue};

/// A live entity as seen by the editor.
pub trait LiveObject {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> ObjectId;

    /// Reads a field as a fresh owned value. `None` means this entity does not carry `property`.
    fn read_field(&self, property: PropertyId) -> Option<PropertyValue>;
}

/// The authoritative local view of game state.
///
/// Implementations must tolerate ids that no longer resolve: return `None`, never panic.
pub trait EntityStore {
    fn resolve(&self, object_type: ObjectType, object_id: ObjectId) -> Option<&dyn LiveObject>;

    /// Current game turn, recorded when a building is toggled on.
    fn game_turn(&self) -> i32;

    /// Number of entries in a static catalog; bounds single-choice selections.
    fn catalog_len(&self, catalog: Catalog) -> usize;

    fn units_on_tile(&self, _tile: ObjectId) -> Vec<ObjectId> {
        Vec::new()
    }

    fn city_on_tile(&self, _tile: ObjectId) -> Option<ObjectId> {
        None
    }
}

/// Renders a tile name from its terrain and optional resource, e.g. "Grassland (Wheat)".
pub fn tile_name(terrain: Option<&str>, resource: Option<&str>) -> String {
    let terrain = terrain.unwrap_or(crate::statics::EN_TERRAIN_UNKNOWN);
    match resource {
        Some(resource) => format!("{terrain} ({resource})"),
        None => terrain.to_string(),
    }
}
