//! In-memory collaborators: an entity store and a transport that records what it is sent.
//!
//! Used by the test-suite and by embedders that want to drive the editor without a live game.

use crate::registry::{ObjectId, ObjectType, PropertyId};
use crate::statics;
use crate::store::{EntityStore, LiveObject, tile_name};
use crate::transport::{Patch, PatchTransport};
use crate::value::{BuiltTurn, Catalog, EnumRef, FixedBitSet, PropertyValue, SpriteStack};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::HashMap;

pub const TILE_SPECIALS_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct MemoryObject {
    object_type: ObjectType,
    object_id: ObjectId,
    tile: Option<ObjectId>,
    fields: IndexMap<PropertyId, PropertyValue>,
}

impl LiveObject for MemoryObject {
    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn read_field(&self, property: PropertyId) -> Option<PropertyValue> {
        self.fields.get(&property).cloned()
    }
}

/// A small game world held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    objects: IndexMap<(ObjectType, ObjectId), MemoryObject>,
    catalogs: HashMap<Catalog, usize>,
    turn: i32,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        let catalogs = [
            (Catalog::Terrain, 12),
            (Catalog::Resource, 8),
            (Catalog::Nation, 16),
            (Catalog::Government, 6),
            (Catalog::Building, 24),
            (Catalog::Advance, 32),
        ]
        .into_iter()
        .collect();
        Self {
            objects: IndexMap::new(),
            catalogs,
            turn: 1,
        }
    }

    pub fn set_game_turn(&mut self, turn: i32) {
        self.turn = turn;
    }

    pub fn set_catalog_len(&mut self, catalog: Catalog, len: usize) {
        self.catalogs.insert(catalog, len);
    }

    fn insert(
        &mut self,
        object_type: ObjectType,
        object_id: ObjectId,
        tile: Option<ObjectId>,
        fields: impl IntoIterator<Item = (PropertyId, PropertyValue)>,
    ) {
        self.objects.insert(
            (object_type, object_id),
            MemoryObject {
                object_type,
                object_id,
                tile,
                fields: fields.into_iter().collect(),
            },
        );
    }

    pub fn add_tile(
        &mut self,
        index: ObjectId,
        (x, y): (i32, i32),
        (terrain_name, terrain): (&str, usize),
        resource: Option<(&str, usize)>,
    ) {
        let mut layers = vec![Cow::Owned(format!("t.{}", terrain_name.to_lowercase()))];
        if let Some((resource_name, _)) = resource {
            layers.push(Cow::Owned(format!("r.{}", resource_name.to_lowercase())));
        }
        let resource_value = resource
            .map(|(_, idx)| PropertyValue::EnumRef(EnumRef::new(Catalog::Resource, idx)))
            .unwrap_or(PropertyValue::None);

        self.insert(
            ObjectType::Tile,
            index,
            Some(index),
            [
                (PropertyId::TileImage, PropertyValue::Image(SpriteStack::new(layers))),
                (PropertyId::TileIndex, PropertyValue::Int(index)),
                (PropertyId::TileAddress, PropertyValue::text(format!("({x}, {y})"))),
                (
                    PropertyId::TileName,
                    PropertyValue::text(tile_name(Some(terrain_name), resource.map(|r| r.0))),
                ),
                (
                    PropertyId::TileTerrain,
                    PropertyValue::EnumRef(EnumRef::new(Catalog::Terrain, terrain)),
                ),
                (PropertyId::TileResource, resource_value),
                (
                    PropertyId::TileSpecials,
                    PropertyValue::BitSet(FixedBitSet::new(TILE_SPECIALS_CAPACITY)),
                ),
                (PropertyId::TileLabel, PropertyValue::static_text(statics::EN_EMPTY)),
            ],
        );
    }

    pub fn add_unit(&mut self, id: ObjectId, tile: ObjectId, type_name: &str, moves_left: i64, hp: i64) {
        self.insert(
            ObjectType::Unit,
            id,
            Some(tile),
            [
                (PropertyId::UnitId, PropertyValue::Int(id)),
                (PropertyId::UnitTypeName, PropertyValue::text(type_name)),
                (PropertyId::UnitMovesLeft, PropertyValue::Int(moves_left)),
                (PropertyId::UnitFuel, PropertyValue::Int(0)),
                (PropertyId::UnitHp, PropertyValue::Int(hp)),
                (PropertyId::UnitVeteran, PropertyValue::Int(0)),
            ],
        );
    }

    pub fn add_city(&mut self, id: ObjectId, name: &str, size: i64, building_count: usize) {
        self.insert(
            ObjectType::City,
            id,
            None,
            [
                (PropertyId::CityId, PropertyValue::Int(id)),
                (PropertyId::CityName, PropertyValue::text(name)),
                (PropertyId::CityAddress, PropertyValue::static_text(statics::EN_EMPTY)),
                (PropertyId::CitySize, PropertyValue::Int(size)),
                (
                    PropertyId::CityBuildings,
                    PropertyValue::TurnArray(vec![BuiltTurn::Never; building_count]),
                ),
            ],
        );
    }

    pub fn add_player(
        &mut self,
        number: ObjectId,
        name: &str,
        nation: usize,
        gold: i64,
        advance_count: usize,
    ) {
        self.insert(
            ObjectType::Player,
            number,
            None,
            [
                (PropertyId::PlayerNumber, PropertyValue::Int(number)),
                (PropertyId::PlayerName, PropertyValue::text(name)),
                (
                    PropertyId::PlayerNation,
                    PropertyValue::EnumRef(EnumRef::new(Catalog::Nation, nation)),
                ),
                (PropertyId::PlayerGold, PropertyValue::Int(gold)),
                (PropertyId::PlayerInventions, PropertyValue::BoolArray(vec![false; advance_count])),
                (
                    PropertyId::PlayerGovernment,
                    PropertyValue::EnumRef(EnumRef::new(Catalog::Government, 0)),
                ),
            ],
        );
    }

    /// Places a city on a tile, copying the tile's address into the city.
    pub fn place_city(&mut self, city: ObjectId, tile: ObjectId) {
        let address = self
            .objects
            .get(&(ObjectType::Tile, tile))
            .and_then(|t| t.fields.get(&PropertyId::TileAddress))
            .cloned();
        if let Some(object) = self.objects.get_mut(&(ObjectType::City, city)) {
            object.tile = Some(tile);
            if let Some(address) = address {
                object.fields.insert(PropertyId::CityAddress, address);
            }
        }
    }

    /// Overwrites a live field, as an inbound server update would.
    pub fn set_field(
        &mut self,
        object_type: ObjectType,
        object_id: ObjectId,
        property: PropertyId,
        value: PropertyValue,
    ) -> bool {
        match self.objects.get_mut(&(object_type, object_id)) {
            Some(object) => {
                object.fields.insert(property, value);
                true
            }
            None => false,
        }
    }

    /// Applies every field of a patch to the matching live object, as the server would on accept.
    pub fn apply_patch(&mut self, patch: &Patch) -> bool {
        let Some(object) = self.objects.get_mut(&(patch.object_type, patch.object_id)) else {
            return false;
        };
        for (property, value) in &patch.fields {
            object.fields.insert(*property, value.clone());
        }
        true
    }

    pub fn remove(&mut self, object_type: ObjectType, object_id: ObjectId) -> bool {
        self.objects.shift_remove(&(object_type, object_id)).is_some()
    }
}

impl EntityStore for MemoryWorld {
    fn resolve(&self, object_type: ObjectType, object_id: ObjectId) -> Option<&dyn LiveObject> {
        self.objects
            .get(&(object_type, object_id))
            .map(|o| o as &dyn LiveObject)
    }

    fn game_turn(&self) -> i32 {
        self.turn
    }

    fn catalog_len(&self, catalog: Catalog) -> usize {
        self.catalogs.get(&catalog).copied().unwrap_or(0)
    }

    fn units_on_tile(&self, tile: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.object_type == ObjectType::Unit && o.tile == Some(tile))
            .map(|o| o.object_id)
            .collect()
    }

    fn city_on_tile(&self, tile: ObjectId) -> Option<ObjectId> {
        self.objects
            .values()
            .find(|o| o.object_type == ObjectType::City && o.tile == Some(tile))
            .map(|o| o.object_id)
    }
}

/// Records every patch, grouped by the batch it was sent in.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub batches: Vec<Vec<Patch>>,
    open: Option<Vec<Patch>>,
    depth: usize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_batch_open(&self) -> bool {
        self.depth > 0
    }

    /// Every patch sent so far, in order.
    pub fn sent(&self) -> impl Iterator<Item = &Patch> {
        self.batches.iter().flatten()
    }
}

impl PatchTransport for RecordingTransport {
    fn begin_batch(&mut self) {
        if self.depth == 0 {
            self.open = Some(Vec::new());
        }
        self.depth += 1;
    }

    fn send(&mut self, patch: Patch) {
        match self.open.as_mut() {
            Some(batch) => batch.push(patch),
            None => self.batches.push(vec![patch]),
        }
    }

    fn end_batch(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            if let Some(batch) = self.open.take() {
                if !batch.is_empty() {
                    self.batches.push(batch);
                }
            }
        }
    }
}
