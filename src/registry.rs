//! Static per-object-type property declarations.

use crate::statics;
use crate::value::{Catalog, ValueKind};
use bitflags::bitflags;
use serde::Deserialize;
use std::fmt;

/// The kinds of live game entity the editor can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ObjectType {
    Tile,
    Unit,
    City,
    Player,
}

impl ObjectType {
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Tile,
        ObjectType::Unit,
        ObjectType::City,
        ObjectType::Player,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ObjectType::Tile => statics::EN_TYPE_TILE,
            ObjectType::Unit => statics::EN_TYPE_UNIT,
            ObjectType::City => statics::EN_TYPE_CITY,
            ObjectType::Player => statics::EN_TYPE_PLAYER,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identity of a live entity: tile index, unit id, city id or player number.
pub type ObjectId = i64;

/// Every declared property. Each id belongs to exactly one [`ObjectType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    TileImage,
    TileIndex,
    TileAddress,
    TileName,
    TileTerrain,
    TileResource,
    TileSpecials,
    TileLabel,
    UnitId,
    UnitTypeName,
    UnitMovesLeft,
    UnitFuel,
    UnitHp,
    UnitVeteran,
    CityId,
    CityName,
    CityAddress,
    CitySize,
    CityBuildings,
    PlayerNumber,
    PlayerName,
    PlayerNation,
    PlayerGold,
    PlayerInventions,
    PlayerGovernment,
}

impl PropertyId {
    pub fn object_type(self) -> ObjectType {
        match self {
            PropertyId::TileImage
            | PropertyId::TileIndex
            | PropertyId::TileAddress
            | PropertyId::TileName
            | PropertyId::TileTerrain
            | PropertyId::TileResource
            | PropertyId::TileSpecials
            | PropertyId::TileLabel => ObjectType::Tile,
            PropertyId::UnitId
            | PropertyId::UnitTypeName
            | PropertyId::UnitMovesLeft
            | PropertyId::UnitFuel
            | PropertyId::UnitHp
            | PropertyId::UnitVeteran => ObjectType::Unit,
            PropertyId::CityId
            | PropertyId::CityName
            | PropertyId::CityAddress
            | PropertyId::CitySize
            | PropertyId::CityBuildings => ObjectType::City,
            PropertyId::PlayerNumber
            | PropertyId::PlayerName
            | PropertyId::PlayerNation
            | PropertyId::PlayerGold
            | PropertyId::PlayerInventions
            | PropertyId::PlayerGovernment => ObjectType::Player,
        }
    }
}

bitflags! {
    /// Capabilities of a declared property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// Edits are accepted and sent in patches.
        const EDITABLE = 1 << 0;
        /// Shown as a column in the object list.
        const LISTABLE = 1 << 1;
        /// Has an extended (item-level) detail widget.
        const HAS_WIDGET = 1 << 2;
    }
}

/// Registry entry describing one property of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProperty {
    pub id: PropertyId,
    pub name: &'static str,
    pub kind: ValueKind,
    pub flags: PropertyFlags,
    /// Column in the object list, assigned to listable properties in declaration order.
    pub list_column: Option<usize>,
    /// Catalog an `EnumRef` property picks from, known even when the live value is `None`.
    pub catalog: Option<Catalog>,
}

impl ObjectProperty {
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_editable(&self) -> bool {
        self.flags.contains(PropertyFlags::EDITABLE)
    }

    pub fn is_listable(&self) -> bool {
        self.flags.contains(PropertyFlags::LISTABLE)
    }

    pub fn has_widget(&self) -> bool {
        self.flags.contains(PropertyFlags::HAS_WIDGET)
    }
}

const EDIT: PropertyFlags = PropertyFlags::EDITABLE;
const LIST: PropertyFlags = PropertyFlags::LISTABLE;
const WIDGET: PropertyFlags = PropertyFlags::HAS_WIDGET;

type Declaration = (PropertyId, &'static str, ValueKind, PropertyFlags);

const TILE_PROPERTIES: &[Declaration] = &[
    (PropertyId::TileImage, statics::EN_PROP_IMAGE, ValueKind::Image, LIST),
    (PropertyId::TileIndex, statics::EN_PROP_INDEX, ValueKind::Int, LIST),
    (PropertyId::TileAddress, statics::EN_PROP_ADDRESS, ValueKind::Text, LIST),
    (PropertyId::TileName, statics::EN_PROP_NAME, ValueKind::Text, LIST),
    (PropertyId::TileTerrain, statics::EN_PROP_TERRAIN, ValueKind::EnumRef, WIDGET),
    (
        PropertyId::TileResource,
        statics::EN_PROP_RESOURCE,
        ValueKind::EnumRef,
        EDIT.union(WIDGET),
    ),
    (
        PropertyId::TileSpecials,
        statics::EN_PROP_SPECIALS,
        ValueKind::BitSet,
        EDIT.union(LIST).union(WIDGET),
    ),
    (PropertyId::TileLabel, statics::EN_PROP_LABEL, ValueKind::Text, EDIT),
];

const UNIT_PROPERTIES: &[Declaration] = &[
    (PropertyId::UnitId, statics::EN_PROP_ID, ValueKind::Int, LIST),
    (PropertyId::UnitTypeName, statics::EN_PROP_TYPE, ValueKind::Text, LIST),
    (
        PropertyId::UnitMovesLeft,
        statics::EN_PROP_MOVES_LEFT,
        ValueKind::Int,
        EDIT.union(LIST),
    ),
    (PropertyId::UnitFuel, statics::EN_PROP_FUEL, ValueKind::Int, EDIT),
    (PropertyId::UnitHp, statics::EN_PROP_HP, ValueKind::Int, EDIT.union(LIST)),
    (PropertyId::UnitVeteran, statics::EN_PROP_VETERAN, ValueKind::Int, EDIT),
];

const CITY_PROPERTIES: &[Declaration] = &[
    (PropertyId::CityId, statics::EN_PROP_ID, ValueKind::Int, LIST),
    (PropertyId::CityName, statics::EN_PROP_NAME, ValueKind::Text, EDIT.union(LIST)),
    (PropertyId::CityAddress, statics::EN_PROP_ADDRESS, ValueKind::Text, LIST),
    (PropertyId::CitySize, statics::EN_PROP_SIZE, ValueKind::Int, EDIT.union(LIST)),
    (
        PropertyId::CityBuildings,
        statics::EN_PROP_BUILDINGS,
        ValueKind::TurnArray,
        EDIT.union(LIST).union(WIDGET),
    ),
];

const PLAYER_PROPERTIES: &[Declaration] = &[
    (PropertyId::PlayerNumber, statics::EN_PROP_NUMBER, ValueKind::Int, LIST),
    (PropertyId::PlayerName, statics::EN_PROP_NAME, ValueKind::Text, EDIT.union(LIST)),
    (
        PropertyId::PlayerNation,
        statics::EN_PROP_NATION,
        ValueKind::EnumRef,
        EDIT.union(LIST).union(WIDGET),
    ),
    (PropertyId::PlayerGold, statics::EN_PROP_GOLD, ValueKind::Int, EDIT.union(LIST)),
    (
        PropertyId::PlayerInventions,
        statics::EN_PROP_INVENTIONS,
        ValueKind::BoolArray,
        EDIT.union(WIDGET),
    ),
    (
        PropertyId::PlayerGovernment,
        statics::EN_PROP_GOVERNMENT,
        ValueKind::EnumRef,
        EDIT.union(WIDGET),
    ),
];

fn declarations(object_type: ObjectType) -> &'static [Declaration] {
    match object_type {
        ObjectType::Tile => TILE_PROPERTIES,
        ObjectType::Unit => UNIT_PROPERTIES,
        ObjectType::City => CITY_PROPERTIES,
        ObjectType::Player => PLAYER_PROPERTIES,
    }
}

fn catalog_of(id: PropertyId) -> Option<Catalog> {
    match id {
        PropertyId::TileTerrain => Some(Catalog::Terrain),
        PropertyId::TileResource => Some(Catalog::Resource),
        PropertyId::PlayerNation => Some(Catalog::Nation),
        PropertyId::PlayerGovernment => Some(Catalog::Government),
        _ => None,
    }
}

/// Builds the registry entries for `object_type` from the static declaration table.
pub fn declare_properties(object_type: ObjectType) -> Vec<ObjectProperty> {
    let mut next_column = 0;
    declarations(object_type)
        .iter()
        .map(|&(id, name, kind, flags)| {
            let list_column = flags.contains(PropertyFlags::LISTABLE).then(|| {
                let column = next_column;
                next_column += 1;
                column
            });
            ObjectProperty {
                id,
                name,
                kind,
                flags,
                list_column,
                catalog: catalog_of(id),
            }
        })
        .collect()
}

/// Looks up a single declaration. `None` means the pair is not declared, which is a caller bug.
pub fn find(object_type: ObjectType, id: PropertyId) -> Option<ObjectProperty> {
    declare_properties(object_type)
        .into_iter()
        .find(|p| p.id == id)
}
