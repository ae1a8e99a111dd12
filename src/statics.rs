// Central place for display strings and other non-localized constants.
// Keep these out of value.rs/registry.rs to reduce duplication and make tweaks safer.

// Property names (EN_ prefix to make future localization easier)
pub const EN_PROP_IMAGE: &str = "Image";
pub const EN_PROP_INDEX: &str = "Index";
pub const EN_PROP_ADDRESS: &str = "Address";
pub const EN_PROP_NAME: &str = "Name";
pub const EN_PROP_TERRAIN: &str = "Terrain";
pub const EN_PROP_RESOURCE: &str = "Resource";
pub const EN_PROP_SPECIALS: &str = "Specials";
pub const EN_PROP_LABEL: &str = "Label";
pub const EN_PROP_ID: &str = "ID";
pub const EN_PROP_TYPE: &str = "Type";
pub const EN_PROP_MOVES_LEFT: &str = "Moves Left";
pub const EN_PROP_FUEL: &str = "Fuel";
pub const EN_PROP_HP: &str = "HP";
pub const EN_PROP_VETERAN: &str = "Veteran";
pub const EN_PROP_SIZE: &str = "Size";
pub const EN_PROP_BUILDINGS: &str = "Buildings";
pub const EN_PROP_NUMBER: &str = "Number";
pub const EN_PROP_NATION: &str = "Nation";
pub const EN_PROP_GOLD: &str = "Gold";
pub const EN_PROP_INVENTIONS: &str = "Inventions";
pub const EN_PROP_GOVERNMENT: &str = "Government";

// Object type labels (page titles).
pub const EN_TYPE_TILE: &str = "Tile";
pub const EN_TYPE_UNIT: &str = "Unit";
pub const EN_TYPE_CITY: &str = "City";
pub const EN_TYPE_PLAYER: &str = "Player";

// Catalog labels used by EnumRef summaries.
pub const EN_CATALOG_TERRAIN: &str = "Terrain";
pub const EN_CATALOG_RESOURCE: &str = "Resource";
pub const EN_CATALOG_NATION: &str = "Nation";
pub const EN_CATALOG_GOVERNMENT: &str = "Government";
pub const EN_CATALOG_BUILDING: &str = "Building";
pub const EN_CATALOG_ADVANCE: &str = "Advance";

// Value summaries.
pub const EN_VALUE_NONE: &str = "(none)";
pub const EN_SUMMARY_BUILT: &str = "built";
pub const EN_SUMMARY_DESTROYED: &str = "destroyed";
pub const EN_SUMMARY_KNOWN: &str = "known";
pub const EN_SUMMARY_SET: &str = "set";
pub const EN_SUMMARY_LAYERS: &str = "layers";
pub const EN_BUILT_NEVER: &str = "never";
pub const EN_BUILT_DESTROYED: &str = "destroyed";
pub const EN_BUILT_TURN: &str = "turn";

// Tile naming.
pub const EN_TERRAIN_UNKNOWN: &str = "Unknown";

pub const EN_EMPTY: &str = "";

// Property filter syntax.
pub const FILTER_OR: char = '|';
pub const FILTER_AND: char = '&';
pub const FILTER_NOT: char = '!';
