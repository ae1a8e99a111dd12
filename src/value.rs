use crate::statics;
use bit_set::BitSet;
use std::{borrow::Cow, fmt};

/// The shape of a property's content. Every [`PropertyValue`] variant maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Int,
    Text,
    Image,
    TurnArray,
    BoolArray,
    BitSet,
    EnumRef,
}

impl ValueKind {
    /// Collection-valued kinds, edited item by item through an extended viewer.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ValueKind::TurnArray | ValueKind::BoolArray | ValueKind::BitSet | ValueKind::EnumRef
        )
    }
}

/// One slot of a "turn built" record. `Never` and `Destroyed` are both absence, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltTurn {
    Never,
    Destroyed,
    Turn(i32),
}

impl BuiltTurn {
    pub fn is_present(self) -> bool {
        matches!(self, BuiltTurn::Turn(_))
    }
}

impl fmt::Display for BuiltTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltTurn::Never => f.write_str(statics::EN_BUILT_NEVER),
            BuiltTurn::Destroyed => f.write_str(statics::EN_BUILT_DESTROYED),
            BuiltTurn::Turn(t) => write!(f, "{} {t}", statics::EN_BUILT_TURN),
        }
    }
}

/// Static rule catalogs an [`EnumRef`] can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    Terrain,
    Resource,
    Nation,
    Government,
    Building,
    Advance,
}

impl Catalog {
    pub fn label(self) -> &'static str {
        match self {
            Catalog::Terrain => statics::EN_CATALOG_TERRAIN,
            Catalog::Resource => statics::EN_CATALOG_RESOURCE,
            Catalog::Nation => statics::EN_CATALOG_NATION,
            Catalog::Government => statics::EN_CATALOG_GOVERNMENT,
            Catalog::Building => statics::EN_CATALOG_BUILDING,
            Catalog::Advance => statics::EN_CATALOG_ADVANCE,
        }
    }
}

/// Reference to a single entry of a static catalog (e.g. a nation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumRef {
    pub catalog: Catalog,
    pub index: usize,
}

impl EnumRef {
    pub fn new(catalog: Catalog, index: usize) -> Self {
        Self { catalog, index }
    }
}

/// A set of small integers bounded by a fixed capacity.
#[derive(Debug, Clone)]
pub struct FixedBitSet {
    capacity: usize,
    bits: BitSet,
}

impl FixedBitSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bits: BitSet::with_capacity(capacity),
        }
    }

    /// Builds a set from indices; indices at or beyond `capacity` are dropped.
    pub fn from_indices(capacity: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(capacity);
        for i in indices {
            set.insert(i);
        }
        set
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// Returns false if `index` is out of range or already present.
    pub fn insert(&mut self, index: usize) -> bool {
        index < self.capacity && self.bits.insert(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.bits.remove(index)
    }

    /// Flips `index` and returns its new membership, or `None` when out of range.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        if index >= self.capacity {
            return None;
        }
        if self.bits.contains(index) {
            self.bits.remove(index);
            Some(false)
        } else {
            self.bits.insert(index);
            Some(true)
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter()
    }
}

impl PartialEq for FixedBitSet {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.bits.iter().eq(other.bits.iter())
    }
}

impl Eq for FixedBitSet {}

/// Sprite tags composing an image, bottom layer first.
/// Tags are usually borrowed from the tileset's static names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpriteStack {
    pub layers: Vec<Cow<'static, str>>,
}

impl SpriteStack {
    pub fn new(layers: impl IntoIterator<Item = Cow<'static, str>>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn from_static(layers: &[&'static str]) -> Self {
        Self::new(layers.iter().map(|s| Cow::Borrowed(*s)))
    }
}

/// The current or pending content of a single property.
///
/// Heap-backed payloads are owned unless they are a [`Cow::Borrowed`] static
/// (e.g. a constant empty string). Dropping a value releases exactly what it owns.
#[derive(Debug, Clone, Default)]
pub enum PropertyValue {
    #[default]
    None,
    Int(i64),
    Text(Cow<'static, str>),
    Image(SpriteStack),
    TurnArray(Vec<BuiltTurn>),
    BoolArray(Vec<bool>),
    BitSet(FixedBitSet),
    EnumRef(EnumRef),
}

impl PropertyValue {
    pub fn text(s: impl Into<String>) -> Self {
        PropertyValue::Text(Cow::Owned(s.into()))
    }

    pub fn static_text(s: &'static str) -> Self {
        PropertyValue::Text(Cow::Borrowed(s))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::None => ValueKind::None,
            PropertyValue::Int(_) => ValueKind::Int,
            PropertyValue::Text(_) => ValueKind::Text,
            PropertyValue::Image(_) => ValueKind::Image,
            PropertyValue::TurnArray(_) => ValueKind::TurnArray,
            PropertyValue::BoolArray(_) => ValueKind::BoolArray,
            PropertyValue::BitSet(_) => ValueKind::BitSet,
            PropertyValue::EnumRef(_) => ValueKind::EnumRef,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PropertyValue::None)
    }

    /// Whether every heap payload is owned by this value rather than borrowed.
    pub fn is_owned(&self) -> bool {
        match self {
            PropertyValue::Text(s) => matches!(s, Cow::Owned(_)),
            PropertyValue::Image(stack) => stack.layers.iter().all(|l| matches!(l, Cow::Owned(_))),
            PropertyValue::None
            | PropertyValue::Int(_)
            | PropertyValue::TurnArray(_)
            | PropertyValue::BoolArray(_)
            | PropertyValue::BitSet(_)
            | PropertyValue::EnumRef(_) => true,
        }
    }

    /// Deep copy in which every heap payload is owned.
    pub fn to_owned_value(&self) -> PropertyValue {
        match self {
            PropertyValue::Text(s) => PropertyValue::Text(Cow::Owned(s.clone().into_owned())),
            PropertyValue::Image(stack) => PropertyValue::Image(SpriteStack::new(
                stack
                    .layers
                    .iter()
                    .map(|l| Cow::Owned(l.clone().into_owned())),
            )),
            other => other.clone(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum_ref(&self) -> Option<EnumRef> {
        match self {
            PropertyValue::EnumRef(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_bit_set(&self) -> Option<&FixedBitSet> {
        match self {
            PropertyValue::BitSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_turn_array(&self) -> Option<&[BuiltTurn]> {
        match self {
            PropertyValue::TurnArray(turns) => Some(turns),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            PropertyValue::BoolArray(flags) => Some(flags),
            _ => None,
        }
    }

    /// Short human-readable summary, used for list cells and collapsed composite widgets.
    pub fn display_string(&self) -> String {
        match self {
            PropertyValue::None => statics::EN_VALUE_NONE.to_string(),
            PropertyValue::Int(v) => v.to_string(),
            PropertyValue::Text(s) => s.to_string(),
            PropertyValue::Image(stack) => {
                format!("{} {}", stack.layers.len(), statics::EN_SUMMARY_LAYERS)
            }
            PropertyValue::TurnArray(turns) => {
                let built = turns.iter().filter(|t| t.is_present()).count();
                let destroyed = turns
                    .iter()
                    .filter(|t| matches!(t, BuiltTurn::Destroyed))
                    .count();
                if destroyed > 0 {
                    format!(
                        "{built} {}, {destroyed} {}",
                        statics::EN_SUMMARY_BUILT,
                        statics::EN_SUMMARY_DESTROYED
                    )
                } else {
                    format!("{built} {}", statics::EN_SUMMARY_BUILT)
                }
            }
            PropertyValue::BoolArray(flags) => {
                let known = flags.iter().filter(|f| **f).count();
                format!("{known} {}", statics::EN_SUMMARY_KNOWN)
            }
            PropertyValue::BitSet(set) => format!("{} {}", set.len(), statics::EN_SUMMARY_SET),
            PropertyValue::EnumRef(r) => format!("{} #{}", r.catalog.label(), r.index),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::None, PropertyValue::None) => true,
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a == b,
            (PropertyValue::Text(a), PropertyValue::Text(b)) => a == b,
            (PropertyValue::Image(a), PropertyValue::Image(b)) => a == b,
            (PropertyValue::TurnArray(a), PropertyValue::TurnArray(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        // Absent on both sides is equal regardless of which sentinel.
                        (!x.is_present() && !y.is_present()) || x == y
                    })
            }
            (PropertyValue::BoolArray(a), PropertyValue::BoolArray(b)) => a == b,
            (PropertyValue::BitSet(a), PropertyValue::BitSet(b)) => a == b,
            (PropertyValue::EnumRef(a), PropertyValue::EnumRef(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(Cow::Owned(v))
    }
}

impl From<EnumRef> for PropertyValue {
    fn from(v: EnumRef) -> Self {
        PropertyValue::EnumRef(v)
    }
}
