//! Data-binding core for an in-game property editor.
//! Tracks pending edits against live game entities, reconciles them lazily against
//! live state, and builds the outbound patches that carry them to the server.

mod binding;
mod editor;
mod filter;
pub mod memory;
mod options;
mod page;
pub mod registry;
pub mod statics;
mod store;
mod transport;
mod value;
mod viewer;

pub use binding::ObjectBinding;
pub use editor::{ChangeOutcome, PropertyEditor};
pub use filter::{FilterError, PropertyFilter};
pub use options::EditorOptions;
pub use page::{DetailEntry, DetailView, ListRow, PropertyPage};
pub use registry::{ObjectId, ObjectProperty, ObjectType, PropertyFlags, PropertyId};
pub use store::{EntityStore, LiveObject, tile_name};
pub use transport::{BatchGuard, Patch, PatchTransport};
pub use value::{BuiltTurn, Catalog, EnumRef, FixedBitSet, PropertyValue, SpriteStack, ValueKind};
pub use viewer::ExtendedViewer;
