use pretty_assertions::assert_eq;

use propedit::memory::{MemoryWorld, RecordingTransport};
use propedit::registry::find;
use propedit::{
    ChangeOutcome, EntityStore, ObjectBinding, ObjectType, PropertyEditor, PropertyId,
    PropertyValue,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn sample_world() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.add_tile(1, (1, 0), ("Grassland", 2), None);
    world.add_unit(50, 1, "Warriors", 1, 10);
    world.add_city(11, "Roma", 4, 3);
    world.place_city(11, 1);
    world.add_player(0, "Caesar", 3, 120, 8);
    world
}

#[test]
fn setting_the_live_value_never_dirties_any_property() {
    init_logging();
    let world = sample_world();

    for (object_type, object_id) in [
        (ObjectType::Tile, 1),
        (ObjectType::Unit, 50),
        (ObjectType::City, 11),
        (ObjectType::Player, 0),
    ] {
        let mut binding = ObjectBinding::new(object_type, object_id);
        for property in propedit::registry::declare_properties(object_type) {
            let current = binding.current_value(&world, &property);
            binding.set_pending_value(&world, &property, &current);
            assert!(!binding.is_dirty(&property), "{:?}", property.id);
        }
        assert!(!binding.has_any_dirty());
    }
}

#[test]
fn repeated_edit_is_idempotent() {
    let world = sample_world();
    let gold = find(ObjectType::Player, PropertyId::PlayerGold).unwrap();
    let mut binding = ObjectBinding::new(ObjectType::Player, 0);

    binding.set_pending_value(&world, &gold, &PropertyValue::Int(500));
    let first = (binding.is_dirty(&gold), binding.effective_value(&world, &gold));
    binding.set_pending_value(&world, &gold, &PropertyValue::Int(500));
    let second = (binding.is_dirty(&gold), binding.effective_value(&world, &gold));

    assert_eq!(first, (true, PropertyValue::Int(500)));
    assert_eq!(first, second);
}

#[test]
fn live_state_catching_up_clears_dirtiness_on_next_read() {
    let mut world = sample_world();
    let name = find(ObjectType::Player, PropertyId::PlayerName).unwrap();
    let mut binding = ObjectBinding::new(ObjectType::Player, 0);

    binding.set_pending_value(&world, &name, &PropertyValue::text("Augustus"));
    assert!(binding.is_dirty(&name));

    world.set_field(
        ObjectType::Player,
        0,
        PropertyId::PlayerName,
        PropertyValue::text("Augustus"),
    );
    // Nothing reconciles until the value is read again.
    assert!(binding.is_dirty(&name));
    assert_eq!(
        binding.effective_value(&world, &name),
        PropertyValue::text("Augustus")
    );
    assert!(!binding.is_dirty(&name));
}

#[test]
fn read_only_properties_ignore_edits() {
    let world = sample_world();
    let mut binding = ObjectBinding::new(ObjectType::Tile, 1);
    for property in propedit::registry::declare_properties(ObjectType::Tile)
        .into_iter()
        .filter(|p| !p.is_editable())
    {
        binding.set_pending_value(&world, &property, &PropertyValue::Int(-1));
        assert!(!binding.is_dirty(&property), "{:?}", property.id);
    }
}

#[test]
fn toggling_a_special_on_and_off_leaves_the_tile_clean() {
    let mut editor = PropertyEditor::new(sample_world(), RecordingTransport::new());
    editor.load_selection(&[1]);
    editor.set_focused(ObjectType::Tile, Some(1));

    assert!(editor.toggle_item(ObjectType::Tile, PropertyId::TileSpecials, 5));
    assert!(editor.is_dirty(ObjectType::Tile, 1, PropertyId::TileSpecials));
    assert!(editor.toggle_item(ObjectType::Tile, PropertyId::TileSpecials, 5));
    assert!(!editor.is_dirty(ObjectType::Tile, 1, PropertyId::TileSpecials));

    // Out of range: rejected, nothing changes.
    assert!(!editor.toggle_item(ObjectType::Tile, PropertyId::TileSpecials, 64));
    assert!(!editor.is_dirty(ObjectType::Tile, 1, PropertyId::TileSpecials));
}

#[test]
fn removal_drops_binding_and_focus() {
    let mut editor = PropertyEditor::new(sample_world(), RecordingTransport::new());
    editor.load_selection(&[1]);
    editor.set_focused(ObjectType::Unit, Some(50));
    editor.set_pending_value(ObjectType::Unit, 50, PropertyId::UnitHp, &PropertyValue::Int(2));

    editor.store_mut().remove(ObjectType::Unit, 50);
    assert_eq!(
        editor.on_object_changed(ObjectType::Unit, 50, true),
        ChangeOutcome::Removed
    );

    let page = editor.page(ObjectType::Unit).unwrap();
    assert!(!page.contains(50));
    assert_eq!(page.focused(), None);
    assert!(page.row(50).is_none());
    assert!(editor.store().resolve(ObjectType::Unit, 50).is_none());
}

#[test]
fn unresolved_binding_reads_none_until_removed() {
    let mut editor = PropertyEditor::new(sample_world(), RecordingTransport::new());
    editor.add_binding(ObjectType::City, 11);
    editor.store_mut().remove(ObjectType::City, 11);

    assert_eq!(
        editor.effective_value(ObjectType::City, 11, PropertyId::CityName),
        PropertyValue::None
    );
    assert_eq!(
        editor.on_object_changed(ObjectType::City, 11, false),
        ChangeOutcome::Refreshed { detail: false }
    );
    let row = editor.page(ObjectType::City).unwrap().row(11).unwrap();
    assert!(row.cells.iter().all(PropertyValue::is_none));
}
