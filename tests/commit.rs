use pretty_assertions::assert_eq;

use propedit::memory::{MemoryWorld, RecordingTransport};
use propedit::registry::declare_properties;
use propedit::{
    BuiltTurn, Catalog, EnumRef, EntityStore, ObjectType, PropertyEditor, PropertyId,
    PropertyValue,
};

fn city_world() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.add_tile(8, (2, 2), ("Plains", 1), None);
    world.add_city(11, "Roma", 4, 3);
    world.place_city(11, 8);
    world.add_city(12, "Antium", 2, 3);
    world.add_player(1, "Hannibal", 4, 30, 6);
    world.set_game_turn(17);
    world
}

#[test]
fn city_size_edit_flows_through_commit_and_reconciles() {
    let mut editor = PropertyEditor::new(city_world(), RecordingTransport::new());
    editor.add_binding(ObjectType::City, 11);

    editor.set_pending_value(ObjectType::City, 11, PropertyId::CitySize, &PropertyValue::Int(6));
    assert!(editor.is_dirty(ObjectType::City, 11, PropertyId::CitySize));
    assert_eq!(
        editor.effective_value(ObjectType::City, 11, PropertyId::CitySize),
        PropertyValue::Int(6)
    );

    assert_eq!(editor.commit(ObjectType::City, &[11]), 1);
    let patch = editor.transport().sent().next().unwrap().clone();
    assert_eq!(patch.object_type, ObjectType::City);
    assert_eq!(patch.object_id, 11);
    assert_eq!(
        patch.fields.iter().map(|(k, v)| (*k, v.clone())).collect::<Vec<_>>(),
        vec![
            (PropertyId::CityName, PropertyValue::text("Roma")),
            (PropertyId::CitySize, PropertyValue::Int(6)),
            (
                PropertyId::CityBuildings,
                PropertyValue::TurnArray(vec![BuiltTurn::Never; 3])
            ),
        ]
    );

    // Commit does not clear pending edits.
    assert!(editor.is_dirty(ObjectType::City, 11, PropertyId::CitySize));
    assert_eq!(
        editor.effective_value(ObjectType::City, 11, PropertyId::CitySize),
        PropertyValue::Int(6)
    );
    assert!(editor.is_dirty(ObjectType::City, 11, PropertyId::CitySize));

    // The server accepts the patch.
    assert!(editor.store_mut().apply_patch(&patch));
    assert_eq!(
        editor.effective_value(ObjectType::City, 11, PropertyId::CitySize),
        PropertyValue::Int(6)
    );
    assert!(!editor.is_dirty(ObjectType::City, 11, PropertyId::CitySize));
}

#[test]
fn patch_carries_full_editable_snapshot_with_only_dirty_fields_changed() {
    let world = city_world();
    let live = world.resolve(ObjectType::Player, 1).unwrap();
    let before: Vec<_> = declare_properties(ObjectType::Player)
        .into_iter()
        .filter(|p| p.is_editable())
        .map(|p| (p.id, live.read_field(p.id).unwrap()))
        .collect();

    let mut editor = PropertyEditor::new(world, RecordingTransport::new());
    editor.add_binding(ObjectType::Player, 1);
    editor.set_focused(ObjectType::Player, Some(1));
    assert!(editor.toggle_item(ObjectType::Player, PropertyId::PlayerNation, 9));
    assert!(editor.toggle_item(ObjectType::Player, PropertyId::PlayerInventions, 0));
    assert_eq!(editor.commit(ObjectType::Player, &[1]), 1);

    let patch = editor.transport().sent().next().unwrap();
    assert_eq!(patch.fields.len(), before.len());
    for (property, old) in before {
        let sent = patch.field(property).unwrap();
        match property {
            PropertyId::PlayerNation => {
                assert_eq!(*sent, PropertyValue::EnumRef(EnumRef::new(Catalog::Nation, 9)))
            }
            PropertyId::PlayerInventions => assert_eq!(
                sent.as_bool_array(),
                Some(&[true, false, false, false, false, false][..])
            ),
            _ => assert_eq!(*sent, old, "{property:?}"),
        }
    }
}

#[test]
fn multi_binding_commit_is_one_batch_of_independent_patches() {
    let mut editor = PropertyEditor::new(city_world(), RecordingTransport::new());
    editor.add_binding(ObjectType::City, 11);
    editor.add_binding(ObjectType::City, 12);
    editor.set_focused(ObjectType::City, Some(12));
    assert!(editor.toggle_item(ObjectType::City, PropertyId::CityBuildings, 2));
    editor.set_pending_value(ObjectType::City, 11, PropertyId::CityName, &PropertyValue::text("Roma Nova"));

    assert_eq!(editor.commit(ObjectType::City, &[11, 12]), 2);
    let transport = editor.transport();
    assert_eq!(transport.batches.len(), 1);
    let ids: Vec<_> = transport.batches[0].iter().map(|p| p.object_id).collect();
    assert_eq!(ids, vec![11, 12]);
    assert_eq!(
        transport.batches[0][1]
            .field(PropertyId::CityBuildings)
            .and_then(|v| v.as_turn_array()),
        Some(&[BuiltTurn::Never, BuiltTurn::Never, BuiltTurn::Turn(17)][..])
    );
    assert!(!transport.is_batch_open());
}

#[test]
fn reset_discards_edits_before_commit() {
    let mut editor = PropertyEditor::new(city_world(), RecordingTransport::new());
    editor.add_binding(ObjectType::City, 11);
    editor.set_pending_value(ObjectType::City, 11, PropertyId::CitySize, &PropertyValue::Int(9));
    editor.reset_selected(ObjectType::City, &[11]);

    assert_eq!(editor.commit(ObjectType::City, &[11]), 0);
    assert_eq!(editor.transport().sent().count(), 0);
    assert_eq!(
        editor.page(ObjectType::City).unwrap().row(11).unwrap().cells[3],
        PropertyValue::Int(4)
    );
}

#[test]
fn removed_city_is_skipped_at_commit() {
    let mut editor = PropertyEditor::new(city_world(), RecordingTransport::new());
    editor.add_binding(ObjectType::City, 11);
    editor.add_binding(ObjectType::City, 12);
    editor.set_pending_value(ObjectType::City, 11, PropertyId::CitySize, &PropertyValue::Int(5));
    editor.set_pending_value(ObjectType::City, 12, PropertyId::CitySize, &PropertyValue::Int(5));
    editor.store_mut().remove(ObjectType::City, 12);

    assert_eq!(editor.commit(ObjectType::City, &[11, 12]), 1);
    assert!(editor.is_dirty(ObjectType::City, 12, PropertyId::CitySize));

    editor.on_object_changed(ObjectType::City, 12, true);
    assert!(!editor.page(ObjectType::City).unwrap().contains(12));
}

#[test]
fn clearing_a_resource_is_sent_and_reconciles() {
    let mut world = city_world();
    world.add_tile(30, (3, 3), ("Grassland", 2), Some(("Wheat", 4)));
    let mut editor = PropertyEditor::new(world, RecordingTransport::new());
    editor.add_binding(ObjectType::Tile, 30);

    editor.set_pending_value(ObjectType::Tile, 30, PropertyId::TileResource, &PropertyValue::None);
    assert!(editor.is_dirty(ObjectType::Tile, 30, PropertyId::TileResource));

    assert_eq!(editor.commit(ObjectType::Tile, &[30]), 1);
    let patch = editor.transport().sent().next().unwrap().clone();
    assert_eq!(patch.field(PropertyId::TileResource), Some(&PropertyValue::None));

    assert!(editor.store_mut().apply_patch(&patch));
    assert_eq!(
        editor.effective_value(ObjectType::Tile, 30, PropertyId::TileResource),
        PropertyValue::None
    );
    assert!(!editor.is_dirty(ObjectType::Tile, 30, PropertyId::TileResource));
}
