use pretty_assertions::assert_eq;
use sysnode_core::prelude::*;
use sysnode_core::{ClassInfo, Fields, SystemClass, TYPE_FIELD};
use sysnode_scene::ExportFormat;
use sysnode_test_utils::{factory, tagged_node, untagged_node, Asset, Character, Prop, VERSION_FIELD};

system_class! {
    /// Redefinition of `Asset` loaded later in the session
    pub struct ReloadedAsset: System = ClassInfo::new("Asset", Some("System"));
}

#[test]
fn test_registering_root_registers_subclasses() {
    let registry = factory();
    assert_eq!(registry.names(), vec!["Asset", "Character", "Prop", "System"]);
}

#[test]
fn test_registering_subclass_only_registers_its_subtree() {
    let mut registry = Factory::new();
    registry.declare::<Character>();
    registry.declare::<Prop>();
    registry.register_type::<Asset>();
    assert_eq!(registry.names(), vec!["Asset", "Character"]);
}

#[test]
fn test_registration_is_idempotent() {
    let mut registry = factory();
    registry.register_type::<System>();
    registry.register_type::<Asset>();
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_redefined_class_replaces_entry_on_reregister() {
    let mut scene = MemoryScene::new();
    Asset::create(&mut scene, Some("crate_a"), None).unwrap();
    let mut registry = factory();
    assert!(registry.get_system(&scene, "crate_a").unwrap().is::<Asset>());

    registry.declare::<ReloadedAsset>();
    assert!(registry.get_system(&scene, "crate_a").unwrap().is::<Asset>());

    registry.register_type::<System>();
    let reloaded = registry.get_system(&scene, "crate_a").unwrap();
    assert!(reloaded.is::<ReloadedAsset>());
    assert_eq!(reloaded.class_name(), "Asset");
    assert!(registry.contains("Character"));
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_redefined_class_never_equals_old_definition() {
    let mut scene = MemoryScene::new();
    let old = Asset::create(&mut scene, Some("crate_a"), None).unwrap();
    let mut registry = factory();
    registry.declare::<ReloadedAsset>();
    registry.register_type::<System>();

    let reloaded = registry.get_system(&scene, old.identity()).unwrap();
    let old: &dyn SystemObject = &old;
    assert_eq!(reloaded.class_name(), old.class_name());
    assert!(*reloaded != *old);
    assert!(*old != *reloaded);

    let mut set = std::collections::HashSet::new();
    set.insert(old.identity().clone());
    assert!(set.contains(reloaded.identity()));
}

#[test]
fn test_untagged_node_is_not_a_system() {
    let mut scene = MemoryScene::new();
    let handle = untagged_node(&mut scene, "plain");
    let registry = factory();

    assert!(registry.get_system_class(&scene, "plain").is_none());
    assert!(registry.get_system_class(&scene, handle).is_none());
    assert!(registry.get_system(&scene, "plain").is_none());
}

#[test]
fn test_missing_node_is_not_a_system() {
    let scene = MemoryScene::new();
    assert!(factory().get_system(&scene, "nowhere").is_none());
}

#[test]
fn test_unknown_tag_resolves_to_system() {
    let mut scene = MemoryScene::new();
    tagged_node(&mut scene, "ufo", "Spaceship");
    let registry = factory();

    let class = registry.get_system_class(&scene, "ufo").unwrap();
    assert_eq!(class, SystemClass::of::<System>());

    let system = registry.get_system(&scene, "ufo").unwrap();
    assert!(system.is::<System>());
    assert_eq!(system.system_type(&scene).unwrap(), "Spaceship");
}

#[test]
fn test_empty_registry_still_falls_back() {
    let mut scene = MemoryScene::new();
    tagged_node(&mut scene, "duck", "Asset");
    let system = Factory::new().get_system(&scene, "duck").unwrap();
    assert!(system.is::<System>());
}

#[test]
fn test_tag_decides_class_not_wrapper() {
    let mut scene = MemoryScene::new();
    let duck = System::create(&mut scene, Some("duck"), None).unwrap();
    duck.set_system_type(&mut scene, "Prop").unwrap();

    assert_eq!(duck.class_name(), "System");
    let rebuilt = factory().get_system(&scene, duck.identity()).unwrap();
    assert!(rebuilt.is::<Prop>());
}

#[test]
fn test_plain_node_promoted_by_tag() {
    let mut scene = MemoryScene::new();
    let handle = untagged_node(&mut scene, "barrel");
    let registry = factory();
    assert!(registry.get_system(&scene, handle).is_none());

    let node = Node::bind(&scene, handle).unwrap();
    sysnode_core::add_system_attr(&mut scene, handle, "Prop").unwrap();
    let system = registry.get_system(&scene, node.id()).unwrap();
    assert!(system.is::<Prop>());
    assert_eq!(system.identity(), node.id());
}

#[test]
fn test_scene_reload_rebuilds_same_systems() {
    let mut scene = MemoryScene::new();
    let registry = factory();
    let hero = Character::create(&mut scene, Some("cast:hero"), None).unwrap();
    let crate_a = Asset::create(&mut scene, Some("crate_a"), None).unwrap();
    crate_a.set_version(&mut scene, 7).unwrap();
    let prop = Prop::create(&mut scene, None, None).unwrap();
    let created: [&dyn SystemObject; 3] = [&hero, &crate_a, &prop];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    scene.save(&path, ExportFormat::PortableAscii).unwrap();
    let reloaded = MemoryScene::load(&path).unwrap();

    for original in created {
        let rebuilt = registry.get_system(&reloaded, original.identity()).unwrap();
        assert!(*rebuilt == *original);
        assert_eq!(
            rebuilt.name(&reloaded).unwrap(),
            original.name(&scene).unwrap()
        );
    }
    let rebuilt = registry.get_system(&reloaded, crate_a.identity()).unwrap();
    assert_eq!(rebuilt.downcast_ref::<Asset>().unwrap().version(&reloaded).unwrap(), 7);
}

#[test]
fn test_serialized_fields_rebuild_class() {
    let mut scene = MemoryScene::new();
    let registry = factory();
    let crate_a = Asset::create(&mut scene, Some("crate_a"), None).unwrap();
    crate_a.set_version(&mut scene, 3).unwrap();

    let fields = crate_a.serialize(&scene).unwrap();
    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(keys, vec![TYPE_FIELD, VERSION_FIELD]);

    let json = serde_json::to_string(&fields).unwrap();
    let data: Fields = serde_json::from_str(&json).unwrap();

    let mut other = MemoryScene::new();
    let rebuilt = registry
        .deserialize(&mut other, &data, Some("crate_b"), None)
        .unwrap();
    let asset = rebuilt.downcast_ref::<Asset>().unwrap();
    assert_eq!(asset.version(&other).unwrap(), 3);
    assert_eq!(asset.system_type(&other).unwrap(), "Asset");

    let found = registry.get_system(&other, rebuilt.identity()).unwrap();
    assert!(*found == *rebuilt);
}

#[test]
fn test_serialize_minimum_is_type() {
    let mut scene = MemoryScene::new();
    let hero = Character::create(&mut scene, Some("hero"), None).unwrap();
    let fields = hero.serialize(&scene).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[TYPE_FIELD], "Character");
}

#[test]
fn test_deserialize_bad_extra_field() {
    let mut scene = MemoryScene::new();
    let mut data = Fields::new();
    data.insert(TYPE_FIELD.into(), "Asset".into());
    data.insert(VERSION_FIELD.into(), "latest".into());

    let result = factory().deserialize(&mut scene, &data, None, None);
    assert!(matches!(result, Err(NodeError::InvalidData(_))));
}

#[test]
fn test_prop_uses_its_node_type() {
    let mut scene = MemoryScene::new();
    let prop = Prop::create(&mut scene, None, None).unwrap();
    assert_eq!(prop.name(&scene).unwrap(), "locator");
    let handle = prop.handle(&scene).unwrap();
    assert_eq!(scene.node_type(handle).unwrap(), "locator");
}
