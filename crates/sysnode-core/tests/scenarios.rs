use pretty_assertions::assert_eq;
use sysnode_core::prelude::*;
use sysnode_core::{SceneError, SysnodeConfig, SYSTEM_TYPE_ATTR};
use sysnode_scene::{ExportFormat, SceneDocument};
use sysnode_test_utils::{factory, scene_with_duck, Asset, Character};

#[test]
fn test_create_system_is_tagged() {
    let (scene, duck) = scene_with_duck();
    let handle = duck.handle(&scene).unwrap();
    assert_eq!(scene.get_attribute(handle, SYSTEM_TYPE_ATTR).unwrap(), "System");

    let found = factory().get_system(&scene, "duck").unwrap();
    assert_eq!(found.system_type(&scene).unwrap(), "System");
    assert!(found.is::<System>());
}

#[test]
fn test_rename_through_namespace_and_back() {
    let (mut scene, duck) = scene_with_duck();
    let id = duck.identity().clone();

    duck.rename(&mut scene, "ns:duck").unwrap();
    assert_eq!(duck.namespace(&scene).unwrap(), "ns");
    assert_eq!(duck.name(&scene).unwrap(), "ns:duck");

    duck.rename(&mut scene, "duck").unwrap();
    assert_eq!(duck.namespace(&scene).unwrap(), "");
    assert!(!scene.namespace_exists("ns"));
    assert_eq!(duck.identity(), &id);
}

#[test]
fn test_export_leaves_selection_unchanged() {
    let (mut scene, duck) = scene_with_duck();
    let other = System::create(&mut scene, Some("goose"), None).unwrap();
    let other_handle = other.handle(&scene).unwrap();
    scene.select(other_handle).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    duck.export(&mut scene, &path, &ExportOptions::default()).unwrap();

    assert_eq!(scene.selection(), vec![other_handle]);
    let doc = SceneDocument::read(&path).unwrap();
    let names: Vec<&str> = doc.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["duck"]);
}

#[test]
fn test_export_with_empty_selection_restores_empty() {
    let (mut scene, duck) = scene_with_duck();
    let dir = tempfile::tempdir().unwrap();
    duck.export(&mut scene, &dir.path().join("out.json"), &ExportOptions::default())
        .unwrap();
    assert!(scene.selection().is_empty());
}

#[test]
fn test_failed_export_still_restores_selection() {
    let (mut scene, duck) = scene_with_duck();
    let goose = System::create(&mut scene, Some("goose"), None).unwrap();
    let goose_handle = goose.handle(&scene).unwrap();
    scene.select(goose_handle).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let unwritable = dir.path().join("missing").join("out.json");
    let err = duck
        .export(&mut scene, &unwritable, &ExportOptions::default())
        .unwrap_err();

    assert!(matches!(err, NodeError::Scene(SceneError::Io(_))));
    assert_eq!(scene.selection(), vec![goose_handle]);
}

#[test]
fn test_export_uses_configured_options() {
    let config = SysnodeConfig::from_toml_str(
        "[export]\nformat = \"portable_binary\"\ninclude_descendants = false\n",
    )
    .unwrap();

    let (mut scene, duck) = scene_with_duck();
    let parent = NodeRef::from(duck.identity());
    System::create(&mut scene, Some("egg"), Some(&parent)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    duck.export(&mut scene, &path, &config.export).unwrap();

    let doc = SceneDocument::read(&path).unwrap();
    assert_eq!(doc.format, ExportFormat::PortableBinary);
    assert_eq!(doc.nodes.len(), 1);
}

#[test]
fn test_deleted_system_type_is_stale() {
    let (mut scene, duck) = scene_with_duck();
    assert_eq!(duck.system_type(&scene).unwrap(), "System");

    duck.delete(&mut scene).unwrap();
    let err = duck.system_type(&scene).unwrap_err();
    assert!(err.is_stale());
    assert_eq!(
        err.to_string(),
        format!("invalid node: System({}) not found", duck.identity())
    );
}

#[test]
fn test_every_accessor_fails_after_delete() {
    let mut scene = MemoryScene::new();
    let asset = Asset::create(&mut scene, Some("crate_a"), None).unwrap();
    asset.delete(&mut scene).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let errors = [
        asset.name(&scene).unwrap_err(),
        asset.short_name(&scene).unwrap_err(),
        asset.namespace(&scene).unwrap_err(),
        asset.system_type(&scene).unwrap_err(),
        asset.version(&scene).unwrap_err(),
        asset.serialize(&scene).unwrap_err(),
        asset.describe(&scene).unwrap_err(),
        asset.rename(&mut scene, "other").unwrap_err(),
        asset.set_namespace(&mut scene, "ns").unwrap_err(),
        asset.set_system_type(&mut scene, "Prop").unwrap_err(),
        asset.create_attributes(&mut scene).unwrap_err(),
        asset
            .export(&mut scene, &dir.path().join("x.json"), &ExportOptions::default())
            .unwrap_err(),
        asset.delete(&mut scene).unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_stale(), "{err}");
    }
}

#[test]
fn test_recreated_name_is_a_different_node() {
    let (mut scene, duck) = scene_with_duck();
    duck.delete(&mut scene).unwrap();
    let again = System::create(&mut scene, Some("duck"), None).unwrap();

    assert!(duck.name(&scene).unwrap_err().is_stale());
    assert_ne!(again.identity(), duck.identity());
    assert_ne!(again, duck);
}

#[test]
fn test_describe_matches_class() {
    let mut scene = MemoryScene::new();
    let hero = Character::create(&mut scene, Some("cast:"), None).unwrap();
    assert_eq!(hero.describe(&scene).unwrap(), "Character('cast:grp')");
}
