use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use sysnode_core::prelude::*;
use sysnode_test_utils::{factory, Asset, Character, Prop};

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn node_name() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..4).prop_map(|segments| segments.join(":"))
}

fn class_index() -> impl Strategy<Value = usize> {
    0..4usize
}

fn create_by_index(scene: &mut MemoryScene, index: usize, name: &str) -> Box<dyn SystemObject> {
    let registry = factory();
    let class = match index {
        0 => "System",
        1 => "Asset",
        2 => "Character",
        _ => "Prop",
    };
    let mut data = sysnode_core::Fields::new();
    data.insert(sysnode_core::TYPE_FIELD.into(), class.into());
    registry.deserialize(scene, &data, Some(name), None).unwrap()
}

proptest! {
    #[test]
    fn prop_rename_keeps_identity_and_hash(
        names in proptest::collection::vec(node_name(), 1..8)
    ) {
        let mut scene = MemoryScene::new();
        let duck = System::create(&mut scene, Some("duck"), None).unwrap();
        let id = duck.identity().clone();
        let hash = hash_of(&duck);

        for name in &names {
            duck.rename(&mut scene, name).unwrap();
            prop_assert_eq!(duck.identity(), &id);
            prop_assert_eq!(hash_of(&duck), hash);

            let rebound = System::bind(&scene, &id).unwrap();
            prop_assert_eq!(&rebound, &duck);
            prop_assert_eq!(hash_of(&rebound), hash);
        }
    }

    #[test]
    fn prop_rename_lands_in_requested_namespace(name in node_name()) {
        let (mut scene, duck) = sysnode_test_utils::scene_with_duck();
        let resolved = duck.rename(&mut scene, &name).unwrap();
        prop_assert_eq!(&resolved, &name);
        let expected_ns = name.rsplit_once(':').map_or("", |(ns, _)| ns);
        prop_assert_eq!(duck.namespace(&scene).unwrap(), expected_ns);
    }

    #[test]
    fn prop_equality_laws(
        a in class_index(),
        b in class_index(),
        c in class_index(),
    ) {
        let mut scene = MemoryScene::new();
        let made = create_by_index(&mut scene, a, "subject");
        let handle = made.handle(&scene).unwrap();
        let registry = factory();

        let bind = |index: usize| -> Box<dyn SystemObject> {
            match index {
                0 => Box::new(System::bind(&scene, handle).unwrap()),
                1 => Box::new(Asset::bind(&scene, handle).unwrap()),
                2 => Box::new(Character::bind(&scene, handle).unwrap()),
                _ => Box::new(Prop::bind(&scene, handle).unwrap()),
            }
        };
        let (x, y, z) = (bind(a), bind(b), bind(c));

        // reflexive
        prop_assert!(*x == *x);
        // class-sensitive
        prop_assert_eq!(*x == *y, a == b);
        // symmetric
        prop_assert_eq!(*x == *y, *y == *x);
        // transitive
        if *x == *y && *y == *z {
            prop_assert!(*x == *z);
        }
        // identity-only hash
        prop_assert_eq!(hash_of(&*x), hash_of(&*y));

        let found = registry.get_system(&scene, made.identity()).unwrap();
        prop_assert!(*found == *made);
    }

    #[test]
    fn prop_stale_only_after_delete(index in class_index(), name in node_name()) {
        let mut scene = MemoryScene::new();
        let system = create_by_index(&mut scene, index, &name);
        prop_assert!(system.name(&scene).is_ok());
        prop_assert!(system.system_type(&scene).is_ok());

        system.delete(&mut scene).unwrap();
        prop_assert!(system.name(&scene).unwrap_err().is_stale());
        prop_assert!(system.system_type(&scene).unwrap_err().is_stale());
        prop_assert!(system.serialize(&scene).unwrap_err().is_stale());
    }
}
