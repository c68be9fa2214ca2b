use automata_kernel::di::SingletonRegistry;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug)]
struct Named(String);

proptest! {
    #[test]
    fn reset_rebuilds_only_the_named_slot(
        names in prop::collection::btree_set("[a-z_]{1,12}", 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let registry = SingletonRegistry::new();
        for name in &names {
            let owned = name.clone();
            registry.register_factory(name.clone(), move || Arc::new(Named(owned.clone())));
        }

        let before: Vec<Arc<Named>> =
            names.iter().map(|n| registry.get_instance::<Named>(n).unwrap()).collect();
        for (name, instance) in names.iter().zip(&before) {
            prop_assert_eq!(&instance.0, name);
            prop_assert!(Arc::ptr_eq(instance, &registry.get_instance::<Named>(name).unwrap()));
        }

        let names: Vec<&String> = names.iter().collect();
        let target = names[pick.index(names.len())];
        registry.reset_instance(target);

        for (name, instance) in names.iter().zip(&before) {
            let now = registry.get_instance::<Named>(name).unwrap();
            prop_assert_eq!(Arc::ptr_eq(instance, &now), *name != target);
        }
    }

    #[test]
    fn names_lists_every_registration_sorted(names in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let registry = SingletonRegistry::new();
        for name in &names {
            registry.register_factory(name.clone(), || Arc::new(0_u8));
        }
        let expected: Vec<String> = names.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(registry.names(), expected);
    }
}
