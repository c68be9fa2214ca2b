mod fixtures;

use automata_kernel::di::{
    CapabilityKey, CapabilityStore, ConventionInterfaces, DeclaredInterfaces, ErasedInstance,
    InterfaceManager, StoredBinding,
};
use automata_kernel::prelude::*;
use fixtures::{IDiagnosticsCapability, IHealthCapability, ProbeService};
use std::sync::Arc;

/// Container that refuses one capability.
struct FlakyStore {
    inner: Container,
    reject: CapabilityKey,
}

impl CapabilityStore for FlakyStore {
    fn store(&self, key: CapabilityKey, instance: ErasedInstance) -> Result<Option<ErasedInstance>, KernelError> {
        if key == self.reject {
            return Err("capability store offline".into());
        }
        self.inner.store(key, instance)
    }

    fn restore(&self, key: CapabilityKey, current: &ErasedInstance, previous: Option<ErasedInstance>) -> bool {
        self.inner.restore(key, current, previous)
    }

    fn remove(&self, key: CapabilityKey) -> bool {
        self.inner.remove(key)
    }
}

fn live_probe() -> Arc<dyn Service> {
    let mut service = ProbeService::create().unwrap();
    service.initialize().unwrap();
    Arc::new(service)
}

#[test]
fn one_failing_capability_leaves_the_other_resolvable() {
    let store = Arc::new(FlakyStore {
        inner: Container::new(),
        reject: CapabilityKey::of::<dyn IDiagnosticsCapability>(),
    });
    let manager = InterfaceManager::new(Arc::clone(&store) as Arc<dyn CapabilityStore>, DeclaredInterfaces);

    let report =
        manager.register_service_interfaces(&ServiceDescriptor::marked::<ProbeService>(), &live_probe());

    assert!(!report.succeeded());
    assert_eq!((report.registered.len(), report.detected), (1, 2));
    assert!(store.inner.resolve::<dyn IHealthCapability>().is_ok());
    assert!(!store.inner.is_registered::<dyn IDiagnosticsCapability>());
}

#[test]
fn later_registration_overwrites_capability() {
    let container = Arc::new(Container::new());
    let manager =
        InterfaceManager::new(Arc::clone(&container) as Arc<dyn CapabilityStore>, ConventionInterfaces::default());
    let descriptor = ServiceDescriptor::marked::<ProbeService>();

    let first = live_probe();
    let second = live_probe();
    assert!(manager.register_service_interfaces(&descriptor, &first).succeeded());
    assert!(manager.register_service_interfaces(&descriptor, &second).succeeded());

    let resolved = container.resolve::<dyn IHealthCapability>().unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&resolved), Arc::as_ptr(&second)));
}

#[test]
fn undoing_an_overwrite_rebinds_the_earlier_service() {
    let container = Arc::new(Container::new());
    let manager = InterfaceManager::with_declared(Arc::clone(&container) as Arc<dyn CapabilityStore>);
    let descriptor = ServiceDescriptor::marked::<ProbeService>();

    let first = live_probe();
    assert!(manager.register_service_interfaces(&descriptor, &first).succeeded());
    let report = manager.register_service_interfaces(&descriptor, &live_probe());
    assert!(report.registered.iter().all(StoredBinding::displaced));

    for binding in report.registered {
        assert!(binding.undo(&*container));
    }
    let resolved = container.resolve::<dyn IHealthCapability>().unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&resolved), Arc::as_ptr(&first)));
    assert!(container.resolve::<dyn IDiagnosticsCapability>().is_ok());
}
