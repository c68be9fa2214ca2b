//! Capability identity and type-erased instances.

use crate::error::KernelError;
use crate::service::Service;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Identity of a capability: usually a trait-object type such as `dyn HealthCapability`,
/// or a concrete service type when an instance is mirrored under itself.
#[derive(Clone, Copy)]
pub struct CapabilityKey {
    id: TypeId,
    name: &'static str,
}

impl CapabilityKey {
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<C>(), name: std::any::type_name::<C>() }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, e.g. `dyn automata_health::HealthCapability`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the key names a trait object rather than a concrete type.
    #[must_use]
    pub fn is_trait_object(&self) -> bool {
        self.name.starts_with("dyn ")
    }

    /// Last path segment without `dyn`, generics or auto-trait bounds.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let bare = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let bare = bare.split([' ', '<']).next().unwrap_or(bare);
        bare.rsplit("::").next().unwrap_or(bare)
    }
}

impl PartialEq for CapabilityKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapabilityKey {}

impl Hash for CapabilityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityKey").field(&self.name).finish()
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An `Arc<C>` with `C` erased, tagged with the key it was built for.
#[derive(Clone)]
pub struct ErasedInstance {
    key: CapabilityKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl ErasedInstance {
    pub fn new<C: ?Sized + Send + Sync + 'static>(instance: Arc<C>) -> Self {
        Self { key: CapabilityKey::of::<C>(), value: Arc::new(instance) }
    }

    #[must_use]
    pub const fn key(&self) -> CapabilityKey {
        self.key
    }

    /// Recovers the typed `Arc<C>`.
    ///
    /// # Errors
    /// Returns [`KernelError::TypeMismatch`] when the instance was built for another key.
    pub fn downcast<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, KernelError> {
        self.value
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or_else(|| KernelError::type_mismatch(std::any::type_name::<C>()))
    }

    /// Whether both handles share one erased allocation, i.e. one is a clone of the other.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for ErasedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedInstance").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Write side of the container as seen by the registration components.
pub trait CapabilityStore: Send + Sync {
    /// Binds `instance` to `key`, replacing any earlier instance binding.
    /// Returns the instance binding it replaced.
    ///
    /// # Errors
    /// Implementations reject instances whose erased type does not match `key`.
    fn store(&self, key: CapabilityKey, instance: ErasedInstance) -> Result<Option<ErasedInstance>, KernelError>;

    /// Undoes a [`store`](Self::store): if `key` is still bound to `current`,
    /// rebinds `previous` or, without one, drops the instance binding.
    /// Constructor registrations for `key` are left alone.
    ///
    /// Returns whether the binding changed.
    fn restore(&self, key: CapabilityKey, current: &ErasedInstance, previous: Option<ErasedInstance>) -> bool;

    /// Drops the instance binding for `key`. Returns whether one existed.
    fn remove(&self, key: CapabilityKey) -> bool;
}

/// An instance binding written to a [`CapabilityStore`], together with the
/// binding it displaced.
#[derive(Debug, Clone)]
pub struct StoredBinding {
    key: CapabilityKey,
    stored: ErasedInstance,
    displaced: Option<ErasedInstance>,
}

impl StoredBinding {
    /// Binds `instance` to `key` in `store`.
    ///
    /// # Errors
    /// Propagates the store's rejection.
    pub fn write(
        store: &dyn CapabilityStore,
        key: CapabilityKey,
        instance: ErasedInstance,
    ) -> Result<Self, KernelError> {
        let displaced = store.store(key, instance.clone())?;
        Ok(Self { key, stored: instance, displaced })
    }

    #[must_use]
    pub const fn key(&self) -> CapabilityKey {
        self.key
    }

    /// Whether the write replaced an earlier instance binding.
    #[must_use]
    pub const fn displaced(&self) -> bool {
        self.displaced.is_some()
    }

    /// Puts back what the write displaced, unless `key` was rebound since.
    pub fn undo(self, store: &dyn CapabilityStore) -> bool {
        store.restore(self.key, &self.stored, self.displaced)
    }
}

type Bind = Arc<dyn Fn(Arc<dyn Service>) -> Result<ErasedInstance, KernelError> + Send + Sync>;

/// How to view a live service as one capability.
#[derive(Clone)]
pub struct CapabilityBinding {
    key: CapabilityKey,
    bind: Bind,
}

impl CapabilityBinding {
    #[must_use]
    pub const fn key(&self) -> CapabilityKey {
        self.key
    }

    /// Casts `service` to this capability.
    ///
    /// # Errors
    /// Returns [`KernelError::TypeMismatch`] if `service` is not the type the binding was declared on.
    pub fn bind(&self, service: Arc<dyn Service>) -> Result<ErasedInstance, KernelError> {
        (self.bind)(service)
    }
}

impl fmt::Debug for CapabilityBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityBinding").field(&self.key).finish()
    }
}

/// Capability list a service type declares in
/// [`ServiceDefinition::capabilities`](crate::service::ServiceDefinition::capabilities).
///
/// ```rust,ignore
/// fn capabilities(set: &mut CapabilitySet<Self>) {
///     set.provide::<dyn HealthCapability>(|s| s);
///     set.provide::<dyn DiagnosticsCapability>(|s| s);
/// }
/// ```
pub struct CapabilitySet<T> {
    bindings: Vec<CapabilityBinding>,
    owner: PhantomData<fn() -> T>,
}

impl<T: Service> CapabilitySet<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { bindings: Vec::new(), owner: PhantomData }
    }

    /// Declares that `T` provides `C`; `cast` performs the unsizing (`|s| s`).
    pub fn provide<C>(&mut self, cast: fn(Arc<T>) -> Arc<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let bind: Bind = Arc::new(move |service: Arc<dyn Service>| {
            let concrete = service
                .downcast_arc::<T>()
                .map_err(|_| KernelError::type_mismatch(std::any::type_name::<T>()))?;
            Ok(ErasedInstance::new::<C>(cast(concrete)))
        });
        self.bindings.push(CapabilityBinding { key: CapabilityKey::of::<C>(), bind });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn into_bindings(self) -> Vec<CapabilityBinding> {
        self.bindings
    }
}

impl<T> fmt::Debug for CapabilitySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bindings.iter().map(|b| b.key)).finish()
    }
}
