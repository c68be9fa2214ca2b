use crate::di::capability::{CapabilityKey, CapabilityStore, ErasedInstance};
use crate::error::KernelError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

type Constructor = Arc<dyn Fn() -> ErasedInstance + Send + Sync>;

struct SingletonEntry {
    constructor: Constructor,
    cached: Option<ErasedInstance>,
}

#[derive(Default)]
struct Tables {
    instances: FxHashMap<CapabilityKey, ErasedInstance>,
    singletons: FxHashMap<CapabilityKey, SingletonEntry>,
    factories: FxHashMap<CapabilityKey, Constructor>,
}

enum Pending {
    Singleton(Constructor),
    Factory(Constructor),
}

/// Capability-keyed resolver with three independent tables.
///
/// Resolution precedence: registered instance, then singleton constructor
/// (built on first resolve and memoized), then factory (built fresh every time).
/// Resolving a capability found in none of them is an error.
///
/// Constructors run without holding the table lock, so a constructor may itself
/// resolve from the container. If two threads race on the first resolve of a
/// singleton, both construct but only the first stored result is ever handed out.
#[derive(Default)]
pub struct Container {
    tables: RwLock<Tables>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for `C`. Singletons are built lazily once; otherwise
    /// the constructor lands in the factory table and runs on every resolve.
    ///
    /// Re-registering a singleton discards its cached instance.
    pub fn register<C, F>(&self, constructor: F, singleton: bool)
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<C>();
        let constructor: Constructor = Arc::new(move || ErasedInstance::new::<C>(constructor()));

        let mut tables = self.tables.write();
        if singleton {
            tables.singletons.insert(key, SingletonEntry { constructor, cached: None });
        } else {
            tables.factories.insert(key, constructor);
        }
        debug!(capability = key.name(), singleton, "Constructor registered");
    }

    /// Registers the concrete type `T` under itself, built with `T::default()`.
    pub fn register_type<T>(&self, singleton: bool)
    where
        T: Default + Send + Sync + 'static,
    {
        self.register::<T, _>(|| Arc::new(T::default()), singleton);
    }

    /// Binds a prebuilt instance; it wins over any constructor for `C`.
    pub fn register_instance<C>(&self, instance: Arc<C>)
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let erased = ErasedInstance::new::<C>(instance);
        let key = erased.key();
        self.tables.write().instances.insert(key, erased);
        debug!(capability = key.name(), "Instance registered");
    }

    /// Binds a zero-argument factory; every resolve builds a new instance.
    pub fn register_factory<C, F>(&self, factory: F)
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        self.register::<C, F>(factory, false);
    }

    /// Resolves `C` following instance > singleton > factory precedence.
    ///
    /// # Errors
    /// * [`KernelError::NotRegistered`] if no table knows `C`.
    /// * [`KernelError::TypeMismatch`] if a stored entry does not hold an `Arc<C>`.
    pub fn resolve<C>(&self) -> Result<Arc<C>, KernelError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<C>();

        let pending = {
            let tables = self.tables.read();
            if let Some(instance) = tables.instances.get(&key) {
                return instance.downcast::<C>();
            }
            match (tables.singletons.get(&key), tables.factories.get(&key)) {
                (Some(SingletonEntry { cached: Some(cached), .. }), _) => {
                    return cached.downcast::<C>();
                },
                (Some(entry), _) => Pending::Singleton(Arc::clone(&entry.constructor)),
                (None, Some(factory)) => Pending::Factory(Arc::clone(factory)),
                (None, None) => {
                    return Err(KernelError::not_registered(format!(
                        "Service {} is not registered",
                        key.name()
                    )));
                },
            }
        };

        match pending {
            Pending::Factory(factory) => {
                trace!(capability = key.name(), "Building from factory");
                factory().downcast::<C>()
            },
            Pending::Singleton(constructor) => {
                let built = constructor();
                let stored = {
                    let mut tables = self.tables.write();
                    match tables.singletons.get_mut(&key) {
                        Some(entry) => entry.cached.get_or_insert(built).clone(),
                        None => built,
                    }
                };
                trace!(capability = key.name(), "Singleton constructed");
                stored.downcast::<C>()
            },
        }
    }

    #[must_use]
    pub fn is_registered<C: ?Sized + 'static>(&self) -> bool {
        self.is_key_registered(CapabilityKey::of::<C>())
    }

    #[must_use]
    pub fn is_key_registered(&self, key: CapabilityKey) -> bool {
        let tables = self.tables.read();
        tables.instances.contains_key(&key)
            || tables.singletons.contains_key(&key)
            || tables.factories.contains_key(&key)
    }

    /// Removes `C` from all tables. Returns whether anything was registered.
    pub fn unregister<C: ?Sized + 'static>(&self) -> bool {
        self.unregister_key(CapabilityKey::of::<C>())
    }

    pub fn unregister_key(&self, key: CapabilityKey) -> bool {
        let mut tables = self.tables.write();
        let instance = tables.instances.remove(&key).is_some();
        let singleton = tables.singletons.remove(&key).is_some();
        let factory = tables.factories.remove(&key).is_some();
        instance || singleton || factory
    }

    /// Drops all three tables.
    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.instances.clear();
        tables.singletons.clear();
        tables.factories.clear();
        debug!("Container cleared");
    }

    /// Number of distinct registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Every registered key, sorted by type name.
    #[must_use]
    pub fn keys(&self) -> Vec<CapabilityKey> {
        let tables = self.tables.read();
        let mut keys: Vec<CapabilityKey> = tables
            .instances
            .keys()
            .chain(tables.singletons.keys())
            .chain(tables.factories.keys())
            .copied()
            .collect();
        keys.sort_by_key(CapabilityKey::name);
        keys.dedup();
        keys
    }
}

impl CapabilityStore for Container {
    fn store(&self, key: CapabilityKey, instance: ErasedInstance) -> Result<Option<ErasedInstance>, KernelError> {
        if instance.key() != key {
            return Err(KernelError::TypeMismatch {
                message: instance.key().name().into(),
                context: Some(format!("cannot bind to {}", key.name()).into()),
            });
        }
        let displaced = self.tables.write().instances.insert(key, instance);
        if displaced.is_some() {
            debug!(capability = key.name(), "Instance rebound");
        } else {
            debug!(capability = key.name(), "Instance registered");
        }
        Ok(displaced)
    }

    fn restore(&self, key: CapabilityKey, current: &ErasedInstance, previous: Option<ErasedInstance>) -> bool {
        let mut tables = self.tables.write();
        if !tables.instances.get(&key).is_some_and(|bound| bound.same_instance(current)) {
            return false;
        }
        match previous {
            Some(previous) => {
                tables.instances.insert(key, previous);
                debug!(capability = key.name(), "Instance binding restored");
            },
            None => {
                tables.instances.remove(&key);
                debug!(capability = key.name(), "Instance binding dropped");
            },
        }
        true
    }

    fn remove(&self, key: CapabilityKey) -> bool {
        self.tables.write().instances.remove(&key).is_some()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("Container")
            .field("instances", &tables.instances.len())
            .field("singletons", &tables.singletons.len())
            .field("factories", &tables.factories.len())
            .finish()
    }
}
