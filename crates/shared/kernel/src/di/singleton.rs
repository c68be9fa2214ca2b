use crate::error::KernelError;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type Factory = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

struct Slot {
    factory: Factory,
    instance: Option<Arc<dyn Any + Send + Sync>>,
}

/// Named, lazily constructed, resettable instances.
///
/// Each name owns a slot behind its own mutex: concurrent first calls for one
/// name construct exactly once, while the name table itself is never locked
/// during construction. A factory may therefore fetch other names.
#[derive(Default)]
pub struct SingletonRegistry {
    slots: RwLock<FxHashMap<Cow<'static, str>, Arc<Mutex<Slot>>>>,
}

impl SingletonRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `name` with a lazy constructor.
    ///
    /// Overwriting an existing name swaps the factory but keeps any cached
    /// instance until [`reset_instance`](Self::reset_instance).
    pub fn register_factory<T, F>(&self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: Factory = Arc::new(move || factory() as Arc<dyn Any + Send + Sync>);

        let existing = self.slots.read().get(&name).cloned();
        match existing {
            Some(slot) => slot.lock().factory = factory,
            None => {
                self.slots
                    .write()
                    .entry(name.clone())
                    .and_modify(|slot| slot.lock().factory = Arc::clone(&factory))
                    .or_insert_with(|| {
                        Arc::new(Mutex::new(Slot { factory: Arc::clone(&factory), instance: None }))
                    });
            },
        }
        debug!(singleton = %name, "Singleton factory registered");
    }

    /// Returns the cached instance for `name`, constructing it on first use.
    ///
    /// # Errors
    /// * [`KernelError::FactoryNotRegistered`] if `name` was never registered.
    /// * [`KernelError::TypeMismatch`] if the instance is not a `T`.
    pub fn get_instance<T>(&self, name: &str) -> Result<Arc<T>, KernelError>
    where
        T: Send + Sync + 'static,
    {
        let slot = self.slot(name)?;
        let instance = {
            let mut slot = slot.lock();
            match &slot.instance {
                Some(instance) => Arc::clone(instance),
                None => {
                    let instance = (slot.factory)();
                    slot.instance = Some(Arc::clone(&instance));
                    debug!(singleton = %name, "Singleton constructed");
                    instance
                },
            }
        };

        instance.downcast::<T>().map_err(|_| KernelError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some(format!("singleton '{name}'").into()),
        })
    }

    /// Drops the cached instance for `name`; the factory stays registered.
    /// Unknown names are ignored.
    pub fn reset_instance(&self, name: &str) {
        let slot = self.slots.read().get(name).cloned();
        if let Some(slot) = slot {
            slot.lock().instance = None;
            debug!(singleton = %name, "Singleton reset");
        }
    }

    /// Drops every cached instance.
    pub fn reset_all(&self) {
        let slots: Vec<_> = self.slots.read().values().cloned().collect();
        for slot in slots {
            slot.lock().instance = None;
        }
        debug!("All singletons reset");
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    /// Whether `name` currently holds a constructed instance.
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        let slot = self.slots.read().get(name).cloned();
        slot.is_some_and(|slot| slot.lock().instance.is_some())
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.read().keys().map(ToString::to_string).collect();
        names.sort_unstable();
        names
    }

    fn slot(&self, name: &str) -> Result<Arc<Mutex<Slot>>, KernelError> {
        self.slots.read().get(name).cloned().ok_or_else(|| KernelError::FactoryNotRegistered {
            message: format!("Singleton factory '{name}' not registered").into(),
            context: None,
        })
    }
}

impl fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonRegistry").field("names", &self.names()).finish()
    }
}
