//! The contract every discoverable service satisfies.

use crate::di::capability::{CapabilityKey, CapabilitySet, ErasedInstance};
use crate::error::ServiceError;
use automata_domain::constants::{EMPTY_INPUT_ERROR, SERVICE_SUFFIX, invalid_type_error};
use downcast_rs::{DowncastSync, impl_downcast};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Base service contract consumed by discovery.
pub trait Service: DowncastSync + ServiceMirror {
    /// Feature this service belongs to.
    fn feature_name(&self) -> &str;

    fn is_initialized(&self) -> bool;

    /// Brings the service up. Called exactly once by discovery before registration.
    ///
    /// # Errors
    /// Any error aborts registration of the whole feature.
    fn initialize(&mut self) -> Result<(), ServiceError>;
}
impl_downcast!(sync Service);

/// Construction and capability declaration for a service type.
pub trait ServiceDefinition: Service + Sized {
    /// Builds an uninitialized instance.
    ///
    /// # Errors
    /// Returns an error if the service cannot be constructed at all.
    fn create() -> Result<Self, ServiceError>;

    /// Declares the capabilities this type provides.
    fn capabilities(_set: &mut CapabilitySet<Self>) {}
}

/// Registry name of a service type. Generated by `#[service("name")]`.
pub trait ServiceMarker {
    const SERVICE_NAME: &'static str;
}

/// Re-erases a shared service under its own concrete type, so an
/// `Arc<dyn Service>` can be mirrored into the container.
pub trait ServiceMirror {
    fn mirror(self: Arc<Self>) -> ErasedInstance;

    fn concrete_key(&self) -> CapabilityKey;
}

impl<T: Service> ServiceMirror for T {
    fn mirror(self: Arc<Self>) -> ErasedInstance {
        ErasedInstance::new::<T>(self)
    }

    fn concrete_key(&self) -> CapabilityKey {
        CapabilityKey::of::<T>()
    }
}

/// Feature name plus initialized flag, embedded by concrete services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceState {
    feature_name: String,
    initialized: bool,
}

impl ServiceState {
    pub fn new(feature_name: impl Into<String>) -> Self {
        Self { feature_name: feature_name.into(), initialized: false }
    }

    /// Derives the feature name from the type name: `HealthService` becomes `health`.
    #[must_use]
    pub fn for_type<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let short = full.split('<').next().unwrap_or(full);
        let short = short.rsplit("::").next().unwrap_or(short);
        let stem = short.strip_suffix(SERVICE_SUFFIX).unwrap_or(short);
        Self::new(stem.to_lowercase())
    }

    #[must_use]
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs `setup` and marks the state initialized if it succeeds.
    ///
    /// # Errors
    /// Propagates the error from `setup`; the state stays uninitialized.
    pub fn initialize_with(
        &mut self,
        setup: impl FnOnce() -> Result<(), ServiceError>,
    ) -> Result<(), ServiceError> {
        match setup() {
            Ok(()) => {
                self.initialized = true;
                info!(service = %self.feature_name, "Service initialized");
                Ok(())
            },
            Err(e) => {
                error!(service = %self.feature_name, error = %e, "Service initialization failed");
                Err(e)
            },
        }
    }

    /// Checks an operation argument and converts it into `T`.
    ///
    /// Empty values (`null`, `""`, `0`, `false`, `[]`, `{}`) are rejected unless
    /// `allow_empty` is set.
    ///
    /// # Errors
    /// Returns the user-facing message for an empty or mistyped value.
    pub fn validate_input<T: DeserializeOwned>(value: &Value, allow_empty: bool) -> Result<T, String> {
        if !allow_empty && is_empty(value) {
            return Err(EMPTY_INPUT_ERROR.to_owned());
        }
        serde_json::from_value(value.clone()).map_err(|_| {
            let full = std::any::type_name::<T>();
            invalid_type_error(full.rsplit("::").next().unwrap_or(full))
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Default implementation of the contract. Detectors never treat it as a service.
#[derive(Debug)]
pub struct BaseService {
    state: ServiceState,
}

impl Default for BaseService {
    fn default() -> Self {
        Self { state: ServiceState::for_type::<Self>() }
    }
}

impl Service for BaseService {
    fn feature_name(&self) -> &str {
        self.state.feature_name()
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn initialize(&mut self) -> Result<(), ServiceError> {
        self.state.initialize_with(|| Ok(()))
    }
}

impl ServiceDefinition for BaseService {
    fn create() -> Result<Self, ServiceError> {
        Ok(Self::default())
    }
}

impl ServiceMarker for BaseService {
    const SERVICE_NAME: &'static str = "base";
}
