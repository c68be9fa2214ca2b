use std::borrow::Cow;

/// Failures of the wiring core.
#[automata_derive::automata_error]
pub enum KernelError {
    /// Resolving a capability or type the container does not know.
    #[error("Not registered{}: {message}", format_context(.context))]
    NotRegistered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Asking the singleton registry for a name without a factory.
    #[error("Singleton factory not registered{}: {message}", format_context(.context))]
    FactoryNotRegistered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A stored instance is not of the requested type.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A service could not be created or its `initialize` failed.
    #[error("Service initialization failed{}: {source}", format_context(.context))]
    Initialization { source: ServiceError, context: Option<Cow<'static, str>> },

    /// A name or capability could not be stored.
    #[error("Registration failed{}: {message}", format_context(.context))]
    Registration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An endpoint could not obtain a collaborator.
    #[error("Injection failed{}: {message}", format_context(.context))]
    Injection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[cfg(not(target_arch = "wasm32"))]
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal kernel error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Error type returned by service implementations from `create` and `initialize`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service refused to come up.
    #[error("{service}: {message}")]
    Failed { service: Cow<'static, str>, message: Cow<'static, str> },

    /// A resource the service needs is missing.
    #[error("{service}: missing {resource}")]
    Unavailable { service: Cow<'static, str>, resource: Cow<'static, str> },
}

impl ServiceError {
    pub fn failed(service: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Failed { service: service.into(), message: message.into() }
    }

    pub fn unavailable(
        service: impl Into<Cow<'static, str>>,
        resource: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Unavailable { service: service.into(), resource: resource.into() }
    }

    /// Name of the service that failed.
    #[must_use]
    pub fn service(&self) -> &str {
        match self {
            Self::Failed { service, .. } | Self::Unavailable { service, .. } => service,
        }
    }
}

impl KernelError {
    pub(crate) fn not_registered(what: impl Into<Cow<'static, str>>) -> Self {
        Self::NotRegistered { message: what.into(), context: None }
    }

    pub(crate) fn type_mismatch(expected: &'static str) -> Self {
        Self::TypeMismatch { message: Cow::Borrowed(expected), context: None }
    }

    pub(crate) fn registration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Registration { message: message.into(), context: None }
    }

    pub(crate) fn injection(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Injection { message: message.into(), context: None }
    }
}
