use std::borrow::Cow;

/// Error types specific to the health feature.
#[automata_derive::automata_error]
pub enum HealthError {
    /// A probe was called before the service was initialized.
    #[error("Health service not initialized{}: {message}", format_context(.context))]
    NotInitialized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host did not report a metric.
    #[error("Probe failed{}: {message}", format_context(.context))]
    Probe { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Serde serialization error{}: {source}", format_context(.context))]
    Serialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal health error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
