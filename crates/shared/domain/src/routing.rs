use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Cross-cutting behaviors wrapped around an exposed operation.
    ///
    /// Composition order is fixed regardless of flag order: logging innermost,
    /// then the initialization guard, with error catching outermost.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RouteGuards: u8 {
        /// Debug-log each call and its outcome.
        const LOG = 1 << 0;
        /// Answer `SERVICE_NOT_INITIALIZED` while the backing service is not ready.
        const REQUIRE_INIT = 1 << 1;
        /// Convert handler errors and panics into an `UNEXPECTED_ERROR` envelope.
        const CATCH = 1 << 2;

        const STANDARD = Self::LOG.bits() | Self::CATCH.bits();
        const ALL = Self::STANDARD.bits() | Self::REQUIRE_INIT.bits();
    }
}

impl Default for RouteGuards {
    fn default() -> Self {
        Self::STANDARD
    }
}
