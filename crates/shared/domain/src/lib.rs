//! # Domain Models
//!
//! Pure data shared by the kernel, the feature crates and the desktop shell.
//! No I/O and no wiring logic here: settings, naming constants, the response
//! envelope, route guard flags and the status report shapes.

pub mod config;
pub mod constants;
pub mod response;
pub mod routing;
pub mod status;
