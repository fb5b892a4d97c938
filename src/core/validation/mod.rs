//! Pre-flight validation against platform limits
//!
//! Cheap checks run before any encoding so oversized or broken units are
//! rejected without touching the host encoder or the network.

pub mod report;
pub mod validator;

pub use report::{format_size, ValidationLimits, ValidationReport};
pub use validator::validate;
