//! Upload abstraction layer
//!
//! - [`traits`] - the [`Uploader`] capability and its request/result types
//! - [`factory`] - backend selection from configuration
//! - `http` - shared client construction and status mapping

pub mod factory;
pub(crate) mod http;
pub mod traits;

pub use factory::create_uploader;
pub use traits::{UploadRequest, UploadResult, Uploader};
