//! Direct-store backend: one HTTP POST, server-computed content hash

pub mod client;

pub use client::{DirectStoreUploader, GLB_CONTENT_TYPE};
