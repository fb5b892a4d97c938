//! Cloud backend: content-addressed object store plus a document tree of
//! component and entity records under a space namespace

pub mod client;
pub mod models;

pub use client::CloudUploader;
pub use models::{sanitize_key, ComponentRecord, EntityMeta, EntityRecord};
