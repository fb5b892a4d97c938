//! Uploader abstraction
//!
//! Both backends sit behind [`Uploader`], chosen once from configuration by
//! [`create_uploader`](super::create_uploader).

use crate::config::BackendTarget;
use crate::core::transform::TransformData;
use crate::domain::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One blob plus the placement metadata that travels with it
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub bytes: &'a [u8],
    pub unit_name: &'a str,
    pub transform: &'a TransformData,
}

/// What a backend hands back for a stored blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Content hash or opaque id
    pub reference_id: String,
    /// Download URL, for URL-based backends
    pub location_url: Option<String>,
    /// Backend-specific details such as `component_id` or `entity_path`
    pub backend_metadata: BTreeMap<String, String>,
}

/// Sends interchange blobs to a remote store
///
/// Implementations make exactly one attempt per call. Retrying is left to
/// the caller so every failure stays visible per unit.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Which backend this is
    fn backend(&self) -> BackendTarget;

    /// Cheap reachability check, run before a batch
    ///
    /// # Errors
    ///
    /// Returns the same error classes as [`Uploader::upload`].
    async fn probe(&self) -> Result<()>;

    /// Stores the blob and any records that reference it
    ///
    /// # Errors
    ///
    /// - `Network` for connection failures, timeouts and 5xx responses
    /// - `Auth` for rejected credentials
    /// - `Quota` for size or rate limits
    /// - `BackendProtocol` for any other unusable response
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResult>;
}
