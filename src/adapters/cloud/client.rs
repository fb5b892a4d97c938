//! Cloud uploader: object store plus document tree
//!
//! Three writes per unit, none of them transactional:
//! 1. the blob to `glbs/{sha256}.glb` in the bucket,
//! 2. a component record pointing at the blob's download URL,
//! 3. an entity record carrying the transform and the component id.
//!
//! A failure after step 1 leaves the blob unreferenced. It is content
//! addressed, so a later upload of the same bytes reuses it.

use super::models::{sanitize_key, ComponentRecord, EntityRecord};
use crate::adapters::direct::GLB_CONTENT_TYPE;
use crate::adapters::upload::http::{build_client, response_error, send_error};
use crate::adapters::upload::{UploadRequest, UploadResult, Uploader};
use crate::config::{BackendTarget, CloudConfig, SecretString};
use crate::domain::ids::generate_entity_uuid;
use crate::domain::{ComponentId, ContentHash, LiftError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Uploads to the object store and writes records into the document tree
pub struct CloudUploader {
    client: Client,
    storage_base: Url,
    database_base: Url,
    bucket: String,
    space_id: String,
    api_key: SecretString,
}

impl std::fmt::Debug for CloudUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudUploader")
            .field("storage_base", &self.storage_base.as_str())
            .field("database_base", &self.database_base.as_str())
            .field("bucket", &self.bucket)
            .field("space_id", &self.space_id)
            .finish_non_exhaustive()
    }
}

fn parse_base(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| LiftError::Configuration(format!("Invalid {field} '{value}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(LiftError::Configuration(format!(
            "{field} cannot be used as a base URL: {value}"
        )));
    }
    Ok(url)
}

/// Appends path segments, percent-encoding each one (including `/`)
fn with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}

impl CloudUploader {
    /// Creates the uploader
    ///
    /// # Errors
    ///
    /// Returns [`LiftError::Configuration`] when a URL is unusable, the api key
    /// or space id is blank, or the HTTP client cannot be built.
    pub fn new(config: &CloudConfig) -> Result<Self> {
        if config.api_key.expose_secret().is_blank() {
            return Err(LiftError::Configuration(
                "cloud.api_key is required".to_string(),
            ));
        }
        if config.space_id.trim().is_empty() {
            return Err(LiftError::Configuration(
                "cloud.space_id is required".to_string(),
            ));
        }

        Ok(Self {
            client: build_client(config.timeout_seconds)?,
            storage_base: parse_base("cloud.storage_base_url", &config.storage_base_url)?,
            database_base: parse_base("cloud.database_url", &config.database_url)?,
            bucket: config.storage_bucket.clone(),
            space_id: config.space_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn key(&self) -> &str {
        self.api_key.expose_secret().as_str()
    }

    /// `{storage}/v0/b/{bucket}/o/{path}` with the path as one encoded segment
    fn object_url(&self, storage_path: &str) -> Url {
        with_segments(
            &self.storage_base,
            &["v0", "b", &self.bucket, "o", storage_path],
        )
    }

    /// Public download URL of a stored object
    pub fn download_url(&self, storage_path: &str) -> String {
        let mut url = self.object_url(storage_path);
        url.query_pairs_mut().append_pair("alt", "media");
        url.into()
    }

    /// Document path relative to the tree root, without the `.json` suffix
    fn document_path(&self, collection: &str, key: &str) -> String {
        format!("space/{}/{collection}/{key}", self.space_id)
    }

    fn document_url(&self, collection: &str, key: &str) -> Url {
        let leaf = format!("{key}.json");
        let mut url = with_segments(
            &self.database_base,
            &["space", &self.space_id, collection, &leaf],
        );
        url.query_pairs_mut().append_pair("auth", self.key());
        url
    }

    async fn put_object(&self, storage_path: &str, bytes: &[u8]) -> Result<()> {
        let mut url = self.object_url(storage_path);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("key", self.key());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, GLB_CONTENT_TYPE)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| send_error("storage upload", e))?;

        if !response.status().is_success() {
            return Err(response_error("storage upload", response).await);
        }
        Ok(())
    }

    async fn put_document<T: Serialize + ?Sized>(
        &self,
        context: &str,
        collection: &str,
        key: &str,
        record: &T,
    ) -> Result<()> {
        let response = self
            .client
            .put(self.document_url(collection, key))
            .json(record)
            .send()
            .await
            .map_err(|e| send_error(context, e))?;

        if !response.status().is_success() {
            return Err(response_error(context, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl Uploader for CloudUploader {
    fn backend(&self) -> BackendTarget {
        BackendTarget::Cloud
    }

    async fn probe(&self) -> Result<()> {
        let mut url = with_segments(&self.database_base, &[".json"]);
        url.query_pairs_mut()
            .append_pair("auth", self.key())
            .append_pair("shallow", "true");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error("database probe", e))?;

        if !response.status().is_success() {
            return Err(response_error("database probe", response).await);
        }

        tracing::debug!(database = %self.database_base, "Cloud database reachable");
        Ok(())
    }

    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResult> {
        let hash = ContentHash::of(request.bytes);
        let storage_path = hash.storage_path();

        tracing::debug!(
            unit = %request.unit_name,
            bytes = request.bytes.len(),
            storage_path = %storage_path,
            "Uploading blob to object store"
        );
        self.put_object(&storage_path, request.bytes).await?;
        let download_url = self.download_url(&storage_path);

        let component_id = ComponentId::generate();
        let component_path = self.document_path("components", component_id.as_str());
        if let Err(e) = self
            .put_document(
                "component write",
                "components",
                component_id.as_str(),
                &ComponentRecord::new(&component_id, &download_url),
            )
            .await
        {
            tracing::warn!(
                unit = %request.unit_name,
                storage_path = %storage_path,
                error = %e,
                "Blob stored but component record failed; blob is unreferenced"
            );
            return Err(e);
        }

        let entity_key = sanitize_key(request.unit_name);
        let entity_path = self.document_path("Scene", &entity_key);
        let uuid = generate_entity_uuid();
        if let Err(e) = self
            .put_document(
                "entity write",
                "Scene",
                &entity_key,
                &EntityRecord::new(&component_id, request.transform, uuid),
            )
            .await
        {
            tracing::warn!(
                unit = %request.unit_name,
                storage_path = %storage_path,
                component_path = %component_path,
                error = %e,
                "Blob and component stored but entity record failed"
            );
            return Err(e);
        }

        tracing::info!(
            unit = %request.unit_name,
            entity_path = %entity_path,
            component_id = %component_id,
            "Cloud records written"
        );

        let mut backend_metadata = BTreeMap::new();
        backend_metadata.insert("storage_path".to_string(), storage_path);
        backend_metadata.insert("component_id".to_string(), component_id.to_string());
        backend_metadata.insert("component_path".to_string(), component_path);
        backend_metadata.insert("entity_path".to_string(), entity_path);
        backend_metadata.insert("uuid".to_string(), uuid.to_string());

        Ok(UploadResult {
            reference_id: hash.to_string(),
            location_url: Some(download_url),
            backend_metadata,
        })
    }
}
