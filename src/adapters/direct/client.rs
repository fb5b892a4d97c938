//! Direct-store uploader
//!
//! A single `POST <base_url>/api/store_glb` with the blob as the body. The
//! server hashes the content and answers with the reference.

use crate::adapters::upload::http::{build_client, response_error, send_error};
use crate::adapters::upload::{UploadRequest, UploadResult, Uploader};
use crate::config::{BackendTarget, DirectStoreConfig};
use crate::domain::{ContentHash, LiftError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::collections::BTreeMap;
use url::Url;

/// Media type of the binary interchange format
pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

const STORE_PATH: &str = "api/store_glb";

/// Uploads to the direct-store microservice
pub struct DirectStoreUploader {
    base_url: Url,
    store_url: Url,
    client: Client,
    /// Precomputed `Basic ...` header value
    authorization: Option<Secret<String>>,
}

impl std::fmt::Debug for DirectStoreUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectStoreUploader")
            .field("store_url", &self.store_url.as_str())
            .field("authenticated", &self.authorization.is_some())
            .finish()
    }
}

impl DirectStoreUploader {
    /// Creates the uploader
    ///
    /// # Errors
    ///
    /// Returns [`LiftError::Configuration`] if the base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: &DirectStoreConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            LiftError::Configuration(format!("Invalid direct.base_url '{}': {e}", config.base_url))
        })?;
        let store_url = Url::parse(&format!(
            "{}/{STORE_PATH}",
            base_url.as_str().trim_end_matches('/')
        ))
        .map_err(|e| LiftError::Configuration(format!("Invalid store endpoint: {e}")))?;

        let authorization = match (&config.username, &config.secret) {
            (Some(user), Some(secret)) if !user.trim().is_empty() => {
                let credentials = format!("{user}:{}", secret.expose_secret().as_str());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(Secret::new(format!("Basic {encoded}")))
            }
            _ => None,
        };

        Ok(Self {
            base_url,
            store_url,
            client: build_client(config.timeout_seconds)?,
            authorization,
        })
    }

    pub fn store_url(&self) -> &Url {
        &self.store_url
    }
}

/// Pulls the reference out of a success body
///
/// JSON bodies carry it as `hash` (or `id`); anything else is taken as the
/// plain-text reference.
fn parse_reference(body: &str) -> Option<String> {
    use serde_json::Value;

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["hash", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar)),
        Ok(value) => scalar(&value),
        Err(_) => {
            let text = body.trim().trim_matches('"').trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

#[async_trait]
impl Uploader for DirectStoreUploader {
    fn backend(&self) -> BackendTarget {
        BackendTarget::Direct
    }

    async fn probe(&self) -> Result<()> {
        let response = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| send_error("direct store probe", e))?;

        // Anything below 500 means the service is up, even a 404 on `/`
        if response.status().is_server_error() {
            return Err(response_error("direct store probe", response).await);
        }

        tracing::debug!(url = %self.base_url, status = %response.status(), "Direct store reachable");
        Ok(())
    }

    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadResult> {
        let local_hash = ContentHash::of(request.bytes);

        let mut url = self.store_url.clone();
        url.query_pairs_mut()
            .append_pair("mesh_name", request.unit_name);

        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, GLB_CONTENT_TYPE)
            .body(request.bytes.to_vec());
        if let Some(ref auth) = self.authorization {
            builder = builder.header(AUTHORIZATION, auth.expose_secret().as_str());
        }

        tracing::debug!(
            unit = %request.unit_name,
            bytes = request.bytes.len(),
            url = %self.store_url,
            "Posting blob to direct store"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| send_error("store_glb", e))?;

        if !response.status().is_success() {
            return Err(response_error("store_glb", response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LiftError::protocol(format!("store_glb: unreadable response: {e}")))?;
        let reference_id = parse_reference(&body)
            .ok_or_else(|| LiftError::protocol("store_glb: response carried no reference"))?;

        if reference_id != local_hash.as_str() {
            tracing::debug!(
                unit = %request.unit_name,
                reference_id = %reference_id,
                local_hash = %local_hash,
                "Server reference differs from local content hash"
            );
        }

        let mut backend_metadata = BTreeMap::new();
        backend_metadata.insert("local_hash".to_string(), local_hash.to_string());
        backend_metadata.insert("size_bytes".to_string(), request.bytes.len().to_string());

        Ok(UploadResult {
            reference_id,
            location_url: None,
            backend_metadata,
        })
    }
}
