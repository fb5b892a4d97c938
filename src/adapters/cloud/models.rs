//! Document-tree record shapes for the cloud backend

use crate::config::FORBIDDEN_KEY_CHARS;
use crate::core::transform::{Quat, TransformData, Vec3};
use crate::domain::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `space/{space_id}/components/{component_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    /// Download URL of the stored blob
    pub url: String,
}

impl ComponentRecord {
    pub fn new(id: &ComponentId, url: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            url: url.into(),
        }
    }
}

/// `space/{space_id}/Scene/{entity}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "__meta")]
    pub meta: EntityMeta,
}

/// Placeable entity metadata
///
/// World transform is written to both the local and world fields; the entity
/// is created at the scene root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    pub active: bool,
    pub components: BTreeMap<String, bool>,
    pub layer: u32,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub uuid: u64,
}

impl EntityRecord {
    pub fn new(component_id: &ComponentId, transform: &TransformData, uuid: u64) -> Self {
        let mut components = BTreeMap::new();
        components.insert(component_id.to_string(), true);
        Self {
            meta: EntityMeta {
                active: true,
                components,
                layer: 0,
                local_position: transform.position,
                local_rotation: transform.rotation,
                local_scale: transform.scale,
                position: transform.position,
                rotation: transform.rotation,
                uuid,
            },
        }
    }
}

/// Replaces characters the document tree does not allow in a key
pub fn sanitize_key(name: &str) -> String {
    let key: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_KEY_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if key.trim().is_empty() {
        "_".to_string()
    } else {
        key
    }
}
