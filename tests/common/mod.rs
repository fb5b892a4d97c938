//! Shared fixtures for integration tests

#![allow(dead_code)]

use assetlift::core::export::{Encoder, EncoderParams};
use assetlift::domain::{ObjectId, Scene, SceneObject};
use std::path::PathBuf;
use std::sync::Mutex;

/// Encoder double that writes deterministic GLB-shaped bytes
///
/// Every output path it was given is recorded so tests can check that the
/// scratch file is gone after the export.
#[derive(Default)]
pub struct ScriptedEncoder {
    pub outputs: Mutex<Vec<PathBuf>>,
    pub fail_with: Option<String>,
}

impl ScriptedEncoder {
    pub fn failing(message: &str) -> Self {
        Self {
            outputs: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

impl Encoder for ScriptedEncoder {
    fn encode(&self, objects: &[&SceneObject], params: &EncoderParams) -> Result<(), String> {
        if let Some(ref message) = self.fail_with {
            return Err(message.clone());
        }

        let path = PathBuf::from(
            params
                .get("filepath")
                .and_then(|v| v.as_str())
                .ok_or_else(|| "filepath parameter missing".to_string())?,
        );
        self.outputs.lock().unwrap().push(path.clone());

        let mut body = b"glTF".to_vec();
        body.extend_from_slice(&2u32.to_le_bytes());
        for obj in objects {
            body.extend_from_slice(obj.name.as_bytes());
            body.extend_from_slice(&obj.face_count.to_le_bytes());
        }
        std::fs::write(&path, body).map_err(|e| e.to_string())
    }
}

pub fn id(name: &str) -> ObjectId {
    ObjectId::new(name).unwrap()
}

pub fn ids(names: &[&str]) -> Vec<ObjectId> {
    names.iter().map(|n| id(n)).collect()
}

/// Two loose props plus a three-level rig
pub fn workshop_scene() -> Scene {
    Scene::from_objects([
        SceneObject::mesh("Chair", 300, 500).unwrap().in_collection("Furniture"),
        SceneObject::mesh("Table", 200, 400).unwrap().in_collection("Furniture"),
        SceneObject::mesh("Robot", 100, 120).unwrap(),
        SceneObject::mesh("Arm", 50, 60).unwrap().with_parent(id("Robot")),
        SceneObject::mesh("Claw", 20, 30).unwrap().with_parent(id("Arm")),
    ])
    .unwrap()
}
