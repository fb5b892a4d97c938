//! Domain identifier types with validation
//!
//! Newtype wrappers for scene object references, remote component ids and
//! content hashes. Each type keeps the different id spaces from being mixed up.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Upper bound (exclusive) for the random part of a component id
const COMPONENT_ID_RANGE: u64 = 1_000_000_000;

/// Upper bound (exclusive) for entity uuids
const ENTITY_UUID_RANGE: u64 = 10_000_000_000;

/// Reference to an object inside a host scene snapshot
///
/// # Examples
///
/// ```
/// use assetlift::domain::ids::ObjectId;
/// use std::str::FromStr;
///
/// let id = ObjectId::from_str("Cube").unwrap();
/// assert_eq!(id.as_str(), "Cube");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new ObjectId, rejecting blank ids
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Object ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the object ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a component record in the cloud document tree
///
/// Always formatted as `GLTF_<decimal>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Generates a component id from a cryptographically random non-negative integer
    pub fn generate() -> Self {
        let n: u64 = OsRng.gen_range(0..COMPONENT_ID_RANGE);
        Self(format!("GLTF_{n}"))
    }

    /// Returns the component ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ComponentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("GLTF_")
            .ok_or_else(|| format!("Component ID must start with 'GLTF_': {s}"))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Component ID must end in decimal digits: {s}"));
        }
        Ok(Self(s.to_string()))
    }
}

/// Generates a random entity uuid for the scene document tree
pub fn generate_entity_uuid() -> u64 {
    OsRng.gen_range(0..ENTITY_UUID_RANGE)
}

/// Lowercase hex SHA-256 digest of an asset blob
///
/// # Examples
///
/// ```
/// use assetlift::domain::ids::ContentHash;
///
/// let hash = ContentHash::of(b"glTF");
/// assert_eq!(hash.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    /// Computes the hash of the given bytes
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Returns the hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object-store path the blob lives at
    pub fn storage_path(&self) -> String {
        format!("glbs/{}.glb", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
