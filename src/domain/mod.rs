//! Domain models and types for assetlift.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ObjectId`], [`ComponentId`], [`ContentHash`])
//! - **Scene snapshot** ([`Scene`], [`SceneObject`]) built by the host editor
//! - **Error types** ([`LiftError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Scene snapshots
//!
//! ```rust
//! use assetlift::domain::{Scene, SceneObject};
//!
//! # fn example() -> assetlift::domain::Result<()> {
//! let scene = Scene::from_objects([
//!     SceneObject::mesh("Crate", 24, 12)?.in_collection("Props"),
//! ])?;
//! assert_eq!(scene.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod scene;

// Re-export commonly used types for convenience
pub use errors::{ErrorKind, LiftError};
pub use ids::{ComponentId, ContentHash, ObjectId};
pub use result::Result;
pub use scene::{
    Material, Matrix4, Modifier, ObjectKind, Scene, SceneObject, TextureRef, TextureSource,
    IDENTITY,
};
