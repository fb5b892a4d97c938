//! Host scene snapshot
//!
//! The host editor builds a [`Scene`] from its own object model before a batch
//! runs. The pipeline only ever reads it, so nothing downstream can mutate the
//! persistent document.

use super::ids::ObjectId;
use super::{LiftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Column-major 4x4 world matrix (`m[column][row]`)
pub type Matrix4 = [[f64; 4]; 4];

/// Identity world matrix
pub const IDENTITY: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Kind of scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Empty,
    Camera,
    Light,
    Armature,
    Other,
}

/// Where a texture's pixels come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextureSource {
    /// Embedded in the document
    Packed,
    /// External file; `exists` is resolved by the host when it builds the snapshot
    External { path: String, exists: bool },
    /// The image reference is broken
    Unresolved,
}

/// Image texture referenced by a material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    pub name: String,
    pub source: TextureSource,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl TextureRef {
    /// Whether the encoder will be unable to read this texture
    pub fn is_missing(&self) -> bool {
        match &self.source {
            TextureSource::Packed => false,
            TextureSource::External { exists, .. } => !exists,
            TextureSource::Unresolved => true,
        }
    }

    /// Larger of the two dimensions, 0 when unknown
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Material slot on a mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub textures: Vec<TextureRef>,
}

/// Modifier stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// One object in the host scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub parent: Option<ObjectId>,
    /// Names of the collections the object is linked into
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub vertex_count: u64,
    #[serde(default)]
    pub face_count: u64,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub world_matrix: Matrix4,
}

impl SceneObject {
    /// Creates an object with an identity transform and no geometry
    pub fn new(id: ObjectId, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parent: None,
            collections: Vec::new(),
            vertex_count: 0,
            face_count: 0,
            materials: Vec::new(),
            modifiers: Vec::new(),
            world_matrix: IDENTITY,
        }
    }

    /// Creates a mesh object whose id equals its name
    pub fn mesh(name: &str, vertex_count: u64, face_count: u64) -> Result<Self> {
        let id = ObjectId::new(name).map_err(LiftError::SceneGraph)?;
        let mut obj = Self::new(id, name, ObjectKind::Mesh);
        obj.vertex_count = vertex_count;
        obj.face_count = face_count;
        Ok(obj)
    }

    /// Sets the parent object
    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Links the object into a collection
    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collections.push(collection.into());
        self
    }

    /// Adds a material slot
    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    /// Adds a modifier
    pub fn with_modifier(mut self, name: impl Into<String>, visible: bool) -> Self {
        self.modifiers.push(Modifier {
            name: name.into(),
            visible,
        });
        self
    }

    /// Sets the world matrix
    pub fn with_world_matrix(mut self, matrix: Matrix4) -> Self {
        self.world_matrix = matrix;
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }

    /// Visible modifiers, which the encoder applies when modifiers are enabled
    pub fn has_visible_modifiers(&self) -> bool {
        self.modifiers.iter().any(|m| m.visible)
    }
}

/// Read-only snapshot of the host scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    /// Insertion order, so units come out in the order the host listed objects
    order: Vec<ObjectId>,
}

impl Scene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scene from objects, rejecting duplicate ids
    pub fn from_objects(objects: impl IntoIterator<Item = SceneObject>) -> Result<Self> {
        let mut scene = Self::new();
        for obj in objects {
            scene.insert(obj)?;
        }
        Ok(scene)
    }

    /// Adds an object
    pub fn insert(&mut self, obj: SceneObject) -> Result<()> {
        if self.objects.contains_key(&obj.id) {
            return Err(LiftError::SceneGraph(format!(
                "Duplicate object id: {}",
                obj.id
            )));
        }
        self.order.push(obj.id.clone());
        self.objects.insert(obj.id.clone(), obj);
        Ok(())
    }

    /// Looks up an object
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Looks up an object, treating a dangling reference as a scene graph error
    pub fn resolve(&self, id: &ObjectId) -> Result<&SceneObject> {
        self.get(id)
            .ok_or_else(|| LiftError::SceneGraph(format!("Unknown object: {id}")))
    }

    /// Objects in insertion order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Direct children of an object, in insertion order
    pub fn children_of(&self, id: &ObjectId) -> Vec<&SceneObject> {
        self.objects()
            .filter(|obj| obj.parent.as_ref() == Some(id))
            .collect()
    }

    /// All descendants of an object, depth first
    pub fn descendants_of(&self, id: &ObjectId) -> Result<Vec<&SceneObject>> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id.clone());
        self.collect_descendants(id, &mut visited, &mut out)?;
        Ok(out)
    }

    fn collect_descendants<'a>(
        &'a self,
        id: &ObjectId,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<&'a SceneObject>,
    ) -> Result<()> {
        for child in self.children_of(id) {
            if !visited.insert(child.id.clone()) {
                return Err(LiftError::SceneGraph(format!(
                    "Cycle in parent graph at {}",
                    child.id
                )));
            }
            out.push(child);
            self.collect_descendants(&child.id, visited, out)?;
        }
        Ok(())
    }

    /// Ancestor chain from the direct parent upwards
    ///
    /// # Errors
    ///
    /// Returns `SceneGraph` on a dangling parent reference or a cycle.
    pub fn ancestors_of(&self, id: &ObjectId) -> Result<Vec<ObjectId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id.clone());

        let mut current = self.resolve(id)?.parent.clone();
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                return Err(LiftError::SceneGraph(format!(
                    "Cycle in parent graph at {parent}"
                )));
            }
            current = self.resolve(&parent)?.parent.clone();
            chain.push(parent);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    fn rig() -> Scene {
        Scene::from_objects([
            SceneObject::mesh("Body", 10, 8).unwrap(),
            SceneObject::mesh("Arm", 10, 8).unwrap().with_parent(id("Body")),
            SceneObject::mesh("Hand", 10, 8).unwrap().with_parent(id("Arm")),
            SceneObject::mesh("Prop", 10, 8).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Scene::from_objects([
            SceneObject::mesh("Cube", 8, 6).unwrap(),
            SceneObject::mesh("Cube", 8, 6).unwrap(),
        ]);
        assert!(matches!(result, Err(LiftError::SceneGraph(_))));
    }

    #[test]
    fn test_descendants_depth_first() {
        let scene = rig();
        let names: Vec<_> = scene
            .descendants_of(&id("Body"))
            .unwrap()
            .iter()
            .map(|o| o.name.clone())
            .collect();
        assert_eq!(names, vec!["Arm", "Hand"]);
    }

    #[test]
    fn test_ancestors_chain() {
        let scene = rig();
        assert_eq!(
            scene.ancestors_of(&id("Hand")).unwrap(),
            vec![id("Arm"), id("Body")]
        );
        assert!(scene.ancestors_of(&id("Prop")).unwrap().is_empty());
    }

    #[test]
    fn test_parent_cycle_detected() {
        let scene = Scene::from_objects([
            SceneObject::mesh("A", 1, 1).unwrap().with_parent(id("B")),
            SceneObject::mesh("B", 1, 1).unwrap().with_parent(id("A")),
        ])
        .unwrap();
        assert!(matches!(
            scene.ancestors_of(&id("A")),
            Err(LiftError::SceneGraph(_))
        ));
    }

    #[test]
    fn test_dangling_parent_detected() {
        let scene =
            Scene::from_objects([SceneObject::mesh("A", 1, 1).unwrap().with_parent(id("Ghost"))])
                .unwrap();
        assert!(scene.ancestors_of(&id("A")).is_err());
    }

    #[test]
    fn test_texture_missing() {
        let packed = TextureRef {
            name: "albedo".into(),
            source: TextureSource::Packed,
            width: 512,
            height: 256,
        };
        let gone = TextureRef {
            name: "normal".into(),
            source: TextureSource::External {
                path: "//textures/normal.png".into(),
                exists: false,
            },
            width: 0,
            height: 0,
        };
        assert!(!packed.is_missing());
        assert_eq!(packed.max_dimension(), 512);
        assert!(gone.is_missing());
    }
}
