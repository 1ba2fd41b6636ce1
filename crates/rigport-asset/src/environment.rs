//! Object dump loading and path-id lookup

use crate::classes::{ClassId, GameObject, UnityClass};
use crate::pptr::PPtr;
use rigport_core::{Result, RigportError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One serialized object: its path id, class name and raw type tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObject {
    pub path_id: i64,
    pub class: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawObject {
    pub fn class_id(&self) -> ClassId {
        ClassId::from_name(&self.class)
    }
}

/// On-disk dump file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectDump {
    #[serde(default)]
    pub objects: Vec<RawObject>,
}

/// All objects of one dump, indexed by path id.
///
/// Objects keep their dump order, which is the order the importer
/// discovers roots in.
#[derive(Debug, Default)]
pub struct AssetEnvironment {
    objects: Vec<RawObject>,
    by_path_id: HashMap<i64, usize>,
}

impl AssetEnvironment {
    /// Build an environment from already-parsed objects
    pub fn new(objects: Vec<RawObject>) -> Result<Self> {
        let mut by_path_id = HashMap::with_capacity(objects.len());
        for (index, obj) in objects.iter().enumerate() {
            if obj.path_id == 0 {
                return Err(RigportError::DumpParse(format!(
                    "object #{} ({}) uses the null path id",
                    index, obj.class
                )));
            }
            if by_path_id.insert(obj.path_id, index).is_some() {
                return Err(RigportError::DumpParse(format!(
                    "duplicate path id {}",
                    obj.path_id
                )));
            }
        }
        log::debug!("Loaded {} objects", objects.len());
        Ok(Self {
            objects,
            by_path_id,
        })
    }

    /// Parse a dump from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let dump: ObjectDump = serde_json::from_str(content)?;
        Self::new(dump.objects)
    }

    /// Load a dump from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let dump: ObjectDump = serde_json::from_str(&content).map_err(|e| {
            RigportError::DumpParse(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Self::new(dump.objects)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in dump order
    pub fn objects(&self) -> impl Iterator<Item = &RawObject> {
        self.objects.iter()
    }

    /// All objects of a class, in dump order
    pub fn objects_of(&self, class: ClassId) -> impl Iterator<Item = &RawObject> {
        self.objects.iter().filter(move |o| o.class_id() == class)
    }

    pub fn get(&self, path_id: i64) -> Option<&RawObject> {
        self.by_path_id.get(&path_id).map(|&i| &self.objects[i])
    }

    /// Read the object at `path_id` as `T`, checking its class
    pub fn read<T: UnityClass>(&self, path_id: i64) -> Result<T> {
        let obj = self
            .get(path_id)
            .ok_or(RigportError::ObjectNotFound(path_id))?;
        Self::decode(obj)
    }

    /// Follow a reference; the null reference is an error
    pub fn deref<T: UnityClass>(&self, pptr: PPtr) -> Result<T> {
        match pptr.get() {
            Some(path_id) => self.read(path_id),
            None => Err(RigportError::ObjectNotFound(0)),
        }
    }

    /// Decode a raw object as `T`, checking its class
    pub fn decode<T: UnityClass>(obj: &RawObject) -> Result<T> {
        let got = obj.class_id();
        if got != T::CLASS {
            return Err(RigportError::UnexpectedClass {
                path_id: obj.path_id,
                expected: T::CLASS.to_string(),
                got: obj.class.clone(),
            });
        }
        serde_json::from_value(obj.data.clone()).map_err(|e| {
            RigportError::DumpParse(format!(
                "{} at path id {}: {}",
                obj.class, obj.path_id, e
            ))
        })
    }

    /// Components of a GameObject that belong to `class`, in component order.
    /// Dangling component references are skipped.
    pub fn components_of<'a>(
        &'a self,
        game_object: &'a GameObject,
        class: ClassId,
    ) -> impl Iterator<Item = &'a RawObject> + 'a {
        game_object
            .components
            .iter()
            .filter_map(move |c| c.component.get().and_then(|id| self.get(id)))
            .filter(move |o| o.class_id() == class)
    }

    /// Whether a GameObject carries a component of `class`
    pub fn has_component(&self, game_object: &GameObject, class: ClassId) -> bool {
        self.components_of(game_object, class).next().is_some()
    }
}
