//! Typed views over the engine classes the importer reads

use crate::pptr::PPtr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine classes recognised in an object dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassId {
    GameObject,
    Transform,
    MonoBehaviour,
    MonoScript,
    SkinnedMeshRenderer,
    MeshRenderer,
    MeshFilter,
    Mesh,
    AnimationClip,
    Other,
}

impl ClassId {
    /// Classify a dump's class name; anything unrecognised is `Other`
    pub fn from_name(name: &str) -> Self {
        match name {
            "GameObject" => ClassId::GameObject,
            "Transform" | "RectTransform" => ClassId::Transform,
            "MonoBehaviour" => ClassId::MonoBehaviour,
            "MonoScript" => ClassId::MonoScript,
            "SkinnedMeshRenderer" => ClassId::SkinnedMeshRenderer,
            "MeshRenderer" => ClassId::MeshRenderer,
            "MeshFilter" => ClassId::MeshFilter,
            "Mesh" => ClassId::Mesh,
            "AnimationClip" => ClassId::AnimationClip,
            _ => ClassId::Other,
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A type that can be read out of a dump object of a given class
pub trait UnityClass: serde::de::DeserializeOwned {
    const CLASS: ClassId;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3f {
    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternionf {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternionf {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl Quaternionf {
    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

fn default_scale() -> Vector3f {
    Vector3f {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    }
}

/// One entry of a GameObject's component list
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentPair {
    pub component: PPtr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    #[serde(rename = "m_Name")]
    pub name: String,
    #[serde(rename = "m_Component", default)]
    pub components: Vec<ComponentPair>,
}

impl UnityClass for GameObject {
    const CLASS: ClassId = ClassId::GameObject;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    #[serde(rename = "m_GameObject")]
    pub game_object: PPtr,
    #[serde(rename = "m_LocalPosition", default)]
    pub local_position: Vector3f,
    #[serde(rename = "m_LocalRotation", default)]
    pub local_rotation: Quaternionf,
    #[serde(rename = "m_LocalScale", default = "default_scale")]
    pub local_scale: Vector3f,
    #[serde(rename = "m_Children", default)]
    pub children: Vec<PPtr>,
    #[serde(rename = "m_Father", default)]
    pub father: PPtr,
}

impl Transform {
    pub fn local_transform(&self) -> rigport_core::Transform {
        rigport_core::Transform::new(
            self.local_position.to_array(),
            self.local_rotation.to_array(),
            self.local_scale.to_array(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.father.is_null()
    }
}

impl UnityClass for Transform {
    const CLASS: ClassId = ClassId::Transform;
}

/// A script component. Script-defined fields are kept as an untyped dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonoBehaviour {
    #[serde(rename = "m_GameObject", default)]
    pub game_object: PPtr,
    #[serde(rename = "m_Script", default)]
    pub script: PPtr,
    #[serde(rename = "m_Name", default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl UnityClass for MonoBehaviour {
    const CLASS: ClassId = ClassId::MonoBehaviour;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonoScript {
    #[serde(rename = "m_Name", default)]
    pub name: String,
    #[serde(rename = "m_ClassName", default)]
    pub class_name: String,
}

impl MonoScript {
    /// Script identifier: the asset name, or the class name when unnamed
    pub fn identifier(&self) -> &str {
        if self.name.is_empty() {
            &self.class_name
        } else {
            &self.name
        }
    }
}

impl UnityClass for MonoScript {
    const CLASS: ClassId = ClassId::MonoScript;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinnedMeshRenderer {
    #[serde(rename = "m_GameObject")]
    pub game_object: PPtr,
    #[serde(rename = "m_Mesh", default)]
    pub mesh: PPtr,
}

impl UnityClass for SkinnedMeshRenderer {
    const CLASS: ClassId = ClassId::SkinnedMeshRenderer;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshFilter {
    #[serde(rename = "m_GameObject")]
    pub game_object: PPtr,
    #[serde(rename = "m_Mesh", default)]
    pub mesh: PPtr,
}

impl UnityClass for MeshFilter {
    const CLASS: ClassId = ClassId::MeshFilter;
}

/// Mesh metadata. Geometry buffers are not read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(rename = "m_Name")]
    pub name: String,
    #[serde(rename = "m_BoneNameHashes", default)]
    pub bone_name_hashes: Vec<u32>,
}

impl UnityClass for Mesh {
    const CLASS: ClassId = ClassId::Mesh;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationClip {
    #[serde(rename = "m_Name")]
    pub name: String,
    #[serde(rename = "m_SampleRate", default)]
    pub sample_rate: f32,
}

impl UnityClass for AnimationClip {
    const CLASS: ClassId = ClassId::AnimationClip;
}
