//! Rigport Asset - Unity object dump model
//!
//! This crate reads the JSON type-tree dump of an asset bundle and exposes
//! the handful of engine classes the importer needs as typed views,
//! addressed by their path id.

mod classes;
mod environment;
mod pptr;

pub use classes::{
    AnimationClip, ClassId, ComponentPair, GameObject, Mesh, MeshFilter,
    MonoBehaviour, MonoScript, Quaternionf, SkinnedMeshRenderer, Transform, UnityClass, Vector3f,
};
pub use environment::{AssetEnvironment, ObjectDump, RawObject};
pub use pptr::PPtr;
