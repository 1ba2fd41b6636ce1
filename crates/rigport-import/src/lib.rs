//! Rigport Import - Armature reconstruction
//!
//! Rebuilds bone hierarchies from a flat forest of engine transforms,
//! indexes every bone by the CRC-32 of its path, and classifies the
//! spring-bone physics scripts attached along the way.

mod armature;
mod builder;
mod physics;
mod skin;

#[cfg(test)]
mod testing;

pub use armature::{join_path, Armature, Bone, BoneId, IndexWarning};
pub use builder::{
    build_armature, find_root_transforms, search_animations, search_environment,
    ArmatureFailure, SceneImport, StaticMesh,
};
pub use physics::{pivot_path_id, AngleLimits, BonePhysics, BonePhysicsType};
pub use skin::{skinned_mesh, vertex_groups};
