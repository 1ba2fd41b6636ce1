//! Skin binding: mapping a mesh's bone hashes back to bones

use crate::armature::Armature;
use rigport_asset::{AssetEnvironment, ClassId, GameObject, Mesh, SkinnedMeshRenderer};
use rigport_core::{PathHash, Result, RigportError};

/// Vertex group names for a skinned mesh, one per entry of its bone hash
/// list. Group `i` is the bone whose path hashes to `hashes[i]`.
pub fn vertex_groups(armature: &Armature, hashes: &[u32]) -> Result<Vec<String>> {
    hashes
        .iter()
        .map(|&value| {
            let hash = PathHash::from_u32(value);
            armature
                .by_hash(hash)
                .map(|bone| bone.name.clone())
                .ok_or_else(|| {
                    RigportError::UnresolvedBoneHash(format!(
                        "{} not in armature '{}'",
                        hash, armature.name
                    ))
                })
        })
        .collect()
}

/// The mesh asset behind an armature's skinned mesh renderer
pub fn skinned_mesh(env: &AssetEnvironment, armature: &Armature) -> Result<Option<Mesh>> {
    let Some(game_object_id) = armature.skinned_mesh_game_object else {
        return Ok(None);
    };
    let game_object: GameObject = env.read(game_object_id)?;
    let Some(renderer) = env
        .components_of(&game_object, ClassId::SkinnedMeshRenderer)
        .next()
    else {
        return Ok(None);
    };
    let renderer: SkinnedMeshRenderer = AssetEnvironment::decode(renderer)?;
    if renderer.mesh.is_null() {
        return Ok(None);
    }
    env.deref(renderer.mesh).map(Some)
}
