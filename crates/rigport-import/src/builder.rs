//! Bone graph reconstruction from the flat transform forest

use crate::armature::{join_path, Armature, Bone, BoneId};
use crate::physics::{pivot_path_id, BonePhysics, BonePhysicsType};
use rigport_asset::{
    AnimationClip, AssetEnvironment, ClassId, GameObject, Mesh, MeshFilter, MonoBehaviour,
    MonoScript, Transform,
};
use rigport_core::{ImportSettings, Result, RigportError};
use std::collections::{HashMap, HashSet};

/// A GameObject rendered with a plain (non-skinned) mesh renderer
#[derive(Debug, Clone)]
pub struct StaticMesh {
    pub name: String,
    pub game_object: i64,
    /// Name of the mesh asset behind its MeshFilter, when one resolves
    pub mesh: Option<String>,
}

/// An armature that could not be built. Its siblings are unaffected.
#[derive(Debug)]
pub struct ArmatureFailure {
    pub root: String,
    pub error: RigportError,
}

/// Everything found in one environment
#[derive(Debug, Default)]
pub struct SceneImport {
    pub static_meshes: Vec<StaticMesh>,
    pub armatures: Vec<Armature>,
    pub failures: Vec<ArmatureFailure>,
}

impl SceneImport {
    pub fn armature(&self, name: &str) -> Option<&Armature> {
        self.armatures.iter().find(|a| a.name == name)
    }

    /// Take ownership of one armature by name
    pub fn take_armature(&mut self, name: &str) -> Result<Armature> {
        let index = self
            .armatures
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| RigportError::ArmatureNotFound(name.to_string()))?;
        Ok(self.armatures.swap_remove(index))
    }
}

/// State threaded through one armature's depth-first traversal
struct TraversalContext<'a> {
    env: &'a AssetEnvironment,
    settings: &'a ImportSettings,
    armature: Armature,
    /// Transform path id -> bone, filled in traversal order. Physics scripts
    /// reference pivots by raw path id, so this is separate from the hash index.
    path_id_tbl: HashMap<i64, BoneId>,
    visited: HashSet<i64>,
}

impl<'a> TraversalContext<'a> {
    fn new(env: &'a AssetEnvironment, settings: &'a ImportSettings, name: String) -> Self {
        Self {
            env,
            settings,
            armature: Armature::new(name),
            path_id_tbl: HashMap::new(),
            visited: HashSet::new(),
        }
    }

    fn visit(&mut self, transform_id: i64, parent: Option<BoneId>) -> Result<()> {
        if !self.visited.insert(transform_id) {
            return Err(RigportError::Structure(format!(
                "transform {} is reachable twice",
                transform_id
            )));
        }

        let transform: Transform = self.env.read(transform_id)?;
        let game_object_id = transform.game_object.path_id;
        let game_object: GameObject = self.env.deref(transform.game_object)?;
        let name = game_object.name.clone();

        if self
            .env
            .has_component(&game_object, ClassId::SkinnedMeshRenderer)
        {
            match self.armature.skinned_mesh_game_object {
                None => self.armature.skinned_mesh_game_object = Some(game_object_id),
                Some(_) => log::debug!(
                    "Armature '{}': additional skinned mesh on '{}' ignored",
                    self.armature.name,
                    name
                ),
            }
        }

        let path_from_root = match parent {
            Some(p) => join_path(&self.armature.bone(p).path_from_root, &name),
            None if self.settings.root_in_path => name.clone(),
            None => String::new(),
        };

        let physics = self.scan_physics(&game_object, &name)?;

        let bone = Bone::new(name, transform.local_transform(), path_from_root)
            .with_physics(physics)
            .with_transform_path_id(transform_id);
        let bone_id = self.armature.add_bone(parent, bone)?;
        self.path_id_tbl.insert(transform_id, bone_id);

        for child in &transform.children {
            if let Some(child_id) = child.get() {
                self.visit(child_id, Some(bone_id))?;
            }
        }
        Ok(())
    }

    /// Look through a GameObject's script components for a physics script.
    /// When several are present the last one wins.
    fn scan_physics(&self, game_object: &GameObject, bone_name: &str) -> Result<Option<BonePhysics>> {
        let mut found = None;
        for obj in self
            .env
            .components_of(game_object, ClassId::MonoBehaviour)
        {
            let behaviour: MonoBehaviour = match AssetEnvironment::decode(obj) {
                Ok(b) => b,
                Err(e) => {
                    log::warn!("Skipping script on '{}': {}", bone_name, e);
                    continue;
                }
            };
            let Some(script_id) = behaviour.script.get() else {
                continue;
            };
            let script: MonoScript = match self.env.read(script_id) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("Script {} of '{}' unreadable: {}", script_id, bone_name, e);
                    continue;
                }
            };
            let Some(kind) = BonePhysicsType::from_script_name(script.identifier()) else {
                continue;
            };
            let Some(mut physics) = BonePhysics::from_fields(kind, &behaviour.fields) else {
                continue;
            };

            if let Some(pivot_id) = pivot_path_id(&behaviour.fields) {
                let pivot = self.path_id_tbl.get(&pivot_id).ok_or_else(|| {
                    RigportError::UnresolvedPivot {
                        bone: bone_name.to_string(),
                        path_id: pivot_id,
                    }
                })?;
                physics.pivot = Some(self.armature.bone(*pivot).name.clone());
            }

            log::debug!("Bone '{}' carries {:?}", bone_name, kind);
            found = Some(physics);
        }
        Ok(found)
    }
}

/// Rebuild the bone tree rooted at one root Transform.
///
/// The armature is named after the root's GameObject. Traversal is
/// pre-order, children in their stored order.
pub fn build_armature(
    env: &AssetEnvironment,
    root_transform: i64,
    settings: &ImportSettings,
) -> Result<Armature> {
    let transform: Transform = env.read(root_transform)?;
    let root_object: GameObject = env.deref(transform.game_object)?;

    let mut ctx = TraversalContext::new(env, settings, root_object.name);
    ctx.visit(root_transform, None)?;

    let armature = ctx.armature;
    log::debug!(
        "Built armature '{}' with {} bones",
        armature.name,
        armature.len()
    );
    Ok(armature)
}

/// Path ids of every Transform without a parent, in dump order
pub fn find_root_transforms(env: &AssetEnvironment) -> Vec<i64> {
    env.objects_of(ClassId::Transform)
        .filter_map(|obj| match AssetEnvironment::decode::<Transform>(obj) {
            Ok(t) if t.is_root() => Some(obj.path_id),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Skipping transform {}: {}", obj.path_id, e);
                None
            }
        })
        .collect()
}

/// Collect static meshes and skinned armatures from an environment.
///
/// Roots whose hierarchy holds no skinned mesh are dropped. A root that
/// fails to build is reported in `failures` and the rest carry on.
pub fn search_environment(env: &AssetEnvironment, settings: &ImportSettings) -> SceneImport {
    let mut scene = SceneImport::default();

    for obj in env.objects_of(ClassId::GameObject) {
        let Ok(game_object) = AssetEnvironment::decode::<GameObject>(obj) else {
            continue;
        };
        if !env.has_component(&game_object, ClassId::MeshRenderer) {
            continue;
        }
        let mesh = env
            .components_of(&game_object, ClassId::MeshFilter)
            .next()
            .and_then(|f| AssetEnvironment::decode::<MeshFilter>(f).ok())
            .and_then(|f| env.deref::<Mesh>(f.mesh).ok())
            .map(|m| m.name);
        scene.static_meshes.push(StaticMesh {
            name: game_object.name,
            game_object: obj.path_id,
            mesh,
        });
    }

    for root in find_root_transforms(env) {
        match build_armature(env, root, settings) {
            Ok(armature) if armature.skinned_mesh_game_object.is_some() => {
                log::info!(
                    "Found armature '{}' ({} bones)",
                    armature.name,
                    armature.len()
                );
                scene.armatures.push(armature);
            }
            Ok(armature) => {
                log::debug!("Root '{}' has no skinned mesh, skipped", armature.name);
            }
            Err(error) => {
                let root_name = env
                    .read::<Transform>(root)
                    .and_then(|t| env.deref::<GameObject>(t.game_object))
                    .map(|g| g.name)
                    .unwrap_or_else(|_| format!("transform {}", root));
                log::warn!("Armature '{}' failed: {}", root_name, error);
                scene.failures.push(ArmatureFailure {
                    root: root_name,
                    error,
                });
            }
        }
    }

    scene
}

/// All animation clips in the environment, in dump order
pub fn search_animations(env: &AssetEnvironment) -> Vec<AnimationClip> {
    env.objects_of(ClassId::AnimationClip)
        .filter_map(|obj| AssetEnvironment::decode::<AnimationClip>(obj).ok())
        .collect()
}
