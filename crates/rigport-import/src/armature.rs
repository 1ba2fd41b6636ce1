//! Reconstructed bone trees and their lookup indexes

use crate::physics::BonePhysics;
use glam::{Mat4, Vec3};
use rigport_core::{PathHash, Result, RigportError, Transform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Index of a bone within its armature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(usize);

impl BoneId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One node of the reconstructed skeleton
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Local transform in engine coordinates
    pub local: Transform,
    pub parent: Option<BoneId>,
    pub children: Vec<BoneId>,
    /// Slash-joined ancestor path, the input of the path hash
    pub path_from_root: String,
    /// World transform in host coordinates, filled by
    /// [`Armature::calculate_global_transforms`]
    pub global_transform: Option<Mat4>,
    pub physics: Option<BonePhysics>,
    /// Path id of the engine Transform this bone was built from
    pub transform_path_id: i64,
}

impl Bone {
    pub fn new(name: impl Into<String>, local: Transform, path_from_root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local,
            parent: None,
            children: Vec::new(),
            path_from_root: path_from_root.into(),
            global_transform: None,
            physics: None,
            transform_path_id: 0,
        }
    }

    pub fn with_physics(mut self, physics: Option<BonePhysics>) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_transform_path_id(mut self, path_id: i64) -> Self {
        self.transform_path_id = path_id;
        self
    }

    pub fn path_hash(&self) -> PathHash {
        PathHash::of(&self.path_from_root)
    }

    /// World-space position of a point given in this bone's local space
    pub fn world_point(&self, local: Vec3) -> Option<Vec3> {
        self.global_transform.map(|g| g.transform_point3(local))
    }
}

/// Compute a child's path from its parent's path.
///
/// An empty parent path means the parent is a root that does not
/// contribute its own name.
pub fn join_path(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent_path, name)
    }
}

/// Problems found while indexing. The first entry always wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexWarning {
    /// Two distinct paths hash to the same value
    HashCollision {
        hash: PathHash,
        kept: String,
        dropped: String,
    },
    /// Two bones share one path (same-named siblings)
    DuplicatePath { path: String },
    /// Two bones share one name
    DuplicateName { name: String },
}

/// A skeletal tree plus its path-hash and name indexes.
///
/// Bones live in an arena owned by the armature; links are [`BoneId`]s.
/// The indexes are derived from the tree: [`Armature::add_bone`] keeps them
/// in step and [`Armature::rebuild_indexes`] recomputes them from scratch.
#[derive(Debug, Clone)]
pub struct Armature {
    pub name: String,
    bones: Vec<Bone>,
    root: Option<BoneId>,
    bone_path_hash_tbl: HashMap<PathHash, BoneId>,
    bone_name_tbl: HashMap<String, BoneId>,
    warnings: Vec<IndexWarning>,
    /// Path id of the GameObject carrying the skinned mesh renderer
    pub skinned_mesh_game_object: Option<i64>,
}

impl Armature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
            root: None,
            bone_path_hash_tbl: HashMap::new(),
            bone_name_tbl: HashMap::new(),
            warnings: Vec::new(),
            skinned_mesh_game_object: None,
        }
    }

    /// Insert a bone under `parent` (or as the root) and index it
    pub fn add_bone(&mut self, parent: Option<BoneId>, mut bone: Bone) -> Result<BoneId> {
        let id = BoneId(self.bones.len());
        match parent {
            None if self.root.is_some() => {
                return Err(RigportError::Structure(format!(
                    "armature '{}' already has a root, cannot add '{}'",
                    self.name, bone.name
                )));
            }
            None => self.root = Some(id),
            Some(p) if p.0 >= self.bones.len() => {
                return Err(RigportError::Structure(format!(
                    "parent {:?} of '{}' does not exist",
                    p, bone.name
                )));
            }
            Some(p) => self.bones[p.0].children.push(id),
        }
        bone.parent = parent;
        bone.children.clear();
        self.bones.push(bone);
        self.index_bone(id);
        Ok(id)
    }

    fn index_bone(&mut self, id: BoneId) {
        let bone = &self.bones[id.0];
        let hash = bone.path_hash();

        match self.bone_path_hash_tbl.get(&hash) {
            Some(existing) => {
                let kept = &self.bones[existing.0].path_from_root;
                let warning = if *kept == bone.path_from_root {
                    IndexWarning::DuplicatePath {
                        path: bone.path_from_root.clone(),
                    }
                } else {
                    IndexWarning::HashCollision {
                        hash,
                        kept: kept.clone(),
                        dropped: bone.path_from_root.clone(),
                    }
                };
                log::warn!("Armature '{}': {:?}", self.name, warning);
                self.warnings.push(warning);
            }
            None => {
                self.bone_path_hash_tbl.insert(hash, id);
            }
        }

        if self.bone_name_tbl.contains_key(&bone.name) {
            let warning = IndexWarning::DuplicateName {
                name: bone.name.clone(),
            };
            log::debug!("Armature '{}': {:?}", self.name, warning);
            self.warnings.push(warning);
        } else {
            self.bone_name_tbl.insert(bone.name.clone(), id);
        }
    }

    /// Recompute both indexes from the tree in depth-first order
    pub fn rebuild_indexes(&mut self) {
        self.bone_path_hash_tbl.clear();
        self.bone_name_tbl.clear();
        self.warnings.clear();
        if let Some(root) = self.root {
            let order: Vec<BoneId> = self.dfs(root).into_iter().map(|(_, id, _)| id).collect();
            for id in order {
                self.index_bone(id);
            }
        }
    }

    pub fn root(&self) -> Option<BoneId> {
        self.root
    }

    pub fn root_bone(&self) -> Option<&Bone> {
        self.root.map(|r| &self.bones[r.0])
    }

    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.0]
    }

    pub fn bones(&self) -> impl Iterator<Item = (BoneId, &Bone)> {
        self.bones.iter().enumerate().map(|(i, b)| (BoneId(i), b))
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bone_path_hash_tbl(&self) -> &HashMap<PathHash, BoneId> {
        &self.bone_path_hash_tbl
    }

    pub fn bone_name_tbl(&self) -> &HashMap<String, BoneId> {
        &self.bone_name_tbl
    }

    pub fn warnings(&self) -> &[IndexWarning] {
        &self.warnings
    }

    pub fn by_hash(&self, hash: PathHash) -> Option<&Bone> {
        self.bone_path_hash_tbl.get(&hash).map(|id| &self.bones[id.0])
    }

    pub fn id_by_name(&self, name: &str) -> Option<BoneId> {
        self.bone_name_tbl.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Bone> {
        self.id_by_name(name).map(|id| &self.bones[id.0])
    }

    /// Pre-order traversal of the subtree at `from`, yielding
    /// `(parent, bone, depth)`. The starting bone is yielded with no parent
    /// so emitters treat it as the top of what they build.
    pub fn dfs(&self, from: BoneId) -> Vec<(Option<BoneId>, BoneId, usize)> {
        let mut out = Vec::with_capacity(self.bones.len());
        let mut stack = vec![(None, from, 0usize)];
        while let Some((parent, id, depth)) = stack.pop() {
            out.push((parent, id, depth));
            for &child in self.bones[id.0].children.iter().rev() {
                stack.push((Some(id), child, depth + 1));
            }
        }
        out
    }

    /// Find the first bone named `name` in the subtree at `from`, pre-order
    pub fn locate_by_name(&self, from: BoneId, name: &str) -> Option<BoneId> {
        self.dfs(from)
            .into_iter()
            .map(|(_, id, _)| id)
            .find(|id| self.bones[id.0].name == name)
    }

    /// Find the first bone named `name` anywhere in the tree
    pub fn locate(&self, name: &str) -> Option<BoneId> {
        self.root.and_then(|r| self.locate_by_name(r, name))
    }

    /// Fill every bone's world transform, in host coordinates
    pub fn calculate_global_transforms(&mut self) {
        if let Some(root) = self.root {
            self.calculate_global_transforms_from(root);
        }
    }

    /// Fill world transforms for the subtree under `from`, treating `from`'s
    /// parent frame as the world origin
    pub fn calculate_global_transforms_from(&mut self, from: BoneId) {
        for (parent, id, _) in self.dfs(from) {
            let local = self.bones[id.0].local.to_host_matrix();
            let global = match parent {
                Some(p) => self.bones[p.0].global_transform.unwrap_or(Mat4::IDENTITY) * local,
                None => local,
            };
            self.bones[id.0].global_transform = Some(global);
        }
    }

    /// Fill world transforms for every bone in the parent frame of `origin`.
    ///
    /// Bones under `origin` get the same values as
    /// [`calculate_global_transforms_from`](Self::calculate_global_transforms_from);
    /// bones elsewhere in the hierarchy are placed in that same frame.
    pub fn calculate_global_transforms_relative_to(&mut self, origin: BoneId) {
        self.calculate_global_transforms();
        let frame = self.bones[origin.0]
            .parent
            .and_then(|p| self.bones[p.0].global_transform)
            .map(|m| m.inverse())
            .unwrap_or(Mat4::IDENTITY);
        for bone in &mut self.bones {
            bone.global_transform = bone.global_transform.map(|g| frame * g);
        }
        self.calculate_global_transforms_from(origin);
    }

    /// The hash table as `{ "<hash>": "<bone name>" }` JSON, for consumers
    /// that only see hashes (animation curves, vertex groups)
    pub fn hash_table_json(&self) -> String {
        let table: BTreeMap<String, &str> = self
            .bone_path_hash_tbl
            .iter()
            .map(|(hash, id)| (hash.to_string(), self.bones[id.0].name.as_str()))
            .collect();
        // A map of strings cannot fail to serialize
        serde_json::to_string(&table).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Position -> Hips -> Spine, Position -> Hips -> LegL
    fn sample() -> Armature {
        let mut arm = Armature::new("chr");
        let root = arm
            .add_bone(None, Bone::new("Position", Transform::IDENTITY, "Position"))
            .unwrap();
        let hips = arm
            .add_bone(
                Some(root),
                Bone::new("Hips", Transform::from_position([0.0, 1.0, 0.0]), "Position/Hips"),
            )
            .unwrap();
        arm.add_bone(
            Some(hips),
            Bone::new("Spine", Transform::from_position([0.0, 0.5, 0.0]), "Position/Hips/Spine"),
        )
        .unwrap();
        arm.add_bone(
            Some(hips),
            Bone::new("LegL", Transform::from_position([0.1, 0.0, 0.0]), "Position/Hips/LegL"),
        )
        .unwrap();
        arm
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "Hips"), "Hips");
        assert_eq!(join_path("Position", "Hips"), "Position/Hips");
    }

    #[test]
    fn test_single_root() {
        let mut arm = sample();
        let err = arm.add_bone(None, Bone::new("Other", Transform::IDENTITY, "Other"));
        assert!(matches!(err, Err(RigportError::Structure(_))));
        assert_eq!(arm.len(), 4);
    }

    #[test]
    fn test_bad_parent_rejected() {
        let mut arm = Armature::new("a");
        let err = arm.add_bone(Some(BoneId(3)), Bone::new("x", Transform::IDENTITY, "x"));
        assert!(matches!(err, Err(RigportError::Structure(_))));
    }

    #[test]
    fn test_indexes_follow_tree() {
        let arm = sample();
        assert_eq!(arm.bone_name_tbl().len(), 4);
        assert_eq!(arm.bone_path_hash_tbl().len(), 4);
        assert_eq!(
            arm.by_hash(PathHash::of("Position/Hips/Spine")).unwrap().name,
            "Spine"
        );
        assert!(arm.by_hash(PathHash::of("Hips/Spine")).is_none());
        assert!(arm.warnings().is_empty());
    }

    #[test]
    fn test_tree_links() {
        let arm = sample();
        for (id, bone) in arm.bones() {
            match bone.parent {
                None => assert_eq!(Some(id), arm.root()),
                Some(p) => {
                    let parent = arm.bone(p);
                    assert_eq!(parent.children.iter().filter(|c| **c == id).count(), 1);
                    assert_eq!(bone.path_from_root, join_path(&parent.path_from_root, &bone.name));
                }
            }
        }
    }

    #[test]
    fn test_dfs_preorder() {
        let arm = sample();
        let names: Vec<(&str, usize)> = arm
            .dfs(arm.root().unwrap())
            .into_iter()
            .map(|(_, id, depth)| (arm.bone(id).name.as_str(), depth))
            .collect();
        assert_eq!(
            names,
            vec![("Position", 0), ("Hips", 1), ("Spine", 2), ("LegL", 2)]
        );
    }

    #[test]
    fn test_dfs_subtree_starts_without_parent() {
        let arm = sample();
        let hips = arm.id_by_name("Hips").unwrap();
        let visit = arm.dfs(hips);
        assert_eq!(visit[0], (None, hips, 0));
        assert_eq!(visit.len(), 3);
    }

    #[test]
    fn test_locate_by_name() {
        let arm = sample();
        let hips = arm.id_by_name("Hips").unwrap();
        assert_eq!(arm.locate_by_name(hips, "LegL"), arm.id_by_name("LegL"));
        assert_eq!(arm.locate_by_name(hips, "Position"), None);
        assert_eq!(arm.locate("Spine"), arm.id_by_name("Spine"));
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut arm = sample();
        let spine = arm.id_by_name("Spine").unwrap();
        let dup = arm
            .add_bone(
                Some(spine),
                Bone::new("Hips", Transform::IDENTITY, "Position/Hips/Spine/Hips"),
            )
            .unwrap();
        assert_ne!(arm.id_by_name("Hips"), Some(dup));
        assert_eq!(
            arm.warnings(),
            &[IndexWarning::DuplicateName {
                name: "Hips".to_string()
            }]
        );
        // Distinct path, so the hash index still gets it
        assert_eq!(arm.bone_path_hash_tbl().len(), 5);
    }

    #[test]
    fn test_duplicate_path_keeps_first() {
        let mut arm = sample();
        let hips = arm.id_by_name("Hips").unwrap();
        let first = arm.by_hash(PathHash::of("Position/Hips/Spine")).map(|b| b.transform_path_id);
        arm.add_bone(
            Some(hips),
            Bone::new("Spine", Transform::IDENTITY, "Position/Hips/Spine").with_transform_path_id(77),
        )
        .unwrap();
        assert_eq!(
            arm.by_hash(PathHash::of("Position/Hips/Spine")).map(|b| b.transform_path_id),
            first
        );
        assert!(arm
            .warnings()
            .iter()
            .any(|w| matches!(w, IndexWarning::DuplicatePath { .. })));
    }

    #[test]
    fn test_hash_collision_keeps_first() {
        // Distinct strings with the same CRC-32
        let hash = PathHash::of("plumless");
        assert_eq!(hash, PathHash::of("buckeroo"));

        let mut arm = Armature::new("chr");
        let root = arm
            .add_bone(None, Bone::new("plumless", Transform::IDENTITY, "plumless"))
            .unwrap();
        arm.add_bone(Some(root), Bone::new("buckeroo", Transform::IDENTITY, "buckeroo"))
            .unwrap();

        assert_eq!(arm.by_hash(hash).map(|b| b.name.as_str()), Some("plumless"));
        assert_eq!(arm.bone_path_hash_tbl().len(), 1);
        assert_eq!(arm.bone_name_tbl().len(), 2);
        assert_eq!(
            arm.warnings(),
            &[IndexWarning::HashCollision {
                hash,
                kept: "plumless".to_string(),
                dropped: "buckeroo".to_string(),
            }]
        );
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let mut arm = sample();
        let before = arm.bone_path_hash_tbl().clone();
        arm.rebuild_indexes();
        assert_eq!(arm.bone_path_hash_tbl(), &before);
        assert_eq!(arm.bone_name_tbl().len(), 4);
    }

    #[test]
    fn test_global_transforms_accumulate() {
        let mut arm = sample();
        arm.calculate_global_transforms();
        let spine = arm.by_name("Spine").unwrap();
        let head = spine.world_point(Vec3::ZERO).unwrap();
        // Engine (0, 1.5, 0) becomes host (0, 0, 1.5)
        assert!(head.abs_diff_eq(Vec3::new(0.0, 0.0, 1.5), 1e-5), "{:?}", head);
        let leg = arm.by_name("LegL").unwrap().world_point(Vec3::ZERO).unwrap();
        assert!(leg.abs_diff_eq(Vec3::new(-0.1, 0.0, 1.0), 1e-5), "{:?}", leg);
    }

    #[test]
    fn test_global_transforms_from_subtree() {
        let mut arm = sample();
        let hips = arm.id_by_name("Hips").unwrap();
        arm.calculate_global_transforms_from(hips);
        assert!(arm.by_name("Position").unwrap().global_transform.is_none());
        let spine = arm.by_name("Spine").unwrap().world_point(Vec3::ZERO).unwrap();
        assert!(spine.abs_diff_eq(Vec3::new(0.0, 0.0, 1.5), 1e-5), "{:?}", spine);
    }

    #[test]
    fn test_global_transforms_relative_to_subtree() {
        let mut arm = sample();
        let spine = arm.id_by_name("Spine").unwrap();
        arm.calculate_global_transforms_relative_to(spine);

        let at = |arm: &Armature, name: &str| {
            arm.by_name(name).unwrap().world_point(Vec3::ZERO).unwrap()
        };
        assert!(at(&arm, "Spine").abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-5));
        assert!(at(&arm, "Hips").abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(at(&arm, "LegL").abs_diff_eq(Vec3::new(-0.1, 0.0, 0.0), 1e-5));
        assert!(at(&arm, "Position").abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_hash_table_json() {
        let arm = sample();
        let parsed: BTreeMap<String, String> =
            serde_json::from_str(&arm.hash_table_json()).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(
            parsed.get(&PathHash::of("Position/Hips").to_string()).map(String::as_str),
            Some("Hips")
        );
    }
}
