//! Edit-bone emission for a reconstructed armature

use crate::rig::{EditBoneDesc, SceneSink};
use glam::Vec3;
use rigport_core::{swizzle_position, swizzle_rotation, ImportSettings, PhysicsSettings};
use rigport_import::Armature;

/// Emit one edit bone per joint under the skeleton root, in DFS order.
///
/// Joints become very short bones: the head sits at the joint, the tail
/// points along the joint's local +Y and the roll follows its local +Z.
/// Returns the number of bones emitted; an armature without the skeleton
/// root emits nothing.
pub fn emit_armature(
    armature: &mut Armature,
    import: &ImportSettings,
    physics: &PhysicsSettings,
    sink: &mut dyn SceneSink,
) -> usize {
    let Some(root) = armature.locate(&import.skeleton_root) else {
        log::warn!(
            "Armature '{}' has no '{}' bone, no edit bones emitted",
            armature.name,
            import.skeleton_root
        );
        return 0;
    };
    armature.calculate_global_transforms_from(root);

    let mut emitted = 0;
    for (parent, id, _) in armature.dfs(root) {
        let bone = armature.bone(id);
        let Some(global) = bone.global_transform else {
            continue;
        };
        let head = global.transform_point3(Vec3::ZERO);
        let direction = (global.transform_point3(Vec3::Y) - head)
            .try_normalize()
            .unwrap_or(Vec3::Z);
        let tail = head + direction * physics.bone_length;
        let roll_axis = global.transform_point3(Vec3::Z) - head;

        sink.add_edit_bone(EditBoneDesc {
            name: bone.name.clone(),
            parent: parent.map(|p| armature.bone(p).name.clone()),
            head: head.to_array(),
            tail: tail.to_array(),
            roll_axis: roll_axis.to_array(),
            bind_translation: swizzle_position(bone.local.translation()).to_array(),
            bind_rotation: swizzle_rotation(bone.local.quat()).to_array(),
        });
        emitted += 1;
    }

    log::debug!("Emitted {} edit bones for '{}'", emitted, armature.name);
    emitted
}
