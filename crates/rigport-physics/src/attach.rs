//! Cross-armature attachment

use crate::rig::{PoseConstraintDesc, PoseTarget, SceneSink};
use rigport_core::{Result, RigportError};
use rigport_import::Armature;

pub const DEFAULT_ATTACH_BONE: &str = "Neck";

/// Make `face`'s `bone` copy the transform of the same-named bone in `body`
pub fn neck_attach(
    face: &Armature,
    body: &Armature,
    bone: &str,
    sink: &mut dyn SceneSink,
) -> Result<()> {
    for armature in [face, body] {
        if armature.locate(bone).is_none() {
            return Err(RigportError::BoneNotFound(format!(
                "{} in armature '{}'",
                bone, armature.name
            )));
        }
    }

    sink.add_pose_constraint(PoseConstraintDesc {
        armature: face.name.clone(),
        bone: bone.to_string(),
        target: PoseTarget::Bone {
            armature: body.name.clone(),
            bone: bone.to_string(),
        },
    });
    log::info!("Attached '{}' {} to '{}'", face.name, bone, body.name);
    Ok(())
}
