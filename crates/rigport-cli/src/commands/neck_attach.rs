//! Neck-attach command

use super::{format_rig, load_scene, take_armature};
use anyhow::Result;
use rigport_physics::{neck_attach, RigScene};

pub fn run(dump: &str, face: &str, body: &str, bone: &str, format: &str) -> Result<()> {
    let (_, _, mut scene) = load_scene(dump)?;
    let face = take_armature(&mut scene, face)?;
    let body = take_armature(&mut scene, body)?;

    let mut rig = RigScene::new();
    neck_attach(&face, &body, bone, &mut rig)?;
    println!("{}", format_rig(&rig, format)?);
    Ok(())
}
