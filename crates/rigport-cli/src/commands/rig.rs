//! Rig command

use super::{format_rig, load_scene, take_armature};
use anyhow::{Context, Result};
use rigport_physics::{emit_armature, emit_physics, RigScene};

pub struct RigArgs {
    pub dump: String,
    pub armature: String,
    pub output: Option<String>,
    pub format: String,
    pub no_physics: bool,
}

pub fn run(args: RigArgs) -> Result<()> {
    let (config, _, mut scene) = load_scene(&args.dump)?;
    let mut armature = take_armature(&mut scene, &args.armature)?;

    let mut rig = RigScene::new();
    let bones = emit_armature(&mut armature, &config.import, &config.physics, &mut rig);
    if bones == 0 {
        log::warn!(
            "No '{}' bone in '{}'; nothing to emit",
            config.import.skeleton_root,
            armature.name
        );
    }
    if !args.no_physics {
        let report = emit_physics(&mut armature, &config.import, &config.physics, &mut rig);
        if report.skipped > 0 {
            log::warn!("{} spring bone(s) skipped", report.skipped);
        }
    }

    let text = format_rig(&rig, &args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("Failed to write {}", path))?;
            println!(
                "Wrote {} bones, {} bodies, {} springs to {}",
                rig.edit_bones.len(),
                rig.bodies.len(),
                rig.springs.len(),
                path
            );
        }
        None => println!("{}", text),
    }

    Ok(())
}
