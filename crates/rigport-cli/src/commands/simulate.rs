//! Simulate command

use super::{load_scene, take_armature};
use anyhow::{Context, Result};
use rigport_physics::{emit_armature, emit_physics, PhysicsWorld, RapierRig, RigScene};

pub fn run(dump: &str, armature: &str, steps: u32, dt: f32) -> Result<()> {
    if dt <= 0.0 {
        anyhow::bail!("--dt must be positive, got {}", dt);
    }
    let (config, _, mut scene) = load_scene(dump)?;
    let mut armature = take_armature(&mut scene, armature)?;

    let mut rig = RigScene::new();
    emit_armature(&mut armature, &config.import, &config.physics, &mut rig);
    let report = emit_physics(&mut armature, &config.import, &config.physics, &mut rig);
    if report.springs == 0 {
        println!("'{}' has no spring bones to simulate", armature.name);
        return Ok(());
    }

    let mut world = PhysicsWorld::new();
    let rapier = RapierRig::instantiate(&rig, &mut world).context("Failed to build Rapier rig")?;
    let start = rapier.bone_poses(&world);
    world.advance(dt, steps);

    println!(
        "Simulated {} steps ({:.3}s) of {} bodies",
        steps,
        world.elapsed(),
        rapier.body_map.len()
    );
    for (before, after) in start.iter().zip(rapier.bone_poses(&world)) {
        let [x, y, z] = after.position;
        let moved = before
            .position
            .iter()
            .zip(after.position.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();
        println!(
            "  {:<24} ({:>8.4}, {:>8.4}, {:>8.4})  moved {:.4}",
            after.bone, x, y, z, moved
        );
    }

    Ok(())
}
