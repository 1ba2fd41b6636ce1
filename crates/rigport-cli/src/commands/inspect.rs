//! Inspect command

use super::load_scene;
use anyhow::Result;
use rigport_import::{search_animations, Armature};
use serde_json::json;

fn physics_count(armature: &Armature) -> usize {
    armature.bones().filter(|(_, b)| b.physics.is_some()).count()
}

pub fn run(dump: &str, format: &str) -> Result<()> {
    let (_, env, scene) = load_scene(dump)?;
    let clips = search_animations(&env);

    match format {
        "text" => {
            println!("Armatures: {}", scene.armatures.len());
            for armature in &scene.armatures {
                println!(
                    "  {} ({} bones, {} with physics, {} index warnings)",
                    armature.name,
                    armature.len(),
                    physics_count(armature),
                    armature.warnings().len()
                );
            }
            println!("Static meshes: {}", scene.static_meshes.len());
            for mesh in &scene.static_meshes {
                println!("  {} [{}]", mesh.name, mesh.mesh.as_deref().unwrap_or("-"));
            }
            println!("Animation clips: {}", clips.len());
            for clip in &clips {
                println!("  {} @ {} fps", clip.name, clip.sample_rate);
            }
            if !scene.failures.is_empty() {
                println!("Failed roots: {}", scene.failures.len());
                for failure in &scene.failures {
                    println!("  {}: {}", failure.root, failure.error);
                }
            }
        }
        "json" => {
            let value = json!({
                "armatures": scene.armatures.iter().map(|a| json!({
                    "name": a.name,
                    "bones": a.len(),
                    "physics": physics_count(a),
                    "warnings": a.warnings().len(),
                })).collect::<Vec<_>>(),
                "static_meshes": scene.static_meshes.iter().map(|m| json!({
                    "name": m.name,
                    "mesh": m.mesh,
                })).collect::<Vec<_>>(),
                "animation_clips": clips.iter().map(|c| &c.name).collect::<Vec<_>>(),
                "failures": scene.failures.iter().map(|f| json!({
                    "root": f.root,
                    "error": f.error.to_string(),
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }

    Ok(())
}
