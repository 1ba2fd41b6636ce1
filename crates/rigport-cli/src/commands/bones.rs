//! Bones command

use super::{load_scene, take_armature};
use anyhow::Result;
use serde_json::json;

pub fn run(dump: &str, armature: &str, format: &str) -> Result<()> {
    let (_, _, mut scene) = load_scene(dump)?;
    let armature = take_armature(&mut scene, armature)?;
    let Some(root) = armature.root() else {
        anyhow::bail!("Armature '{}' has no bones", armature.name);
    };

    match format {
        "text" => {
            for (_, id, depth) in armature.dfs(root) {
                let bone = armature.bone(id);
                let physics = bone
                    .physics
                    .as_ref()
                    .map(|p| format!("  [{}]", p.kind.script_name()))
                    .unwrap_or_default();
                println!(
                    "{}{}  {}  {}{}",
                    "  ".repeat(depth),
                    bone.name,
                    bone.path_hash().to_hex(),
                    bone.path_from_root,
                    physics
                );
            }
            for warning in armature.warnings() {
                println!("warning: {:?}", warning);
            }
        }
        "json" => {
            let bones: Vec<_> = armature
                .dfs(root)
                .into_iter()
                .map(|(parent, id, _)| {
                    let bone = armature.bone(id);
                    json!({
                        "name": bone.name,
                        "parent": parent.map(|p| armature.bone(p).name.as_str()),
                        "path": bone.path_from_root,
                        "hash": bone.path_hash().value(),
                        "physics": bone.physics,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&bones)?);
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }

    Ok(())
}
