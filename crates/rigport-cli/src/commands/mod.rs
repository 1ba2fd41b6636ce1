//! CLI command implementations

pub mod bones;
pub mod hash;
pub mod inspect;
pub mod neck_attach;
pub mod rig;
pub mod simulate;

use anyhow::{Context, Result};
use rigport_asset::AssetEnvironment;
use rigport_core::RigportConfig;
use rigport_import::{search_environment, Armature, SceneImport};
use rigport_physics::RigScene;

/// Load config and dump, and run the armature search
pub(crate) fn load_scene(dump: &str) -> Result<(RigportConfig, AssetEnvironment, SceneImport)> {
    let config = RigportConfig::load().context("Failed to load config")?;
    let env = AssetEnvironment::load(dump).with_context(|| format!("Failed to load dump {}", dump))?;
    let scene = search_environment(&env, &config.import);
    Ok((config, env, scene))
}

/// Take one armature out of a search result, reporting why it is missing
pub(crate) fn take_armature(scene: &mut SceneImport, name: &str) -> Result<Armature> {
    if let Some(failure) = scene.failures.iter().find(|f| f.root == name) {
        anyhow::bail!("Armature '{}' failed to import: {}", name, failure.error);
    }
    scene.take_armature(name).with_context(|| {
        let known: Vec<&str> = scene.armatures.iter().map(|a| a.name.as_str()).collect();
        format!("Available armatures: {}", known.join(", "))
    })
}

pub(crate) fn format_rig(rig: &RigScene, format: &str) -> Result<String> {
    Ok(match format {
        "toml" => rig.to_toml()?,
        "json" => rig.to_json()?,
        _ => anyhow::bail!("Unknown format: {}", format),
    })
}
