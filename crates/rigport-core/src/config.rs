//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `RIGPORT_SKELETON_ROOT`, `RIGPORT_ROOT_IN_PATH`
//! 2. Project-local: `.rigport/config.toml`
//! 3. Global: `~/.rigport/config.toml`

use crate::error::{Result, RigportError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for armature reconstruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Name of the bone that roots the actual skeleton
    #[serde(default = "default_skeleton_root")]
    pub skeleton_root: String,
    /// Whether the transform root's own name prefixes every bone path.
    ///
    /// Defaults to `true`. Unity stores `m_BoneNameHashes` relative to the
    /// animator, i.e. `Position/Hips/...` with no character root in front;
    /// set this to `false` when reading dumps taken straight from a player.
    #[serde(default = "default_true")]
    pub root_in_path: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            skeleton_root: default_skeleton_root(),
            root_in_path: true,
        }
    }
}

/// Unit conversion factors for emitted physics shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "default_pivot_size")]
    pub pivot_size: f32,
    #[serde(default = "default_half")]
    pub sphere_radius_factor: f32,
    #[serde(default = "default_one")]
    pub capsule_radius_factor: f32,
    #[serde(default = "default_one")]
    pub capsule_height_factor: f32,
    #[serde(default = "default_half")]
    pub spring_bone_radius_factor: f32,
    /// Length given to emitted edit bones
    #[serde(default = "default_bone_length")]
    pub bone_length: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            pivot_size: default_pivot_size(),
            sphere_radius_factor: default_half(),
            capsule_radius_factor: default_one(),
            capsule_height_factor: default_one(),
            spring_bone_radius_factor: default_half(),
            bone_length: default_bone_length(),
        }
    }
}

fn default_skeleton_root() -> String {
    "Position".to_string()
}
fn default_true() -> bool {
    true
}
fn default_pivot_size() -> f32 {
    0.004
}
fn default_half() -> f32 {
    0.5
}
fn default_one() -> f32 {
    1.0
}
fn default_bone_length() -> f32 {
    0.01
}

/// Config file structure. Every field is optional so a layer only
/// overrides what it mentions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    import: Option<ImportLayer>,
    #[serde(default)]
    physics: Option<PhysicsLayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ImportLayer {
    skeleton_root: Option<String>,
    root_in_path: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PhysicsLayer {
    pivot_size: Option<f32>,
    sphere_radius_factor: Option<f32>,
    capsule_radius_factor: Option<f32>,
    capsule_height_factor: Option<f32>,
    spring_bone_radius_factor: Option<f32>,
    bone_length: Option<f32>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigportConfig {
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
}

impl RigportConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = RigportConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".rigport/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from a specific file path on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = RigportConfig::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML string on top of the defaults, without env overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = RigportConfig::default();
        config.merge(file);
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".rigport").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            RigportError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: ConfigFile) {
        if let Some(import) = overlay.import {
            if let Some(root) = import.skeleton_root {
                self.import.skeleton_root = root;
            }
            if let Some(flag) = import.root_in_path {
                self.import.root_in_path = flag;
            }
        }

        if let Some(physics) = overlay.physics {
            let p = &mut self.physics;
            if let Some(v) = physics.pivot_size {
                p.pivot_size = v;
            }
            if let Some(v) = physics.sphere_radius_factor {
                p.sphere_radius_factor = v;
            }
            if let Some(v) = physics.capsule_radius_factor {
                p.capsule_radius_factor = v;
            }
            if let Some(v) = physics.capsule_height_factor {
                p.capsule_height_factor = v;
            }
            if let Some(v) = physics.spring_bone_radius_factor {
                p.spring_bone_radius_factor = v;
            }
            if let Some(v) = physics.bone_length {
                p.bone_length = v;
            }
        }
    }

    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("RIGPORT_SKELETON_ROOT") {
            self.import.skeleton_root = root;
        }
        if let Some(flag) = lookup("RIGPORT_ROOT_IN_PATH") {
            self.import.root_in_path = match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(RigportError::Config(format!(
                        "RIGPORT_ROOT_IN_PATH must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }
        Ok(())
    }
}
