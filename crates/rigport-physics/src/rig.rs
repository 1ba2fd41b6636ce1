//! Emitted scene description and the sink it is written into

use glam::{Mat4, Quat, Vec3};
use rigport_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where emitted bones, bodies and constraints go.
///
/// Every emission call takes the sink explicitly; there is no ambient
/// "active object" state.
pub trait SceneSink {
    fn add_edit_bone(&mut self, bone: EditBoneDesc);
    fn has_body(&self, name: &str) -> bool;
    fn add_rigid_body(&mut self, body: RigidBodyDesc);
    fn add_spring_constraint(&mut self, constraint: SpringConstraintDesc);
    fn add_pose_constraint(&mut self, constraint: PoseConstraintDesc);
    fn add_no_collision(&mut self, link: NoCollisionDesc);
}

/// A joint of the emitted armature, in host coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBoneDesc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    /// Direction the bone's local Z axis points to, for roll alignment
    pub roll_axis: [f32; 3],
    /// Bind-pose local translation
    pub bind_translation: [f32; 3],
    /// Bind-pose local rotation [x, y, z, w]
    pub bind_rotation: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// Moved by animation, never by the solver
    Passive,
    /// Simulated
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CollisionShape {
    Sphere { radius: f32 },
    /// Capsule along the local Z axis; `height` is the full length
    Capsule { radius: f32, height: f32 },
}

/// A rigid body with its collision shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    pub name: String,
    pub body_type: BodyType,
    pub kinematic: bool,
    /// Whether the body takes part in collisions at all
    pub collides: bool,
    pub shape: CollisionShape,
    /// Bone the body follows, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_bone: Option<String>,
    /// Initial world position
    pub position: [f32; 3],
    /// Initial world rotation [x, y, z, w]
    pub rotation: [f32; 4],
}

impl RigidBodyDesc {
    /// Place the body at a world matrix, dropping its scale
    pub fn with_world_matrix(mut self, matrix: Mat4) -> Self {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        self.position = translation.to_array();
        self.rotation = rotation.normalize().to_array();
        self
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn quat(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

/// Per-axis range. A disabled axis is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLimit {
    pub enabled: bool,
    pub lower: f32,
    pub upper: f32,
}

impl AxisLimit {
    pub const FREE: Self = Self {
        enabled: false,
        lower: 0.0,
        upper: 0.0,
    };
    pub const LOCKED: Self = Self {
        enabled: true,
        lower: 0.0,
        upper: 0.0,
    };

    pub fn range(lower: f32, upper: f32) -> Self {
        Self {
            enabled: true,
            lower,
            upper,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.enabled && self.lower == self.upper
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSpring {
    pub enabled: bool,
    pub stiffness: f32,
    #[serde(default)]
    pub damping: f32,
}

/// Generic spring constraint between a pivot and a target body.
/// Axis arrays are [X, Y, Z]; angular values are radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringConstraintDesc {
    pub name: String,
    pub pivot: String,
    pub target: String,
    pub linear: [AxisLimit; 3],
    pub angular: [AxisLimit; 3],
    pub angular_spring: [AxisSpring; 3],
}

/// What a pose constraint makes a bone follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PoseTarget {
    Body { body: String },
    Bone { armature: String, bone: String },
}

/// Copy-transforms constraint: the bone's pose tracks `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseConstraintDesc {
    pub armature: String,
    pub bone: String,
    pub target: PoseTarget,
}

/// Constraint with no limits whose only effect is to stop the two
/// bodies from colliding with each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoCollisionDesc {
    pub body_a: String,
    pub body_b: String,
}

/// In-memory scene sink, serialisable as the import's output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigScene {
    #[serde(default)]
    pub edit_bones: Vec<EditBoneDesc>,
    #[serde(default)]
    pub bodies: Vec<RigidBodyDesc>,
    #[serde(default)]
    pub springs: Vec<SpringConstraintDesc>,
    #[serde(default)]
    pub pose_constraints: Vec<PoseConstraintDesc>,
    #[serde(default)]
    pub no_collisions: Vec<NoCollisionDesc>,
    #[serde(skip)]
    body_index: HashMap<String, usize>,
}

impl RigScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, name: &str) -> Option<&RigidBodyDesc> {
        self.body_index.get(name).map(|&i| &self.bodies[i])
    }

    pub fn edit_bone(&self, name: &str) -> Option<&EditBoneDesc> {
        self.edit_bones.iter().find(|b| b.name == name)
    }

    /// Drop every rigid body and everything that depends on one,
    /// leaving the edit bones and bone-to-bone pose constraints
    pub fn remove_physics(&mut self) -> usize {
        let removed = self.bodies.len();
        self.bodies.clear();
        self.body_index.clear();
        self.springs.clear();
        self.no_collisions.clear();
        self.pose_constraints
            .retain(|c| !matches!(c.target, PoseTarget::Body { .. }));
        removed
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| rigport_core::RigportError::Serialize(e.to_string()))
    }

    /// Parse a scene previously written with [`RigScene::to_toml`]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut scene: RigScene = toml::from_str(content)
            .map_err(|e| rigport_core::RigportError::Serialize(e.to_string()))?;
        scene.body_index = scene
            .bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        Ok(scene)
    }
}

impl SceneSink for RigScene {
    fn add_edit_bone(&mut self, bone: EditBoneDesc) {
        self.edit_bones.push(bone);
    }

    fn has_body(&self, name: &str) -> bool {
        self.body_index.contains_key(name)
    }

    fn add_rigid_body(&mut self, body: RigidBodyDesc) {
        if self.has_body(&body.name) {
            log::warn!("Rigid body '{}' already exists, keeping the first", body.name);
            return;
        }
        self.body_index.insert(body.name.clone(), self.bodies.len());
        self.bodies.push(body);
    }

    fn add_spring_constraint(&mut self, constraint: SpringConstraintDesc) {
        self.springs.push(constraint);
    }

    fn add_pose_constraint(&mut self, constraint: PoseConstraintDesc) {
        self.pose_constraints.push(constraint);
    }

    fn add_no_collision(&mut self, link: NoCollisionDesc) {
        self.no_collisions.push(link);
    }
}
