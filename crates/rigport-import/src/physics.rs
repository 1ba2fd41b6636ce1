//! Secondary-physics descriptors read from spring-bone script components

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of physics script attached to a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonePhysicsType {
    SphereCollider,
    CapsuleCollider,
    SpringBone,
    SpringManager,
}

/// Script identifiers recognised as physics components
const SCRIPT_TABLE: &[(&str, BonePhysicsType)] = &[
    ("SpringSphereCollider", BonePhysicsType::SphereCollider),
    ("SpringCapsuleCollider", BonePhysicsType::CapsuleCollider),
    ("SekaiSpringBone", BonePhysicsType::SpringBone),
    ("SpringManager", BonePhysicsType::SpringManager),
];

impl BonePhysicsType {
    /// Classify a script identifier. Unrecognised scripts are not physics.
    pub fn from_script_name(name: &str) -> Option<Self> {
        SCRIPT_TABLE
            .iter()
            .find(|(script, _)| *script == name)
            .map(|(_, kind)| *kind)
    }

    pub fn script_name(&self) -> &'static str {
        SCRIPT_TABLE
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(script, _)| *script)
            .unwrap_or("")
    }

    pub fn is_collider(&self) -> bool {
        matches!(
            self,
            BonePhysicsType::SphereCollider | BonePhysicsType::CapsuleCollider
        )
    }
}

/// Angular range in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleLimits {
    pub min: f32,
    pub max: f32,
}

impl AngleLimits {
    pub fn to_radians(&self) -> [f32; 2] {
        [self.min.to_radians(), self.max.to_radians()]
    }
}

/// Classified physics data attached to a bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonePhysics {
    pub kind: BonePhysicsType,
    pub radius: f32,
    pub height: f32,
    pub angular_stiffness: f32,
    pub drag_force: f32,
    pub y_angle_limits: AngleLimits,
    pub z_angle_limits: AngleLimits,
    /// Name of the pivot bone, resolved during traversal
    pub pivot: Option<String>,
}

/// Script fields as they appear in the type tree. All optional here;
/// which ones are required depends on the kind.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptFields {
    radius: Option<f32>,
    height: Option<f32>,
    angular_stiffness: Option<f32>,
    drag_force: Option<f32>,
    y_angle_limits: Option<AngleLimits>,
    z_angle_limits: Option<AngleLimits>,
}

impl BonePhysics {
    /// Build a descriptor from a script's field dictionary.
    ///
    /// Returns None when a field the kind needs is missing or malformed;
    /// the bone is then imported without physics.
    pub fn from_fields(kind: BonePhysicsType, fields: &Map<String, Value>) -> Option<Self> {
        let parsed: ScriptFields = match serde_json::from_value(Value::Object(fields.clone())) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Malformed {} fields: {}", kind.script_name(), e);
                return None;
            }
        };

        let missing: Vec<&str> = match kind {
            BonePhysicsType::SphereCollider => required(&[("radius", parsed.radius.is_some())]),
            BonePhysicsType::CapsuleCollider => required(&[
                ("radius", parsed.radius.is_some()),
                ("height", parsed.height.is_some()),
            ]),
            BonePhysicsType::SpringBone => required(&[
                ("radius", parsed.radius.is_some()),
                ("angularStiffness", parsed.angular_stiffness.is_some()),
                ("yAngleLimits", parsed.y_angle_limits.is_some()),
                ("zAngleLimits", parsed.z_angle_limits.is_some()),
            ]),
            BonePhysicsType::SpringManager => Vec::new(),
        };
        if !missing.is_empty() {
            log::warn!(
                "{} is missing field(s) {}; ignoring",
                kind.script_name(),
                missing.join(", ")
            );
            return None;
        }

        Some(Self {
            kind,
            radius: parsed.radius.unwrap_or_default(),
            height: parsed.height.unwrap_or_default(),
            angular_stiffness: parsed.angular_stiffness.unwrap_or_default(),
            drag_force: parsed.drag_force.unwrap_or_default(),
            y_angle_limits: parsed.y_angle_limits.unwrap_or_default(),
            z_angle_limits: parsed.z_angle_limits.unwrap_or_default(),
            pivot: None,
        })
    }
}

fn required<'a>(checks: &[(&'a str, bool)]) -> Vec<&'a str> {
    checks
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

/// Path id referenced by a script's `pivotNode` field.
///
/// None when the field is absent, null or not a reference.
pub fn pivot_path_id(fields: &Map<String, Value>) -> Option<i64> {
    let value = fields.get("pivotNode")?;
    let path_id = value.get("m_PathID").and_then(Value::as_i64);
    if path_id.is_none() {
        log::warn!("pivotNode is not an object reference: {}", value);
    }
    path_id.filter(|&id| id != 0)
}
