//! Physics rig mapping: bone physics descriptors to bodies and constraints

use crate::rig::{
    AxisLimit, AxisSpring, BodyType, CollisionShape, NoCollisionDesc, PoseConstraintDesc,
    PoseTarget, RigidBodyDesc, SceneSink, SpringConstraintDesc,
};
use glam::Mat4;
use rigport_core::{ImportSettings, PhysicsSettings};
use rigport_import::{Armature, Bone, BonePhysics, BonePhysicsType};
use serde::Serialize;

/// Counts of what a mapping pass emitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhysicsReport {
    pub colliders: usize,
    pub pivots: usize,
    pub targets: usize,
    pub springs: usize,
    pub no_collision_links: usize,
    /// Spring bones dropped for lack of a resolved pivot
    pub skipped: usize,
}

impl PhysicsReport {
    pub fn bodies(&self) -> usize {
        self.colliders + self.pivots + self.targets
    }
}

/// Name of the body a spring bone creates for `bone` in the given role
pub fn spring_body_name(armature: &str, bone: &str, pivot: bool) -> String {
    let role = if pivot { "pivot" } else { "target" };
    format!("{}_{}_{}_rigidbody", armature, bone, role)
}

pub fn collider_body_name(bone: &str) -> String {
    format!("{}_rigidbody", bone)
}

/// Emit the physics rig of `armature` into `sink`.
///
/// Walks the skeleton root's subtree in DFS order. Colliders become passive
/// kinematic bodies that follow their bone. Each spring bone gets a pivot
/// and a target body (created once per name), a spring constraint between
/// them and a pose constraint making the bone follow the target. Finally
/// every pair of newly created targets is excluded from colliding.
pub fn emit_physics(
    armature: &mut Armature,
    import: &ImportSettings,
    settings: &PhysicsSettings,
    sink: &mut dyn SceneSink,
) -> PhysicsReport {
    let mut report = PhysicsReport::default();
    let Some(root) = armature.locate(&import.skeleton_root) else {
        log::debug!(
            "Armature '{}' has no '{}' bone, skipping physics",
            armature.name,
            import.skeleton_root
        );
        return report;
    };
    // Pivots may live outside the skeleton root's subtree
    armature.calculate_global_transforms_relative_to(root);

    let mut mapper = RigMapper {
        armature,
        settings,
        sink,
        targets: Vec::new(),
        report: &mut report,
    };
    let bones = mapper.armature;
    for (_, id, _) in bones.dfs(root) {
        let bone = bones.bone(id);
        let Some(physics) = &bone.physics else {
            continue;
        };
        match physics.kind {
            kind if kind.is_collider() => mapper.collider(bone, physics),
            BonePhysicsType::SpringBone => mapper.spring_bone(bone, physics),
            _ => {}
        }
    }
    mapper.exclude_target_pairs();

    log::info!(
        "Physics for '{}': {} bodies, {} springs, {} no-collision links",
        armature.name,
        report.bodies(),
        report.springs,
        report.no_collision_links
    );
    report
}

struct RigMapper<'a> {
    armature: &'a Armature,
    settings: &'a PhysicsSettings,
    sink: &'a mut dyn SceneSink,
    /// Target bodies created during this pass, in creation order
    targets: Vec<String>,
    report: &'a mut PhysicsReport,
}

impl RigMapper<'_> {
    fn collider(&mut self, bone: &Bone, physics: &BonePhysics) {
        let shape = match physics.kind {
            BonePhysicsType::SphereCollider => CollisionShape::Sphere {
                radius: physics.radius * self.settings.sphere_radius_factor,
            },
            _ => CollisionShape::Capsule {
                radius: physics.radius * self.settings.capsule_radius_factor,
                height: physics.height * self.settings.capsule_height_factor,
            },
        };
        let body = RigidBodyDesc {
            name: collider_body_name(&bone.name),
            body_type: BodyType::Passive,
            kinematic: true,
            collides: true,
            shape,
            parent_bone: Some(bone.name.clone()),
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
        .with_world_matrix(world_of(bone));
        self.sink.add_rigid_body(body);
        self.report.colliders += 1;
    }

    fn spring_bone(&mut self, bone: &Bone, physics: &BonePhysics) {
        let Some(pivot_name) = physics.pivot.as_deref() else {
            log::warn!("Spring bone '{}' has no pivot, skipping", bone.name);
            self.report.skipped += 1;
            return;
        };
        let armature_name = self.armature.name.clone();

        let pivot = spring_body_name(&armature_name, pivot_name, true);
        if !self.sink.has_body(&pivot) {
            let world = match self.armature.by_name(pivot_name) {
                Some(pivot_bone) => world_of(pivot_bone),
                None => {
                    log::warn!("Pivot bone '{}' not in armature, placing at origin", pivot_name);
                    Mat4::IDENTITY
                }
            };
            let body = RigidBodyDesc {
                name: pivot.clone(),
                body_type: BodyType::Active,
                kinematic: true,
                collides: false,
                shape: CollisionShape::Sphere {
                    radius: self.settings.pivot_size,
                },
                parent_bone: Some(pivot_name.to_string()),
                position: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
            }
            .with_world_matrix(world);
            self.sink.add_rigid_body(body);
            self.report.pivots += 1;
        }

        let target = spring_body_name(&armature_name, &bone.name, false);
        if !self.sink.has_body(&target) {
            let body = RigidBodyDesc {
                name: target.clone(),
                body_type: BodyType::Active,
                kinematic: false,
                collides: true,
                shape: CollisionShape::Sphere {
                    radius: physics.radius * self.settings.spring_bone_radius_factor,
                },
                parent_bone: None,
                position: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
            }
            .with_world_matrix(world_of(bone));
            self.sink.add_rigid_body(body);
            self.targets.push(target.clone());
            self.report.targets += 1;
        }

        self.sink
            .add_spring_constraint(spring_constraint(&armature_name, bone, physics, &pivot, &target));
        self.report.springs += 1;

        self.sink.add_pose_constraint(PoseConstraintDesc {
            armature: armature_name,
            bone: bone.name.clone(),
            target: PoseTarget::Body { body: target },
        });
    }

    fn exclude_target_pairs(&mut self) {
        for (i, a) in self.targets.iter().enumerate() {
            for b in &self.targets[i + 1..] {
                self.sink.add_no_collision(NoCollisionDesc {
                    body_a: a.clone(),
                    body_b: b.clone(),
                });
                self.report.no_collision_links += 1;
            }
        }
    }
}

/// Spring between pivot and target.
///
/// Linear motion is locked. Angular X is free; the descriptor's Z range
/// limits angular Y and its Y range limits angular Z. The angular spring is
/// on for all three axes with the descriptor's stiffness on Y and Z and
/// its drag as damping.
fn spring_constraint(
    armature: &str,
    bone: &Bone,
    physics: &BonePhysics,
    pivot: &str,
    target: &str,
) -> SpringConstraintDesc {
    let [y_lo, y_hi] = physics.z_angle_limits.to_radians();
    let [z_lo, z_hi] = physics.y_angle_limits.to_radians();
    let stiff = AxisSpring {
        enabled: true,
        stiffness: physics.angular_stiffness,
        damping: physics.drag_force,
    };
    SpringConstraintDesc {
        name: format!("{}_{}_spring", armature, bone.name),
        pivot: pivot.to_string(),
        target: target.to_string(),
        linear: [AxisLimit::LOCKED; 3],
        angular: [
            AxisLimit::FREE,
            AxisLimit::range(y_lo, y_hi),
            AxisLimit::range(z_lo, z_hi),
        ],
        angular_spring: [
            AxisSpring {
                enabled: true,
                stiffness: 0.0,
                damping: physics.drag_force,
            },
            stiff,
            stiff,
        ],
    }
}

fn world_of(bone: &Bone) -> Mat4 {
    bone.global_transform.unwrap_or(Mat4::IDENTITY)
}
