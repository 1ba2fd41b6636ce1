//! Instantiation of an emitted rig in Rapier, and pose readback

use crate::rig::{
    BodyType, CollisionShape, PoseTarget, RigScene, RigidBodyDesc, SpringConstraintDesc,
};
use crate::world::PhysicsWorld;
use rapier3d::na;
use rapier3d::prelude::*;
use rigport_core::{Result, RigportError};
use serde::Serialize;
use std::collections::HashMap;

const LINEAR_AXES: [(JointAxis, JointAxesMask); 3] = [
    (JointAxis::LinX, JointAxesMask::LIN_X),
    (JointAxis::LinY, JointAxesMask::LIN_Y),
    (JointAxis::LinZ, JointAxesMask::LIN_Z),
];
const ANGULAR_AXES: [(JointAxis, JointAxesMask); 3] = [
    (JointAxis::AngX, JointAxesMask::ANG_X),
    (JointAxis::AngY, JointAxesMask::ANG_Y),
    (JointAxis::AngZ, JointAxesMask::ANG_Z),
];

/// World pose a bone should take from its pose constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonePose {
    pub armature: String,
    pub bone: String,
    pub position: [f32; 3],
    /// [x, y, z, w]
    pub rotation: [f32; 4],
}

/// Handles of a rig's bodies and joints inside a [`PhysicsWorld`]
#[derive(Debug, Default)]
pub struct RapierRig {
    /// Body name -> RigidBodyHandle mapping
    pub body_map: HashMap<String, RigidBodyHandle>,
    /// Body name -> ColliderHandle mapping
    pub collider_map: HashMap<String, ColliderHandle>,
    /// Spring constraint name -> joint handle mapping
    pub spring_map: HashMap<String, ImpulseJointHandle>,
    pub no_collision_joints: Vec<ImpulseJointHandle>,
    /// (armature, bone, target body) for every body-targeted pose constraint
    pose_links: Vec<(String, String, RigidBodyHandle)>,
}

impl RapierRig {
    /// Create bodies, colliders and joints for every element of `scene`
    pub fn instantiate(scene: &RigScene, world: &mut PhysicsWorld) -> Result<Self> {
        let mut rig = Self::default();

        for desc in &scene.bodies {
            let (body, collider) = world.add_body(build_body(desc), build_collider(desc));
            rig.body_map.insert(desc.name.clone(), body);
            rig.collider_map.insert(desc.name.clone(), collider);
        }

        for spring in &scene.springs {
            let pivot = rig.handle(&spring.pivot)?;
            let target = rig.handle(&spring.target)?;
            let joint = build_spring(spring, world, pivot, target)?;
            let handle = world.add_joint(pivot, target, joint);
            rig.spring_map.insert(spring.name.clone(), handle);
        }

        for link in &scene.no_collisions {
            let a = rig.handle(&link.body_a)?;
            let b = rig.handle(&link.body_b)?;
            let joint = GenericJointBuilder::new(JointAxesMask::empty()).contacts_enabled(false);
            rig.no_collision_joints.push(world.add_joint(a, b, joint));
        }

        for constraint in &scene.pose_constraints {
            if let PoseTarget::Body { body } = &constraint.target {
                let handle = rig.handle(body)?;
                rig.pose_links
                    .push((constraint.armature.clone(), constraint.bone.clone(), handle));
            }
        }

        log::info!(
            "Instantiated {} bodies, {} springs, {} no-collision joints",
            rig.body_map.len(),
            rig.spring_map.len(),
            rig.no_collision_joints.len()
        );
        Ok(rig)
    }

    fn handle(&self, name: &str) -> Result<RigidBodyHandle> {
        self.body_map
            .get(name)
            .copied()
            .ok_or_else(|| RigportError::Physics(format!("unknown rigid body '{}'", name)))
    }

    /// Current pose of every bone driven by a body
    pub fn bone_poses(&self, world: &PhysicsWorld) -> Vec<BonePose> {
        self.pose_links
            .iter()
            .filter_map(|(armature, bone, handle)| {
                let iso = world.pose(*handle)?;
                let t = iso.translation.vector;
                let r = iso.rotation.into_inner();
                Some(BonePose {
                    armature: armature.clone(),
                    bone: bone.clone(),
                    position: [t.x, t.y, t.z],
                    rotation: [r.i, r.j, r.k, r.w],
                })
            })
            .collect()
    }
}

fn isometry_of(desc: &RigidBodyDesc) -> Isometry<Real> {
    let [x, y, z] = desc.position;
    let [qx, qy, qz, qw] = desc.rotation;
    let rotation = na::UnitQuaternion::from_quaternion(na::Quaternion::new(qw, qx, qy, qz));
    Isometry::from_parts(na::Translation3::new(x, y, z), rotation)
}

fn build_body(desc: &RigidBodyDesc) -> RigidBody {
    let builder = match (desc.kinematic, desc.body_type) {
        (true, _) => RigidBodyBuilder::kinematic_position_based(),
        (false, BodyType::Passive) => RigidBodyBuilder::fixed(),
        (false, BodyType::Active) => RigidBodyBuilder::dynamic(),
    };
    builder.position(isometry_of(desc)).build()
}

fn build_collider(desc: &RigidBodyDesc) -> Collider {
    let builder = match desc.shape {
        CollisionShape::Sphere { radius } => ColliderBuilder::ball(radius),
        CollisionShape::Capsule { radius, height } => {
            ColliderBuilder::capsule_z((height * 0.5 - radius).max(0.0), radius)
        }
    };
    if desc.collides {
        builder.build()
    } else {
        builder
            .collision_groups(InteractionGroups::new(Group::NONE, Group::NONE))
            .build()
    }
}

/// Generic joint with its frame at the pivot's origin, so the bodies'
/// initial placement is the rest pose
fn build_spring(
    spring: &SpringConstraintDesc,
    world: &PhysicsWorld,
    pivot: RigidBodyHandle,
    target: RigidBodyHandle,
) -> Result<GenericJoint> {
    let pose = |handle: RigidBodyHandle| {
        world
            .pose(handle)
            .ok_or_else(|| RigportError::Physics(format!("missing body for '{}'", spring.name)))
    };
    let pivot_iso = pose(pivot)?;
    let target_iso = pose(target)?;

    let mut locked = JointAxesMask::empty();
    for (limit, (_, mask)) in spring
        .linear
        .iter()
        .chain(spring.angular.iter())
        .zip(LINEAR_AXES.iter().chain(ANGULAR_AXES.iter()))
    {
        if limit.is_locked() {
            locked |= *mask;
        }
    }

    let mut builder = GenericJointBuilder::new(locked)
        .local_frame1(Isometry::identity())
        .local_frame2(target_iso.inverse() * pivot_iso);
    for (limit, (axis, _)) in spring
        .linear
        .iter()
        .chain(spring.angular.iter())
        .zip(LINEAR_AXES.iter().chain(ANGULAR_AXES.iter()))
    {
        if limit.enabled && !limit.is_locked() {
            builder = builder.limits(*axis, [limit.lower, limit.upper]);
        }
    }
    for (spring_axis, (axis, _)) in spring.angular_spring.iter().zip(ANGULAR_AXES.iter()) {
        if spring_axis.enabled && spring_axis.stiffness > 0.0 {
            builder = builder.motor_position(*axis, 0.0, spring_axis.stiffness, spring_axis.damping);
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{AxisLimit, AxisSpring, NoCollisionDesc, PoseConstraintDesc, SceneSink};

    fn sphere(name: &str, kinematic: bool, collides: bool, z: f32) -> RigidBodyDesc {
        RigidBodyDesc {
            name: name.to_string(),
            body_type: BodyType::Active,
            kinematic,
            collides,
            shape: CollisionShape::Sphere { radius: 0.01 },
            parent_bone: None,
            position: [0.0, 0.0, z],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    fn pendulum() -> RigScene {
        let mut scene = RigScene::new();
        scene.add_rigid_body(sphere("pivot", true, false, 1.0));
        scene.add_rigid_body(sphere("target", false, true, 0.8));
        let spring = AxisSpring {
            enabled: true,
            stiffness: 20.0,
            damping: 0.4,
        };
        scene.add_spring_constraint(SpringConstraintDesc {
            name: "hair_spring".into(),
            pivot: "pivot".into(),
            target: "target".into(),
            linear: [AxisLimit::LOCKED; 3],
            angular: [
                AxisLimit::FREE,
                AxisLimit::range(-0.5, 0.5),
                AxisLimit::range(-0.5, 0.5),
            ],
            angular_spring: [spring; 3],
        });
        scene.add_pose_constraint(PoseConstraintDesc {
            armature: "chr".into(),
            bone: "Hair".into(),
            target: PoseTarget::Body {
                body: "target".into(),
            },
        });
        scene
    }

    #[test]
    fn test_instantiate_bodies_and_joints() {
        let mut world = PhysicsWorld::new();
        let rig = RapierRig::instantiate(&pendulum(), &mut world).unwrap();

        assert_eq!(world.body_count(), 2);
        assert_eq!(world.joint_count(), 1);
        let pivot = world.body(rig.body_map["pivot"]).unwrap();
        assert!(pivot.is_kinematic());
        let target = world.body(rig.body_map["target"]).unwrap();
        assert!(target.is_dynamic());

        let pivot_collider = world.collider(rig.collider_map["pivot"]).unwrap();
        assert_eq!(
            pivot_collider.collision_groups(),
            InteractionGroups::new(Group::NONE, Group::NONE)
        );
    }

    #[test]
    fn test_pose_readback_matches_target() {
        let mut world = PhysicsWorld::new();
        let rig = RapierRig::instantiate(&pendulum(), &mut world).unwrap();

        let poses = rig.bone_poses(&world);
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].bone, "Hair");
        assert!((poses[0].position[2] - 0.8).abs() < 1e-6);
        assert!((poses[0].rotation[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_locked_linear_axes_keep_distance() {
        let mut world = PhysicsWorld::new();
        let rig = RapierRig::instantiate(&pendulum(), &mut world).unwrap();
        world.advance(1.0 / 60.0, 120);
        let target = world.pose(rig.body_map["target"]).unwrap();
        let pivot = world.pose(rig.body_map["pivot"]).unwrap();
        let distance = (target.translation.vector - pivot.translation.vector).norm();
        assert!((distance - 0.2).abs() < 0.05, "{}", distance);
    }

    #[test]
    fn test_no_collision_joint_disables_contacts() {
        let mut scene = pendulum();
        scene.add_rigid_body(sphere("other", false, true, 0.5));
        scene.add_no_collision(NoCollisionDesc {
            body_a: "target".into(),
            body_b: "other".into(),
        });
        let mut world = PhysicsWorld::new();
        let rig = RapierRig::instantiate(&scene, &mut world).unwrap();

        assert_eq!(rig.no_collision_joints.len(), 1);
        let joint = world.joint(rig.no_collision_joints[0]).unwrap();
        assert!(!joint.data.contacts_enabled());
    }

    #[test]
    fn test_unknown_body_is_error() {
        let mut scene = RigScene::new();
        scene.add_no_collision(NoCollisionDesc {
            body_a: "a".into(),
            body_b: "b".into(),
        });
        let mut world = PhysicsWorld::new();
        let err = RapierRig::instantiate(&scene, &mut world).unwrap_err();
        assert!(matches!(err, RigportError::Physics(_)));
    }
}
