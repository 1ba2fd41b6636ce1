//! Rigport Physics - rig emission and Rapier 3D integration
//!
//! Turns a reconstructed armature into a host-side description:
//! - `emit_armature` - edit bones in host coordinates
//! - `emit_physics` - colliders, spring-bone pivot/target pairs and their constraints
//! - `neck_attach` - pose link between two armatures
//! - `RapierRig` - instantiates a `RigScene` in a `PhysicsWorld` and reads poses back

pub mod attach;
pub mod mapper;
pub mod rig;
pub mod skeleton;
pub mod sync;
pub mod world;

pub use attach::{neck_attach, DEFAULT_ATTACH_BONE};
pub use mapper::{collider_body_name, emit_physics, spring_body_name, PhysicsReport};
pub use rig::{
    AxisLimit, AxisSpring, BodyType, CollisionShape, EditBoneDesc, NoCollisionDesc,
    PoseConstraintDesc, PoseTarget, RigScene, RigidBodyDesc, SceneSink, SpringConstraintDesc,
};
pub use skeleton::emit_armature;
pub use sync::{BonePose, RapierRig};
pub use world::PhysicsWorld;
