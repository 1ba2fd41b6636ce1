//! Rapier world that instantiated rigs are simulated in

use rapier3d::prelude::*;

/// Gravitational acceleration along host -Z
pub const GRAVITY: Real = 9.81;

/// Simulation state for rigs. Host space is Z-up, so gravity pulls along -Z.
///
/// Bodies always enter the world together with their single collider, which
/// is how the rig scene describes them.
pub struct PhysicsWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd: CCDSolver,
    gravity: Vector<Real>,
    elapsed: Real,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd: CCDSolver::new(),
            gravity: vector![0.0, 0.0, -GRAVITY],
            elapsed: 0.0,
        }
    }

    /// Add a body with its collider attached
    pub fn add_body(
        &mut self,
        body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = self.bodies.insert(body);
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        (body, collider)
    }

    pub fn add_joint(
        &mut self,
        a: RigidBodyHandle,
        b: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
    ) -> ImpulseJointHandle {
        self.joints.insert(a, b, joint, true)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn joint(&self, handle: ImpulseJointHandle) -> Option<&ImpulseJoint> {
        self.joints.get(handle)
    }

    /// World placement of a body
    pub fn pose(&self, handle: RigidBodyHandle) -> Option<Isometry<Real>> {
        self.bodies.get(handle).map(|body| *body.position())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Simulated time so far, in seconds
    pub fn elapsed(&self) -> Real {
        self.elapsed
    }

    pub fn step(&mut self, dt: Real) {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
        self.elapsed += dt;
    }

    /// Run `steps` fixed steps of `dt` seconds
    pub fn advance(&mut self, dt: Real, steps: u32) {
        for _ in 0..steps {
            self.step(dt);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
