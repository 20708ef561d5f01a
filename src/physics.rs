//! Rigid-body physics on top of rapier3d.
//!
//! [`PhysicsWorld`] owns the full rapier state behind a small surface:
//! insert bodies, step, read poses back, teleport. Handles stay valid
//! until [`PhysicsWorld::remove_body`]; looking up a removed handle is a
//! caller bug and panics with the invariant message.

use rapier3d::na;
use rapier3d::prelude::*;

pub use rapier3d::prelude::RigidBodyHandle;

/// Triangle soup for mesh colliders, shared with the OBJ loader.
#[derive(Clone, Debug, Default)]
pub struct TrimeshData {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<[u32; 3]>,
}

/// How a body participates in the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyKind {
    /// Fully simulated, affected by gravity and contacts.
    Dynamic { mass: f32 },
    /// Position driven from game code, pushes dynamic bodies around.
    Kinematic,
    /// Never moves.
    Fixed,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Trimesh(TrimeshData),
    Ball { radius: f32 },
    Cuboid { half_extents: [f32; 3] },
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(gravity: [f32; 3]) -> Self {
        Self {
            gravity: vector![gravity[0], gravity[1], gravity[2]],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            steps: 0,
        }
    }

    /// Advance the world by `dt` seconds. Zero or negative deltas are
    /// ignored so a stalled frame timer cannot run the solver backwards.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.steps += 1;
    }

    /// Number of solver steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn insert_body(
        &mut self,
        kind: BodyKind,
        shape: Shape,
        position: cgmath::Vector3<f32>,
    ) -> RigidBodyHandle {
        let builder = match kind {
            BodyKind::Dynamic { mass } => RigidBodyBuilder::dynamic()
                .additional_mass(mass)
                // Small game worlds: a sleeping ball on a tilting board
                // would stop reacting to the tilt.
                .can_sleep(false),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let body = builder
            .translation(vector![position.x, position.y, position.z])
            .build();
        let handle = self.bodies.insert(body);

        let collider = match shape {
            Shape::Trimesh(data) => {
                let vertices = data
                    .vertices
                    .iter()
                    .map(|v| point![v[0], v[1], v[2]])
                    .collect();
                ColliderBuilder::trimesh(vertices, data.indices)
            }
            Shape::Ball { radius } => ColliderBuilder::ball(radius),
            Shape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents[0], half_extents[1], half_extents[2])
            }
        };
        self.colliders
            .insert_with_parent(collider.friction(0.5).build(), handle, &mut self.bodies);

        handle
    }

    /// Remove a body and everything attached to it. The handle must not
    /// be used afterwards.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn position(&self, handle: RigidBodyHandle) -> cgmath::Vector3<f32> {
        let translation = self.body(handle).translation();
        cgmath::Vector3::new(translation.x, translation.y, translation.z)
    }

    pub fn rotation(&self, handle: RigidBodyHandle) -> cgmath::Quaternion<f32> {
        let rotation = self.body(handle).rotation();
        cgmath::Quaternion::new(rotation.w, rotation.i, rotation.j, rotation.k)
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> cgmath::Vector3<f32> {
        let velocity = self.body(handle).linvel();
        cgmath::Vector3::new(velocity.x, velocity.y, velocity.z)
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: cgmath::Vector3<f32>) {
        self.body_mut(handle)
            .set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> cgmath::Vector3<f32> {
        let velocity = self.body(handle).angvel();
        cgmath::Vector3::new(velocity.x, velocity.y, velocity.z)
    }

    pub fn set_angular_velocity(
        &mut self,
        handle: RigidBodyHandle,
        velocity: cgmath::Vector3<f32>,
    ) {
        self.body_mut(handle)
            .set_angvel(vector![velocity.x, velocity.y, velocity.z], true);
    }

    /// Hard reset of a body: place it at a pose and drop all momentum.
    pub fn teleport(
        &mut self,
        handle: RigidBodyHandle,
        position: cgmath::Vector3<f32>,
        rotation: cgmath::Quaternion<f32>,
    ) {
        let body = self.body_mut(handle);
        body.set_position(to_isometry(position, rotation), true);
        body.set_linvel(vector![0.0, 0.0, 0.0], true);
        body.set_angvel(vector![0.0, 0.0, 0.0], true);
    }

    /// Target pose for a kinematic body; rapier derives the velocities
    /// that carry contacts along, so a tilting board flings the ball
    /// instead of passing through it.
    pub fn set_kinematic_pose(
        &mut self,
        handle: RigidBodyHandle,
        position: cgmath::Vector3<f32>,
        rotation: cgmath::Quaternion<f32>,
    ) {
        self.body_mut(handle)
            .set_next_kinematic_position(to_isometry(position, rotation));
    }

    fn body(&self, handle: RigidBodyHandle) -> &RigidBody {
        self.bodies.get(handle).expect("unknown rigid-body handle")
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        self.bodies
            .get_mut(handle)
            .expect("unknown rigid-body handle")
    }
}

fn to_isometry(
    position: cgmath::Vector3<f32>,
    rotation: cgmath::Quaternion<f32>,
) -> Isometry<Real> {
    let translation = Translation::from(vector![position.x, position.y, position.z]);
    let rotation = na::UnitQuaternion::from_quaternion(na::Quaternion::new(
        rotation.s,
        rotation.v.x,
        rotation.v.y,
        rotation.v.z,
    ));
    Isometry::from_parts(translation, rotation)
}
