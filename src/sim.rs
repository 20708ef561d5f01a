//! Couples the physics world to the rendered scene.
//!
//! Each [`SimObject`] pairs one rigid body with one render [`Instance`];
//! after every solver step the body pose is copied into the instance, so
//! the renderer never reads physics state directly. The [`Simulation`]
//! also owns the pause flag and the game clock used for scoring.

use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use instant::Duration;

use crate::{
    data_structures::instance::Instance,
    physics::{BodyKind, PhysicsWorld, RigidBodyHandle, Shape},
};

/// One simulated, rendered object.
pub struct SimObject {
    pub instance: Instance,
    spawn_position: Vector3<f32>,
    spawn_rotation: Quaternion<f32>,
    body: RigidBodyHandle,
}

impl SimObject {
    fn new(body: RigidBodyHandle, position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        let mut instance = Instance::new();
        instance.position = position;
        instance.rotation = rotation;
        Self {
            instance,
            spawn_position: position,
            spawn_rotation: rotation,
            body,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn position(&self) -> Vector3<f32> {
        self.instance.position
    }

    /// Copy the body pose into the render instance. Calling this twice
    /// without a solver step in between changes nothing.
    pub fn sync_pose(&mut self, world: &PhysicsWorld) {
        self.instance.position = world.position(self.body);
        self.instance.rotation = world.rotation(self.body);
    }

    /// Put the object back at its spawn pose with all momentum dropped.
    pub fn respawn(&mut self, world: &mut PhysicsWorld) {
        world.teleport(self.body, self.spawn_position, self.spawn_rotation);
        self.sync_pose(world);
    }
}

/// Accumulated board tilt, clamped per axis.
///
/// Input deltas add onto two absolute angles around the world x and z
/// axes; the clamp keeps the board from flipping over no matter how fast
/// the mouse moves.
#[derive(Clone, Copy, Debug)]
pub struct TiltControl {
    around_x: f32,
    around_z: f32,
    limit: f32,
}

impl TiltControl {
    pub fn new(limit: f32) -> Self {
        Self {
            around_x: 0.0,
            around_z: 0.0,
            limit,
        }
    }

    pub fn apply(&mut self, dx: f32, dz: f32) {
        self.around_x = (self.around_x + dx).clamp(-self.limit, self.limit);
        self.around_z = (self.around_z + dz).clamp(-self.limit, self.limit);
    }

    pub fn reset(&mut self) {
        self.around_x = 0.0;
        self.around_z = 0.0;
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_axis_angle(Vector3::unit_z(), Rad(self.around_z))
            * Quaternion::from_axis_angle(Vector3::unit_x(), Rad(self.around_x))
    }
}

/// The physics world, its objects and the game clock.
pub struct Simulation {
    pub world: PhysicsWorld,
    pub objects: Vec<SimObject>,
    paused: bool,
    game_time: Duration,
}

impl Simulation {
    pub fn new(gravity: [f32; 3]) -> Self {
        Self {
            world: PhysicsWorld::new(gravity),
            objects: Vec::new(),
            paused: false,
            game_time: Duration::ZERO,
        }
    }

    /// Insert a body and its paired render instance; returns the index
    /// into [`Simulation::objects`].
    pub fn spawn(
        &mut self,
        kind: BodyKind,
        shape: Shape,
        position: Vector3<f32>,
    ) -> usize {
        let body = self.world.insert_body(kind, shape, position);
        self.objects
            .push(SimObject::new(body, position, Quaternion::new(1.0, 0.0, 0.0, 0.0)));
        self.objects.len() - 1
    }

    /// Step physics and sync every object. While paused neither the
    /// world nor the game clock advances.
    pub fn advance(&mut self, dt: Duration) {
        if self.paused {
            return;
        }
        self.world.step(dt.as_secs_f32());
        for object in &mut self.objects {
            object.sync_pose(&self.world);
        }
        self.game_time += dt;
    }

    /// Respawn one object by index.
    pub fn respawn(&mut self, index: usize) {
        if let Some(object) = self.objects.get_mut(index) {
            object.respawn(&mut self.world);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time the current run has been actively simulating.
    pub fn game_time(&self) -> Duration {
        self.game_time
    }

    /// Start timing a fresh run.
    pub fn restart_clock(&mut self) {
        self.game_time = Duration::ZERO;
    }
}
