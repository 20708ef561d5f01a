//! Headless simulation tests: no window, no GPU, just the physics world
//! and the game rules driving it.

use std::time::Duration;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3, Zero};
use tiltbox::{
    game::zones::{Zone, ZoneTrigger},
    physics::{BodyKind, PhysicsWorld, Shape},
    sim::{Simulation, TiltControl},
};

const STEP: Duration = Duration::from_millis(16);

fn ball_on_floor() -> (Simulation, usize, usize) {
    let mut sim = Simulation::new([0.0, -10.0, 0.0]);
    let floor = sim.spawn(
        BodyKind::Fixed,
        Shape::Cuboid {
            half_extents: [10.0, 0.5, 10.0],
        },
        Vector3::new(0.0, -0.5, 0.0),
    );
    let ball = sim.spawn(
        BodyKind::Dynamic { mass: 1.0 },
        Shape::Ball { radius: 0.5 },
        Vector3::new(0.0, 5.0, 0.0),
    );
    (sim, floor, ball)
}

#[test]
fn gravity_pulls_a_dynamic_ball_down() {
    let (mut sim, _, ball) = ball_on_floor();
    let start = sim.objects[ball].position().y;
    for _ in 0..30 {
        sim.advance(STEP);
    }
    let now = sim.objects[ball].position().y;
    assert!(now < start, "ball did not fall: {start} -> {now}");
}

#[test]
fn a_fixed_body_never_moves() {
    let (mut sim, floor, _) = ball_on_floor();
    for _ in 0..60 {
        sim.advance(STEP);
    }
    let position = sim.objects[floor].position();
    assert!((position - Vector3::new(0.0, -0.5, 0.0)).magnitude() < 1e-5);
}

#[test]
fn pause_freezes_world_and_clock() {
    let (mut sim, _, ball) = ball_on_floor();
    sim.advance(STEP);
    let steps_before = sim.world.steps();
    let time_before = sim.game_time();
    let pose_before = sim.objects[ball].instance.clone();

    sim.toggle_pause();
    for _ in 0..10 {
        sim.advance(STEP);
    }

    assert_eq!(sim.world.steps(), steps_before);
    assert_eq!(sim.game_time(), time_before);
    assert_eq!(sim.objects[ball].instance, pose_before);

    sim.toggle_pause();
    sim.advance(STEP);
    assert_eq!(sim.world.steps(), steps_before + 1);
    assert!(sim.game_time() > time_before);
}

#[test]
fn game_time_accumulates_per_advance() {
    let (mut sim, _, _) = ball_on_floor();
    for _ in 0..10 {
        sim.advance(STEP);
    }
    assert_eq!(sim.game_time(), STEP * 10);
    sim.restart_clock();
    assert_eq!(sim.game_time(), Duration::ZERO);
}

#[test]
fn respawn_restores_pose_and_drops_momentum() {
    let (mut sim, _, ball) = ball_on_floor();
    let body = sim.objects[ball].body();
    sim.world
        .set_angular_velocity(body, Vector3::new(3.0, 0.0, 0.0));
    for _ in 0..30 {
        sim.advance(STEP);
    }
    assert!(sim.objects[ball].position().y < 5.0);

    sim.respawn(ball);

    assert_eq!(sim.objects[ball].position(), Vector3::new(0.0, 5.0, 0.0));
    assert!(sim.world.linear_velocity(body).magnitude() < 1e-6);
    assert!(sim.world.angular_velocity(body).magnitude() < 1e-6);
}

#[test]
fn sync_without_a_step_changes_nothing() {
    let (mut sim, _, ball) = ball_on_floor();
    sim.advance(STEP);
    let pose = sim.objects[ball].instance.clone();
    let world = &sim.world;
    sim.objects[ball].sync_pose(world);
    sim.objects[ball].sync_pose(world);
    assert_eq!(sim.objects[ball].instance, pose);
}

#[test]
fn kinematic_body_follows_its_target_pose() {
    let mut sim = Simulation::new([0.0, -10.0, 0.0]);
    let board = sim.spawn(
        BodyKind::Kinematic,
        Shape::Cuboid {
            half_extents: [5.0, 0.2, 5.0],
        },
        Vector3::new(0.0, 0.0, 0.0),
    );
    let mut tilt = TiltControl::new(0.5);
    tilt.apply(0.2, 0.0);

    let body = sim.objects[board].body();
    sim.world
        .set_kinematic_pose(body, Vector3::zero(), tilt.rotation());
    sim.advance(STEP);

    let rotation = sim.objects[board].instance.rotation;
    let expected = Quaternion::from_axis_angle(Vector3::unit_x(), Rad(0.2));
    assert!(
        (rotation.s - expected.s).abs() < 1e-4 && (rotation.v - expected.v).magnitude() < 1e-4,
        "rotation {rotation:?} vs {expected:?}"
    );
}

#[test]
fn tilt_stays_clamped_under_wild_input() {
    let mut tilt = TiltControl::new(0.5);
    for _ in 0..1000 {
        tilt.apply(0.3, -0.4);
    }
    let rotation = tilt.rotation();
    let expected = Quaternion::from_axis_angle(Vector3::unit_z(), Rad(-0.5))
        * Quaternion::from_axis_angle(Vector3::unit_x(), Rad(0.5));
    assert!((rotation.s - expected.s).abs() < 1e-5);
    assert!((rotation.v - expected.v).magnitude() < 1e-5);

    tilt.reset();
    let identity = tilt.rotation();
    assert!((identity.s - 1.0).abs() < 1e-6);
    assert!(identity.v.magnitude() < 1e-6);
}

#[test]
fn zero_dt_does_not_step_the_world() {
    let mut world = PhysicsWorld::new([0.0, -10.0, 0.0]);
    world.step(0.0);
    world.step(-1.0);
    assert_eq!(world.steps(), 0);
}

#[test]
fn removed_bodies_free_their_slot() {
    let mut world = PhysicsWorld::new([0.0, -10.0, 0.0]);
    let handle = world.insert_body(
        BodyKind::Dynamic { mass: 1.0 },
        Shape::Ball { radius: 0.5 },
        Vector3::new(0.0, 1.0, 0.0),
    );
    world.remove_body(handle);
    // The world keeps stepping fine without the body.
    world.step(0.016);
    assert_eq!(world.steps(), 1);
}

#[test]
fn falling_ball_trips_the_fall_zone_once() {
    let mut sim = Simulation::new([0.0, -10.0, 0.0]);
    let ball = sim.spawn(
        BodyKind::Dynamic { mass: 1.0 },
        Shape::Ball { radius: 0.5 },
        Vector3::new(0.0, 2.0, 0.0),
    );
    let mut fall = ZoneTrigger::new(Zone::Below { y: -15.0 });

    let mut fires = 0;
    for _ in 0..600 {
        sim.advance(STEP);
        if fall.observe(sim.objects[ball].position()) {
            fires += 1;
        }
    }
    assert_eq!(fires, 1, "fall zone should latch after the first crossing");
}
