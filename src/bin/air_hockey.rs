//! Two-player air hockey on one keyboard.
//!
//! Player one drives their paddle with WASD, player two with IJKL. The
//! puck starts at center and respawns there after every goal. `c` cycles
//! through the camera presets (paddle controls follow the view), `p`
//! pauses, `r` restarts the match, escape quits.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use instant::Duration;
use tiltbox::{
    camera::CameraPreset,
    context::{Context, InitContext},
    data_structures::{instance::Instance, model::Model},
    flow::{self, FlowConstructor, GraphicsFlow, Out},
    game::{
        config::GameConfig,
        zones::{Zone, ZoneTrigger},
    },
    physics::{BodyKind, Shape},
    render::{Instanced, Render},
    resources::{load_collision_mesh, load_model_obj},
    sim::Simulation,
};
use wgpu::util::DeviceExt;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

const CONFIG_PATH: &str = "./assets/air_hockey.toml";
const PADDLE_RADIUS: f32 = 0.7;
const PUCK_RADIUS: f32 = 0.4;
/// Paddle speed while a movement key is held.
const PADDLE_SPEED: f32 = 8.0;

#[derive(Default)]
struct PlayerKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

impl PlayerKeys {
    /// Velocity in view space: forward and left as seen from the camera.
    fn intent(&self) -> (f32, f32) {
        (
            (self.forward as i32 - self.back as i32) as f32,
            (self.left as i32 - self.right as i32) as f32,
        )
    }
}

struct HockeyFlow {
    sim: Simulation,
    table: usize,
    paddles: [usize; 2],
    puck: usize,
    table_model: Model,
    paddle_model: Model,
    puck_model: Model,
    table_buffer: wgpu::Buffer,
    paddle_buffer: wgpu::Buffer,
    puck_buffer: wgpu::Buffer,
    /// Goal behind player one and player two respectively.
    goals: [ZoneTrigger; 2],
    scores: [u32; 2],
    preset: CameraPreset,
    keys: [PlayerKeys; 2],
    title: String,
}

/// Score line for the window title, standing in for an on-screen text
/// overlay.
fn score_line(scores: [u32; 2], paused: bool) -> String {
    let mut line = format!("air hockey | {} : {}", scores[0], scores[1]);
    if paused {
        line.push_str(" | paused");
    }
    line
}

impl HockeyFlow {
    async fn new(init: InitContext, config: GameConfig) -> anyhow::Result<Self> {
        let table_model = load_model_obj("hockey_table.obj", &init.device, &init.queue).await?;
        let paddle_model = load_model_obj("paddle.obj", &init.device, &init.queue).await?;
        let puck_model = load_model_obj("puck.obj", &init.device, &init.queue).await?;
        let table_collision = load_collision_mesh("hockey_table.obj").await?;

        let mut sim = Simulation::new(config.gravity);
        let table = sim.spawn(
            BodyKind::Fixed,
            Shape::Trimesh(table_collision),
            config.spawn("table"),
        );
        let paddles = [
            sim.spawn(
                BodyKind::Dynamic { mass: 2.0 },
                Shape::Ball {
                    radius: PADDLE_RADIUS,
                },
                config.spawn("paddle_p1"),
            ),
            sim.spawn(
                BodyKind::Dynamic { mass: 2.0 },
                Shape::Ball {
                    radius: PADDLE_RADIUS,
                },
                config.spawn("paddle_p2"),
            ),
        ];
        let puck = sim.spawn(
            BodyKind::Dynamic { mass: 0.2 },
            Shape::Ball {
                radius: PUCK_RADIUS,
            },
            config.spawn("puck"),
        );

        let table_buffer =
            mk_instance_buffer(&init.device, &[sim.objects[table].instance.clone()], "table");
        let paddle_buffer = mk_instance_buffer(
            &init.device,
            &[
                sim.objects[paddles[0]].instance.clone(),
                sim.objects[paddles[1]].instance.clone(),
            ],
            "paddles",
        );
        let puck_buffer =
            mk_instance_buffer(&init.device, &[sim.objects[puck].instance.clone()], "puck");

        let goals = [
            ZoneTrigger::new(config.zone("goal_p1").unwrap_or(Zone::Box {
                min: [-2.0, -5.0, -14.0],
                max: [2.0, 2.0, -10.1],
            })),
            ZoneTrigger::new(config.zone("goal_p2").unwrap_or(Zone::Box {
                min: [-2.0, -5.0, 10.1],
                max: [2.0, 2.0, 14.0],
            })),
        ];

        Ok(Self {
            sim,
            table,
            paddles,
            puck,
            table_model,
            paddle_model,
            puck_model,
            table_buffer,
            paddle_buffer,
            puck_buffer,
            goals,
            scores: [0, 0],
            preset: CameraPreset::Overhead,
            keys: [PlayerKeys::default(), PlayerKeys::default()],
            title: String::new(),
        })
    }

    /// View-relative movement basis on the table plane for the current
    /// camera, so "forward" always means "up on screen".
    fn movement_basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let eye = self.preset.eye();
        let mut forward = Vector3::new(-eye.x, 0.0, -eye.z);
        if forward.magnitude() < 1e-3 {
            forward = Vector3::unit_z();
        }
        let forward = forward.normalize();
        let left = Vector3::unit_y().cross(forward);
        (forward, left)
    }

    fn drive_paddles(&mut self) {
        let (forward, left) = self.movement_basis();
        for (index, keys) in self.keys.iter().enumerate() {
            let (ahead, side) = keys.intent();
            let velocity = (forward * ahead + left * side) * PADDLE_SPEED;
            let body = self.sim.objects[self.paddles[index]].body();
            let fall = self.sim.world.linear_velocity(body).y;
            self.sim
                .world
                .set_linear_velocity(body, Vector3::new(velocity.x, fall, velocity.z));
        }
    }

    fn reset_positions(&mut self) {
        self.sim.respawn(self.paddles[0]);
        self.sim.respawn(self.paddles[1]);
        self.sim.respawn(self.puck);
        for goal in &mut self.goals {
            goal.reset();
        }
    }

    fn restart_match(&mut self) {
        self.scores = [0, 0];
        self.reset_positions();
        self.sim.restart_clock();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> Out {
        match key {
            // player one
            KeyCode::KeyW => self.keys[0].forward = pressed,
            KeyCode::KeyS => self.keys[0].back = pressed,
            KeyCode::KeyA => self.keys[0].left = pressed,
            KeyCode::KeyD => self.keys[0].right = pressed,
            // player two
            KeyCode::KeyI => self.keys[1].forward = pressed,
            KeyCode::KeyK => self.keys[1].back = pressed,
            KeyCode::KeyJ => self.keys[1].left = pressed,
            KeyCode::KeyL => self.keys[1].right = pressed,
            KeyCode::KeyC if pressed => {
                self.preset = self.preset.next();
                let preset = self.preset;
                return Out::Configure(Box::new(move |ctx| {
                    ctx.camera
                        .controller
                        .apply_preset(preset, &mut ctx.camera.camera);
                }));
            }
            KeyCode::KeyP if pressed => self.sim.toggle_pause(),
            KeyCode::KeyR if pressed => self.restart_match(),
            KeyCode::Escape if pressed => return Out::Exit,
            _ => (),
        }
        Out::Empty
    }
}

fn mk_instance_buffer(
    device: &wgpu::Device,
    instances: &[Instance],
    label: &str,
) -> wgpu::Buffer {
    let raw: Vec<_> = instances.iter().map(Instance::to_raw).collect();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&raw),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

impl GraphicsFlow<()> for HockeyFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut ()) -> Out {
        ctx.camera
            .controller
            .apply_preset(self.preset, &mut ctx.camera.camera);
        ctx.clear_colour = wgpu::Color {
            r: 0.03,
            g: 0.07,
            b: 0.1,
            a: 1.0,
        };
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _state: &mut (), dt: Duration) -> Out {
        if !self.sim.is_paused() {
            self.drive_paddles();
        }
        self.sim.advance(dt);

        ctx.queue.write_buffer(
            &self.table_buffer,
            0,
            bytemuck::cast_slice(&[self.sim.objects[self.table].instance.to_raw()]),
        );
        ctx.queue.write_buffer(
            &self.paddle_buffer,
            0,
            bytemuck::cast_slice(&[
                self.sim.objects[self.paddles[0]].instance.to_raw(),
                self.sim.objects[self.paddles[1]].instance.to_raw(),
            ]),
        );
        ctx.queue.write_buffer(
            &self.puck_buffer,
            0,
            bytemuck::cast_slice(&[self.sim.objects[self.puck].instance.to_raw()]),
        );

        if !self.sim.is_paused() {
            let puck_position = self.sim.objects[self.puck].position();
            // A goal behind a player scores for the opponent.
            if self.goals[0].observe(puck_position) {
                self.scores[1] += 1;
                log::info!("player two scores! {} : {}", self.scores[0], self.scores[1]);
                self.reset_positions();
            } else if self.goals[1].observe(puck_position) {
                self.scores[0] += 1;
                log::info!("player one scores! {} : {}", self.scores[0], self.scores[1]);
                self.reset_positions();
            }
        }

        let title = score_line(self.scores, self.sim.is_paused());
        if title != self.title {
            ctx.set_title(&title);
            self.title = title;
        }

        let puck_position = self.sim.objects[self.puck].position();
        Out::Configure(Box::new(move |ctx| {
            ctx.light.follow(Point3::from_vec(puck_position));
        }))
    }

    fn on_tick(&mut self, _ctx: &Context, _state: &mut ()) -> Out {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _ctx: &Context,
        _state: &mut (),
        _event: &DeviceEvent,
    ) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _ctx: &Context, _state: &mut (), event: &WindowEvent) -> Out {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            return self.handle_key(*key, *state == ElementState::Pressed);
        }
        Out::Empty
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        Render::Defaults(vec![
            Instanced {
                instance: &self.table_buffer,
                model: &self.table_model,
                amount: 1,
            },
            Instanced {
                instance: &self.paddle_buffer,
                model: &self.paddle_model,
                amount: 2,
            },
            Instanced {
                instance: &self.puck_buffer,
                model: &self.puck_model,
                amount: 1,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_title_shows_the_score_and_pause_state() {
        assert_eq!(score_line([2, 1], false), "air hockey | 2 : 1");
        assert_eq!(score_line([0, 0], true), "air hockey | 0 : 0 | paused");
    }
}

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    let window = config.window.clone();

    let constructor: FlowConstructor<()> = Box::new(move |init: InitContext| {
        Box::pin(async move {
            let flow = HockeyFlow::new(init, config).await?;
            Ok(Box::new(flow) as Box<dyn GraphicsFlow<()>>)
        })
    });

    flow::run(window, vec![constructor])
}
