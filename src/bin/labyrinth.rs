//! Tilting labyrinth: roll the ball into the goal pocket without
//! dropping it through a hole.
//!
//! Controls: arrow keys or left-mouse-drag tilt the board, right-drag
//! orbits the camera, space resets the view. `a`/`s`/`d` toggle the
//! lighting terms, `p` pauses, `r` restarts, escape quits.

use cgmath::{EuclideanSpace, Point3};
use instant::Duration;
use tiltbox::{
    context::{Context, InitContext, MouseButtonState},
    data_structures::{instance::Instance, model::Model},
    flow::{self, FlowConstructor, GraphicsFlow, Out},
    game::{
        config::GameConfig,
        scoreboard::Scoreboard,
        zones::{Zone, ZoneTrigger},
    },
    physics::{BodyKind, Shape},
    pipelines::light::LightUniform,
    render::{Instanced, Render},
    resources::{load_collision_mesh, load_model_obj},
    sim::{Simulation, TiltControl},
};
use wgpu::util::DeviceExt;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

const CONFIG_PATH: &str = "./assets/labyrinth.toml";
const BALL_RADIUS: f32 = 0.5;
/// Tilt added per tick while an arrow key is held, in radians.
const KEY_TILT_STEP: f32 = 0.01;
/// Tilt added per pixel of left-button mouse drag, in radians.
const MOUSE_TILT_STEP: f32 = 0.003;

#[derive(Default)]
struct HeldKeys {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl HeldKeys {
    /// Tilt deltas for one tick of held keys. While paused all input is
    /// ignored, so no tilt piles up for the board to snap to on unpause.
    fn tilt_deltas(&self, paused: bool) -> (f32, f32) {
        if paused {
            return (0.0, 0.0);
        }
        (
            (self.down as i32 - self.up as i32) as f32 * KEY_TILT_STEP,
            (self.left as i32 - self.right as i32) as f32 * KEY_TILT_STEP,
        )
    }
}

struct LabyrinthFlow {
    sim: Simulation,
    tilt: TiltControl,
    board: usize,
    ball: usize,
    board_model: Model,
    ball_model: Model,
    board_buffer: wgpu::Buffer,
    ball_buffer: wgpu::Buffer,
    win: ZoneTrigger,
    fall: ZoneTrigger,
    scoreboard: Scoreboard,
    keys: HeldKeys,
    title: String,
}

impl LabyrinthFlow {
    async fn new(init: InitContext, config: GameConfig) -> anyhow::Result<Self> {
        let board_model = load_model_obj("board.obj", &init.device, &init.queue).await?;
        let ball_model = load_model_obj("ball.obj", &init.device, &init.queue).await?;
        let board_collision = load_collision_mesh("board.obj").await?;

        let mut sim = Simulation::new(config.gravity);
        // The board goes in first so its surface exists before the ball
        // starts falling.
        let board = sim.spawn(
            BodyKind::Kinematic,
            Shape::Trimesh(board_collision),
            config.spawn("board"),
        );
        let ball = sim.spawn(
            BodyKind::Dynamic { mass: 1.0 },
            Shape::Ball {
                radius: BALL_RADIUS,
            },
            config.spawn("ball"),
        );

        let board_buffer = mk_instance_buffer(&init.device, &sim.objects[board].instance, "board");
        let ball_buffer = mk_instance_buffer(&init.device, &sim.objects[ball].instance, "ball");

        let win = ZoneTrigger::new(config.zone("win").unwrap_or(Zone::Box {
            min: [-100.0, -5.0, -6.7],
            max: [-9.0, 5.0, -6.3],
        }));
        let fall = ZoneTrigger::new(config.zone("fall").unwrap_or(Zone::Below { y: -15.0 }));

        Ok(Self {
            sim,
            tilt: TiltControl::new(config.tilt_limit),
            board,
            ball,
            board_model,
            ball_model,
            board_buffer,
            ball_buffer,
            win,
            fall,
            scoreboard: Scoreboard::new(),
            keys: HeldKeys::default(),
            title: String::new(),
        })
    }

    /// Ball back on the board, board level, clock at zero.
    fn reset_run(&mut self) {
        self.sim.respawn(self.ball);
        self.tilt.reset();
        self.win.reset();
        self.fall.reset();
        self.sim.restart_clock();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> Out {
        match key {
            KeyCode::ArrowUp => self.keys.up = pressed,
            KeyCode::ArrowDown => self.keys.down = pressed,
            KeyCode::ArrowLeft => self.keys.left = pressed,
            KeyCode::ArrowRight => self.keys.right = pressed,
            KeyCode::Space if pressed => {
                return Out::Configure(Box::new(|ctx| {
                    let eye = Point3::new(0.0, 25.0, 0.1);
                    ctx.camera.controller.set_view(eye, &mut ctx.camera.camera);
                }));
            }
            KeyCode::KeyA if pressed => {
                return Out::Configure(Box::new(|ctx| ctx.light.uniform.toggle_ambient()));
            }
            KeyCode::KeyS if pressed => {
                return Out::Configure(Box::new(|ctx| ctx.light.uniform.toggle_specular()));
            }
            KeyCode::KeyD if pressed => {
                return Out::Configure(Box::new(|ctx| ctx.light.uniform.toggle_diffuse()));
            }
            KeyCode::KeyP if pressed => self.sim.toggle_pause(),
            KeyCode::KeyR if pressed => {
                self.scoreboard.restart();
                self.reset_run();
            }
            KeyCode::Escape if pressed => return Out::Exit,
            _ => (),
        }
        Out::Empty
    }
}

/// One-line game state for the window title, standing in for an
/// on-screen text overlay.
fn status_line(
    game_time: Duration,
    fails: u32,
    best: Option<Duration>,
    paused: bool,
    light: &LightUniform,
) -> String {
    let mut line = format!(
        "labyrinth | time {:.1}s | fails {}",
        game_time.as_secs_f32(),
        fails
    );
    if let Some(best) = best {
        line.push_str(&format!(" | best {:.1}s", best.as_secs_f32()));
    }
    line.push_str(&format!(
        " | ambient {} diffuse {} specular {}",
        on_off(light.ambient > 0.0),
        on_off(light.diffuse > 0.0),
        on_off(light.specular > 0.0),
    ));
    if paused {
        line.push_str(" | paused");
    }
    line
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn mk_instance_buffer(device: &wgpu::Device, instance: &Instance, label: &str) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[instance.to_raw()]),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

impl GraphicsFlow<()> for LabyrinthFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut ()) -> Out {
        let eye = Point3::new(0.0, 25.0, 0.1);
        ctx.camera.controller.set_view(eye, &mut ctx.camera.camera);
        ctx.clear_colour = wgpu::Color {
            r: 0.05,
            g: 0.05,
            b: 0.08,
            a: 1.0,
        };
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _state: &mut (), dt: Duration) -> Out {
        let board_body = self.sim.objects[self.board].body();
        let board_position = self.sim.objects[self.board].position();
        self.sim
            .world
            .set_kinematic_pose(board_body, board_position, self.tilt.rotation());
        self.sim.advance(dt);

        ctx.queue.write_buffer(
            &self.board_buffer,
            0,
            bytemuck::cast_slice(&[self.sim.objects[self.board].instance.to_raw()]),
        );
        ctx.queue.write_buffer(
            &self.ball_buffer,
            0,
            bytemuck::cast_slice(&[self.sim.objects[self.ball].instance.to_raw()]),
        );

        if !self.sim.is_paused() {
            let ball_position = self.sim.objects[self.ball].position();
            if self.fall.observe(ball_position) {
                self.scoreboard.record_fail();
                log::info!("ball lost ({} fails so far)", self.scoreboard.fails());
                self.sim.respawn(self.ball);
                self.fall.reset();
            } else if self.win.observe(ball_position) {
                let entry = self
                    .scoreboard
                    .record_win("player", self.sim.game_time());
                log::info!("goal! finished in {:.2?}", entry.time);
                self.reset_run();
            }
        }

        let title = status_line(
            self.sim.game_time(),
            self.scoreboard.fails(),
            self.scoreboard.best(),
            self.sim.is_paused(),
            &ctx.light.uniform,
        );
        if title != self.title {
            ctx.set_title(&title);
            self.title = title;
        }

        let ball_position = self.sim.objects[self.ball].position();
        Out::Configure(Box::new(move |ctx| {
            ctx.light.follow(Point3::from_vec(ball_position));
        }))
    }

    fn on_tick(&mut self, _ctx: &Context, _state: &mut ()) -> Out {
        let (dx, dz) = self.keys.tilt_deltas(self.sim.is_paused());
        if dx != 0.0 || dz != 0.0 {
            self.tilt.apply(dx, dz);
        }
        Out::Empty
    }

    fn on_device_events(&mut self, ctx: &Context, _state: &mut (), event: &DeviceEvent) -> Out {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if ctx.mouse.pressed == MouseButtonState::Left && !self.sim.is_paused() {
                self.tilt.apply(
                    *dy as f32 * MOUSE_TILT_STEP,
                    -*dx as f32 * MOUSE_TILT_STEP,
                );
            }
        }
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
                instance: &self.board_buffer,
                model: &self.board_model,
                amount: 1,
            },
            Instanced {
                instance: &self.ball_buffer,
                model: &self.ball_model,
                amount: 1,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_tilt_nothing_while_paused() {
        let keys = HeldKeys {
            up: true,
            left: true,
            ..Default::default()
        };
        assert_eq!(keys.tilt_deltas(true), (0.0, 0.0));
        assert_eq!(keys.tilt_deltas(false), (-KEY_TILT_STEP, KEY_TILT_STEP));
    }

    #[test]
    fn the_title_tracks_the_run_state() {
        let light = LightUniform::new(
            cgmath::Vector3::new(0.0, 8.0, 0.0),
            cgmath::Vector3::new(1.0, 1.0, 1.0),
        );
        let line = status_line(Duration::from_millis(12_300), 2, None, false, &light);
        assert_eq!(
            line,
            "labyrinth | time 12.3s | fails 2 | ambient on diffuse on specular on"
        );

        let mut dark = light;
        dark.toggle_diffuse();
        let line = status_line(
            Duration::ZERO,
            0,
            Some(Duration::from_secs(9)),
            true,
            &dark,
        );
        assert_eq!(
            line,
            "labyrinth | time 0.0s | fails 0 | best 9.0s | ambient on diffuse off specular on | paused"
        );
    }
}

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    let window = config.window.clone();

    let constructor: FlowConstructor<()> = Box::new(move |init: InitContext| {
        Box::pin(async move {
            let flow = LabyrinthFlow::new(init, config).await?;
            Ok(Box::new(flow) as Box<dyn GraphicsFlow<()>>)
        })
    });

    flow::run(window, vec![constructor])
}
