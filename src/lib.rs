//! tiltbox
//!
//! A small physics-driven game engine and the two games shipped with it:
//! a tilting labyrinth and a two-player air hockey table. The engine
//! couples a rigid-body world to an instanced wgpu renderer; games are
//! implemented as flows that feed input into the simulation and hand
//! their render instances back each frame.
//!
//! High-level modules
//! - `camera`: camera, presets, orbit controller and view uniforms
//! - `context`: central GPU and window context owning device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, textures)
//! - `flow`: high level flow control (scenes / update loops)
//! - `game`: trigger zones, scoreboards and on-disk configuration
//! - `physics`: rigid-body world wrapping rapier3d
//! - `pipelines`: render pipeline definitions (basic, light)
//! - `render`: render composition for efficient pipeline reuse
//! - `resources`: loading of models, textures and collision meshes
//! - `sim`: couples physics bodies to rendered instances
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod game;
pub mod physics;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod sim;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
