//! Camera, projection and the orbit controller.
//!
//! The camera is a plain look-at: an eye point, a target and an up vector.
//! Games either pick one of the fixed [`CameraPreset`] views or let the
//! right-mouse-drag orbit controller circle the eye around the playfield
//! center. The combined view-projection is uploaded as a single uniform.

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use winit::event::{MouseScrollDelta, WindowEvent};

/// wgpu clip space is x,y in [-1, 1] but z in [0, 1], unlike OpenGL.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// The fixed viewpoints cycled by the air-hockey camera menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPreset {
    /// Behind player one, looking down the table.
    Overhead,
    /// Side view from positive x.
    EndOnEast,
    /// Side view from negative x.
    EndOnWest,
}

impl CameraPreset {
    pub fn eye(&self) -> Point3<f32> {
        match self {
            CameraPreset::Overhead => Point3::new(0.0, 15.0, -5.0),
            CameraPreset::EndOnEast => Point3::new(20.0, 15.0, 0.0),
            CameraPreset::EndOnWest => Point3::new(-20.0, 15.0, 0.0),
        }
    }

    pub fn next(&self) -> CameraPreset {
        match self {
            CameraPreset::Overhead => CameraPreset::EndOnEast,
            CameraPreset::EndOnEast => CameraPreset::EndOnWest,
            CameraPreset::EndOnWest => CameraPreset::Overhead,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<E: Into<Point3<f32>>, T: Into<Point3<f32>>>(eye: E, target: T) -> Self {
        Self {
            eye: eye.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The camera uniform as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.eye.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Orbit control around the playfield center.
///
/// Dragging with the right mouse button swings the eye on a circle of
/// fixed radius; the scroll wheel changes the radius. Selecting a preset
/// or the default view hands control back until the next drag.
#[derive(Clone, Debug)]
pub struct CameraController {
    sensitivity: f32,
    distance: f32,
    height: f32,
    angle: f32,
    orbiting: bool,
}

impl CameraController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            distance: 20.0,
            height: 20.0,
            angle: 0.0,
            orbiting: false,
        }
    }

    /// Feed a mouse delta while the right button is held.
    pub fn handle_mouse(&mut self, dx: f64, _dy: f64) {
        self.angle += dx as f32 * self.sensitivity * 0.001;
        self.orbiting = true;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            let scroll = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
            };
            self.distance = (self.distance - scroll).clamp(5.0, 60.0);
        }
    }

    /// Re-derive the eye position when the orbit is active.
    pub fn update(&mut self, camera: &mut Camera, _dt: Duration) {
        if !self.orbiting {
            return;
        }
        camera.eye = Point3::new(
            self.distance * self.angle.sin(),
            self.height,
            self.distance * self.angle.cos(),
        );
        camera.target = Point3::new(0.0, 0.0, 0.0);
    }

    /// Snap to one of the fixed views, disabling the orbit.
    pub fn apply_preset(&mut self, preset: CameraPreset, camera: &mut Camera) {
        self.orbiting = false;
        camera.eye = preset.eye();
        camera.target = Point3::new(0.0, 0.0, 0.0);
    }

    /// Snap to an explicit eye point, disabling the orbit.
    pub fn set_view(&mut self, eye: Point3<f32>, camera: &mut Camera) {
        self.orbiting = false;
        self.height = eye.y;
        camera.eye = eye;
        camera.target = Point3::new(0.0, 0.0, 0.0);
    }
}

/// Camera state plus its GPU resources, owned by the context.
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
