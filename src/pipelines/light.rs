//! The single point light and its render resources.
//!
//! The light follows the tracked game object (ball or puck) and its three
//! lighting terms can be toggled at runtime, matching the classic
//! ambient/diffuse/specular keyboard switches.

use cgmath::{Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    model::{Model, ModelVertex, Vertex},
    texture,
};

pub struct LightResources {
    /// Optional marker model drawn at the light position.
    pub model: Option<Model>,
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub render_pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        uniform: LightUniform,
        model: Option<Model>,
    ) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        let render_pipeline = mk_render_pipeline(device, config, camera_bind_group_layout);
        Self {
            model,
            uniform,
            buffer,
            render_pipeline,
            bind_group,
            bind_group_layout,
        }
    }

    /// Move the light to hover one unit above a tracked object.
    pub fn follow(&mut self, position: Point3<f32>) {
        self.uniform.position = [position.x, position.y + 1.0, position.z];
    }
}

/// Uniform layout shared with the shaders. Fields are packed into vec4
/// slots: position carries the ambient strength in its w component slot,
/// color carries diffuse, and the last slot holds specular and shininess.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub ambient: f32,
    pub color: [f32; 3],
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub _padding: [f32; 2],
}

impl LightUniform {
    pub fn new(position: Vector3<f32>, color: Vector3<f32>) -> Self {
        Self {
            position: position.into(),
            ambient: 0.1,
            color: color.into(),
            diffuse: 1.0,
            specular: 1.0,
            shininess: 32.0,
            _padding: [0.0; 2],
        }
    }

    /// Switch the ambient term on or off, remembering the on-strength.
    pub fn toggle_ambient(&mut self) {
        self.ambient = if self.ambient == 0.0 { 0.1 } else { 0.0 };
    }

    pub fn toggle_diffuse(&mut self) {
        self.diffuse = if self.diffuse == 0.0 { 1.0 } else { 0.0 };
    }

    pub fn toggle_specular(&mut self) {
        self.specular = if self.specular == 0.0 { 1.0 } else { 0.0 };
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: None,
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: None,
    })
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let light_bind_group_layout = mk_bind_group_layout(device);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Light Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, &light_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Light Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("light.wgsl").into()),
    };
    crate::pipelines::basic::mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(texture::Texture::DEPTH_FORMAT),
        &[ModelVertex::desc()],
        shader,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_tightly_packed_into_vec4_slots() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }

    #[test]
    fn toggles_flip_between_off_and_on() {
        let mut light =
            LightUniform::new(Vector3::new(0.0, 5.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(light.ambient, 0.1);
        light.toggle_ambient();
        assert_eq!(light.ambient, 0.0);
        light.toggle_ambient();
        assert_eq!(light.ambient, 0.1);

        light.toggle_specular();
        light.toggle_diffuse();
        assert_eq!(light.specular, 0.0);
        assert_eq!(light.diffuse, 0.0);
    }
}
