//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn by returning a [`Render`] from
//! [`crate::flow::GraphicsFlow::on_render`]. The event loop flattens the
//! returned trees into one batch per pipeline so state changes stay
//! minimal regardless of how many flows are active.

use wgpu::RenderPass;

use crate::{context::Context, data_structures::model::Model};

/// Data for instanced object rendering: a model plus its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies how a flow's objects should be rendered.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Composed(Vec<Render>)` recursively renders a composition
/// - `Custom(...)` invokes a user-defined closure for special effects
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        basics: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, basics)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}
