//! Engine data models: meshes and materials, per-object instances, textures.

pub mod instance;
pub mod model;
pub mod texture;
