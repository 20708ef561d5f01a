use std::io::{BufReader, Cursor};

use crate::{
    data_structures::model,
    physics::TrimeshData,
    resources::texture::{diffuse_normal_layout, load_string},
};

/**
 * Loading of meshes, textures and collision geometry from external files.
 */
pub mod mesh;
pub mod texture;

pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<model::Model> {
    let bind_group_layout = diffuse_normal_layout(device);

    let (materials, models) =
        texture::load_textures(file_name, queue, device, &bind_group_layout).await?;
    let meshes = mesh::load_meshes(&models, file_name, device);

    Ok(model::Model { meshes, materials })
}

/// Load an OBJ file as raw collision geometry for the physics world.
///
/// All meshes in the file are merged into one triangle soup; materials are
/// ignored. The same file can back both the rendered model and the
/// collider so the two never drift apart.
pub async fn load_collision_mesh(file_name: &str) -> anyhow::Result<TrimeshData> {
    let obj_text = load_string(file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    let (models, _) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok((Vec::new(), Default::default())),
    )?;

    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<[u32; 3]> = Vec::new();
    for m in &models {
        let base = vertices.len() as u32;
        vertices.extend(
            m.mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]]),
        );
        indices.extend(
            m.mesh
                .indices
                .chunks_exact(3)
                .map(|c| [base + c[0], base + c[1], base + c[2]]),
        );
    }
    anyhow::ensure!(
        !indices.is_empty(),
        "no triangles in collision mesh {file_name}"
    );

    Ok(TrimeshData { vertices, indices })
}
