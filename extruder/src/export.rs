use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use stl_io::{Normal, Triangle, Vertex};

use crate::mesh::Mesh;

/// Default output location, in the working directory.
pub const DEFAULT_OUTPUT: &str = "output_model.stl";

/// Serializes the mesh as binary STL. Facet normals come from each face's
/// winding; zero-area faces get a null normal. An empty mesh produces a
/// valid zero-facet file.
pub fn write_stl<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<()> {
    let triangles = mesh
        .faces
        .iter()
        .enumerate()
        .map(|(index, face)| {
            let normal = mesh.normal(index);
            Triangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: face.map(|idx| {
                    let v = mesh.vertices[idx as usize];
                    Vertex::new([v.x as f32, v.y as f32, v.z as f32])
                }),
            }
        })
        .collect::<Vec<_>>();

    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Writes the mesh to `path`, creating or truncating the file. Geometry
/// already computed by the caller stays valid if this fails.
pub fn save_stl(path: impl AsRef<Path>, mesh: &Mesh) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    write_stl(&mut writer, mesh)?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}
