//! Wavefront OBJ support, read through `tobj`.

use std::io::BufRead;
use std::path::Path;

use framescope_core::Result;
use glam::Vec3;

use crate::RawMesh;

fn load_options() -> tobj::LoadOptions {
    // Faces must index positions only, texture and normal indices never split vertices.
    tobj::LoadOptions {
        single_index: false,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load every model of an OBJ file into one mesh.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawMesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())
        .map_err(|e| framescope_core::FramescopeError::load(path, e))?;
    Ok(merge_models(&models))
}

/// Parse OBJ text from a reader. Material libraries are ignored.
pub fn read<R: BufRead>(reader: &mut R) -> Result<RawMesh> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|e| framescope_core::FramescopeError::InvalidMesh(e.to_string()))?;
    Ok(merge_models(&models))
}

fn merge_models(models: &[tobj::Model]) -> RawMesh {
    let mut raw = RawMesh::default();
    for model in models {
        let offset = raw.vertices.len() as u32;
        let mesh = &model.mesh;
        raw.vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        raw.faces.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }
    log::debug!(
        "OBJ: {} model(s), {} vertices, {} triangles",
        models.len(),
        raw.vertices.len(),
        raw.faces.len()
    );
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_quad_is_triangulated() {
        let text = "# a quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let raw = read(&mut Cursor::new(text)).unwrap();
        assert_eq!(raw.vertices.len(), 4);
        assert_eq!(raw.faces.len(), 2);
        let surface = raw.into_surface().unwrap();
        assert_eq!(surface.num_edges(), 5);
    }

    #[test]
    fn test_read_ignores_texture_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";
        let raw = read(&mut Cursor::new(text)).unwrap();
        assert_eq!(raw.vertices.len(), 3);
        assert_eq!(raw.faces, vec![[0, 1, 2]]);
    }
}
