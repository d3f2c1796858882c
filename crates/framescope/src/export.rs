//! Writing the mesh and its frame field to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{FieldResult, FramescopeError, LineMesh, MeshExporter, Result, SurfaceMesh};

/// Suffix of the field line mesh file name.
pub const FIELD_SUFFIX: &str = "_FF";

/// Segment length multiplier for exported field lines.
pub const EXPORT_LENGTH_MULT: f32 = 1.0;

/// Segment length multiplier for edge fields drawn in the viewer.
pub const DISPLAY_LENGTH_MULT: f32 = 1.3;

const SEGMENT_SCALE: f32 = 0.3;

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// The input mesh with its attributes.
    pub mesh: PathBuf,
    /// The field line mesh.
    pub field: PathBuf,
}

/// Builds one segment per frame direction, starting at each element anchor.
///
/// Segments are `0.3 * length_mult` times the mean edge length.
pub fn field_line_mesh(mesh: &SurfaceMesh, field: &FieldResult, length_mult: f32) -> LineMesh {
    let length = SEGMENT_SCALE * mesh.mean_edge_length() * length_mult;
    let anchors = mesh.element_positions(field.element());
    let mut lines = LineMesh::new();
    for (i, &anchor) in anchors.iter().enumerate().take(field.len()) {
        for direction in field.directions(i) {
            lines.push_segment(anchor, anchor + direction * length);
        }
    }
    lines
}

/// Writes `<base>.<ext>` and `<base>_FF.<ext>` under `dir`, creating it if needed.
pub fn export_field(
    mesh: &SurfaceMesh,
    field: &FieldResult,
    exporter: &mut dyn MeshExporter,
    dir: &Path,
    base_name: &str,
) -> Result<ExportPaths> {
    let extension = exporter.extension().to_string();
    let paths = ExportPaths {
        mesh: dir.join(format!("{base_name}.{extension}")),
        field: dir.join(format!("{base_name}{FIELD_SUFFIX}.{extension}")),
    };

    fs::create_dir_all(dir).map_err(|e| FramescopeError::Save {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    exporter.save_surface(mesh, &paths.mesh)?;
    exporter.save_lines(&field_line_mesh(mesh, field, EXPORT_LENGTH_MULT), &paths.field)?;

    log::info!(
        "exported {} and {}",
        paths.mesh.display(),
        paths.field.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, FieldKind, Vec2, Vec3};

    fn single_triangle() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_one_segment_per_direction() {
        let mesh = single_triangle();
        let field = FieldResult::new(
            FieldKind::Smooth(ElementKind::Vertices),
            4,
            vec![Vec2::X; 3],
            vec![Vec3::X; 3],
            vec![Vec3::Y; 3],
        )
        .unwrap();

        let lines = field_line_mesh(&mesh, &field, EXPORT_LENGTH_MULT);
        assert_eq!(lines.num_edges(), 3 * 4);
        assert_eq!(lines.vertices.len(), 2 * 3 * 4);

        let expected = SEGMENT_SCALE * mesh.mean_edge_length();
        for edge in &lines.edges {
            let [a, b] = edge.map(|v| lines.vertices[v as usize]);
            assert!(((b - a).length() - expected).abs() < 1e-5);
        }
        // first segment starts at vertex 0 along the basis X axis
        assert_eq!(lines.vertices[0], Vec3::ZERO);
        assert!((lines.vertices[1].normalize() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_display_segments_are_longer() {
        let mesh = single_triangle();
        let field = FieldResult::new(
            FieldKind::Smooth(ElementKind::Faces),
            2,
            vec![Vec2::X],
            vec![Vec3::X],
            vec![Vec3::Y],
        )
        .unwrap();

        let short = field_line_mesh(&mesh, &field, EXPORT_LENGTH_MULT);
        let long = field_line_mesh(&mesh, &field, DISPLAY_LENGTH_MULT);
        let len = |l: &LineMesh| (l.vertices[1] - l.vertices[0]).length();
        assert!((len(&long) / len(&short) - 1.3).abs() < 1e-4);
        assert_eq!(short.vertices[0], mesh.face_barycenters()[0]);
    }
}
