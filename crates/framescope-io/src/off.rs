//! Object File Format (OFF) support.
//!
//! Accepts the plain `OFF` header, `#` comments anywhere and counts on the
//! header line or the next one. Polygons are fan-triangulated.

use std::path::Path;

use framescope_core::{FramescopeError, Result};
use glam::Vec3;

use crate::{header_count, RawMesh};

/// Load a mesh from an OFF file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| FramescopeError::load(path, e))?;
    parse(&text)
}

/// Parse OFF text.
pub fn parse(text: &str) -> Result<RawMesh> {
    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace);

    match tokens.next() {
        Some("OFF") => {}
        other => {
            return Err(FramescopeError::InvalidMesh(format!(
                "expected OFF header, found {other:?}"
            )))
        }
    }

    let mut next_number = |what: &str| -> Result<f64> {
        let token = tokens
            .next()
            .ok_or_else(|| FramescopeError::InvalidMesh(format!("unexpected end of file reading {what}")))?;
        token
            .parse::<f64>()
            .map_err(|_| FramescopeError::InvalidMesh(format!("invalid {what}: '{token}'")))
    };

    let num_vertices = header_count(next_number("vertex count")?, "vertex count")?;
    let num_faces = header_count(next_number("face count")?, "face count")?;
    let _num_edges = next_number("edge count")?;

    // Every vertex and face takes at least one byte of text.
    let mut raw = RawMesh {
        vertices: Vec::with_capacity(num_vertices.min(text.len())),
        faces: Vec::with_capacity(num_faces.min(text.len())),
    };
    for _ in 0..num_vertices {
        let x = next_number("vertex coordinate")?;
        let y = next_number("vertex coordinate")?;
        let z = next_number("vertex coordinate")?;
        raw.vertices.push(Vec3::new(x as f32, y as f32, z as f32));
    }

    let mut corners = Vec::new();
    for _ in 0..num_faces {
        let degree = header_count(next_number("face degree")?, "face degree")?;
        corners.clear();
        for _ in 0..degree {
            corners.push(next_number("face index")? as u32);
        }
        raw.push_polygon(&corners);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRAHEDRON: &str = "OFF
# regular enough
4 4 6
0 0 0
1 0 0
0 1 0
0 0 1
3 0 2 1
3 0 1 3
3 1 2 3
3 2 0 3
";

    #[test]
    fn test_parse_tetrahedron() {
        let raw = parse(TETRAHEDRON).unwrap();
        assert_eq!(raw.vertices.len(), 4);
        assert_eq!(raw.faces[0], [0, 2, 1]);
        let surface = raw.into_surface().unwrap();
        assert_eq!(surface.num_edges(), 6);
        assert!(surface.boundary_vertices().iter().all(|&b| !b));
    }

    #[test]
    fn test_parse_polygon_and_inline_counts() {
        let raw = parse("OFF 4 1 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3 # quad\n").unwrap();
        assert_eq!(raw.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("PLY\n").is_err());
        assert!(parse("OFF\n3 1 0\n0 0 0\n1 0 0\n").is_err());
        assert!(parse("OFF\n1 0 0\n0 zero 0\n").is_err());
        assert!(parse("OFF\n99999999999999999999 1 0\n0 0 0\n").is_err());
        assert!(parse("OFF\n1000000000 1 0\n0 0 0\n").is_err());
        assert!(parse("OFF\n-3 1 0\n0 0 0\n").is_err());
    }
}
