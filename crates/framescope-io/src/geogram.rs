//! geogram ASCII (`.geogram_ascii`) support.
//!
//! A file is a `[HEAD]` block followed by `[ATTS]` blocks, which declare an
//! element set and its size, and `[ATTR]` blocks, which hold one attribute of
//! a declared set:
//!
//! ```text
//! [ATTR]
//! "GEO::Mesh::vertices"
//! "point"
//! "double"
//! 8
//! 3
//! 0.0
//! ...
//! ```
//!
//! Surface meshes are written with their vertex, facet and edge attributes,
//! so singularity flags survive an export.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use framescope_core::{AttributeData, ElementKind, FramescopeError, LineMesh, Result, SurfaceMesh};
use glam::Vec3;

use crate::{checked_total, RawMesh};

const VERTICES: &str = "GEO::Mesh::vertices";
const FACETS: &str = "GEO::Mesh::facets";
const FACET_CORNERS: &str = "GEO::Mesh::facet_corners";
const EDGES: &str = "GEO::Mesh::edges";

const POINT: &str = "point";
const FACET_PTR: &str = "GEO::Mesh::facets::facet_ptr";
const CORNER_VERTEX: &str = "GEO::Mesh::facet_corners::corner_vertex";
const EDGE_VERTEX: &str = "GEO::Mesh::edges::edge_vertex";

fn element_set(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Vertices => VERTICES,
        ElementKind::Faces => FACETS,
        ElementKind::Edges => EDGES,
    }
}

/// Load a surface mesh from a geogram ASCII file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| FramescopeError::load(path, e))?;
    parse(&text)
}

struct Attribute {
    dimension: usize,
    values: Vec<f64>,
}

/// Parse geogram ASCII text. Facets without a `facet_ptr` are read as triangles.
pub fn parse(text: &str) -> Result<RawMesh> {
    let mut tokens = text.split_whitespace().map(|t| t.trim_matches('"'));
    let mut sizes: HashMap<String, usize> = HashMap::new();
    let mut attributes: HashMap<(String, String), Attribute> = HashMap::new();

    let mut expect = |what: &str| -> Result<String> {
        tokens
            .next()
            .map(str::to_string)
            .ok_or_else(|| FramescopeError::InvalidMesh(format!("unexpected end of file reading {what}")))
    };
    let parse_usize = |token: &str, what: &str| -> Result<usize> {
        token
            .parse::<usize>()
            .map_err(|_| FramescopeError::InvalidMesh(format!("invalid {what}: '{token}'")))
    };

    loop {
        let Ok(block) = expect("block") else {
            break;
        };
        match block.as_str() {
            "[HEAD]" => {
                let magic = expect("magic")?;
                if magic != "GEOGRAM" {
                    return Err(FramescopeError::InvalidMesh(format!(
                        "not a geogram file (magic '{magic}')"
                    )));
                }
                expect("version")?;
            }
            "[ATTS]" => {
                let set = expect("element set")?;
                let size = parse_usize(&expect("element count")?, "element count")?;
                sizes.insert(set, size);
            }
            "[ATTR]" => {
                let set = expect("element set")?;
                let name = expect("attribute name")?;
                let _type = expect("attribute type")?;
                let _element_size = expect("element size")?;
                let dimension = parse_usize(&expect("dimension")?, "dimension")?;
                let size = *sizes.get(&set).ok_or_else(|| {
                    FramescopeError::InvalidMesh(format!("attribute {name} on undeclared set {set}"))
                })?;
                let total = checked_total(size, dimension, &name)?;
                let mut values = Vec::with_capacity(total.min(text.len()));
                for _ in 0..total {
                    let token = expect("attribute value")?;
                    let value = token.parse::<f64>().map_err(|_| {
                        FramescopeError::InvalidMesh(format!("invalid value '{token}' in {name}"))
                    })?;
                    values.push(value);
                }
                attributes.insert((set, name), Attribute { dimension, values });
            }
            other => {
                return Err(FramescopeError::InvalidMesh(format!(
                    "unexpected token '{other}'"
                )))
            }
        }
    }

    let get = |set: &str, name: &str| attributes.get(&(set.to_string(), name.to_string()));

    let points = get(VERTICES, POINT)
        .ok_or_else(|| FramescopeError::InvalidMesh("missing vertex positions".into()))?;
    let vertices = points
        .values
        .chunks_exact(points.dimension.max(1))
        .map(|p| {
            let coord = |i: usize| p.get(i).copied().unwrap_or(0.0) as f32;
            Vec3::new(coord(0), coord(1), coord(2))
        })
        .collect();

    let corners: Vec<u32> = get(FACET_CORNERS, CORNER_VERTEX)
        .map(|a| a.values.iter().map(|&v| v as u32).collect())
        .unwrap_or_default();

    let mut raw = RawMesh {
        vertices,
        faces: Vec::new(),
    };
    match get(FACETS, FACET_PTR) {
        Some(ptr) => {
            let starts: Vec<usize> = ptr.values.iter().map(|&v| v as usize).collect();
            for (i, &start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or(corners.len());
                let polygon = corners.get(start..end).ok_or_else(|| {
                    FramescopeError::InvalidMesh(format!("facet {i} has corners out of range"))
                })?;
                raw.push_polygon(polygon);
            }
        }
        None => {
            for tri in corners.chunks_exact(3) {
                raw.faces.push([tri[0], tri[1], tri[2]]);
            }
        }
    }
    Ok(raw)
}

fn write_head<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "[HEAD]")?;
    writeln!(w, "\"GEOGRAM\"")?;
    writeln!(w, "\"1.0\"")
}

fn write_atts<W: Write>(w: &mut W, set: &str, size: usize) -> io::Result<()> {
    writeln!(w, "[ATTS]")?;
    writeln!(w, "\"{set}\"")?;
    writeln!(w, "{size}")
}

fn write_attr<W, T, I>(
    w: &mut W,
    set: &str,
    name: &str,
    (ty, element_size, dimension): (&str, usize, usize),
    values: I,
) -> io::Result<()>
where
    W: Write,
    T: std::fmt::Display,
    I: IntoIterator<Item = T>,
{
    writeln!(w, "[ATTR]")?;
    writeln!(w, "\"{set}\"")?;
    writeln!(w, "\"{name}\"")?;
    writeln!(w, "\"{ty}\"")?;
    writeln!(w, "{element_size}")?;
    writeln!(w, "{dimension}")?;
    for value in values {
        writeln!(w, "{value}")?;
    }
    Ok(())
}

const DOUBLE3: (&str, usize, usize) = ("double", 8, 3);
const INDEX: (&str, usize, usize) = ("index_t", 4, 1);
const INDEX2: (&str, usize, usize) = ("index_t", 4, 2);

fn write_points<W: Write>(w: &mut W, points: &[Vec3]) -> io::Result<()> {
    write_atts(w, VERTICES, points.len())?;
    write_attr(
        w,
        VERTICES,
        POINT,
        DOUBLE3,
        points.iter().flat_map(|p| p.to_array().map(f64::from)),
    )
}

fn write_user_attributes<W: Write>(w: &mut W, mesh: &SurfaceMesh, kind: ElementKind) -> io::Result<()> {
    let set = element_set(kind);
    for (name, data) in mesh.attributes().iter(kind) {
        match data {
            AttributeData::Int(values) => write_attr(w, set, name, ("int", 4, 1), values)?,
            AttributeData::Float(values) => write_attr(
                w,
                set,
                name,
                ("double", 8, 1),
                values.iter().map(|&v| f64::from(v)),
            )?,
        }
    }
    Ok(())
}

/// Write a surface mesh and all of its attributes.
pub fn write_surface<W: Write>(w: &mut W, mesh: &SurfaceMesh) -> io::Result<()> {
    write_head(w)?;

    write_points(w, mesh.vertices())?;
    write_user_attributes(w, mesh, ElementKind::Vertices)?;

    write_atts(w, EDGES, mesh.num_edges())?;
    write_attr(w, EDGES, EDGE_VERTEX, INDEX2, mesh.edges().iter().flatten())?;
    write_user_attributes(w, mesh, ElementKind::Edges)?;

    write_atts(w, FACETS, mesh.num_faces())?;
    write_attr(w, FACETS, FACET_PTR, INDEX, (0..mesh.num_faces()).map(|f| 3 * f))?;
    write_user_attributes(w, mesh, ElementKind::Faces)?;

    write_atts(w, FACET_CORNERS, 3 * mesh.num_faces())?;
    write_attr(w, FACET_CORNERS, CORNER_VERTEX, INDEX, mesh.faces().iter().flatten())?;
    w.flush()
}

/// Write a line mesh as vertices and edges.
pub fn write_lines<W: Write>(w: &mut W, lines: &LineMesh) -> io::Result<()> {
    write_head(w)?;
    write_points(w, &lines.vertices)?;
    write_atts(w, EDGES, lines.num_edges())?;
    write_attr(w, EDGES, EDGE_VERTEX, INDEX2, lines.edges.iter().flatten())?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use framescope_core::SINGULARITY_ATTRIBUTE;

    fn square() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_written_surface_reads_back() {
        let mut mesh = square();
        mesh.set_attribute(
            ElementKind::Vertices,
            SINGULARITY_ATTRIBUTE,
            AttributeData::Int(vec![0, 1, 0, -1]),
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_surface(&mut buffer, &mesh).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("[HEAD]\n\"GEOGRAM\"\n"));
        assert!(text.contains("\"GEO::Mesh::vertices\"\n\"singuls\"\n\"int\"\n4\n1\n0\n1\n0\n-1\n"));

        let raw = parse(&text).unwrap();
        assert_eq!(raw.vertices, mesh.vertices());
        assert_eq!(raw.faces, mesh.faces());
    }

    #[test]
    fn test_write_lines() {
        let mut lines = LineMesh::new();
        lines.push_segment(Vec3::ZERO, Vec3::X);
        let mut buffer = Vec::new();
        write_lines(&mut buffer, &lines).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("[ATTS]\n\"GEO::Mesh::edges\"\n1\n"));
        assert!(text.contains("\"GEO::Mesh::edges::edge_vertex\"\n\"index_t\"\n4\n2\n0\n1\n"));
        assert!(!text.contains("facet"));
    }

    #[test]
    fn test_parse_without_facet_ptr_reads_triangles() {
        let text = "[HEAD]\n\"GEOGRAM\"\n\"1.0\"\n\
                    [ATTS]\n\"GEO::Mesh::vertices\"\n3\n\
                    [ATTR]\n\"GEO::Mesh::vertices\"\n\"point\"\n\"double\"\n8\n3\n\
                    0 0 0\n1 0 0\n0 1 0\n\
                    [ATTS]\n\"GEO::Mesh::facet_corners\"\n3\n\
                    [ATTR]\n\"GEO::Mesh::facet_corners\"\n\"GEO::Mesh::facet_corners::corner_vertex\"\n\"index_t\"\n4\n1\n\
                    0\n1\n2\n";
        let raw = parse(text).unwrap();
        assert_eq!(raw.faces, vec![[0, 1, 2]]);
        assert_eq!(raw.vertices[1], Vec3::X);
    }

    #[test]
    fn test_parse_rejects_other_files() {
        assert!(parse("[HEAD]\n\"PLY\"\n\"1.0\"\n").is_err());
        assert!(parse("OFF\n").is_err());
        assert!(parse("[ATTR]\n\"GEO::Mesh::vertices\"\n\"point\"\n\"double\"\n8\n3\n").is_err());
    }

    #[test]
    fn test_parse_errors() {
        let huge = "[HEAD]\n\"GEOGRAM\"\n\"1.0\"\n\
                    [ATTS]\n\"GEO::Mesh::vertices\"\n18446744073709551615\n\
                    [ATTR]\n\"GEO::Mesh::vertices\"\n\"point\"\n\"double\"\n8\n3\n0 0 0\n";
        assert!(matches!(parse(huge), Err(FramescopeError::InvalidMesh(_))));
        let large = huge.replace("18446744073709551615", "1000000000");
        assert!(matches!(parse(&large), Err(FramescopeError::InvalidMesh(_))));
    }
}
