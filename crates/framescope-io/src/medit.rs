//! Medit `.mesh` ASCII support.
//!
//! Only the surface part is read: `Vertices`, `Triangles` and
//! `Quadrilaterals`. Indices are 1-based and every element carries a
//! trailing reference number, which is dropped. Edge, corner and volume
//! sections are skipped.

use std::path::Path;

use framescope_core::{FramescopeError, Result};
use glam::Vec3;

use crate::{checked_total, header_count, RawMesh};

/// Load a mesh from a Medit file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| FramescopeError::load(path, e))?;
    parse(&text)
}

struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = &'a str> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: Box::new(
                text.lines()
                    .map(|line| line.split('#').next().unwrap_or(""))
                    .flat_map(str::split_whitespace),
            ),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn number(&mut self, what: &str) -> Result<f64> {
        let token = self.next().ok_or_else(|| {
            FramescopeError::InvalidMesh(format!("unexpected end of file reading {what}"))
        })?;
        token
            .parse::<f64>()
            .map_err(|_| FramescopeError::InvalidMesh(format!("invalid {what}: '{token}'")))
    }

    fn count(&mut self, section: &str) -> Result<usize> {
        let what = format!("{section} count");
        header_count(self.number(&what)?, &what)
    }

    fn skip_cells(&mut self, section: &str, values_per_cell: usize) -> Result<()> {
        let n = self.count(section)?;
        self.skip(checked_total(n, values_per_cell, section)?)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.number("value")?;
        }
        Ok(())
    }

    fn cells(&mut self, section: &str, raw: &mut RawMesh, corners: usize) -> Result<()> {
        let n = self.count(section)?;
        let mut cell = Vec::with_capacity(corners);
        for _ in 0..n {
            cell.clear();
            for _ in 0..corners {
                let index = self.number("vertex index")? as i64;
                if index < 1 {
                    return Err(FramescopeError::InvalidMesh(format!(
                        "{section}: vertex index {index} is not 1-based"
                    )));
                }
                cell.push((index - 1) as u32);
            }
            self.number("reference")?;
            raw.push_polygon(&cell);
        }
        Ok(())
    }
}

/// Parse Medit text.
pub fn parse(text: &str) -> Result<RawMesh> {
    let mut tokens = Tokens::new(text);
    let mut raw = RawMesh::default();
    let mut dimension = 3usize;

    while let Some(keyword) = tokens.next() {
        match keyword {
            "MeshVersionFormatted" => tokens.skip(1)?,
            "Dimension" => {
                dimension = tokens.number("dimension")? as usize;
                if !(2..=3).contains(&dimension) {
                    return Err(FramescopeError::InvalidMesh(format!(
                        "unsupported dimension {dimension}"
                    )));
                }
            }
            "Vertices" => {
                let n = tokens.count(keyword)?;
                for _ in 0..n {
                    let x = tokens.number("vertex coordinate")?;
                    let y = tokens.number("vertex coordinate")?;
                    let z = if dimension == 3 {
                        tokens.number("vertex coordinate")?
                    } else {
                        0.0
                    };
                    tokens.number("reference")?;
                    raw.vertices.push(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
            "Triangles" => tokens.cells(keyword, &mut raw, 3)?,
            "Quadrilaterals" => tokens.cells(keyword, &mut raw, 4)?,
            "Edges" => tokens.skip_cells(keyword, 3)?,
            "Tetrahedra" => tokens.skip_cells(keyword, 5)?,
            "Hexahedra" => tokens.skip_cells(keyword, 9)?,
            "Corners" | "Ridges" | "RequiredVertices" | "RequiredEdges" => {
                tokens.skip_cells(keyword, 1)?;
            }
            "End" => break,
            other => {
                return Err(FramescopeError::InvalidMesh(format!(
                    "unknown Medit keyword '{other}'"
                )))
            }
        }
    }

    if raw.faces.is_empty() {
        return Err(FramescopeError::InvalidMesh(
            "Medit file has no surface triangles or quadrilaterals".into(),
        ));
    }
    Ok(raw)
}
