//! Mesh file I/O for framescope.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✗ | Polygons are fan-triangulated |
//! | Medit | `.mesh` | ✓ | ✗ | Triangles and quadrilaterals, volume cells ignored |
//! | OFF | `.off` | ✓ | ✗ | Polygons are fan-triangulated |
//! | STL | `.stl` | ✓ | ✗ | Binary and ASCII |
//! | geogram ASCII | `.geogram_ascii` | ✓ | ✓ | Attributes are written alongside the geometry |
//!
//! Loaded meshes go through [`SurfaceMesh::new`], so every format rejects
//! non-manifold or inconsistently oriented input the same way.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod geogram;
pub mod medit;
pub mod obj;
pub mod off;
pub mod stl;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use framescope_core::{FramescopeError, LineMesh, MeshExporter, Result, SurfaceMesh};
use glam::Vec3;

/// Extensions accepted by [`load`], with their leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".obj", ".mesh", ".off", ".stl", ".geogram_ascii"];

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// Medit (INRIA) ASCII format.
    Medit,
    /// Object File Format.
    Off,
    /// STL (stereolithography) format.
    Stl,
    /// geogram ASCII format.
    GeogramAscii,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "mesh" => Some(Format::Medit),
            "off" => Some(Format::Off),
            "stl" => Some(Format::Stl),
            "geogram_ascii" => Some(Format::GeogramAscii),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// The canonical extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Obj => "obj",
            Format::Medit => "mesh",
            Format::Off => "off",
            Format::Stl => "stl",
            Format::GeogramAscii => "geogram_ascii",
        }
    }
}

/// Comma separated list of [`SUPPORTED_EXTENSIONS`], for user messages.
pub fn supported_formats() -> String {
    SUPPORTED_EXTENSIONS.join(", ")
}

/// Reads an element count from a header value.
///
/// Counts must be non-negative integers that fit a `u32` vertex index.
pub(crate) fn header_count(value: f64, what: &str) -> Result<usize> {
    if !(0.0..=f64::from(u32::MAX)).contains(&value) || value.fract() > 0.0 {
        return Err(FramescopeError::InvalidMesh(format!("invalid {what}: {value}")));
    }
    Ok(value as usize)
}

/// `count * per_item`, or `InvalidMesh` when it overflows.
pub(crate) fn checked_total(count: usize, per_item: usize, what: &str) -> Result<usize> {
    count.checked_mul(per_item).ok_or_else(|| {
        FramescopeError::InvalidMesh(format!("{what}: {count} x {per_item} values overflow"))
    })
}

/// Vertex positions and triangles read from a file, before topology checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangles as vertex indices.
    pub faces: Vec<[u32; 3]>,
}

impl RawMesh {
    /// Appends a polygon, fan-triangulated from its first corner.
    ///
    /// Polygons with fewer than three corners are dropped.
    pub fn push_polygon(&mut self, corners: &[u32]) {
        if corners.len() < 3 {
            return;
        }
        for window in corners[1..].windows(2) {
            self.faces.push([corners[0], window[0], window[1]]);
        }
    }

    /// Checks that every face references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(FramescopeError::InvalidMesh("no faces".into()));
        }
        let n = self.vertices.len();
        if let Some(face) = self.faces.iter().find(|f| f.iter().any(|&v| v as usize >= n)) {
            return Err(FramescopeError::InvalidMesh(format!(
                "face {face:?} references a vertex out of range (mesh has {n} vertices)"
            )));
        }
        Ok(())
    }

    /// Builds the mesh store.
    pub fn into_surface(self) -> Result<SurfaceMesh> {
        self.validate()?;
        SurfaceMesh::new(self.vertices, self.faces)
    }
}

/// Load a surface mesh with automatic format detection.
///
/// Every failure past format detection is reported as
/// [`FramescopeError::Load`] for `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SurfaceMesh> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| FramescopeError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_string(),
    })?;

    let raw = match format {
        Format::Obj => obj::load(path),
        Format::Medit => medit::load(path),
        Format::Off => off::load(path),
        Format::Stl => stl::load(path),
        Format::GeogramAscii => geogram::load(path),
    }
    .and_then(RawMesh::into_surface)
    .map_err(|e| match e {
        e @ FramescopeError::Load { .. } => e,
        other => FramescopeError::load(path, other),
    })?;

    log::info!(
        "loaded {} ({} vertices, {} faces)",
        path.display(),
        raw.num_vertices(),
        raw.num_faces()
    );
    Ok(raw)
}

/// Writes meshes in the geogram ASCII format.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeogramExporter;

impl GeogramExporter {
    /// Creates the exporter.
    pub fn new() -> Self {
        Self
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| FramescopeError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

impl MeshExporter for GeogramExporter {
    fn extension(&self) -> &str {
        Format::GeogramAscii.extension()
    }

    fn save_surface(&mut self, mesh: &SurfaceMesh, path: &Path) -> Result<()> {
        let mut writer = create(path)?;
        geogram::write_surface(&mut writer, mesh).map_err(|e| FramescopeError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("wrote surface mesh to {}", path.display());
        Ok(())
    }

    fn save_lines(&mut self, lines: &LineMesh, path: &Path) -> Result<()> {
        let mut writer = create(path)?;
        geogram::write_lines(&mut writer, lines).map_err(|e| FramescopeError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("wrote {} field segments to {}", lines.num_edges(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/model.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("model.mesh"), Some(Format::Medit));
        assert_eq!(Format::from_path("model.off"), Some(Format::Off));
        assert_eq!(Format::from_path("model.stl"), Some(Format::Stl));
        assert_eq!(
            Format::from_path("model.geogram_ascii"),
            Some(Format::GeogramAscii)
        );
        assert_eq!(Format::from_path("model.ply"), None);
        assert_eq!(Format::from_path("model"), None);
        assert_eq!(Format::from_extension(".stl"), Some(Format::Stl));
    }

    #[test]
    fn test_supported_formats_message() {
        assert_eq!(
            supported_formats(),
            ".obj, .mesh, .off, .stl, .geogram_ascii"
        );
    }

    #[test]
    fn test_unsupported_extension_is_fatal() {
        let err = load("does/not/exist.ply").unwrap_err();
        assert!(matches!(err, FramescopeError::UnsupportedFormat { ref extension, .. } if extension == "ply"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load("does/not/exist.off").unwrap_err();
        assert!(matches!(err, FramescopeError::Load { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_fan_triangulation() {
        let mut raw = RawMesh::default();
        raw.push_polygon(&[0, 1, 2, 3, 4]);
        raw.push_polygon(&[5, 6]);
        assert_eq!(raw.faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_header_count() {
        assert_eq!(header_count(12.0, "count").unwrap(), 12);
        assert!(header_count(-1.0, "count").is_err());
        assert!(header_count(2.5, "count").is_err());
        assert!(header_count(1e20, "count").is_err());
        assert!(header_count(f64::NAN, "count").is_err());
        assert!(checked_total(usize::MAX, 9, "cells").is_err());
        assert_eq!(checked_total(4, 9, "cells").unwrap(), 36);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let raw = RawMesh {
            vertices: vec![Vec3::ZERO; 2],
            faces: vec![[0, 1, 2]],
        };
        assert!(raw.validate().is_err());
        assert!(RawMesh::default().validate().is_err());
    }
}
