//! Export sink capability.

use std::path::Path;

use crate::error::Result;
use crate::mesh::{LineMesh, SurfaceMesh};

/// Serializes meshes to files of one format.
pub trait MeshExporter {
    /// File extension written by this exporter, without the dot.
    fn extension(&self) -> &str;

    /// Writes a surface mesh, including its attributes.
    fn save_surface(&mut self, mesh: &SurfaceMesh, path: &Path) -> Result<()>;

    /// Writes a line mesh.
    fn save_lines(&mut self, lines: &LineMesh, path: &Path) -> Result<()>;
}
