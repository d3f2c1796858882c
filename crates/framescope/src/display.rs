//! Display sinks for fields and singularities.
//!
//! The session hands finished results to a [`Viewer`]; viewers never drive
//! the session. [`TextViewer`] prints summaries and one JSON record per
//! singularity.

use std::io::Write;

use crate::singularities::{total_index, Singularity};
use crate::{FieldResult, FramescopeError, LineMesh, SurfaceMesh, Vec3};

/// Tangent frames ready to draw: `order` world vectors per anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDisplay {
    /// Element anchors.
    pub anchors: Vec<Vec3>,
    /// `directions[k][i]` is the k-th direction of element `i`.
    pub directions: Vec<Vec<Vec3>>,
}

impl FrameDisplay {
    /// Collects the frame directions of every element of `field`.
    pub fn from_field(mesh: &SurfaceMesh, field: &FieldResult) -> Self {
        let mut directions = vec![Vec::with_capacity(field.len()); field.order() as usize];
        for i in 0..field.len() {
            for (k, d) in field.directions(i).enumerate() {
                directions[k].push(d);
            }
        }
        Self {
            anchors: mesh.element_positions(field.element()),
            directions,
        }
    }

    /// Symmetry order of the displayed frames.
    pub fn order(&self) -> usize {
        self.directions.len()
    }
}

/// Receives display updates from the session.
pub trait Viewer {
    /// Shows tangent frames of a vertex or face field.
    fn show_frames(&mut self, frames: &FrameDisplay);

    /// Shows an edge field as line segments.
    fn show_field_lines(&mut self, lines: &LineMesh);

    /// Shows singularity markers with their indices.
    fn show_singularities(&mut self, singularities: &[Singularity]);

    /// Removes any displayed field.
    fn clear_field(&mut self);

    /// Removes any displayed singularity markers.
    fn clear_singularities(&mut self);

    /// Informational message.
    fn message(&mut self, text: &str);

    /// A command failed.
    fn error(&mut self, err: &FramescopeError);
}

/// Writes display updates as text.
pub struct TextViewer<W: Write> {
    out: W,
}

impl<W: Write> TextViewer<W> {
    /// Creates a viewer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the viewer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            log::warn!("viewer output failed: {e}");
        }
    }
}

impl<W: Write> Viewer for TextViewer<W> {
    fn show_frames(&mut self, frames: &FrameDisplay) {
        self.line(&format!(
            "frames: {} elements, {} directions each",
            frames.anchors.len(),
            frames.order()
        ));
    }

    fn show_field_lines(&mut self, lines: &LineMesh) {
        self.line(&format!("field lines: {} segments", lines.num_edges()));
    }

    fn show_singularities(&mut self, singularities: &[Singularity]) {
        self.line(&format!(
            "singularities: {} (total index {})",
            singularities.len(),
            total_index(singularities)
        ));
        for s in singularities {
            match serde_json::to_string(s) {
                Ok(json) => self.line(&json),
                Err(e) => log::warn!("could not serialize singularity: {e}"),
            }
        }
    }

    fn clear_field(&mut self) {}

    fn clear_singularities(&mut self) {}

    fn message(&mut self, text: &str) {
        self.line(text);
    }

    fn error(&mut self, err: &FramescopeError) {
        self.line(&format!("error: {err}"));
    }
}
