use glam::Vec3;

/// A set of straight segments, used to export and display frame fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMesh {
    /// Segment end points.
    pub vertices: Vec<Vec3>,
    /// Segments as vertex index pairs.
    pub edges: Vec<[u32; 2]>,
}

impl LineMesh {
    /// Creates an empty line mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the segment `from → to` with its own two vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_segment(&mut self, from: Vec3, to: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices.push(from);
        self.vertices.push(to);
        self.edges.push([base, base + 1]);
    }

    /// Returns the number of segments.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if there is no segment.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
