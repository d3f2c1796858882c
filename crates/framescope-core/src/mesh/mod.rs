//! Triangle surface mesh store.
//!
//! The geometry and topology of a [`SurfaceMesh`] are fixed once it is built;
//! only its [`AttributeStore`] changes afterwards.

mod geometry;
mod lines;
mod topology;

pub use lines::LineMesh;
pub use topology::VertexFan;

use std::collections::HashMap;

use glam::Vec3;

use crate::attributes::{AttributeData, AttributeStore};
use crate::element::ElementKind;
use crate::error::{FramescopeError, Result};

/// Dihedral angle above which an interior edge counts as a sharp feature (40°).
pub const DEFAULT_FEATURE_ANGLE: f32 = 40.0 * std::f32::consts::PI / 180.0;

/// A triangulated surface with cached derived data.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    // Core data
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,

    // Topology
    edges: Vec<[u32; 2]>,
    edge_lookup: HashMap<(u32, u32), u32>,
    edge_faces: Vec<Vec<u32>>,
    face_edges: Vec<[u32; 3]>,
    halfedge_faces: HashMap<(u32, u32), u32>,
    vertex_faces: Vec<Vec<u32>>,

    // Geometry
    face_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    face_barycenters: Vec<Vec3>,

    attributes: AttributeStore,
}

impl SurfaceMesh {
    /// Builds a mesh from vertex positions and consistently oriented triangles.
    ///
    /// Fails on empty face lists, out-of-range or repeated indices, edges with
    /// more than two incident faces and inconsistent orientation.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        if faces.is_empty() {
            return Err(FramescopeError::InvalidMesh("mesh has no faces".into()));
        }
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&v) = face.iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(FramescopeError::InvalidMesh(format!(
                    "face {face_idx} references invalid vertex index {v}"
                )));
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(FramescopeError::InvalidMesh(format!(
                    "face {face_idx} is degenerate (has duplicate vertices)"
                )));
            }
        }

        let mut mesh = Self {
            vertices,
            faces,
            edges: Vec::new(),
            edge_lookup: HashMap::new(),
            edge_faces: Vec::new(),
            face_edges: Vec::new(),
            halfedge_faces: HashMap::new(),
            vertex_faces: Vec::new(),
            face_normals: Vec::new(),
            vertex_normals: Vec::new(),
            face_barycenters: Vec::new(),
            attributes: AttributeStore::new(),
        };
        mesh.compute_topology()?;
        mesh.compute_face_normals();
        mesh.compute_vertex_normals();
        mesh.compute_face_barycenters();

        log::debug!(
            "built surface mesh: {} vertices, {} faces, {} edges",
            mesh.num_vertices(),
            mesh.num_faces(),
            mesh.num_edges()
        );
        Ok(mesh)
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of elements of one kind.
    pub fn num_elements(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Vertices => self.num_vertices(),
            ElementKind::Faces => self.num_faces(),
            ElementKind::Edges => self.num_edges(),
        }
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Unique edges as sorted vertex pairs, in sorted order.
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    /// Per-face unit normals.
    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    /// Per-vertex area-weighted unit normals.
    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    /// Cached face centroids.
    pub fn face_barycenters(&self) -> &[Vec3] {
        &self.face_barycenters
    }

    /// Position of vertex `v`.
    pub fn position(&self, v: u32) -> Vec3 {
        self.vertices[v as usize]
    }

    /// Positions of the three corners of face `f`.
    pub fn face_positions(&self, f: u32) -> [Vec3; 3] {
        self.faces[f as usize].map(|v| self.vertices[v as usize])
    }

    /// Midpoint of edge `e`.
    pub fn edge_midpoint(&self, e: u32) -> Vec3 {
        let [a, b] = self.edges[e as usize];
        (self.position(a) + self.position(b)) * 0.5
    }

    /// Point in space representing element `id` of `kind`.
    ///
    /// Vertex position, face barycenter or edge midpoint.
    pub fn element_position(&self, kind: ElementKind, id: u32) -> Vec3 {
        match kind {
            ElementKind::Vertices => self.position(id),
            ElementKind::Faces => self.face_barycenters[id as usize],
            ElementKind::Edges => self.edge_midpoint(id),
        }
    }

    /// Anchor positions of every element of `kind`.
    pub fn element_positions(&self, kind: ElementKind) -> Vec<Vec3> {
        match kind {
            ElementKind::Vertices => self.vertices.clone(),
            ElementKind::Faces => self.face_barycenters.clone(),
            ElementKind::Edges => (0..self.num_edges() as u32)
                .map(|e| self.edge_midpoint(e))
                .collect(),
        }
    }

    // -- Attributes --

    /// Read access to the attribute store.
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Gets an attribute by kind and name.
    pub fn attribute(&self, kind: ElementKind, name: &str) -> Option<&AttributeData> {
        self.attributes.get(kind, name)
    }

    /// Writes an attribute, checking that it covers every element of `kind`.
    pub fn set_attribute(
        &mut self,
        kind: ElementKind,
        name: &str,
        data: AttributeData,
    ) -> Result<()> {
        let expected = self.num_elements(kind);
        if data.len() != expected {
            return Err(FramescopeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        self.attributes.set(kind, name, data);
        Ok(())
    }

    /// Removes an attribute if present.
    pub fn clear_attribute(&mut self, kind: ElementKind, name: &str) -> Option<AttributeData> {
        self.attributes.clear(kind, name)
    }

    /// Maps the bounding box into the unit cube, preserving aspect ratio.
    #[must_use]
    pub fn fit_into_unit_cube(mut self) -> Self {
        let (min, max) = self.bounding_box();
        let extent = (max - min).max_element();
        if extent <= f32::EPSILON {
            return self;
        }
        let scale = 1.0 / extent;
        for p in self.vertices.iter_mut().chain(self.face_barycenters.iter_mut()) {
            *p = (*p - min) * scale;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn tetrahedron() -> SurfaceMesh {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
            Vec3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        SurfaceMesh::new(vertices, faces).unwrap()
    }

    pub(crate) fn flat_grid(n: u32) -> SurfaceMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Vec3::new(i as f32, j as f32, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = j * (n + 1) + i + 1;
                let v01 = (j + 1) * (n + 1) + i;
                let v11 = (j + 1) * (n + 1) + i + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        SurfaceMesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn test_tetrahedron_counts() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_elements(ElementKind::Edges), 6);
    }

    #[test]
    fn test_rejects_bad_faces() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(SurfaceMesh::new(vertices.clone(), vec![]).is_err());
        assert!(SurfaceMesh::new(vertices.clone(), vec![[0, 1, 5]]).is_err());
        assert!(SurfaceMesh::new(vertices, vec![[0, 1, 1]]).is_err());
    }

    #[test]
    fn test_barycenters() {
        let mesh = flat_grid(1);
        let expected = (Vec3::new(0.0, 0.0, 0.0) + Vec3::new(1.0, 0.0, 0.0) + Vec3::new(1.0, 1.0, 0.0)) / 3.0;
        assert!((mesh.face_barycenters()[0] - expected).length() < 1e-6);
        assert_eq!(mesh.element_position(ElementKind::Faces, 0), mesh.face_barycenters()[0]);
        assert_eq!(mesh.element_position(ElementKind::Vertices, 3), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_attribute_length_is_checked() {
        let mut mesh = tetrahedron();
        let err = mesh
            .set_attribute(ElementKind::Faces, "x", AttributeData::Int(vec![0; 3]))
            .unwrap_err();
        assert!(matches!(err, FramescopeError::SizeMismatch { expected: 4, actual: 3 }));
        mesh.set_attribute(ElementKind::Edges, "x", AttributeData::Int(vec![0; 6]))
            .unwrap();
        assert!(mesh.attribute(ElementKind::Edges, "x").is_some());
        assert!(mesh.clear_attribute(ElementKind::Edges, "x").is_some());
        assert!(mesh.attributes().is_empty());
    }

    #[test]
    fn test_fit_into_unit_cube() {
        let vertices = vec![
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let mesh = SurfaceMesh::new(vertices, vec![[0, 1, 2]])
            .unwrap()
            .fit_into_unit_cube();
        let (min, max) = mesh.bounding_box();
        assert!(min.length() < 1e-6);
        assert!((max - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
        let bary = mesh.face_barycenters()[0];
        assert!((bary - Vec3::new(0.5, 1.0 / 6.0, 0.0)).length() < 1e-6);
    }
}
