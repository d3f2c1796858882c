//! Connectivity of surface meshes: edges, incidences and vertex fans.

use std::collections::HashMap;

use super::SurfaceMesh;
use crate::error::{FramescopeError, Result};

/// Faces around a vertex in counter-clockwise order (seen from the normal side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFan {
    /// Incident faces, each sharing an edge with the next one.
    pub faces: Vec<u32>,
    /// Whether the last face is adjacent to the first (interior vertex).
    pub closed: bool,
}

impl SurfaceMesh {
    /// Computes edges, edge/face incidences and the directed-edge table.
    pub(super) fn compute_topology(&mut self) -> Result<()> {
        let mut edge_set: Vec<[u32; 2]> = self
            .faces
            .iter()
            .flat_map(|face| (0..3).map(move |i| sorted_pair(face[i], face[(i + 1) % 3])))
            .collect();
        edge_set.sort_unstable();
        edge_set.dedup();

        self.edge_lookup = edge_set
            .iter()
            .enumerate()
            .map(|(i, &[a, b])| ((a, b), i as u32))
            .collect();
        self.edge_faces = vec![Vec::new(); edge_set.len()];
        self.edges = edge_set;
        self.vertex_faces = vec![Vec::new(); self.vertices.len()];
        self.face_edges = Vec::with_capacity(self.faces.len());
        self.halfedge_faces = HashMap::with_capacity(self.faces.len() * 3);

        for (face_idx, face) in self.faces.iter().enumerate() {
            let f = face_idx as u32;
            let mut edges = [0u32; 3];
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let [lo, hi] = sorted_pair(a, b);
                let e = self.edge_lookup[&(lo, hi)];
                edges[i] = e;

                let incident = &mut self.edge_faces[e as usize];
                incident.push(f);
                if incident.len() > 2 {
                    return Err(FramescopeError::InvalidMesh(format!(
                        "edge ({lo}, {hi}) has more than two incident faces"
                    )));
                }
                if self.halfedge_faces.insert((a, b), f).is_some() {
                    return Err(FramescopeError::InvalidMesh(format!(
                        "faces are not consistently oriented around edge ({lo}, {hi})"
                    )));
                }
                self.vertex_faces[a as usize].push(f);
            }
            self.face_edges.push(edges);
        }
        Ok(())
    }

    /// Index of the edge between `a` and `b`, in either order.
    pub fn edge_index(&self, a: u32, b: u32) -> Option<u32> {
        let [lo, hi] = sorted_pair(a, b);
        self.edge_lookup.get(&(lo, hi)).copied()
    }

    /// Faces incident to edge `e` (one on the boundary, two inside).
    pub fn edge_faces(&self, e: u32) -> &[u32] {
        &self.edge_faces[e as usize]
    }

    /// Edges of face `f`; entry `i` joins corners `i` and `i + 1`.
    pub fn face_edges(&self, f: u32) -> [u32; 3] {
        self.face_edges[f as usize]
    }

    /// Faces incident to vertex `v`, in face-id order.
    pub fn vertex_faces(&self, v: u32) -> &[u32] {
        &self.vertex_faces[v as usize]
    }

    /// Face containing the directed edge `a → b`.
    pub fn halfedge_face(&self, a: u32, b: u32) -> Option<u32> {
        self.halfedge_faces.get(&(a, b)).copied()
    }

    /// Corner index of vertex `v` in face `f`.
    pub fn corner_of(&self, f: u32, v: u32) -> Option<usize> {
        self.faces[f as usize].iter().position(|&x| x == v)
    }

    /// Whether edge `e` has a single incident face.
    pub fn is_boundary_edge(&self, e: u32) -> bool {
        self.edge_faces[e as usize].len() < 2
    }

    /// Whether vertex `v` lies on a boundary edge.
    pub fn is_boundary_vertex(&self, v: u32) -> bool {
        self.vertex_faces[v as usize].iter().any(|&f| {
            let face = self.faces[f as usize];
            face.iter()
                .filter(|&&w| w != v)
                .any(|&w| self.edge_index(v, w).is_some_and(|e| self.is_boundary_edge(e)))
        })
    }

    /// Boundary flag of every vertex.
    pub fn boundary_vertices(&self) -> Vec<bool> {
        let mut flags = vec![false; self.vertices.len()];
        for (e, &[a, b]) in self.edges.iter().enumerate() {
            if self.is_boundary_edge(e as u32) {
                flags[a as usize] = true;
                flags[b as usize] = true;
            }
        }
        flags
    }

    /// Boundary edges and interior edges sharper than `angle_threshold`.
    pub fn feature_edges(&self, angle_threshold: f32) -> Vec<bool> {
        (0..self.edges.len() as u32)
            .map(|e| self.dihedral_angle(e).map_or(true, |angle| angle > angle_threshold))
            .collect()
    }

    /// Faces around `v` ordered counter-clockwise.
    ///
    /// Face `(v, a, b)` is followed by the face containing `v → b`. Boundary
    /// fans start at the face without a clockwise neighbour; closed fans start
    /// at the lowest face id.
    pub fn vertex_fan(&self, v: u32) -> VertexFan {
        let incident = &self.vertex_faces[v as usize];
        let Some(&first) = incident.iter().min() else {
            return VertexFan {
                faces: Vec::new(),
                closed: false,
            };
        };

        let start = incident
            .iter()
            .copied()
            .filter(|&f| self.fan_prev(f, v).is_none())
            .min()
            .unwrap_or(first);

        let mut faces = vec![start];
        let mut closed = false;
        let mut current = start;
        while let Some(next) = self.fan_next(current, v) {
            if next == start {
                closed = true;
                break;
            }
            if faces.len() > incident.len() {
                break;
            }
            faces.push(next);
            current = next;
        }

        // Non-manifold vertices (several fans) are never treated as interior
        let closed = closed && faces.len() == incident.len();
        VertexFan { faces, closed }
    }

    /// Next face counter-clockwise around `v` after `f`.
    fn fan_next(&self, f: u32, v: u32) -> Option<u32> {
        let corner = self.corner_of(f, v)?;
        let prev = self.faces[f as usize][(corner + 2) % 3];
        self.halfedge_face(v, prev)
    }

    /// Previous face counter-clockwise around `v` before `f`.
    fn fan_prev(&self, f: u32, v: u32) -> Option<u32> {
        let corner = self.corner_of(f, v)?;
        let next = self.faces[f as usize][(corner + 1) % 3];
        self.halfedge_face(next, v)
    }
}

fn sorted_pair(a: u32, b: u32) -> [u32; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}
