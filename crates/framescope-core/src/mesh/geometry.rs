//! Geometry computation methods for surface meshes.
//!
//! This module contains methods for computing derived mesh data from raw vertices and faces:
//! - Face and vertex normals, face barycenters
//! - Corner angles, angle defects, cotangent weights and dihedral angles
//! - Tangent basis computation for fields on vertices, faces and edges

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::SurfaceMesh;
use crate::element::ElementKind;

impl SurfaceMesh {
    // === Computation methods ===

    /// Computes face normals using cross product of first two edges.
    pub(super) fn compute_face_normals(&mut self) {
        self.face_normals = self
            .faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0] as usize];
                let v1 = self.vertices[face[1] as usize];
                let v2 = self.vertices[face[2] as usize];
                (v1 - v0).cross(v2 - v0).normalize_or_zero()
            })
            .collect();
    }

    /// Computes vertex normals as area-weighted average of incident face normals.
    pub(super) fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for face in &self.faces {
            let v0 = self.vertices[face[0] as usize];
            let v1 = self.vertices[face[1] as usize];
            let v2 = self.vertices[face[2] as usize];
            // Cross product length is twice the area, so this is area-weighted
            let weighted_normal = (v1 - v0).cross(v2 - v0);
            for &vi in face {
                normals[vi as usize] += weighted_normal;
            }
        }

        self.vertex_normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();
    }

    pub(super) fn compute_face_barycenters(&mut self) {
        self.face_barycenters = self
            .faces
            .iter()
            .map(|face| face.iter().map(|&v| self.vertices[v as usize]).sum::<Vec3>() / 3.0)
            .collect();
    }

    // === Queries ===

    /// Axis-aligned bounding box `(min, max)` of the vertices.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for &p in &self.vertices {
            min = min.min(p);
            max = max.max(p);
        }
        if self.vertices.is_empty() {
            (Vec3::ZERO, Vec3::ZERO)
        } else {
            (min, max)
        }
    }

    /// Mean length over all edges.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_edge_length(&self) -> f32 {
        if self.edges.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .edges
            .iter()
            .map(|&[a, b]| self.position(a).distance(self.position(b)))
            .sum();
        total / self.edges.len() as f32
    }

    /// Area of face `f`.
    pub fn face_area(&self, f: u32) -> f32 {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(p2 - p0).length() * 0.5
    }

    /// Interior angle of face `f` at its corner `corner` (0, 1 or 2).
    pub fn corner_angle(&self, f: u32, corner: usize) -> f32 {
        let face = self.faces[f as usize];
        let a = self.position(face[corner]);
        let b = self.position(face[(corner + 1) % 3]);
        let c = self.position(face[(corner + 2) % 3]);
        let ab = (b - a).normalize_or_zero();
        let ac = (c - a).normalize_or_zero();
        ab.dot(ac).clamp(-1.0, 1.0).acos()
    }

    /// Angle defect at vertex `v`.
    ///
    /// `2π − Σ corner angles` for interior vertices (integrated Gaussian
    /// curvature), `π − Σ corner angles` on the boundary (turning angle).
    pub fn angle_defect(&self, v: u32) -> f32 {
        let angle_sum: f32 = self.vertex_faces[v as usize]
            .iter()
            .filter_map(|&f| self.corner_of(f, v).map(|c| self.corner_angle(f, c)))
            .sum();
        if self.is_boundary_vertex(v) {
            PI - angle_sum
        } else {
            TAU - angle_sum
        }
    }

    /// Cotangent weight `(cot α + cot β) / 2` of edge `e`, from the angles
    /// opposite to it in its incident faces.
    pub fn cotan_weight(&self, e: u32) -> f32 {
        let [a, b] = self.edges[e as usize];
        let mut weight = 0.0;
        for &f in &self.edge_faces[e as usize] {
            let Some(opposite) = self.faces[f as usize]
                .iter()
                .position(|&v| v != a && v != b)
            else {
                continue;
            };
            let face = self.faces[f as usize];
            let o = self.position(face[opposite]);
            let u = self.position(face[(opposite + 1) % 3]) - o;
            let w = self.position(face[(opposite + 2) % 3]) - o;
            let cross = u.cross(w).length();
            if cross > 1e-12 {
                weight += u.dot(w) / cross;
            }
        }
        weight * 0.5
    }

    /// Angle between the normals of the two faces of edge `e`.
    ///
    /// `None` for boundary edges.
    pub fn dihedral_angle(&self, e: u32) -> Option<f32> {
        match self.edge_faces[e as usize].as_slice() {
            &[f, g] => {
                let n0 = self.face_normals[f as usize];
                let n1 = self.face_normals[g as usize];
                Some(n0.dot(n1).clamp(-1.0, 1.0).acos())
            }
            _ => None,
        }
    }

    // === Tangent bases ===

    /// Compute default per-face tangent basis from first edge direction.
    pub fn face_tangent_basis(&self) -> (Vec<Vec3>, Vec<Vec3>) {
        let mut basis_x = Vec::with_capacity(self.faces.len());
        let mut basis_y = Vec::with_capacity(self.faces.len());

        for (face_idx, face) in self.faces.iter().enumerate() {
            let v0 = self.vertices[face[0] as usize];
            let v1 = self.vertices[face[1] as usize];
            let normal = self.face_normals[face_idx];

            let bx = (v1 - v0).normalize_or_zero();
            let by = normal.cross(bx).normalize_or_zero();
            basis_x.push(bx);
            basis_y.push(by);
        }

        (basis_x, basis_y)
    }

    /// Compute default per-vertex tangent basis from area-weighted face bases.
    pub fn vertex_tangent_basis(&self) -> (Vec<Vec3>, Vec<Vec3>) {
        let (face_bx, _face_by) = self.face_tangent_basis();

        let mut vert_bx = vec![Vec3::ZERO; self.vertices.len()];
        for (face_idx, face) in self.faces.iter().enumerate() {
            let weighted_bx = face_bx[face_idx] * self.face_area(face_idx as u32);
            for &vi in face {
                vert_bx[vi as usize] += weighted_bx;
            }
        }

        // Orthonormalize against vertex normals
        let mut basis_x = Vec::with_capacity(self.vertices.len());
        let mut basis_y = Vec::with_capacity(self.vertices.len());

        for (i, normal) in self.vertex_normals.iter().enumerate() {
            let bx = tangent_or_fallback(vert_bx[i], *normal);
            let by = normal.cross(bx).normalize_or_zero();
            basis_x.push(bx);
            basis_y.push(by);
        }

        (basis_x, basis_y)
    }

    /// Per-edge tangent basis: edge direction and the averaged face normal.
    pub fn edge_tangent_basis(&self) -> (Vec<Vec3>, Vec<Vec3>) {
        let mut basis_x = Vec::with_capacity(self.edges.len());
        let mut basis_y = Vec::with_capacity(self.edges.len());

        for (e, &[a, b]) in self.edges.iter().enumerate() {
            let normal = self.edge_faces[e]
                .iter()
                .map(|&f| self.face_normals[f as usize])
                .sum::<Vec3>()
                .normalize_or_zero();
            let bx = tangent_or_fallback(self.position(b) - self.position(a), normal);
            let by = normal.cross(bx).normalize_or_zero();
            basis_x.push(bx);
            basis_y.push(by);
        }

        (basis_x, basis_y)
    }

    /// Tangent basis of every element of `kind`.
    pub fn tangent_basis(&self, kind: ElementKind) -> (Vec<Vec3>, Vec<Vec3>) {
        match kind {
            ElementKind::Vertices => self.vertex_tangent_basis(),
            ElementKind::Faces => self.face_tangent_basis(),
            ElementKind::Edges => self.edge_tangent_basis(),
        }
    }
}

/// Projects `v` onto the plane orthogonal to `normal`, picking an arbitrary
/// tangent when the projection vanishes.
fn tangent_or_fallback(v: Vec3, normal: Vec3) -> Vec3 {
    let bx = (v - normal * normal.dot(v)).normalize_or_zero();
    if bx.length_squared() > 1e-6 {
        return bx;
    }
    let axis = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    (axis - normal * normal.dot(axis)).normalize_or_zero()
}
