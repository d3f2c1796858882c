//! Singularity indices of frame fields.
//!
//! The index of a cycle of elements `e_0 → e_1 → … → e_0` is
//!
//! ```text
//! round((Σ wrap(φ_b − φ_a − n·ρ_ab) + n·K) / 2π)
//! ```
//!
//! where `φ` is the phase of the power representation, `ρ_ab` the transport
//! angle between consecutive frames and `K` the holonomy of the cycle: the
//! angle defect for cycles around a vertex, zero for the edges of one face
//! and the wrapped sum of transport angles for the vertices of one face.
//! Vertices on the boundary always get index 0.

use std::f32::consts::TAU;

use framescope_core::{
    AttributeData, ElementKind, FieldResult, Result, SurfaceMesh, SINGULARITY_ATTRIBUTE,
};
use glam::Vec3;

use crate::connection::{transport_angle, wrap_angle};

/// Holonomy of a cycle.
#[derive(Debug, Clone, Copy)]
enum Holonomy {
    /// The wrapped sum of the transport angles.
    Wrapped,
    /// The representative of the sum of transport angles closest to this value.
    Near(f32),
}

/// Index of one cycle, given as `(from, to, shared direction)` steps.
#[allow(clippy::cast_precision_loss)]
fn cycle_index(field: &FieldResult, steps: &[(u32, u32, Vec3)], holonomy: Holonomy) -> i32 {
    let n = field.order() as f32;
    let frame = |i: u32| (field.basis_x()[i as usize], field.basis_y()[i as usize]);

    let mut turning = 0.0f32;
    let mut transport = 0.0f32;
    for &(a, b, d) in steps {
        let rho = transport_angle(d, frame(a), frame(b));
        transport += rho;
        turning += wrap_angle(field.phase(b as usize) - field.phase(a as usize) - n * rho);
    }
    let k = match holonomy {
        Holonomy::Wrapped => wrap_angle(transport),
        Holonomy::Near(target) => transport - TAU * ((transport - target) / TAU).round(),
    };
    ((turning + n * k) / TAU).round() as i32
}

/// Faces around `v` as `(face, corner of v)`, or `None` on the boundary.
fn closed_fan(mesh: &SurfaceMesh, v: u32) -> Option<Vec<(u32, usize)>> {
    let fan = mesh.vertex_fan(v);
    if !fan.closed {
        return None;
    }
    fan.faces
        .iter()
        .map(|&f| mesh.corner_of(f, v).map(|c| (f, c)))
        .collect()
}

/// Indices on the faces of a vertex field.
fn vertex_field_on_faces(mesh: &SurfaceMesh, field: &FieldResult) -> Vec<i32> {
    mesh.faces()
        .iter()
        .map(|face| {
            let steps: Vec<(u32, u32, Vec3)> = (0..3)
                .map(|i| {
                    let (a, b) = (face[i], face[(i + 1) % 3]);
                    (a, b, mesh.position(b) - mesh.position(a))
                })
                .collect();
            cycle_index(field, &steps, Holonomy::Wrapped)
        })
        .collect()
}

/// Indices on the vertices of a face field.
fn face_field_on_vertices(mesh: &SurfaceMesh, field: &FieldResult) -> Vec<i32> {
    (0..mesh.num_vertices() as u32)
        .map(|v| {
            let Some(fan) = closed_fan(mesh, v) else {
                return 0;
            };
            let steps: Vec<(u32, u32, Vec3)> = fan
                .iter()
                .enumerate()
                .map(|(i, &(f, corner))| {
                    let (g, _) = fan[(i + 1) % fan.len()];
                    // f = (v, a, b) is followed by the face holding v → b
                    let b = mesh.faces()[f as usize][(corner + 2) % 3];
                    (f, g, mesh.position(b) - mesh.position(v))
                })
                .collect();
            cycle_index(field, &steps, Holonomy::Near(mesh.angle_defect(v)))
        })
        .collect()
}

/// Indices on the vertices of an edge field.
fn edge_field_on_vertices(mesh: &SurfaceMesh, field: &FieldResult, face_x: &[Vec3]) -> Vec<i32> {
    (0..mesh.num_vertices() as u32)
        .map(|v| {
            let Some(fan) = closed_fan(mesh, v) else {
                return 0;
            };
            let steps: Option<Vec<(u32, u32, Vec3)>> = fan
                .iter()
                .map(|&(f, corner)| {
                    let face = mesh.faces()[f as usize];
                    let from = mesh.edge_index(v, face[(corner + 1) % 3])?;
                    let to = mesh.edge_index(v, face[(corner + 2) % 3])?;
                    Some((from, to, face_x[f as usize]))
                })
                .collect();
            steps.map_or(0, |steps| {
                cycle_index(field, &steps, Holonomy::Near(mesh.angle_defect(v)))
            })
        })
        .collect()
}

/// Indices on the faces of an edge field.
fn edge_field_on_faces(mesh: &SurfaceMesh, field: &FieldResult, face_x: &[Vec3]) -> Vec<i32> {
    (0..mesh.num_faces() as u32)
        .map(|f| {
            let [e0, e1, e2] = mesh.face_edges(f);
            let d = face_x[f as usize];
            cycle_index(field, &[(e0, e1, d), (e1, e2, d), (e2, e0, d)], Holonomy::Near(0.0))
        })
        .collect()
}

/// Singularity indices of `field`, per element kind it flags.
///
/// Vertex fields are flagged on faces, face fields on vertices and edge
/// fields on both vertices and faces.
pub fn compute(mesh: &SurfaceMesh, field: &FieldResult) -> Result<Vec<(ElementKind, Vec<i32>)>> {
    field.check_against(mesh)?;
    let indices = match field.element() {
        ElementKind::Vertices => vec![(ElementKind::Faces, vertex_field_on_faces(mesh, field))],
        ElementKind::Faces => vec![(ElementKind::Vertices, face_field_on_vertices(mesh, field))],
        ElementKind::Edges => {
            let (face_x, _) = mesh.face_tangent_basis();
            vec![
                (
                    ElementKind::Vertices,
                    edge_field_on_vertices(mesh, field, &face_x),
                ),
                (ElementKind::Faces, edge_field_on_faces(mesh, field, &face_x)),
            ]
        }
    };
    debug_assert!(indices
        .iter()
        .map(|(kind, _)| kind)
        .eq(field.kind().singularity_elements()));
    Ok(indices)
}

/// Writes the `singuls` attribute on every element kind flagged for `field`.
pub fn flag(mesh: &mut SurfaceMesh, field: &FieldResult) -> Result<()> {
    for (kind, indices) in compute(mesh, field)? {
        let count = indices.iter().filter(|&&i| i != 0).count();
        log::debug!("{count} singular {kind} for {}", field.kind());
        mesh.set_attribute(kind, SINGULARITY_ATTRIBUTE, AttributeData::Int(indices))?;
    }
    Ok(())
}
