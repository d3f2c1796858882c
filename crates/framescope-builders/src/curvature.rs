//! Cross fields aligned with principal curvature directions.
//!
//! Each face gets a shape operator fitted to the variation of vertex normals
//! along its edges. Operators are lifted to 3D tensors so they can be
//! averaged between elements without transport, projected back into each
//! element frame and turned into a direction plus a confidence. Confident
//! elements are locked, uncertain ones are filled in by diffusion.

use framescope_core::{
    CurvatureParams, ElementKind, FieldKind, FieldResult, Result, SurfaceMesh,
};
use glam::{Mat3, Vec2, Vec3};

use crate::connection::Connection;
use crate::diffusion::Diffusion;
use crate::features::{feature_constraints, lock_features, CORNER_AGREEMENT};

const DEGENERATE: f32 = 1e-12;

/// Symmetric 2x2 tensor `[[a, b], [b, c]]` in some tangent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeOperator {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl ShapeOperator {
    /// Angle of the direction of largest curvature.
    pub fn principal_angle(self) -> f32 {
        0.5 * (2.0 * self.b).atan2(self.a - self.c)
    }

    /// Principal curvatures `(k1, k2)`, `k1 >= k2`.
    pub fn principal_curvatures(self) -> (f32, f32) {
        let mean = 0.5 * (self.a + self.c);
        let radius = (0.25 * (self.a - self.c).powi(2) + self.b * self.b).sqrt();
        (mean + radius, mean - radius)
    }

    /// How clearly one direction dominates, in `[0, 1]`.
    pub fn confidence(self) -> f32 {
        let (k1, k2) = self.principal_curvatures();
        let denom = k1.abs() + k2.abs();
        if denom <= f32::EPSILON {
            0.0
        } else {
            ((k1 - k2).abs() / denom).min(1.0)
        }
    }

    /// Lifts the operator to a world-space tensor.
    pub fn to_world(self, bx: Vec3, by: Vec3) -> Mat3 {
        outer(bx, bx) * self.a + (outer(bx, by) + outer(by, bx)) * self.b + outer(by, by) * self.c
    }

    /// Restricts a world-space tensor to the frame `(bx, by)`.
    pub fn from_world(tensor: &Mat3, bx: Vec3, by: Vec3) -> Self {
        Self {
            a: bx.dot(*tensor * bx),
            b: bx.dot(*tensor * by),
            c: by.dot(*tensor * by),
        }
    }
}

fn outer(u: Vec3, v: Vec3) -> Mat3 {
    Mat3::from_cols(u * v.x, u * v.y, u * v.z)
}

/// Least-squares shape operator of every face, in the face tangent frame.
///
/// Solves `S·dp = dn` over the three edges, where `dp` and `dn` are the
/// projected position and vertex-normal differences.
pub fn face_shape_operators(mesh: &SurfaceMesh) -> Vec<ShapeOperator> {
    let (basis_x, basis_y) = mesh.face_tangent_basis();
    let normals = mesh.vertex_normals();

    mesh.faces()
        .iter()
        .enumerate()
        .map(|(f, face)| {
            let (bx, by) = (basis_x[f], basis_y[f]);
            // Normal equations for the unknowns (a, b, c)
            let mut m = Mat3::ZERO;
            let mut rhs = Vec3::ZERO;
            for i in 0..3 {
                let (p, q) = (face[i] as usize, face[(i + 1) % 3] as usize);
                let dp = mesh.vertices()[q] - mesh.vertices()[p];
                let dn = normals[q] - normals[p];
                let u = Vec2::new(dp.dot(bx), dp.dot(by));
                let w = Vec2::new(dn.dot(bx), dn.dot(by));
                for (row, target) in [(Vec3::new(u.x, u.y, 0.0), w.x), (Vec3::new(0.0, u.x, u.y), w.y)] {
                    m += outer(row, row);
                    rhs += row * target;
                }
            }
            solve_cramer(&m, rhs).map_or_else(ShapeOperator::default, |x| ShapeOperator {
                a: x.x,
                b: x.y,
                c: x.z,
            })
        })
        .collect()
}

fn solve_cramer(m: &Mat3, rhs: Vec3) -> Option<Vec3> {
    let det = m.determinant();
    if det.abs() < DEGENERATE {
        return None;
    }
    let dx = Mat3::from_cols(rhs, m.y_axis, m.z_axis).determinant();
    let dy = Mat3::from_cols(m.x_axis, rhs, m.z_axis).determinant();
    let dz = Mat3::from_cols(m.x_axis, m.y_axis, rhs).determinant();
    Some(Vec3::new(dx, dy, dz) / det)
}

/// World-space curvature tensor of every element of `conn`, averaged over
/// `patch_size` rings.
pub fn element_tensors(mesh: &SurfaceMesh, conn: &Connection, patch_size: u32) -> Vec<Mat3> {
    let (face_x, face_y) = mesh.face_tangent_basis();
    let face_tensors: Vec<Mat3> = face_shape_operators(mesh)
        .into_iter()
        .enumerate()
        .map(|(f, s)| s.to_world(face_x[f], face_y[f]))
        .collect();

    let mut tensors = match conn.kind() {
        ElementKind::Faces => face_tensors,
        ElementKind::Edges => (0..mesh.num_edges() as u32)
            .map(|e| {
                let faces = mesh.edge_faces(e);
                let sum = faces.iter().fold(Mat3::ZERO, |acc, &f| acc + face_tensors[f as usize]);
                sum * (1.0 / faces.len().max(1) as f32)
            })
            .collect(),
        ElementKind::Vertices => {
            let mut sums = vec![Mat3::ZERO; mesh.num_vertices()];
            let mut areas = vec![0.0f32; mesh.num_vertices()];
            for (f, face) in mesh.faces().iter().enumerate() {
                let area = mesh.face_area(f as u32);
                for &v in face {
                    sums[v as usize] += face_tensors[f] * area;
                    areas[v as usize] += area;
                }
            }
            sums.into_iter()
                .zip(areas)
                .map(|(t, area)| if area > 0.0 { t * (1.0 / area) } else { t })
                .collect()
        }
    };

    for _ in 1..patch_size {
        tensors = (0..conn.len() as u32)
            .map(|i| {
                let links = conn.links(i);
                let sum = links
                    .iter()
                    .fold(tensors[i as usize], |acc, l| acc + tensors[l.target as usize]);
                sum * (1.0 / (links.len() + 1) as f32)
            })
            .collect();
    }
    tensors
}

/// Builds a curvature-aligned cross field on vertices or faces.
pub fn build(mesh: &SurfaceMesh, params: &CurvatureParams) -> Result<FieldResult> {
    let kind = ElementKind::from(params.element);
    let order = CurvatureParams::ORDER;
    let conn = Connection::new(mesh, kind, false);
    crate::ensure_elements(&conn)?;

    let tensors = element_tensors(mesh, &conn, params.patch_size);
    let mut problem = Diffusion::new(vec![Vec2::ZERO; conn.len()], params.attach_weight);
    let mut ignored = 0usize;
    for (i, tensor) in tensors.iter().enumerate() {
        let (bx, by) = conn.frame(i as u32);
        let shape = ShapeOperator::from_world(tensor, bx, by);
        let confidence = shape.confidence();
        let z = Vec2::from_angle(order as f32 * shape.principal_angle());
        if confidence >= params.smooth_threshold {
            problem.lock(i, z);
        } else if confidence < params.confidence_threshold {
            problem.attach[i] = 0.0;
            ignored += 1;
        } else {
            problem.var[i] = z;
        }
    }

    if params.align_features {
        let constraints = feature_constraints(mesh, &conn, order);
        lock_features(&mut problem, &constraints, CORNER_AGREEMENT);
    }
    log::debug!(
        "curvature field: {} locked, {ignored} ignored of {} {kind}",
        problem.num_locked(),
        conn.len()
    );

    problem.run(&conn, order, params.smoothing_steps);

    let (basis_x, basis_y) = conn.into_bases();
    crate::finish(
        FieldKind::Curvature(params.element),
        order,
        problem.var,
        basis_x,
        basis_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{cylinder, flat_grid, octahedron};
    use framescope_core::CurvatureElement;

    #[test]
    fn test_shape_operator_invariants() {
        let s = ShapeOperator { a: 2.0, b: 0.0, c: 0.0 };
        assert_eq!(s.principal_curvatures(), (2.0, 0.0));
        assert!((s.confidence() - 1.0).abs() < 1e-6);
        assert!(s.principal_angle().abs() < 1e-6);

        let umbilic = ShapeOperator { a: 1.0, b: 0.0, c: 1.0 };
        assert!(umbilic.confidence() < 1e-6);
        assert_eq!(ShapeOperator::default().confidence(), 0.0);

        let rotated = ShapeOperator { a: 0.0, b: 0.0, c: 3.0 };
        assert!((rotated.principal_angle().abs() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_world_tensor_roundtrip_in_frame() {
        let s = ShapeOperator { a: 0.3, b: -0.2, c: 1.1 };
        let back = ShapeOperator::from_world(&s.to_world(Vec3::X, Vec3::Z), Vec3::X, Vec3::Z);
        assert!((back.a - s.a).abs() < 1e-6);
        assert!((back.b - s.b).abs() < 1e-6);
        assert!((back.c - s.c).abs() < 1e-6);
    }

    #[test]
    fn test_flat_grid_has_no_curvature() {
        let mesh = flat_grid(2);
        for s in face_shape_operators(&mesh) {
            assert!(s.a.abs() < 1e-6 && s.b.abs() < 1e-6 && s.c.abs() < 1e-6);
        }
    }

    #[test]
    fn test_cylinder_directions_follow_the_axis() {
        let mesh = cylinder(12, 4);
        let params = CurvatureParams {
            element: CurvatureElement::Faces,
            patch_size: 1,
            ..CurvatureParams::default()
        };
        let field = build(&mesh, &params).unwrap();
        // the cylinder axis is Z: every cross away from the rims has one branch along it
        for i in 2 * 12..2 * 12 * 3 {
            let best = field
                .directions(i)
                .map(|d| d.z.abs())
                .fold(0.0f32, f32::max);
            assert!(best > 0.95, "face {i} cross is not aligned with the axis");
        }
    }

    #[test]
    fn test_output_is_unit_cross_field() {
        let mesh = octahedron(0.15);
        for element in [CurvatureElement::Vertices, CurvatureElement::Faces] {
            let params = CurvatureParams {
                element,
                ..CurvatureParams::default()
            };
            let field = build(&mesh, &params).unwrap();
            assert_eq!(field.order(), 4);
            assert_eq!(field.len(), mesh.num_elements(element.into()));
            assert!(field
                .var()
                .iter()
                .all(|z| z.is_finite() && (z.length() - 1.0).abs() < 1e-4));
        }
    }
}
