//! Alignment constraints from sharp and boundary edges.

use framescope_core::{ElementKind, SurfaceMesh, DEFAULT_FEATURE_ANGLE};
use glam::Vec2;

use crate::connection::Connection;
use crate::diffusion::Diffusion;

/// Agreement needed to lock an element when feature directions are exact.
pub const STRICT_AGREEMENT: f32 = 0.99;
/// Agreement needed to lock an element at corners between feature curves.
pub const CORNER_AGREEMENT: f32 = 0.5;

/// Mean power representation of the feature edges touching each element.
///
/// A feature edge constrains its endpoints for vertex fields, its adjacent
/// faces for face fields and itself for edge fields. Elements away from
/// features get `None`.
pub fn feature_constraints(mesh: &SurfaceMesh, conn: &Connection, order: u32) -> Vec<Option<Vec2>> {
    let features = mesh.feature_edges(DEFAULT_FEATURE_ANGLE);
    let mut sums = vec![Vec2::ZERO; conn.len()];
    let mut counts = vec![0u32; conn.len()];

    for (e, &[a, b]) in mesh.edges().iter().enumerate() {
        if !features[e] {
            continue;
        }
        let d = mesh.position(b) - mesh.position(a);
        let constrained: Vec<u32> = match conn.kind() {
            ElementKind::Vertices => vec![a, b],
            ElementKind::Faces => mesh.edge_faces(e as u32).to_vec(),
            ElementKind::Edges => vec![e as u32],
        };
        for i in constrained {
            sums[i as usize] += conn.power(i, d, order);
            counts[i as usize] += 1;
        }
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f32))
        .collect()
}

/// Locks every element whose mean feature direction has more than
/// `min_agreement` magnitude. Returns the number of new locks.
pub fn lock_features(problem: &mut Diffusion, constraints: &[Option<Vec2>], min_agreement: f32) -> usize {
    let mut locked = 0;
    for (i, constraint) in constraints.iter().enumerate() {
        if let Some(mean) = constraint {
            if mean.length() > min_agreement {
                problem.lock(i, mean.normalize());
                locked += 1;
            }
        }
    }
    locked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::flat_grid;

    #[test]
    fn test_boundary_constrains_grid_border() {
        let mesh = flat_grid(2);
        let conn = Connection::new(&mesh, ElementKind::Vertices, false);
        let constraints = feature_constraints(&mesh, &conn, 4);
        // every vertex but the centre touches the boundary
        assert!(constraints[4].is_none());
        assert_eq!(constraints.iter().filter(|c| c.is_some()).count(), 8);
        // border directions are axis aligned, so a cross field agrees everywhere
        for c in constraints.iter().flatten() {
            assert!((c.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_conflicting_directions_stay_free() {
        let mesh = flat_grid(2);
        let conn = Connection::new(&mesh, ElementKind::Vertices, false);
        // a line field sees perpendicular border edges at the corners as opposite
        let constraints = feature_constraints(&mesh, &conn, 2);
        assert!(constraints[0].unwrap().length() < 1e-4);

        let mut problem = Diffusion::new(vec![Vec2::X; conn.len()], 1.0);
        let locked = lock_features(&mut problem, &constraints, STRICT_AGREEMENT);
        // the four edge midpoints lock, the four corners do not
        assert_eq!(locked, 4);
        assert!(!problem.locked[0]);
        assert!(problem.locked[1]);
    }
}
