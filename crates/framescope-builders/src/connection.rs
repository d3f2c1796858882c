//! Discrete connection between neighbouring element frames.
//!
//! Every element carries a tangent frame `(X, Y)`. Two neighbouring frames
//! are related through a direction `d` tangent to both: its angle is
//! `α_a(d)` in frame `a` and `α_b(d)` in frame `b`, and a tangent vector at
//! angle `θ` in `a` corresponds to angle `θ + ρ_ab` in `b`, with
//! `ρ_ab = α_b(d) − α_a(d)`.

use std::f32::consts::{PI, TAU};

use framescope_core::{ElementKind, SurfaceMesh};
use glam::{Vec2, Vec3};

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle - TAU * (angle / TAU).round();
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Angle of `d` in the frame `(bx, by)`.
pub fn frame_angle(d: Vec3, bx: Vec3, by: Vec3) -> f32 {
    d.dot(by).atan2(d.dot(bx))
}

/// Transport angle `ρ_ab` from frame `a` to frame `b` through the shared direction `d`.
pub fn transport_angle(d: Vec3, a: (Vec3, Vec3), b: (Vec3, Vec3)) -> f32 {
    frame_angle(d, b.0, b.1) - frame_angle(d, a.0, a.1)
}

/// One neighbour of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Neighbouring element.
    pub target: u32,
    /// Transport angle from this element's frame to the target's.
    pub angle: f32,
    /// Diffusion weight.
    pub weight: f32,
}

/// Per-element frames plus the adjacency used to compare them.
///
/// Vertices are linked through edges, faces through interior edges and edges
/// through the faces they share.
#[derive(Debug, Clone)]
pub struct Connection {
    kind: ElementKind,
    basis_x: Vec<Vec3>,
    basis_y: Vec<Vec3>,
    links: Vec<Vec<Link>>,
}

const MIN_COTAN_WEIGHT: f32 = 1e-4;

impl Connection {
    /// Builds frames and links for elements of `kind`.
    ///
    /// With `use_cotan_weights`, vertex links are weighted by the cotangent
    /// weight of their edge; every other link has weight 1.
    pub fn new(mesh: &SurfaceMesh, kind: ElementKind, use_cotan_weights: bool) -> Self {
        let (basis_x, basis_y) = mesh.tangent_basis(kind);
        let mut conn = Self {
            kind,
            links: vec![Vec::new(); basis_x.len()],
            basis_x,
            basis_y,
        };

        match kind {
            ElementKind::Vertices => {
                for (e, &[a, b]) in mesh.edges().iter().enumerate() {
                    let weight = if use_cotan_weights {
                        mesh.cotan_weight(e as u32).max(MIN_COTAN_WEIGHT)
                    } else {
                        1.0
                    };
                    conn.link(a, b, mesh.position(b) - mesh.position(a), weight);
                }
            }
            ElementKind::Faces => {
                for (e, &[a, b]) in mesh.edges().iter().enumerate() {
                    if let &[f, g] = mesh.edge_faces(e as u32) {
                        conn.link(f, g, mesh.position(b) - mesh.position(a), 1.0);
                    }
                }
            }
            ElementKind::Edges => {
                let (face_x, _) = mesh.face_tangent_basis();
                for f in 0..mesh.num_faces() as u32 {
                    let [e0, e1, e2] = mesh.face_edges(f);
                    let d = face_x[f as usize];
                    conn.link(e0, e1, d, 1.0);
                    conn.link(e1, e2, d, 1.0);
                    conn.link(e2, e0, d, 1.0);
                }
            }
        }
        conn
    }

    fn link(&mut self, a: u32, b: u32, d: Vec3, weight: f32) {
        let angle = transport_angle(d, self.frame(a), self.frame(b));
        self.links[a as usize].push(Link {
            target: b,
            angle,
            weight,
        });
        self.links[b as usize].push(Link {
            target: a,
            angle: -angle,
            weight,
        });
    }

    /// Element kind the frames live on.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if there is no element.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Frame `(X, Y)` of element `i`.
    pub fn frame(&self, i: u32) -> (Vec3, Vec3) {
        (self.basis_x[i as usize], self.basis_y[i as usize])
    }

    /// Neighbours of element `i`.
    pub fn links(&self, i: u32) -> &[Link] {
        &self.links[i as usize]
    }

    /// `order`-th power representation of the world direction `d` in the frame of `i`.
    #[allow(clippy::cast_precision_loss)]
    pub fn power(&self, i: u32, d: Vec3, order: u32) -> Vec2 {
        let (bx, by) = self.frame(i);
        Vec2::from_angle(order as f32 * frame_angle(d, bx, by))
    }

    /// Hands the frames over to a field result.
    pub fn into_bases(self) -> (Vec<Vec3>, Vec<Vec3>) {
        (self.basis_x, self.basis_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::flat_grid;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_transport_between_rotated_frames() {
        let a = (Vec3::X, Vec3::Y);
        let b = (Vec3::Y, -Vec3::X);
        // X is at angle 0 in a and -π/2 in b
        let rho = transport_angle(Vec3::X, a, b);
        assert!((rho + PI / 2.0).abs() < 1e-5);
        assert!((transport_angle(Vec3::Y, a, b) - rho).abs() < 1e-5);
    }

    #[test]
    fn test_adjacency_sizes() {
        let mesh = flat_grid(2);
        let vertices = Connection::new(&mesh, ElementKind::Vertices, true);
        let faces = Connection::new(&mesh, ElementKind::Faces, false);
        let edges = Connection::new(&mesh, ElementKind::Edges, false);

        let total = |c: &Connection| (0..c.len() as u32).map(|i| c.links(i).len()).sum::<usize>();
        assert_eq!(total(&vertices), 2 * mesh.num_edges());
        // interior edges: 16 edges minus 8 on the boundary
        assert_eq!(total(&faces), 2 * 8);
        assert_eq!(total(&edges), 2 * 3 * mesh.num_faces());
        assert_eq!(vertices.links(4).len(), 6);
    }

    #[test]
    fn test_links_are_antisymmetric() {
        let mesh = flat_grid(2);
        let conn = Connection::new(&mesh, ElementKind::Faces, false);
        for i in 0..conn.len() as u32 {
            for link in conn.links(i) {
                let back = conn
                    .links(link.target)
                    .iter()
                    .find(|l| l.target == i)
                    .unwrap();
                assert!((back.angle + link.angle).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_power_of_basis_direction() {
        let mesh = flat_grid(1);
        let conn = Connection::new(&mesh, ElementKind::Faces, false);
        let (bx, _) = conn.frame(0);
        assert!((conn.power(0, bx, 4) - Vec2::X).length() < 1e-5);
        assert!((conn.power(0, -bx, 2) - Vec2::X).length() < 1e-5);
        assert!((conn.power(0, -bx, 1) + Vec2::X).length() < 1e-5);
    }
}
