//! Reference frame field builders for framescope.
//!
//! [`ReferenceBuilder`] implements [`FieldBuilder`] with:
//! - smooth fields of any order on vertices, faces or edges ([`smooth`])
//! - cross fields aligned with principal curvature directions ([`curvature`])
//! - singularity indices written to the `singuls` attribute ([`singularities`])
//!
//! Fields are stored as power representations in per-element tangent frames
//! and smoothed over a discrete [`Connection`] by Jacobi iterations.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Element ids are u32 by construction
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

pub mod connection;
pub mod curvature;
pub mod diffusion;
pub mod features;
pub mod singularities;
pub mod smooth;

pub use connection::{Connection, Link};
pub use diffusion::Diffusion;

use framescope_core::{
    FieldBuilder, FieldKind, FieldParams, FieldResult, FramescopeError, Result, SurfaceMesh,
};
use glam::{Vec2, Vec3};

/// Builds smooth and curvature-aligned fields and flags their singularities.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceBuilder;

impl ReferenceBuilder {
    /// Creates the builder.
    pub fn new() -> Self {
        Self
    }
}

impl FieldBuilder for ReferenceBuilder {
    fn build(&mut self, mesh: &SurfaceMesh, params: &FieldParams) -> Result<FieldResult> {
        log::info!("building {}", params.kind());
        match params {
            FieldParams::Smooth(p) => smooth::build(mesh, p),
            FieldParams::Curvature(p) => curvature::build(mesh, p),
        }
    }

    fn flag_singularities(&mut self, mesh: &mut SurfaceMesh, field: &FieldResult) -> Result<()> {
        singularities::flag(mesh, field)
    }
}

fn ensure_elements(conn: &Connection) -> Result<()> {
    if conn.is_empty() {
        Err(FramescopeError::Builder(format!(
            "mesh has no {} to carry a field",
            conn.kind()
        )))
    } else {
        Ok(())
    }
}

fn finish(
    kind: FieldKind,
    order: u32,
    var: Vec<Vec2>,
    basis_x: Vec<Vec3>,
    basis_y: Vec<Vec3>,
) -> Result<FieldResult> {
    if let Some(i) = var.iter().position(|z| !z.is_finite()) {
        return Err(FramescopeError::Builder(format!(
            "{kind}: non-finite value at element {i}"
        )));
    }
    FieldResult::new(kind, order, var, basis_x, basis_y)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use framescope_core::{
        CurvatureParams, ElementKind, SmoothParams, SINGULARITY_ATTRIBUTE,
    };

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
                let v10 = v00 + 1;
                let v01 = v00 + n + 1;
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        SurfaceMesh::new(vertices, faces).unwrap()
    }

    /// Octahedron with vertices pushed off the axes by up to `jitter`.
    pub(crate) fn octahedron(jitter: f32) -> SurfaceMesh {
        let axes = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let vertices = axes
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let t = i as f32;
                p + jitter * Vec3::new((1.3 * t).sin(), (2.1 * t).cos(), (0.7 * t + 0.4).sin())
            })
            .collect();
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        SurfaceMesh::new(vertices, faces).unwrap()
    }

    /// Open unit-radius cylinder around Z, height 2, `rings + 1` vertex rings.
    pub(crate) fn cylinder(segments: u32, rings: u32) -> SurfaceMesh {
        let mut vertices = Vec::new();
        for j in 0..=rings {
            for i in 0..segments {
                let theta = std::f32::consts::TAU * i as f32 / segments as f32;
                vertices.push(Vec3::new(theta.cos(), theta.sin(), 2.0 * j as f32 / rings as f32));
            }
        }
        let mut faces = Vec::new();
        for j in 0..rings {
            for i in 0..segments {
                let v00 = j * segments + i;
                let v10 = j * segments + (i + 1) % segments;
                let v01 = v00 + segments;
                let v11 = v10 + segments;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        SurfaceMesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn test_dispatches_on_mode() {
        let mesh = octahedron(0.1);
        let mut builder = ReferenceBuilder::new();

        let smooth = FieldParams::Smooth(SmoothParams {
            element: ElementKind::Edges,
            order: 2,
            ..SmoothParams::default()
        });
        let field = builder.build(&mesh, &smooth).unwrap();
        assert_eq!(field.kind(), smooth.kind());
        assert_eq!(field.order(), 2);

        let curvature = FieldParams::Curvature(CurvatureParams::default());
        let field = builder.build(&mesh, &curvature).unwrap();
        assert_eq!(field.kind(), curvature.kind());
        assert_eq!(field.order(), CurvatureParams::ORDER);
    }

    #[test]
    fn test_flags_follow_field_support() {
        let mut builder = ReferenceBuilder::new();
        for element in ElementKind::ALL {
            let mut mesh = octahedron(0.1);
            let params = FieldParams::Smooth(SmoothParams {
                element,
                ..SmoothParams::default()
            });
            let field = builder.build(&mesh, &params).unwrap();
            builder.flag_singularities(&mut mesh, &field).unwrap();

            let flagged = field.kind().singularity_elements();
            let mut total = 0;
            for kind in ElementKind::ALL {
                let attr = mesh.attribute(kind, SINGULARITY_ATTRIBUTE);
                assert_eq!(attr.is_some(), flagged.contains(&kind), "{element} field on {kind}");
                if let Some(attr) = attr {
                    assert_eq!(attr.len(), mesh.num_elements(kind));
                    total += attr.as_int().unwrap().iter().sum::<i32>();
                }
            }
            // closed genus-0 surface
            assert_eq!(total, 2 * 4, "{element} field");
        }
    }

    #[test]
    fn test_non_finite_output_is_a_builder_error() {
        let err = finish(
            FieldKind::Smooth(ElementKind::Faces),
            4,
            vec![Vec2::new(f32::NAN, 0.0)],
            vec![Vec3::X],
            vec![Vec3::Y],
        )
        .unwrap_err();
        assert!(matches!(err, FramescopeError::Builder(_)));
    }
}
