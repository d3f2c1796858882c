//! Smooth frame fields on vertices, faces or edges.

use framescope_core::{FieldKind, FieldResult, Result, SmoothParams, SurfaceMesh};
use glam::Vec2;

use crate::connection::Connection;
use crate::diffusion::Diffusion;
use crate::features::{feature_constraints, lock_features, CORNER_AGREEMENT, STRICT_AGREEMENT};

/// Builds a smooth field of `params.order` on `params.element`.
///
/// Every element starts at angle zero in its own frame. With
/// `align_features`, elements along sharp or boundary edges are locked to
/// the edge direction; `cad_correction` also locks corners where several
/// feature curves meet at compatible angles.
pub fn build(mesh: &SurfaceMesh, params: &SmoothParams) -> Result<FieldResult> {
    let kind = params.element;
    let conn = Connection::new(mesh, kind, params.use_cotan_weights);
    crate::ensure_elements(&conn)?;

    let mut problem = Diffusion::new(vec![Vec2::X; conn.len()], params.attach_weight);
    if params.align_features {
        let constraints = feature_constraints(mesh, &conn, params.order);
        let min_agreement = if params.cad_correction {
            CORNER_AGREEMENT
        } else {
            STRICT_AGREEMENT
        };
        let locked = lock_features(&mut problem, &constraints, min_agreement);
        log::debug!("smooth field: {locked} of {} {kind} locked on features", conn.len());
    }

    problem.run(&conn, params.order, params.smoothing_steps);

    let (basis_x, basis_y) = conn.into_bases();
    crate::finish(FieldKind::Smooth(kind), params.order, problem.var, basis_x, basis_y)
}
