//! Frame field results and the builder capability that produces them.
//!
//! A [`FieldResult`] stores one unit complex number per element, the
//! `order`-th power representation of the frame expressed in the element's
//! tangent basis. The `order` directions of the frame are recovered by taking
//! the `order`-th root.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::element::{ElementKind, FieldKind, FieldMode};
use crate::error::{FramescopeError, Result};
use crate::mesh::SurfaceMesh;
use crate::params::FieldParams;

/// The frame field produced by one builder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    kind: FieldKind,
    order: u32,
    var: Vec<Vec2>,     // power representation per element
    basis_x: Vec<Vec3>, // Per-element X axis of tangent frame
    basis_y: Vec<Vec3>, // Per-element Y axis of tangent frame
}

impl FieldResult {
    /// Creates a field result, checking that all per-element arrays agree.
    pub fn new(
        kind: FieldKind,
        order: u32,
        var: Vec<Vec2>,
        basis_x: Vec<Vec3>,
        basis_y: Vec<Vec3>,
    ) -> Result<Self> {
        if order == 0 {
            return Err(FramescopeError::invalid_param("order", order, "must be positive"));
        }
        for len in [basis_x.len(), basis_y.len()] {
            if len != var.len() {
                return Err(FramescopeError::SizeMismatch {
                    expected: var.len(),
                    actual: len,
                });
            }
        }
        Ok(Self {
            kind,
            order,
            var,
            basis_x,
            basis_y,
        })
    }

    /// Mode and support of the field.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The construction mode.
    pub fn mode(&self) -> FieldMode {
        self.kind.mode()
    }

    /// The element kind the field lives on.
    pub fn element(&self) -> ElementKind {
        self.kind.element()
    }

    /// Rotational symmetry order.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Per-element power representation.
    pub fn var(&self) -> &[Vec2] {
        &self.var
    }

    /// Returns the tangent basis X axes.
    pub fn basis_x(&self) -> &[Vec3] {
        &self.basis_x
    }

    /// Returns the tangent basis Y axes.
    pub fn basis_y(&self) -> &[Vec3] {
        &self.basis_y
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.var.len()
    }

    /// Returns true if the field has no element.
    pub fn is_empty(&self) -> bool {
        self.var.is_empty()
    }

    /// Angle of the representation of element `i`, `order` times the frame angle.
    pub fn phase(&self, i: usize) -> f32 {
        let z = self.var[i];
        z.y.atan2(z.x)
    }

    /// One unit tangent-space vector per element: the first frame direction.
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_vectors(&self) -> Vec<Vec2> {
        let order = self.order as f32;
        (0..self.len())
            .map(|i| Vec2::from_angle(self.phase(i) / order))
            .collect()
    }

    /// The `order` world-space unit directions of element `i`.
    #[allow(clippy::cast_precision_loss)]
    pub fn directions(&self, i: usize) -> impl Iterator<Item = Vec3> + '_ {
        let order = self.order as f32;
        let theta = self.phase(i) / order;
        (0..self.order).map(move |k| {
            let angle = theta + TAU * k as f32 / order;
            self.basis_x[i] * angle.cos() + self.basis_y[i] * angle.sin()
        })
    }

    /// Project the first frame direction of every element to world space.
    pub fn world_vectors(&self) -> Vec<Vec3> {
        self.frame_vectors()
            .iter()
            .enumerate()
            .map(|(i, v2d)| self.basis_x[i] * v2d.x + self.basis_y[i] * v2d.y)
            .collect()
    }

    /// Checks that the field covers every element of its kind on `mesh`.
    pub fn check_against(&self, mesh: &SurfaceMesh) -> Result<()> {
        let expected = mesh.num_elements(self.element());
        if self.len() == expected {
            Ok(())
        } else {
            Err(FramescopeError::SizeMismatch {
                expected,
                actual: self.len(),
            })
        }
    }
}

/// Computes frame fields and flags their singularities.
///
/// Implementations own the numerics; the session only sequences calls.
pub trait FieldBuilder {
    /// Builds a field on `mesh` from one parameter record.
    fn build(&mut self, mesh: &SurfaceMesh, params: &FieldParams) -> Result<FieldResult>;

    /// Writes the integer `singuls` attribute on the element kinds given by
    /// [`FieldKind::singularity_elements`] of `field`.
    fn flag_singularities(&mut self, mesh: &mut SurfaceMesh, field: &FieldResult) -> Result<()>;
}
