//! Core abstractions for framescope.
//!
//! This crate provides the fundamental types used throughout framescope:
//! - [`SurfaceMesh`], the read-only mesh store with its [`AttributeStore`]
//! - [`ElementKind`] and [`FieldKind`], which decide where fields and singularities live
//! - Parameter records for the smooth and curvature construction modes
//! - [`FieldResult`] and the [`FieldBuilder`] / [`MeshExporter`] collaborator traits

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Parameter structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Element ids are u32 by construction
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod attributes;
pub mod element;
pub mod error;
pub mod export;
pub mod field;
pub mod mesh;
pub mod params;

pub use attributes::{AttributeData, AttributeStore, SINGULARITY_ATTRIBUTE};
pub use element::{CurvatureElement, ElementKind, FieldKind, FieldMode};
pub use error::{FramescopeError, Result};
pub use export::MeshExporter;
pub use field::{FieldBuilder, FieldResult};
pub use mesh::{LineMesh, SurfaceMesh, VertexFan, DEFAULT_FEATURE_ANGLE};
pub use params::{
    CurvatureParams, FieldParams, ParamValue, SmoothParams, MAX_ORDER, MAX_PATCH_SIZE,
    MAX_SMOOTHING_STEPS,
};

// Re-export glam types for convenience
pub use glam::{Vec2, Vec3};
