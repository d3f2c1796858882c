//! framescope: interactive exploration of frame fields and their singularities.
//!
//! A [`Session`] holds a loaded [`SurfaceMesh`], one parameter record per
//! construction mode, the current [`FieldResult`] and the singularities
//! extracted from it. Fields are computed by a [`FieldBuilder`]; results are
//! shown through a [`Viewer`] and written through a [`MeshExporter`].
//!
//! # Quick Start
//!
//! ```no_run
//! use framescope::*;
//!
//! fn main() -> Result<()> {
//!     let mut session = open_session("model.obj")?;
//!     session.set_parameter(FieldMode::Smooth, "element", ParamValue::Element(ElementKind::Edges))?;
//!     session.run()?;
//!
//!     // edge fields have singularities on vertices and faces
//!     for s in session.find_singularities()? {
//!         println!("{} {} at {}: {}", s.element, s.id, s.position, s.index);
//!     }
//!
//!     session.export(&mut GeogramExporter::new(), std::path::Path::new("output"))?;
//!     Ok(())
//! }
//! ```
//!
//! # Where singularities live
//!
//! | Field on | Singularities on |
//! |----------|------------------|
//! | vertices | faces |
//! | faces | vertices |
//! | edges (smooth only) | vertices, then faces |

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Element ids are u32 by construction
#![allow(clippy::cast_possible_truncation)]

pub mod command;
pub mod display;
pub mod export;
mod init;
pub mod session;
pub mod singularities;

// Re-export core types
pub use framescope_core::{
    AttributeData, AttributeStore, CurvatureElement, CurvatureParams, ElementKind, FieldBuilder,
    FieldKind, FieldMode, FieldParams, FieldResult, FramescopeError, LineMesh, MeshExporter,
    ParamValue, Result, SmoothParams, SurfaceMesh, Vec2, Vec3, SINGULARITY_ATTRIBUTE,
};

// Re-export collaborators
pub use framescope_builders::ReferenceBuilder;
pub use framescope_io::{supported_formats, GeogramExporter};

pub use command::Command;
pub use display::{FrameDisplay, TextViewer, Viewer};
pub use export::ExportPaths;
pub use init::{init_logging, load_mesh, mesh_name, open_session};
pub use session::{Outcome, Session, SessionState};
pub use singularities::Singularity;
