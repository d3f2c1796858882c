//! Startup: logging, mesh loading and session creation.

use std::path::Path;

use crate::{Result, Session, SurfaceMesh};

/// Initializes logging from `RUST_LOG`. Calling it twice is harmless.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Loads a mesh file and fits it into the unit cube.
///
/// # Errors
///
/// Returns a load error for unreadable files and an unsupported-format
/// error for unknown extensions; both are fatal at startup.
///
/// # Example
///
/// ```no_run
/// use framescope::*;
///
/// fn main() -> Result<()> {
///     let mesh = load_mesh("bunny.obj")?;
///     println!("{} faces", mesh.num_faces());
///     Ok(())
/// }
/// ```
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<SurfaceMesh> {
    let mesh = framescope_io::load(path.as_ref())?.fit_into_unit_cube();
    log::info!(
        "mesh: {} vertices, {} faces, {} edges",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_edges()
    );
    Ok(mesh)
}

/// Base name of a mesh file, used to name exports.
pub fn mesh_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map_or_else(|| "mesh".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Loads `path` and opens a session on it with the reference builder.
///
/// # Errors
///
/// Same as [`load_mesh`].
///
/// # Example
///
/// ```no_run
/// use framescope::*;
///
/// fn main() -> Result<()> {
///     let mut session = open_session("bunny.obj")?;
///     session.set_parameter(FieldMode::Smooth, "element", ParamValue::Element(ElementKind::Faces))?;
///     session.run()?;
///     for s in session.find_singularities()? {
///         println!("{} {} has index {}", s.element, s.id, s.index);
///     }
///     Ok(())
/// }
/// ```
pub fn open_session<P: AsRef<Path>>(path: P) -> Result<Session> {
    let mesh = load_mesh(&path)?;
    Ok(Session::with_reference_builder(mesh, mesh_name(&path)))
}
