//! The field session: mode, parameters, current field and singularities.
//!
//! A [`Session`] owns one [`SessionState`] and the field builder that
//! computes into it. Every user action goes through a method here (or
//! through [`Session::apply`] for parsed [`Command`]s), and each one either
//! completes or leaves the state as it was.

use std::path::{Path, PathBuf};

use crate::command::{Command, HELP};
use crate::display::{FrameDisplay, Viewer};
use crate::export::{self, ExportPaths, DISPLAY_LENGTH_MULT};
use crate::singularities::{self, Singularity};
use crate::{
    AttributeData, CurvatureParams, ElementKind, FieldBuilder, FieldMode, FieldParams, FieldResult,
    FramescopeError, MeshExporter, ParamValue, ReferenceBuilder, Result, SmoothParams,
    SurfaceMesh, SINGULARITY_ATTRIBUTE,
};

const NO_FIELD: &str = "no field computed";

/// Default export directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Everything a session knows.
#[derive(Debug, Clone)]
pub struct SessionState {
    mesh: SurfaceMesh,
    mesh_name: String,
    mode: FieldMode,
    smooth: SmoothParams,
    curvature: CurvatureParams,
    field: Option<FieldResult>,
    singularities: Option<Vec<Singularity>>,
    stale: bool,
}

impl SessionState {
    /// Fresh state for a loaded mesh, with default parameters in smooth mode.
    pub fn new(mesh: SurfaceMesh, mesh_name: impl Into<String>) -> Self {
        Self {
            mesh,
            mesh_name: mesh_name.into(),
            mode: FieldMode::default(),
            smooth: SmoothParams::default(),
            curvature: CurvatureParams::default(),
            field: None,
            singularities: None,
            stale: true,
        }
    }

    /// The loaded mesh.
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Base name used for exports.
    pub fn mesh_name(&self) -> &str {
        &self.mesh_name
    }

    /// The active mode.
    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Smooth-mode parameters, kept while curvature mode is active.
    pub fn smooth(&self) -> &SmoothParams {
        &self.smooth
    }

    /// Curvature-mode parameters, kept while smooth mode is active.
    pub fn curvature(&self) -> &CurvatureParams {
        &self.curvature
    }

    /// The request a run would send to the builder now.
    pub fn active_params(&self) -> FieldParams {
        match self.mode {
            FieldMode::Smooth => FieldParams::Smooth(self.smooth.clone()),
            FieldMode::Curvature => FieldParams::Curvature(self.curvature.clone()),
        }
    }

    /// The current field, if a run succeeded.
    pub fn field(&self) -> Option<&FieldResult> {
        self.field.as_ref()
    }

    /// Singularities of the current field; empty until extracted.
    pub fn singularities(&self) -> &[Singularity] {
        self.singularities.as_deref().unwrap_or_default()
    }

    /// Whether singularities were extracted for the current field.
    pub fn has_singularities(&self) -> bool {
        self.singularities.is_some()
    }

    /// Whether the mode or parameters changed since the last successful run.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

/// Puts back the `singuls` attributes taken off before flagging.
fn restore_singularity_attributes(
    mesh: &mut SurfaceMesh,
    previous: Vec<(ElementKind, Option<AttributeData>)>,
) {
    for (kind, data) in previous {
        mesh.clear_attribute(kind, SINGULARITY_ATTRIBUTE);
        if let Some(data) = data {
            if let Err(e) = mesh.set_attribute(kind, SINGULARITY_ATTRIBUTE, data) {
                log::warn!("could not restore {kind} singularities: {e}");
            }
        }
    }
}

/// What the command loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// A session bound to a field builder.
pub struct Session {
    state: SessionState,
    builder: Box<dyn FieldBuilder>,
    output_dir: PathBuf,
}

impl Session {
    /// Creates a session computing fields with `builder`.
    pub fn new(
        mesh: SurfaceMesh,
        mesh_name: impl Into<String>,
        builder: Box<dyn FieldBuilder>,
    ) -> Self {
        Self {
            state: SessionState::new(mesh, mesh_name),
            builder,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Creates a session using [`ReferenceBuilder`].
    pub fn with_reference_builder(mesh: SurfaceMesh, mesh_name: impl Into<String>) -> Self {
        Self::new(mesh, mesh_name, Box::new(ReferenceBuilder::new()))
    }

    /// Read access to the state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Directory used by `export` without an explicit destination.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Sets the default export directory.
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    /// Switches the active parameter record. The other record is kept.
    pub fn set_mode(&mut self, mode: FieldMode) {
        if self.state.mode != mode {
            log::info!("mode: {mode}");
        }
        self.state.mode = mode;
        self.state.stale = true;
    }

    /// Edits one parameter of `mode`, active or not.
    ///
    /// Range-bound values are clamped. A rejected edit leaves the record and
    /// the stale flag untouched.
    pub fn set_parameter(&mut self, mode: FieldMode, name: &str, value: ParamValue) -> Result<()> {
        match mode {
            FieldMode::Smooth => self.state.smooth.set(name, value)?,
            FieldMode::Curvature => self.state.curvature.set(name, value)?,
        }
        log::debug!("{mode}.{name} = {value}");
        self.state.stale = true;
        Ok(())
    }

    /// Computes a field with the active parameters.
    ///
    /// On success the new field replaces the old one, the singularity set is
    /// dropped and every `singuls` attribute is cleared. On failure nothing
    /// changes.
    pub fn run(&mut self) -> Result<&FieldResult> {
        let params = self.state.active_params();
        log::info!("OPTIONS: {}", serde_json::to_string(&params)?);

        let field = self.builder.build(&self.state.mesh, &params)?;
        if field.kind() != params.kind() {
            return Err(FramescopeError::Builder(format!(
                "requested {} but got {}",
                params.kind(),
                field.kind()
            )));
        }
        field.check_against(&self.state.mesh)?;

        for kind in ElementKind::ALL {
            self.state.mesh.clear_attribute(kind, SINGULARITY_ATTRIBUTE);
        }
        self.state.singularities = None;
        self.state.stale = false;
        log::info!("computed {} ({} elements)", field.kind(), field.len());
        Ok(&*self.state.field.insert(field))
    }

    /// Flags singularities of the current field and collects them.
    ///
    /// Needs a field. The `singuls` attribute of every kind the field's
    /// singularities live on is cleared, the builder flags once, and the
    /// nonzero entries are read back with vertices before faces. If
    /// flagging fails the previous attributes are put back.
    pub fn find_singularities(&mut self) -> Result<&[Singularity]> {
        let state = &mut self.state;
        let field = state.field.as_ref().ok_or(FramescopeError::Precondition(NO_FIELD))?;
        if state.stale {
            log::warn!("parameters changed since the last run; using the current field");
        }

        let kinds = field.kind().singularity_elements();
        let previous: Vec<_> = kinds
            .iter()
            .map(|&kind| (kind, state.mesh.clear_attribute(kind, SINGULARITY_ATTRIBUTE)))
            .collect();

        if let Err(err) = self.builder.flag_singularities(&mut state.mesh, field) {
            restore_singularity_attributes(&mut state.mesh, previous);
            return Err(err);
        }

        let found = singularities::extract(&state.mesh, kinds);
        log::info!(
            "{} singularities, total index {}",
            found.len(),
            singularities::total_index(&found)
        );
        Ok(state.singularities.insert(found).as_slice())
    }

    /// Writes the mesh and the field lines to `dir`, named after the mesh.
    pub fn export(&self, exporter: &mut dyn MeshExporter, dir: &Path) -> Result<ExportPaths> {
        let field = self.state.field.as_ref().ok_or(FramescopeError::Precondition(NO_FIELD))?;
        export::export_field(&self.state.mesh, field, exporter, dir, &self.state.mesh_name)
    }

    /// Applies one command and reports to `viewer`.
    pub fn apply(
        &mut self,
        command: Command,
        viewer: &mut dyn Viewer,
        exporter: &mut dyn MeshExporter,
    ) -> Result<Outcome> {
        match command {
            Command::SetMode(mode) => {
                self.set_mode(mode);
                viewer.message(&format!("mode: {mode}"));
            }
            Command::SetParameter { mode, name, value } => {
                let mode = mode.unwrap_or(self.state.mode);
                self.set_parameter(mode, &name, value)?;
                viewer.message(&format!("{mode}.{name} = {value}"));
            }
            Command::Run => {
                self.run()?;
                viewer.clear_singularities();
                viewer.clear_field();
                let mesh = &self.state.mesh;
                if let Some(field) = &self.state.field {
                    if field.element() == ElementKind::Edges {
                        let lines = export::field_line_mesh(mesh, field, DISPLAY_LENGTH_MULT);
                        viewer.show_field_lines(&lines);
                    } else {
                        viewer.show_frames(&FrameDisplay::from_field(mesh, field));
                    }
                }
            }
            Command::FindSingularities => {
                let found = self.find_singularities()?;
                viewer.clear_singularities();
                viewer.show_singularities(found);
            }
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.output_dir.clone());
                let paths = self.export(exporter, &dir)?;
                viewer.message(&format!(
                    "wrote {} and {}",
                    paths.mesh.display(),
                    paths.field.display()
                ));
            }
            Command::ShowParams => {
                viewer.message(&serde_json::to_string_pretty(&self.state.active_params())?);
            }
            Command::Help => viewer.message(HELP),
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    /// Parses and applies commands line by line until `quit` or the end.
    ///
    /// Failed lines are reported to `viewer` and skipped.
    pub fn run_lines<I, S>(
        &mut self,
        lines: I,
        viewer: &mut dyn Viewer,
        exporter: &mut dyn MeshExporter,
    ) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            let result = Command::parse_line(line.as_ref()).and_then(|command| match command {
                Some(command) => self.apply(command, viewer, exporter),
                None => Ok(Outcome::Continue),
            });
            match result {
                Ok(Outcome::Quit) => return Outcome::Quit,
                Ok(Outcome::Continue) => {}
                Err(err) => {
                    log::warn!("{err}");
                    viewer.error(&err);
                }
            }
        }
        Outcome::Continue
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TextViewer;
    use crate::{GeogramExporter, Vec3};

    fn tetrahedron() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::with_reference_builder(tetrahedron(), "tet");
        let state = session.state();
        assert_eq!(state.mode(), FieldMode::Smooth);
        assert!(state.field().is_none());
        assert!(state.singularities().is_empty());
        assert!(state.is_stale());
        assert_eq!(session.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert_eq!(state.active_params(), FieldParams::Smooth(SmoothParams::default()));
    }

    #[test]
    fn test_rejected_edit_keeps_stale_flag() {
        let mut session = Session::with_reference_builder(tetrahedron(), "tet");
        session.run().unwrap();
        assert!(!session.state().is_stale());

        let err = session
            .set_parameter(FieldMode::Curvature, "element", ParamValue::Element(ElementKind::Edges))
            .unwrap_err();
        assert!(matches!(err, FramescopeError::InvalidParameter { .. }));
        assert!(!session.state().is_stale());

        session
            .set_parameter(FieldMode::Curvature, "patchSize", ParamValue::Int(0))
            .unwrap();
        assert_eq!(session.state().curvature().patch_size, 1);
        assert!(session.state().is_stale());
    }

    #[test]
    fn test_reference_pipeline_on_tetrahedron() {
        let mut session = Session::with_reference_builder(tetrahedron(), "tet");
        session
            .set_parameter(FieldMode::Smooth, "element", ParamValue::Element(ElementKind::Faces))
            .unwrap();
        session.run().unwrap();
        let found = session.find_singularities().unwrap();
        assert!(found.iter().all(|s| s.element == ElementKind::Vertices && s.index != 0));
        assert_eq!(singularities::total_index(found), 2 * 4);
    }

    #[test]
    fn test_apply_reports_to_viewer() {
        let mut session = Session::with_reference_builder(tetrahedron(), "tet");
        let mut viewer = TextViewer::new(Vec::new());
        let mut exporter = GeogramExporter::new();

        let outcome = session.run_lines(
            ["find", "set element edges", "run", "singularities", "params", "quit", "run"],
            &mut viewer,
            &mut exporter,
        );
        assert_eq!(outcome, Outcome::Quit);

        let text = String::from_utf8(viewer.into_inner()).unwrap();
        assert!(text.starts_with("error: no field computed"));
        assert!(text.contains("smooth.element = edges"));
        assert!(text.contains("field lines: 24 segments"));
        assert!(text.contains("singularities: "));
        assert!(text.contains("\"mode\": \"smooth\""));
    }
}
