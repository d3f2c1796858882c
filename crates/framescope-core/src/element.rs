//! Mesh element kinds and field kinds.
//!
//! A field lives on one [`ElementKind`]; which kinds its singularities live on
//! follows from its [`FieldKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FramescopeError;

/// The kind of mesh element a value is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Mesh vertices.
    Vertices,
    /// Triangular faces.
    Faces,
    /// Undirected edges.
    Edges,
}

impl ElementKind {
    /// All element kinds, in attribute-store order.
    pub const ALL: [ElementKind; 3] = [ElementKind::Vertices, ElementKind::Faces, ElementKind::Edges];

    /// Lowercase name, as used in commands and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Vertices => "vertices",
            ElementKind::Faces => "faces",
            ElementKind::Edges => "edges",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = FramescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertices" | "vertex" | "v" => Ok(ElementKind::Vertices),
            "faces" | "face" | "f" => Ok(ElementKind::Faces),
            "edges" | "edge" | "e" => Ok(ElementKind::Edges),
            _ => Err(FramescopeError::invalid_param(
                "element",
                s,
                "expected vertices, faces or edges",
            )),
        }
    }
}

/// Elements a curvature-aligned field can be defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurvatureElement {
    /// Mesh vertices.
    #[default]
    Vertices,
    /// Triangular faces.
    Faces,
}

impl From<CurvatureElement> for ElementKind {
    fn from(element: CurvatureElement) -> Self {
        match element {
            CurvatureElement::Vertices => ElementKind::Vertices,
            CurvatureElement::Faces => ElementKind::Faces,
        }
    }
}

impl TryFrom<ElementKind> for CurvatureElement {
    type Error = FramescopeError;

    fn try_from(kind: ElementKind) -> Result<Self, Self::Error> {
        match kind {
            ElementKind::Vertices => Ok(CurvatureElement::Vertices),
            ElementKind::Faces => Ok(CurvatureElement::Faces),
            ElementKind::Edges => Err(FramescopeError::invalid_param(
                "element",
                kind,
                "curvature fields are defined on vertices or faces only",
            )),
        }
    }
}

/// The two construction modes of a frame field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Smooth field aligned to geometry and features.
    #[default]
    Smooth,
    /// Field aligned to principal curvature directions.
    Curvature,
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldMode::Smooth => "smooth",
            FieldMode::Curvature => "curvature",
        })
    }
}

impl FromStr for FieldMode {
    type Err = FramescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smooth" => Ok(FieldMode::Smooth),
            "curvature" | "curv" => Ok(FieldMode::Curvature),
            _ => Err(FramescopeError::invalid_param(
                "mode",
                s,
                "expected smooth or curvature",
            )),
        }
    }
}

/// Mode and support of a computed field.
///
/// `(curvature, edges)` has no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Smooth field on any element kind.
    Smooth(ElementKind),
    /// Curvature-aligned field on vertices or faces.
    Curvature(CurvatureElement),
}

impl FieldKind {
    /// The construction mode.
    pub fn mode(self) -> FieldMode {
        match self {
            FieldKind::Smooth(_) => FieldMode::Smooth,
            FieldKind::Curvature(_) => FieldMode::Curvature,
        }
    }

    /// The element kind the field variables live on.
    pub fn element(self) -> ElementKind {
        match self {
            FieldKind::Smooth(element) => element,
            FieldKind::Curvature(element) => element.into(),
        }
    }

    /// Element kinds carrying singularities of this field, vertices first.
    pub fn singularity_elements(self) -> &'static [ElementKind] {
        match self.element() {
            ElementKind::Vertices => &[ElementKind::Faces],
            ElementKind::Faces => &[ElementKind::Vertices],
            ElementKind::Edges => &[ElementKind::Vertices, ElementKind::Faces],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field on {}", self.mode(), self.element())
    }
}
