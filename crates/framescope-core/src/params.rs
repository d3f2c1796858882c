//! Parameter records for the two field construction modes.
//!
//! Edits go through [`SmoothParams::set`] / [`CurvatureParams::set`], which
//! validate the value type and clamp range-bound values instead of rejecting
//! them.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{CurvatureElement, ElementKind, FieldKind, FieldMode};
use crate::error::{FramescopeError, Result};

/// Largest accepted symmetry order.
pub const MAX_ORDER: u32 = 64;

/// Largest accepted curvature patch size, in neighbour rings.
pub const MAX_PATCH_SIZE: u32 = 16;

/// Largest accepted number of smoothing iterations.
pub const MAX_SMOOTHING_STEPS: u32 = 10_000;

/// A parameter value coming from the control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Toggle.
    Bool(bool),
    /// Integer input.
    Int(i64),
    /// Float input.
    Float(f32),
    /// Element selection.
    Element(ElementKind),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Element(e) => write!(f, "{e}"),
        }
    }
}

impl FromStr for ParamValue {
    type Err = FramescopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => return Ok(ParamValue::Bool(true)),
            "false" | "off" | "no" => return Ok(ParamValue::Bool(false)),
            _ => {}
        }
        if let Ok(i) = s.parse::<i64>() {
            return Ok(ParamValue::Int(i));
        }
        if let Ok(x) = s.parse::<f32>() {
            return Ok(ParamValue::Float(x));
        }
        s.parse::<ElementKind>()
            .map(ParamValue::Element)
            .map_err(|_| FramescopeError::invalid_param("value", s, "not a bool, number or element"))
    }
}

impl ParamValue {
    fn as_bool(self, name: &str) -> Result<bool> {
        match self {
            ParamValue::Bool(b) => Ok(b),
            other => Err(FramescopeError::invalid_param(name, other, "expected a toggle")),
        }
    }

    /// Integer value clamped to `range`.
    fn as_count(self, name: &str, range: RangeInclusive<u32>) -> Result<u32> {
        match self {
            ParamValue::Int(i) => {
                let clamped = i.clamp(i64::from(*range.start()), i64::from(*range.end()));
                Ok(u32::try_from(clamped).unwrap_or(*range.end()))
            }
            other => Err(FramescopeError::invalid_param(name, other, "expected an integer")),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_float(self, name: &str) -> Result<f32> {
        let x = match self {
            ParamValue::Float(x) => x,
            ParamValue::Int(i) => i as f32,
            other => return Err(FramescopeError::invalid_param(name, other, "expected a number")),
        };
        if x.is_finite() {
            Ok(x)
        } else {
            Err(FramescopeError::invalid_param(name, x, "must be finite"))
        }
    }

    fn as_element(self, name: &str) -> Result<ElementKind> {
        match self {
            ParamValue::Element(e) => Ok(e),
            other => Err(FramescopeError::invalid_param(name, other, "expected an element kind")),
        }
    }
}

/// Parameters of the smooth frame field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothParams {
    /// Element kind the field is defined on.
    pub element: ElementKind,

    /// Rotational symmetry order (4 for cross fields).
    pub order: u32,

    /// Keep constraints at feature corners whose directions agree modulo the symmetry.
    pub cad_correction: bool,

    /// Lock elements along boundary and sharp edges to the edge direction.
    pub align_features: bool,

    /// Use cotangent weights for vertex-based smoothing.
    pub use_cotan_weights: bool,

    /// Number of smoothing iterations.
    pub smoothing_steps: u32,

    /// Weight tying each element to its current value during smoothing.
    pub attach_weight: f32,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            element: ElementKind::Vertices,
            order: 4,
            cad_correction: true,
            align_features: false,
            use_cotan_weights: true,
            smoothing_steps: 3,
            attach_weight: 1.0,
        }
    }
}

impl SmoothParams {
    /// Names accepted by [`SmoothParams::set`].
    pub const NAMES: [&'static str; 7] = [
        "element",
        "order",
        "cad_correction",
        "align_features",
        "use_cotan_weights",
        "smoothing_steps",
        "attach_weight",
    ];

    /// Sets one parameter by name. Out-of-range numbers are clamped.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "element" => self.element = value.as_element(name)?,
            "order" => self.order = value.as_count(name, 1..=MAX_ORDER)?,
            "cad_correction" | "cadCorrection" | "cadFF" => {
                self.cad_correction = value.as_bool(name)?;
            }
            "align_features" | "alignFeatures" => self.align_features = value.as_bool(name)?,
            "use_cotan_weights" | "useCotanWeights" | "cotan" => {
                self.use_cotan_weights = value.as_bool(name)?;
            }
            "smoothing_steps" | "smoothingSteps" => {
                self.smoothing_steps = value.as_count(name, 0..=MAX_SMOOTHING_STEPS)?;
            }
            "attach_weight" | "attachWeight" => {
                self.attach_weight = value.as_float(name)?.max(0.0);
            }
            _ => {
                return Err(FramescopeError::UnknownParameter {
                    mode: FieldMode::Smooth.to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Field kind a run with these parameters produces.
    pub fn kind(&self) -> FieldKind {
        FieldKind::Smooth(self.element)
    }
}

/// Parameters of the principal-curvature frame field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureParams {
    /// Element kind the field is defined on.
    pub element: CurvatureElement,

    /// Lock elements along boundary and sharp edges to the edge direction.
    pub align_features: bool,

    /// Estimates with lower confidence are discarded, in `[0, 1]`.
    pub confidence_threshold: f32,

    /// Estimates with at least this confidence are kept fixed, in `[0, 1]`.
    pub smooth_threshold: f32,

    /// Number of neighbour rings averaged into each curvature estimate.
    pub patch_size: u32,

    /// Number of smoothing iterations.
    pub smoothing_steps: u32,

    /// Weight tying each element to its estimate during smoothing.
    pub attach_weight: f32,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            element: CurvatureElement::Vertices,
            align_features: false,
            confidence_threshold: 0.5,
            smooth_threshold: 0.7,
            patch_size: 2,
            smoothing_steps: 3,
            attach_weight: 1.0,
        }
    }
}

impl CurvatureParams {
    /// Names accepted by [`CurvatureParams::set`].
    pub const NAMES: [&'static str; 7] = [
        "element",
        "align_features",
        "confidence_threshold",
        "smooth_threshold",
        "patch_size",
        "smoothing_steps",
        "attach_weight",
    ];

    /// Order of principal-direction fields.
    pub const ORDER: u32 = 4;

    /// Sets one parameter by name. Thresholds are clamped to `[0, 1]`.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "element" => self.element = CurvatureElement::try_from(value.as_element(name)?)?,
            "align_features" | "alignFeatures" => self.align_features = value.as_bool(name)?,
            "confidence_threshold" | "confidenceThreshold" => {
                self.confidence_threshold = value.as_float(name)?.clamp(0.0, 1.0);
            }
            "smooth_threshold" | "smoothThreshold" => {
                self.smooth_threshold = value.as_float(name)?.clamp(0.0, 1.0);
            }
            "patch_size" | "patchSize" => self.patch_size = value.as_count(name, 1..=MAX_PATCH_SIZE)?,
            "smoothing_steps" | "smoothingSteps" => {
                self.smoothing_steps = value.as_count(name, 0..=MAX_SMOOTHING_STEPS)?;
            }
            "attach_weight" | "attachWeight" => {
                self.attach_weight = value.as_float(name)?.max(0.0);
            }
            _ => {
                return Err(FramescopeError::UnknownParameter {
                    mode: FieldMode::Curvature.to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Field kind a run with these parameters produces.
    pub fn kind(&self) -> FieldKind {
        FieldKind::Curvature(self.element)
    }
}

/// The parameter record handed to a field builder for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FieldParams {
    /// Smooth field request.
    Smooth(SmoothParams),
    /// Curvature field request.
    Curvature(CurvatureParams),
}

impl FieldParams {
    /// Field kind the request produces.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldParams::Smooth(p) => p.kind(),
            FieldParams::Curvature(p) => p.kind(),
        }
    }

    /// Symmetry order of the requested field.
    pub fn order(&self) -> u32 {
        match self {
            FieldParams::Smooth(p) => p.order,
            FieldParams::Curvature(_) => CurvatureParams::ORDER,
        }
    }
}
