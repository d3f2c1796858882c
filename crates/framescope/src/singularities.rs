//! Reading flagged singularities back from the mesh attribute store.
//!
//! The builder writes one `singuls` array per element kind the field's
//! singularities live on. [`extract`] turns those arrays into one ordered
//! list of markers: nonzero entries only, in element-id order, kinds in the
//! order they are requested (vertices before faces for edge fields).

use serde::Serialize;

use crate::{AttributeData, ElementKind, SurfaceMesh, Vec3, SINGULARITY_ATTRIBUTE};

/// One singular element with its signed index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Singularity {
    /// Kind of the singular element.
    pub element: ElementKind,
    /// Element id within its kind.
    pub id: u32,
    /// Marker location: vertex position or face barycenter.
    pub position: Vec3,
    /// Turning number, in units of `1 / order` turns. Never zero.
    pub index: i32,
}

/// Collects the nonzero entries of the `singuls` attribute of each kind.
///
/// A kind without the attribute contributes nothing. Float arrays are
/// rounded to the nearest index. The mesh only stores attributes covering
/// every element, so ids are always in range.
pub fn extract(mesh: &SurfaceMesh, kinds: &[ElementKind]) -> Vec<Singularity> {
    let mut found = Vec::new();
    for &kind in kinds {
        let Some(data) = mesh.attribute(kind, SINGULARITY_ATTRIBUTE) else {
            log::warn!("no '{SINGULARITY_ATTRIBUTE}' attribute on {kind} after flagging");
            continue;
        };
        let before = found.len();
        found.extend(
            indices(data)
                .enumerate()
                .filter(|&(_, index)| index != 0)
                .map(|(id, index)| {
                    let id = id as u32;
                    Singularity {
                        element: kind,
                        id,
                        position: mesh.element_position(kind, id),
                        index,
                    }
                }),
        );
        log::debug!("{} singular {kind}", found.len() - before);
    }
    found
}

#[allow(clippy::cast_possible_truncation)]
fn indices(data: &AttributeData) -> Box<dyn Iterator<Item = i32> + '_> {
    match data {
        AttributeData::Int(values) => Box::new(values.iter().copied()),
        AttributeData::Float(values) => Box::new(values.iter().map(|x| x.round() as i32)),
    }
}

/// Sum of all indices, which equals `order` times the Euler characteristic
/// on a closed surface.
pub fn total_index(singularities: &[Singularity]) -> i32 {
    singularities.iter().map(|s| s.index).sum()
}
