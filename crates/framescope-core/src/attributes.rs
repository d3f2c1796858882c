//! Per-element attribute storage.

use std::collections::HashMap;

use crate::element::ElementKind;

/// Name of the integer attribute holding singularity indices.
pub const SINGULARITY_ATTRIBUTE: &str = "singuls";

/// Values of one attribute, one entry per element.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Integer values (singularity indices, flags).
    Int(Vec<i32>),
    /// Real values (confidences, scalars).
    Float(Vec<f32>),
}

impl AttributeData {
    /// Number of elements covered.
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Int(values) => values.len(),
            AttributeData::Float(values) => values.len(),
        }
    }

    /// Returns true if the attribute has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer view, if this is an integer attribute.
    pub fn as_int(&self) -> Option<&[i32]> {
        match self {
            AttributeData::Int(values) => Some(values),
            AttributeData::Float(_) => None,
        }
    }

    /// Float view, if this is a float attribute.
    pub fn as_float(&self) -> Option<&[f32]> {
        match self {
            AttributeData::Float(values) => Some(values),
            AttributeData::Int(_) => None,
        }
    }
}

/// Attribute store keyed by element kind, then attribute name.
///
/// The store does not know element counts; [`crate::SurfaceMesh`] checks
/// lengths before writing.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    attributes: HashMap<ElementKind, HashMap<String, AttributeData>>,
}

impl AttributeStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, returning the values it replaced.
    pub fn set(
        &mut self,
        kind: ElementKind,
        name: impl Into<String>,
        data: AttributeData,
    ) -> Option<AttributeData> {
        self.attributes
            .entry(kind)
            .or_default()
            .insert(name.into(), data)
    }

    /// Gets an attribute by kind and name.
    pub fn get(&self, kind: ElementKind, name: &str) -> Option<&AttributeData> {
        self.attributes.get(&kind).and_then(|m| m.get(name))
    }

    /// Removes an attribute. Clearing an absent attribute is a no-op.
    pub fn clear(&mut self, kind: ElementKind, name: &str) -> Option<AttributeData> {
        self.attributes.get_mut(&kind).and_then(|m| m.remove(name))
    }

    /// Checks if an attribute exists.
    pub fn contains(&self, kind: ElementKind, name: &str) -> bool {
        self.attributes
            .get(&kind)
            .is_some_and(|m| m.contains_key(name))
    }

    /// Attribute names on one element kind, sorted.
    pub fn names(&self, kind: ElementKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attributes
            .get(&kind)
            .into_iter()
            .flat_map(|m| m.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Iterates over `(name, data)` pairs of one element kind, sorted by name.
    pub fn iter(&self, kind: ElementKind) -> impl Iterator<Item = (&str, &AttributeData)> {
        let map = self.attributes.get(&kind);
        self.names(kind)
            .into_iter()
            .filter_map(move |name| map.and_then(|m| m.get_key_value(name)))
            .map(|(name, data)| (name.as_str(), data))
    }

    /// Removes every attribute.
    pub fn clear_all(&mut self) {
        self.attributes.clear();
    }

    /// Returns the total number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.values().map(HashMap::len).sum()
    }

    /// Returns true if the store holds no attribute.
    pub fn is_empty(&self) -> bool {
        self.attributes.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let mut store = AttributeStore::new();
        assert!(store.is_empty());

        store.set(ElementKind::Faces, SINGULARITY_ATTRIBUTE, AttributeData::Int(vec![0, 1]));
        assert!(store.contains(ElementKind::Faces, SINGULARITY_ATTRIBUTE));
        assert!(!store.contains(ElementKind::Vertices, SINGULARITY_ATTRIBUTE));
        assert_eq!(
            store
                .get(ElementKind::Faces, SINGULARITY_ATTRIBUTE)
                .and_then(AttributeData::as_int),
            Some(&[0, 1][..])
        );

        let removed = store.clear(ElementKind::Faces, SINGULARITY_ATTRIBUTE);
        assert_eq!(removed, Some(AttributeData::Int(vec![0, 1])));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_absent_is_noop() {
        let mut store = AttributeStore::new();
        assert!(store.clear(ElementKind::Edges, "missing").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_set_replaces() {
        let mut store = AttributeStore::new();
        store.set(ElementKind::Vertices, "w", AttributeData::Float(vec![1.0]));
        let old = store.set(ElementKind::Vertices, "w", AttributeData::Float(vec![2.0]));
        assert_eq!(old, Some(AttributeData::Float(vec![1.0])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iter_is_sorted_per_kind() {
        let mut store = AttributeStore::new();
        store.set(ElementKind::Faces, "b", AttributeData::Int(vec![]));
        store.set(ElementKind::Faces, "a", AttributeData::Int(vec![]));
        store.set(ElementKind::Edges, "c", AttributeData::Int(vec![]));
        let names: Vec<&str> = store.iter(ElementKind::Faces).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(store.names(ElementKind::Edges), vec!["c"]);
    }
}
