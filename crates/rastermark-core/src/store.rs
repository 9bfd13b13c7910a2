//! Ordered annotation storage.

use crate::annotations::{Annotation, AnnotationId, AnnotationUpdate};
use std::collections::HashMap;

/// Insertion-ordered collection of annotations.
///
/// Insertion order doubles as z-order: later annotations draw on top and are
/// hit-tested first. Ids are unique and stable for an annotation's lifetime.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    /// All annotations, keyed by id.
    annotations: HashMap<AnnotationId, Annotation>,
    /// Z-order (back to front).
    z_order: Vec<AnnotationId>,
}

impl AnnotationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation on top of the stack. Returns its id.
    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.z_order.push(id);
        self.annotations.insert(id, annotation);
        id
    }

    /// Apply a per-kind update to an annotation.
    ///
    /// Updates addressed at a missing id or a mismatched kind are dropped.
    pub fn update(&mut self, id: AnnotationId, update: AnnotationUpdate) {
        match self.annotations.get_mut(&id) {
            Some(annotation) => {
                if !annotation.apply(&update) {
                    log::warn!("update {update:?} does not match annotation {id}");
                }
            }
            None => log::warn!("update for unknown annotation {id}"),
        }
    }

    /// Remove a set of annotations.
    pub fn remove_many(&mut self, ids: &[AnnotationId]) {
        self.z_order.retain(|id| !ids.contains(id));
        for id in ids {
            self.annotations.remove(id);
        }
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.annotations.contains_key(&id)
    }

    /// Annotations in z-order (back to front).
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Annotation> {
        self.z_order.iter().filter_map(|id| self.annotations.get(id))
    }

    /// Annotations in reverse z-order (front to back), for hit-testing.
    pub fn iter_ordered_rev(&self) -> impl Iterator<Item = &Annotation> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.annotations.get(id))
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.z_order.clear();
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
