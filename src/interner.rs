//! Label interning
//!
//! Trees can carry labels as strings, as dense integer ids, or both. The
//! [`LabelInterner`] trait is the bridge the annotation engine uses to
//! translate between the two; [`LabelMap`] is the default implementation
//! backed by a `lasso` interner.

use lasso::{Capacity, Key, Rodeo, Spur};
use rustc_hash::FxBuildHasher;
use std::fmt;

pub const LABEL_MAP_CAPACITY: usize = 1024;

/// Bidirectional mapping between labels and dense ids starting at 0
///
/// Interning takes `&mut self`, so one interner cannot be mutated from two
/// places at once without external synchronization.
pub trait LabelInterner {
    /// Id of `label`, assigning the next free id if it is new
    fn intern(&mut self, label: &str) -> usize;

    /// Id of `label` if it has been interned
    fn find(&self, label: &str) -> Option<usize>;

    /// Label with the given id
    fn lookup(&self, id: usize) -> Option<&str>;

    /// Number of interned labels, which is also the next id
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intern every label in order
    fn intern_all(&mut self, labels: &[String]) -> Vec<usize> {
        labels.iter().map(|label| self.intern(label)).collect()
    }

    /// Look up every id in order; `None` if any id is unknown
    fn lookup_all(&self, ids: &[usize]) -> Option<Vec<String>> {
        ids.iter()
            .map(|&id| self.lookup(id).map(str::to_owned))
            .collect()
    }
}

/// String interner for node labels
pub struct LabelMap(Rodeo<Spur, FxBuildHasher>);

impl fmt::Debug for LabelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelMap").field("len", &self.0.len()).finish()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelMap {
    pub fn new() -> Self {
        Self(Rodeo::with_capacity_and_hasher(
            Capacity::for_strings(LABEL_MAP_CAPACITY),
            FxBuildHasher,
        ))
    }
}

impl LabelInterner for LabelMap {
    #[inline]
    fn intern(&mut self, label: &str) -> usize {
        self.0.get_or_intern(label).into_usize()
    }

    #[inline]
    fn find(&self, label: &str) -> Option<usize> {
        self.0.get(label).map(Key::into_usize)
    }

    #[inline]
    fn lookup(&self, id: usize) -> Option<&str> {
        let key = Spur::try_from_usize(id)?;
        self.0.try_resolve(&key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut map = LabelMap::new();
        assert!(map.is_empty());
        assert_eq!(map.intern("NP"), 0);
        assert_eq!(map.intern("VP"), 1);
        assert_eq!(map.intern("NP"), 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_find_and_lookup() {
        let mut map = LabelMap::new();
        let np = map.intern("NP");
        assert_eq!(map.find("NP"), Some(np));
        assert_eq!(map.find("S"), None);
        assert_eq!(map.lookup(np), Some("NP"));
        assert_eq!(map.lookup(7), None);
    }

    #[test]
    fn test_batch() {
        let mut map = LabelMap::new();
        let labels: Vec<String> = ["S", "NP", "this", "NP"].map(String::from).to_vec();
        let ids = map.intern_all(&labels);
        assert_eq!(ids, vec![0, 1, 2, 1]);
        assert_eq!(map.lookup_all(&ids), Some(labels));
        assert_eq!(map.lookup_all(&[0, 42]), None);
    }

    #[test]
    fn test_unicode_labels() {
        let mut map = LabelMap::new();
        let id = map.intern("你好");
        assert_eq!(map.lookup(id), Some("你好"));
        assert_ne!(map.intern("café"), id);
    }

    #[test]
    fn test_debug_shows_size() {
        let mut map = LabelMap::new();
        map.intern_all(&["S".to_owned(), "NP".to_owned()]);
        assert_eq!(format!("{map:?}"), "LabelMap { len: 2 }");
    }
}
