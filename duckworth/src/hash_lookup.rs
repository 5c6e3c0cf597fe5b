//! Insertion-ordered bidirectional mapping between items and dense indices. Simulation state is kept
//! in flat vectors addressed by these indices so that the hot loop never hashes.

use std::hash::Hash;
use std::ops::Index;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct HashLookup<T: Eq + Hash> {
    indices: FxHashMap<T, usize>,
    items: Vec<T>,
}
impl<T: Eq + Hash> HashLookup<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            items: Vec::with_capacity(capacity),
        }
    }

    /// Returns the index of `item`, appending it first if it has not been seen.
    pub fn index_or_push(&mut self, item: T) -> usize
    where
        T: Clone,
    {
        if let Some(&index) = self.indices.get(&item) {
            return index;
        }
        let index = self.items.len();
        self.indices.insert(item.clone(), index);
        self.items.push(item);
        index
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.indices.get(item).copied()
    }

    pub fn item_at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, in index order.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash> Default for HashLookup<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Eq + Hash> Index<usize> for HashLookup<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.item_at(index)
            .unwrap_or_else(|| panic!("no item at index {index}"))
    }
}

/// Repeated items keep the index of their first occurrence.
impl<T: Eq + Hash + Clone> FromIterator<T> for HashLookup<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut lookup = Self::with_capacity(iter.size_hint().0);
        for item in iter {
            lookup.index_or_push(item);
        }
        lookup
    }
}
