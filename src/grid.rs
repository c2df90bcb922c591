use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::trace;

use crate::aabb::Aabb;
use crate::types::Location;

/// Sparse lattice: cell -> keys occupying it, plus each key's recorded footprint.
///
/// A key's previous footprint is always fully retracted before its new one is
/// inserted, so no cell keeps a key that no longer covers it.
#[derive(Debug)]
pub struct CellIndex<K> {
    cells: HashMap<Location, HashSet<K>>,
    footprints: HashMap<K, HashSet<Location>>,
}

impl<K> Default for CellIndex<K> {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
            footprints: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> CellIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `key`'s footprint with `footprint`, touching only the cells
    /// that changed.
    pub fn update(&mut self, key: K, footprint: impl IntoIterator<Item = Location>) {
        let next: HashSet<Location> = footprint.into_iter().collect();
        let prev = self.footprints.remove(&key).unwrap_or_default();

        let mut retracted = 0usize;
        for loc in prev.difference(&next) {
            self.retract(key, *loc);
            retracted += 1;
        }
        let mut added = 0usize;
        for loc in next.difference(&prev) {
            self.cells.entry(*loc).or_default().insert(key);
            added += 1;
        }
        if retracted + added > 0 {
            trace!(?key, retracted, added, cells = next.len(), "footprint changed");
        }
        self.footprints.insert(key, next);
    }

    /// Retract `key` from every recorded cell. Unknown keys are a no-op.
    pub fn remove(&mut self, key: K) -> bool {
        let Some(prev) = self.footprints.remove(&key) else {
            return false;
        };
        for loc in prev {
            self.retract(key, loc);
        }
        true
    }

    fn retract(&mut self, key: K, loc: Location) {
        if let Some(set) = self.cells.get_mut(&loc) {
            set.remove(&key);
            if set.is_empty() {
                self.cells.remove(&loc);
            }
        }
    }

    /// Union of every cell in `floor(min) ..= floor(max)`. A coarse filter:
    /// callers still run the exact test.
    pub fn query(&self, aabb: &Aabb) -> HashSet<K> {
        let mut out = HashSet::new();
        for loc in aabb.cells() {
            if let Some(set) = self.cells.get(&loc) {
                out.extend(set.iter().copied());
            }
        }
        out
    }

    /// Keys in a single cell.
    pub fn at(&self, loc: Location) -> impl Iterator<Item = &K> {
        self.cells.get(&loc).into_iter().flatten()
    }

    pub fn footprint(&self, key: &K) -> Option<&HashSet<Location>> {
        self.footprints.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.footprints.contains_key(key)
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Sum of all footprint sizes.
    pub fn entry_count(&self) -> usize {
        self.footprints.values().map(HashSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.footprints.clear();
    }
}
