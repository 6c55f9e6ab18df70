//! Object store interface consumed by the octree
//!
//! The tree never owns the objects it indexes. It reads their bounds through
//! [`BoundsStore`] and reports leaf membership back through
//! [`BoundsStore::assign_cell`].

use crate::spatial::AABB;

/// Enumerable, stably indexed collection of bounding boxes
pub trait BoundsStore {
    /// Number of indexable objects
    fn count(&self) -> u32;

    /// Bounds of object `index`, `None` when `index >= count()`
    fn bounds_of(&self, index: u32) -> Option<AABB>;

    /// Object `index` overlaps the leaf with id `cell_id`
    ///
    /// Called once per overlapping leaf, so an object straddling a boundary
    /// is reported several times during one rebuild.
    fn assign_cell(&mut self, index: u32, cell_id: u32);
}

/// In-memory object store with per-object cell tags
#[derive(Debug, Clone, Default)]
pub struct AabbStore {
    bounds: Vec<AABB>,
    cells: Vec<Vec<u32>>,
}

impl AabbStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its index
    pub fn push(&mut self, aabb: AABB) -> u32 {
        self.bounds.push(aabb);
        self.cells.push(Vec::new());
        index_u32(self.bounds.len() - 1)
    }

    /// Replace the bounds of an existing object
    ///
    /// Returns false when `index` is out of range.
    pub fn set(&mut self, index: u32, aabb: AABB) -> bool {
        match self.bounds.get_mut(index as usize) {
            Some(slot) => {
                *slot = aabb;
                true
            }
            None => false,
        }
    }

    /// Bounds of an object
    pub fn get(&self, index: u32) -> Option<&AABB> {
        self.bounds.get(index as usize)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// True when the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Iterate over every object's bounds in index order
    pub fn iter(&self) -> impl Iterator<Item = &AABB> {
        self.bounds.iter()
    }

    /// Mutable iteration, for moving objects between rebuilds
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AABB> {
        self.bounds.iter_mut()
    }

    /// Leaf ids recorded for an object, in assignment order
    pub fn cells(&self, index: u32) -> &[u32] {
        self.cells.get(index as usize).map_or(&[], Vec::as_slice)
    }

    /// Forget every cell tag; call before rebuilding the tree
    pub fn clear_cells(&mut self) {
        for cells in &mut self.cells {
            cells.clear();
        }
    }
}

impl FromIterator<AABB> for AabbStore {
    fn from_iter<I: IntoIterator<Item = AABB>>(iter: I) -> Self {
        let bounds: Vec<AABB> = iter.into_iter().collect();
        let cells = vec![Vec::new(); bounds.len()];
        Self { bounds, cells }
    }
}

impl BoundsStore for AabbStore {
    fn count(&self) -> u32 {
        index_u32(self.bounds.len())
    }

    fn bounds_of(&self, index: u32) -> Option<AABB> {
        self.bounds.get(index as usize).copied()
    }

    fn assign_cell(&mut self, index: u32, cell_id: u32) {
        if let Some(cells) = self.cells.get_mut(index as usize) {
            if !cells.contains(&cell_id) {
                cells.push(cell_id);
            }
        }
    }
}

fn index_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
