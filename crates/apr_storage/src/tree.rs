//! The particle cell tree: which cells are active on each resolution level.
//!
//! This is the input of the structure builder, produced upstream by the level/pushing pipeline. Each level is a dense buffer of
//! status bytes with `y` varying fastest, so every `(level, z, x)` column is a contiguous slice. A value of 0 means the cell is
//! not active, and `1..=3` is a `CellStatus`.
//!
//! ```
//! use apr_core::prelude::*;
//! use apr_storage::prelude::*;
//!
//! let shapes = LevelShapes::from_finest(0, 2, LevelShape::new(4, 4, 4)).unwrap();
//! let mut tree = ParticleCellTree::new(shapes);
//! tree.insert(2, 0, 0, 3, CellStatus::Real);
//! tree.insert(2, 3, 3, 3, CellStatus::Boundary);
//!
//! assert_eq!(tree.num_cells(), 2);
//! assert_eq!(tree.get(2, 0, 0, 3), Some(CellStatus::Real));
//!
//! // Every ancestor of an active cell, marked `Real` for direct parents and `Ghost` above that.
//! let parents = tree.parent_tree().unwrap();
//! assert_eq!(parents.get(1, 0, 0, 1), Some(CellStatus::Real));
//! assert_eq!(parents.get(1, 1, 1, 1), Some(CellStatus::Real));
//! assert_eq!(parents.get(0, 0, 0, 0), Some(CellStatus::Ghost));
//! ```

use crate::CellStatus;

use apr_core::prelude::*;

/// Whether every ancestor of an active cell is also active.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ancestry {
    /// No guarantee. Typical for the particle cells of an APR, where each location is covered by exactly one level.
    Open,
    /// Every active cell above `level_min` has an active parent. Holds for trees made by `ParticleCellTree::parent_tree`.
    Closed,
}

/// Dense per-level occupancy of particle cells.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParticleCellTree {
    shapes: LevelShapes,
    // Indexed by `level - level_min`, then by `LevelShape::voxel_index`.
    levels: Vec<Vec<u8>>,
    ancestry: Ancestry,
}

impl ParticleCellTree {
    /// A tree with no active cells.
    pub fn new(shapes: LevelShapes) -> Self {
        let levels = shapes.iter().map(|(_, shape)| vec![0; shape.num_voxels()]).collect();

        Self {
            shapes,
            levels,
            ancestry: Ancestry::Open,
        }
    }

    /// A tree where the status of each cell is determined by the `filler` function, called with `(level, z, x, y)`.
    pub fn fill_with(
        shapes: LevelShapes,
        mut filler: impl FnMut(u8, usize, usize, usize) -> Option<CellStatus>,
    ) -> Self {
        let mut tree = Self::new(shapes);
        for level in tree.shapes.levels() {
            let shape = *tree.shapes.shape(level);
            for (z, x) in shape.columns() {
                for y in 0..shape.y_num {
                    if let Some(status) = filler(level, z, x, y) {
                        tree.insert(level, z, x, y, status);
                    }
                }
            }
        }

        tree
    }

    /// Takes ownership of one dense status buffer per level, `level_min` first.
    ///
    /// This is where externally produced occupancy enters the structure, so every buffer is validated against `shapes`.
    pub fn from_levels(shapes: LevelShapes, levels: Vec<Vec<u8>>) -> Result<Self, StructureError> {
        if levels.len() != shapes.num_levels() {
            return Err(StructureError::LevelCountMismatch {
                expected: shapes.num_levels(),
                actual: levels.len(),
            });
        }
        for ((level, shape), buffer) in shapes.iter().zip(levels.iter()) {
            if buffer.len() != shape.num_voxels() {
                return Err(StructureError::VoxelCountMismatch {
                    level,
                    expected: shape.num_voxels(),
                    actual: buffer.len(),
                });
            }
            if let Some((index, &value)) = buffer
                .iter()
                .enumerate()
                .find(|&(_, &v)| v != 0 && CellStatus::from_u8(v).is_none())
            {
                return Err(StructureError::InvalidStatus { level, index, value });
            }
        }

        Ok(Self {
            shapes,
            levels,
            ancestry: Ancestry::Open,
        })
    }

    #[inline]
    pub fn shapes(&self) -> &LevelShapes {
        &self.shapes
    }

    #[inline]
    pub fn ancestry(&self) -> Ancestry {
        self.ancestry
    }

    /// The status of a cell. `None` if the cell is empty or outside the pyramid.
    #[inline]
    pub fn get(&self, level: u8, z: usize, x: usize, y: usize) -> Option<CellStatus> {
        let shape = self.shapes.get(level)?;
        if !shape.contains(z, x, y) {
            return None;
        }

        CellStatus::from_u8(self.level_buffer(level)[shape.voxel_index(z, x, y)])
    }

    #[inline]
    pub fn is_occupied(&self, level: u8, z: usize, x: usize, y: usize) -> bool {
        self.get(level, z, x, y).is_some()
    }

    /// # Panics
    ///
    /// If `(z, x, y)` is outside of `level`.
    #[inline]
    pub fn insert(&mut self, level: u8, z: usize, x: usize, y: usize, status: CellStatus) {
        self.write(level, z, x, y, status.to_u8());
    }

    #[inline]
    pub fn remove(&mut self, level: u8, z: usize, x: usize, y: usize) {
        self.write(level, z, x, y, 0);
    }

    fn write(&mut self, level: u8, z: usize, x: usize, y: usize, value: u8) {
        let shape = *self.shapes.shape(level);
        assert!(
            shape.contains(z, x, y),
            "cell (z={}, x={}, y={}) outside level {} shape {:?}",
            z,
            x,
            y,
            level,
            shape
        );

        let i = shape.voxel_index(z, x, y);
        self.level_buffer_mut(level)[i] = value;
        // Edits void any ancestry guarantee.
        self.ancestry = Ancestry::Open;
    }

    /// The status bytes of the `(level, z, x)` column, indexed by `y`.
    #[inline]
    pub fn column(&self, level: u8, z: usize, x: usize) -> &[u8] {
        let shape = self.shapes.shape(level);
        let start = shape.voxel_index(z, x, 0);

        &self.level_buffer(level)[start..start + shape.y_num]
    }

    /// The dense status buffer of `level`.
    #[inline]
    pub fn level_buffer(&self, level: u8) -> &[u8] {
        &self.levels[(level - self.shapes.level_min()) as usize]
    }

    #[inline]
    fn level_buffer_mut(&mut self, level: u8) -> &mut [u8] {
        let i = (level - self.shapes.level_min()) as usize;

        &mut self.levels[i]
    }

    pub fn num_cells_at(&self, level: u8) -> usize {
        self.level_buffer(level).iter().filter(|&&v| v != 0).count()
    }

    pub fn num_cells(&self) -> usize {
        self.shapes.levels().map(|level| self.num_cells_at(level)).sum()
    }

    /// The tree of all ancestors of active cells, spanning `level_min..=level_max - 1`. Returns `None` for a single-level tree.
    ///
    /// A cell that directly parents an active cell is marked `Real`, and every further ancestor that is not already marked becomes
    /// `Ghost`. The result is ancestor-closed, which lets the parent resolver treat a missing parent as a defect.
    pub fn parent_tree(&self) -> Option<ParticleCellTree> {
        let level_min = self.shapes.level_min();
        let level_max = self.shapes.level_max();
        if level_max == level_min {
            return None;
        }

        let mut parents = ParticleCellTree::new(self.shapes.truncated(level_max - 1));
        for level in (level_min + 1)..=level_max {
            let shape = *self.shapes.shape(level);
            for (z, x) in shape.columns() {
                for (y, _) in self.column(level, z, x).iter().enumerate().filter(|&(_, &v)| v != 0) {
                    parents.mark_ancestors(level - 1, z / 2, x / 2, y / 2);
                }
            }
        }
        parents.ancestry = Ancestry::Closed;

        Some(parents)
    }

    fn mark_ancestors(&mut self, level: u8, z: usize, x: usize, y: usize) {
        let already_marked = self.is_occupied(level, z, x, y);
        self.write(level, z, x, y, CellStatus::Real.to_u8());
        if already_marked {
            // Any marked cell already has all of its ancestors marked.
            return;
        }

        let (mut level, mut z, mut x, mut y) = (level, z, x, y);
        while level > self.shapes.level_min() {
            level -= 1;
            z /= 2;
            x /= 2;
            y /= 2;
            if self.is_occupied(level, z, x, y) {
                break;
            }
            self.write(level, z, x, y, CellStatus::Ghost.to_u8());
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    fn shapes() -> LevelShapes {
        LevelShapes::from_finest(1, 3, LevelShape::new(8, 8, 8)).unwrap()
    }

    #[test]
    fn columns_are_contiguous_along_y() {
        let mut tree = ParticleCellTree::new(shapes());
        tree.insert(3, 2, 5, 0, CellStatus::Real);
        tree.insert(3, 2, 5, 7, CellStatus::Boundary);

        assert_eq!(tree.column(3, 2, 5), &[1, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(tree.num_cells_at(3), 2);
        assert_eq!(tree.num_cells_at(2), 0);

        tree.remove(3, 2, 5, 0);
        assert_eq!(tree.get(3, 2, 5, 0), None);
        assert_eq!(tree.num_cells(), 1);
    }

    #[test]
    fn lookups_outside_the_pyramid_are_empty() {
        let mut tree = ParticleCellTree::new(shapes());
        tree.insert(1, 0, 0, 0, CellStatus::Real);

        assert_eq!(tree.get(1, 0, 0, 0), Some(CellStatus::Real));
        assert_eq!(tree.get(0, 0, 0, 0), None);
        assert_eq!(tree.get(4, 0, 0, 0), None);
        assert!(!tree.is_occupied(9, 0, 0, 0));
        assert!(!tree.is_occupied(1, 2, 0, 0));
    }

    #[test]
    fn from_levels_validates_buffers() {
        let shapes = shapes();
        let good: Vec<Vec<u8>> = shapes.iter().map(|(_, s)| vec![0; s.num_voxels()]).collect();
        assert!(ParticleCellTree::from_levels(shapes.clone(), good.clone()).is_ok());

        let mut short = good.clone();
        short[1].pop();
        assert_eq!(
            ParticleCellTree::from_levels(shapes.clone(), short),
            Err(StructureError::VoxelCountMismatch {
                level: 2,
                expected: 64,
                actual: 63
            })
        );

        let mut bad_status = good.clone();
        bad_status[0][3] = 9;
        assert_eq!(
            ParticleCellTree::from_levels(shapes.clone(), bad_status),
            Err(StructureError::InvalidStatus {
                level: 1,
                index: 3,
                value: 9
            })
        );

        assert_eq!(
            ParticleCellTree::from_levels(shapes, good[..2].to_vec()),
            Err(StructureError::LevelCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn parent_tree_is_ancestor_closed() {
        let mut tree = ParticleCellTree::new(shapes());
        tree.insert(3, 5, 6, 7, CellStatus::Real);
        tree.insert(2, 0, 0, 0, CellStatus::Real);

        let parents = tree.parent_tree().unwrap();

        assert_eq!(parents.ancestry(), Ancestry::Closed);
        assert_eq!(parents.shapes().level_max(), 2);
        assert_eq!(parents.get(2, 2, 3, 3), Some(CellStatus::Real));
        assert_eq!(parents.get(1, 1, 1, 1), Some(CellStatus::Ghost));
        assert_eq!(parents.get(1, 0, 0, 0), Some(CellStatus::Real));
        assert_eq!(parents.num_cells(), 3);
    }

    #[test]
    fn ghost_is_promoted_when_it_gains_a_real_child() {
        let mut tree = ParticleCellTree::new(shapes());
        // Marks (2, 0, 0, 0) as a direct parent and (1, 0, 0, 0) as a ghost.
        tree.insert(3, 0, 0, 0, CellStatus::Real);
        // Now (1, 0, 0, 0) directly parents a real cell.
        tree.insert(2, 1, 1, 1, CellStatus::Real);

        let parents = tree.parent_tree().unwrap();

        assert_eq!(parents.get(2, 0, 0, 0), Some(CellStatus::Real));
        assert_eq!(parents.get(1, 0, 0, 0), Some(CellStatus::Real));
    }

    #[test]
    fn single_level_has_no_parent_tree() {
        let shapes = LevelShapes::from_finest(2, 2, LevelShape::new(4, 4, 4)).unwrap();

        assert!(ParticleCellTree::new(shapes).parent_tree().is_none());
    }
}
