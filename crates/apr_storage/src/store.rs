//! Per-level, per-column word storage.

use crate::{
    column::{find_y, y_at},
    NodeWord, ParentWord, PcKey,
};

use apr_core::prelude::*;

use bytemuck::Pod;

/// One growable sequence of words per `(level, column)`, for every level of a pyramid.
///
/// Footprint is proportional to the number of stored words, never to the dense voxel count of a level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnStore<W> {
    shapes: LevelShapes,
    // Indexed by `level - level_min`, then by column offset.
    levels: Vec<Vec<Vec<W>>>,
}

/// The gap-encoded index: node words of every column.
pub type GapIndex = ColumnStore<NodeWord>;

/// The octree overlay, parallel to a `GapIndex` word for word.
pub type ParentInfo = ColumnStore<ParentWord>;

impl<W> ColumnStore<W> {
    /// Takes the columns of each level, `level_min` first.
    pub(crate) fn from_levels(shapes: LevelShapes, levels: Vec<Vec<Vec<W>>>) -> Self {
        assert_eq!(levels.len(), shapes.num_levels());
        for ((_, shape), columns) in shapes.iter().zip(levels.iter()) {
            assert_eq!(columns.len(), shape.num_columns());
        }

        Self { shapes, levels }
    }

    #[inline]
    pub fn shapes(&self) -> &LevelShapes {
        &self.shapes
    }

    #[inline]
    pub fn contains_level(&self, level: u8) -> bool {
        self.shapes.contains_level(level)
    }

    /// All columns of `level`, in column offset order.
    #[inline]
    pub fn level_columns(&self, level: u8) -> &[Vec<W>] {
        &self.levels[self.level_index(level)]
    }

    #[inline]
    pub(crate) fn level_columns_mut(&mut self, level: u8) -> &mut [Vec<W>] {
        let i = self.level_index(level);

        &mut self.levels[i]
    }

    #[inline]
    pub fn column_at(&self, level: u8, offset: usize) -> &[W] {
        &self.level_columns(level)[offset]
    }

    #[inline]
    pub fn column(&self, level: u8, z: usize, x: usize) -> &[W] {
        let offset = self.shapes.shape(level).column_offset(z, x);

        self.column_at(level, offset)
    }

    /// Number of words in the `(level, z, x)` column.
    #[inline]
    pub fn size_at(&self, level: u8, z: usize, x: usize) -> usize {
        self.column(level, z, x).len()
    }

    #[inline]
    pub fn node_at(&self, level: u8, offset: usize, j: usize) -> &W {
        &self.level_columns(level)[offset][j]
    }

    /// The word addressed by `key`.
    #[inline]
    pub fn get(&self, key: PcKey) -> &W {
        let offset = self.shapes.shape(key.level()).column_offset(key.z(), key.x());

        self.node_at(key.level(), offset, key.j())
    }

    /// Total number of words across all levels.
    pub fn num_words(&self) -> usize {
        self.levels.iter().flatten().map(Vec::len).sum()
    }

    #[inline]
    fn level_index(&self, level: u8) -> usize {
        assert!(
            self.shapes.contains_level(level),
            "level {} outside {}..={}",
            level,
            self.shapes.level_min(),
            self.shapes.level_max()
        );

        (level - self.shapes.level_min()) as usize
    }
}

impl<W: Pod> ColumnStore<W> {
    /// The raw native-endian bytes of one column, for an external serializer.
    #[inline]
    pub fn column_bytes(&self, level: u8, z: usize, x: usize) -> &[u8] {
        bytemuck::cast_slice(self.column(level, z, x))
    }
}

impl GapIndex {
    /// The key of the cell at `(level, z, x, y)`. `None` if the cell is not active or the coordinates are outside the pyramid.
    pub fn find_cell(&self, level: u8, z: usize, x: usize, y: usize) -> Option<PcKey> {
        let shape = self.shapes.get(level)?;
        if !shape.contains(z, x, y) {
            return None;
        }

        find_y(self.column(level, z, x), y).map(|j| PcKey::new(level, z, x, j))
    }

    /// The y-coordinate of the cell at `key`.
    #[inline]
    pub fn y_of(&self, key: PcKey) -> usize {
        y_at(self.column(key.level(), key.z(), key.x()), key.j())
    }
}

impl ParentInfo {
    /// An all-zero overlay with the same column sizes as `index`.
    pub(crate) fn zeroed_like(index: &GapIndex) -> Self {
        let levels = index
            .levels
            .iter()
            .map(|columns| {
                columns
                    .iter()
                    .map(|column| vec![ParentWord::default(); column.len()])
                    .collect()
            })
            .collect();

        Self {
            shapes: index.shapes.clone(),
            levels,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
