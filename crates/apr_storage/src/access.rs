//! The queryable access structure of an Adaptive Particle Representation.
//!
//! `ParticleCellAccess` owns the gap-encoded index and its parent overlay. It is built once from a `ParticleCellTree` and is
//! read-only afterward.
//!
//! ```
//! use apr_core::prelude::*;
//! use apr_storage::prelude::*;
//!
//! let shapes = LevelShapes::from_finest(0, 0, LevelShape::new(8, 2, 1)).unwrap();
//! let mut tree = ParticleCellTree::new(shapes);
//! tree.insert(0, 0, 0, 5, CellStatus::Real);
//! tree.insert(0, 0, 1, 5, CellStatus::Real);
//!
//! let access = ParticleCellAccess::build(&tree);
//! let a = access.find_cell(0, 0, 0, 5).unwrap();
//! let b = access.find_cell(0, 0, 1, 5).unwrap();
//!
//! assert_eq!(access.face_neighbour(a, Face::XPlus), FaceNeighbour::Same(b));
//! assert_eq!(access.face_neighbour(b, Face::XMinus), FaceNeighbour::Same(a));
//! assert_eq!(access.iter().map(|p| p.y).collect::<Vec<_>>(), vec![5, 5]);
//! ```

use crate::{
    builder::build_gap_index,
    column::ColumnRuns,
    neighbours::{face_neighbour, resolve_neighbours},
    parents::{children, parent, resolve_parents},
    Ancestry, CellStatus, FaceNeighbour, GapIndex, LinearParticleIterator, NodeWord, ParentInfo,
    ParticleCellTree, PcKey,
};

use apr_core::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for `ParticleCellAccess::build_with_config`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct AccessConfig {
    /// Levels with more columns than this are processed on the rayon pool.
    pub parallel_threshold: usize,
    /// Whether faces without a same-level neighbour are linked to coarser or finer neighbours.
    pub resolve_cross_level: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 100,
            resolve_cross_level: true,
        }
    }
}

impl AccessConfig {
    #[inline]
    pub fn is_parallel(&self, shape: &LevelShape) -> bool {
        shape.num_columns() > self.parallel_threshold
    }
}

/// The gap-encoded index of a particle cell tree, with neighbour and parent links resolved.
#[derive(Clone, Debug)]
pub struct ParticleCellAccess {
    gap_index: GapIndex,
    parent_info: ParentInfo,
    ancestry: Ancestry,
    config: AccessConfig,
    // Global index of the first particle of each column, per level, with one extra entry holding the end of the level.
    column_offsets: Vec<Vec<u64>>,
    total_particles: u64,
    total_gaps: u64,
    total_non_empty_columns: u64,
}

impl ParticleCellAccess {
    pub fn build(tree: &ParticleCellTree) -> Self {
        Self::build_with_config(tree, AccessConfig::default())
    }

    pub fn build_with_config(tree: &ParticleCellTree, config: AccessConfig) -> Self {
        let _span = tracing::debug_span!("build_access").entered();

        let mut gap_index = build_gap_index(tree, &config);
        resolve_neighbours(&mut gap_index, &config);
        let parent_info = resolve_parents(&gap_index, tree.ancestry(), &config);

        let mut column_offsets = Vec::with_capacity(gap_index.shapes().num_levels());
        let mut total_particles = 0;
        let mut total_gaps = 0;
        let mut total_non_empty_columns = 0;
        for level in gap_index.shapes().levels() {
            let columns = gap_index.level_columns(level);
            let mut offsets = Vec::with_capacity(columns.len() + 1);
            for words in columns.iter() {
                offsets.push(total_particles);
                let cells = words.iter().filter(|w| w.is_cell()).count() as u64;
                total_particles += cells;
                // Every column holds one gap marker per run and the trailing sentinel.
                total_gaps += words.len() as u64 - cells - 1;
                if cells > 0 {
                    total_non_empty_columns += 1;
                }
            }
            offsets.push(total_particles);
            column_offsets.push(offsets);
        }

        tracing::debug!(
            total_particles,
            total_gaps,
            total_non_empty_columns,
            num_words = gap_index.num_words(),
            "built particle cell access"
        );

        Self {
            gap_index,
            parent_info,
            ancestry: tree.ancestry(),
            config,
            column_offsets,
            total_particles,
            total_gaps,
            total_non_empty_columns,
        }
    }

    #[inline]
    pub fn shapes(&self) -> &LevelShapes {
        self.gap_index.shapes()
    }

    #[inline]
    pub fn gap_index(&self) -> &GapIndex {
        &self.gap_index
    }

    #[inline]
    pub fn parent_info(&self) -> &ParentInfo {
        &self.parent_info
    }

    #[inline]
    pub fn ancestry(&self) -> Ancestry {
        self.ancestry
    }

    #[inline]
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    #[inline]
    pub fn is_occupied(&self, level: u8, z: usize, x: usize, y: usize) -> bool {
        self.find_cell(level, z, x, y).is_some()
    }

    #[inline]
    pub fn find_cell(&self, level: u8, z: usize, x: usize, y: usize) -> Option<PcKey> {
        self.gap_index.find_cell(level, z, x, y)
    }

    #[inline]
    pub fn node(&self, key: PcKey) -> NodeWord {
        *self.gap_index.get(key)
    }

    #[inline]
    pub fn y_of(&self, key: PcKey) -> usize {
        self.gap_index.y_of(key)
    }

    #[inline]
    pub fn status(&self, key: PcKey) -> CellStatus {
        self.node(key).status()
    }

    pub fn face_neighbour(&self, key: PcKey, face: Face) -> FaceNeighbour {
        face_neighbour(&self.gap_index, key, face)
    }

    /// Neighbours across all faces, in `Face::ALL` order.
    pub fn all_face_neighbours(&self, key: PcKey) -> [FaceNeighbour; 6] {
        let mut neighbours = [FaceNeighbour::None; 6];
        for face in Face::ALL.iter() {
            neighbours[face.index()] = self.face_neighbour(key, *face);
        }

        neighbours
    }

    #[inline]
    pub fn parent(&self, key: PcKey) -> Option<PcKey> {
        parent(&self.parent_info, key)
    }

    /// Children ordered like `ChildOffset::ALL`.
    #[inline]
    pub fn children(&self, key: PcKey) -> [Option<PcKey>; 8] {
        children(&self.gap_index, &self.parent_info, key)
    }

    /// The position of the cell at `key` in linear iteration order.
    pub fn global_index(&self, key: PcKey) -> u64 {
        let level = key.level();
        let offset = self.shapes().shape(level).column_offset(key.z(), key.x());
        let words = self.gap_index.column_at(level, offset);
        assert!(words[key.j()].is_cell(), "{:?} is not a particle cell", key);

        let cells_before = words[..key.j()].iter().filter(|w| w.is_cell()).count() as u64;

        self.column_offsets[self.level_index(level)][offset] + cells_before
    }

    /// The runs of consecutive cells in one column, with the global index of each run's first particle.
    pub fn column_runs(&self, level: u8, z: usize, x: usize) -> ColumnRuns<'_> {
        let offset = self.shapes().shape(level).column_offset(z, x);

        ColumnRuns::new(
            self.gap_index.column_at(level, offset),
            self.column_offsets[self.level_index(level)][offset],
        )
    }

    /// The raw bytes of one column of node words.
    #[inline]
    pub fn column_bytes(&self, level: u8, z: usize, x: usize) -> &[u8] {
        self.gap_index.column_bytes(level, z, x)
    }

    #[inline]
    pub fn total_particles(&self) -> u64 {
        self.total_particles
    }

    /// Number of runs of consecutive cells, i.e. gap markers other than the trailing sentinels.
    #[inline]
    pub fn total_gaps(&self) -> u64 {
        self.total_gaps
    }

    #[inline]
    pub fn total_non_empty_columns(&self) -> u64 {
        self.total_non_empty_columns
    }

    pub fn num_particles_at(&self, level: u8) -> u64 {
        let (begin, end) = self.level_range(level);

        end - begin
    }

    pub fn iter(&self) -> LinearParticleIterator<'_> {
        LinearParticleIterator::new(&self.gap_index, self.shapes().levels(), 0, self.total_particles)
    }

    pub fn iter_level(&self, level: u8) -> LinearParticleIterator<'_> {
        let (begin, end) = self.level_range(level);

        LinearParticleIterator::new(&self.gap_index, level..=level, begin, end)
    }

    fn level_range(&self, level: u8) -> (u64, u64) {
        let offsets = &self.column_offsets[self.level_index(level)];

        (offsets[0], offsets[offsets.len() - 1])
    }

    #[inline]
    fn level_index(&self, level: u8) -> usize {
        assert!(self.shapes().contains_level(level), "level {} outside the pyramid", level);

        (level - self.shapes().level_min()) as usize
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
