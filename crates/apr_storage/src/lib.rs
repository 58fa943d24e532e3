#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! Sparse storage and indexing for the particle cells of an Adaptive Particle Representation (APR).
//!
//! An APR covers every location of an image with a particle cell on exactly one resolution level. This crate encodes which cells
//! are active as a per-level, per-column run-length index along y, and resolves the links between cells:
//!   - `ParticleCellTree`: the dense input occupancy of every level
//!   - `GapIndex`: the gap-encoded columns of `NodeWord`s
//!   - `ParticleCellAccess`: the index plus face neighbour and parent/child links, with queries
//!   - `LinearParticleIterator`: the canonical traversal that defines every particle's global index
//!   - `ParticleData`: per-particle values in that order
//!
//! Cells are addressed by `PcKey`, a bit-packed `(level, z, x, j)` value where `j` is the word position inside the column.

pub mod access;
pub mod builder;
pub mod column;
pub mod iterator;
pub mod key;
pub mod neighbours;
pub mod node;
pub mod parents;
pub mod particle_data;
pub mod store;
pub mod tree;

mod parallel;

pub use access::*;
pub use column::{CellRun, ColumnCells, ColumnRuns};
pub use iterator::*;
pub use key::*;
pub use neighbours::FaceNeighbour;
pub use node::*;
pub use particle_data::*;
pub use store::*;
pub use tree::*;

pub use apr_core::StructureError;

pub mod prelude {
    pub use super::{
        AccessConfig, Ancestry, CellRun, CellStatus, FaceNeighbour, GapIndex, IteratorState,
        LinearParticleIterator, NeighbourLevel, NodeWord, ParentInfo, ParentWord, Particle,
        ParticleCellAccess, ParticleCellTree, ParticleData, PcKey, StructureError,
    };
}
