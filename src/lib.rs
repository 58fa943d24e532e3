//! The access structure of the Adaptive Particle Representation (APR) of 3D images.
//!
//! An APR replaces the pixels of an image with particle cells of adaptive size, where every location is covered by exactly one
//! cell on one resolution level. This library is organized into two crates:
//! - **core**: resolution level shapes, face directions and octree child addressing
//! - **storage**: the gap-encoded particle cell index, its builder, face neighbour and parent/child resolution, and the linear
//!   particle iterator
//!
//! ```
//! use adaptive_particles::prelude::*;
//!
//! let shapes = LevelShapes::for_image(LevelShape::new(16, 16, 16), 2).unwrap();
//! let mut tree = ParticleCellTree::new(shapes);
//! tree.insert(4, 3, 3, 3, CellStatus::Real);
//! tree.insert(3, 0, 0, 0, CellStatus::Boundary);
//!
//! let access = ParticleCellAccess::build(&tree);
//! let values = ParticleData::from_fn(&access, |p| p.level);
//! assert_eq!(values.as_slice(), &[3, 4]);
//! ```

pub use apr_core as core;
pub use apr_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::storage::prelude::*;
}
