//! The core data types for addressing an Adaptive Particle Representation:
//! - `LevelShape` and `LevelShapes`: the lattice shape of each resolution level
//! - `Face` and `Axis3`: the six face directions and the three axes
//! - `ChildOffset`: a child's position inside its parent's 2x2x2 group

pub mod axis;
pub mod error;
pub mod int_math;
pub mod level;
pub mod octant;

pub use axis::{Axis3, Face};
pub use error::StructureError;
pub use int_math::{ceil_div_pow2, ceil_log2};
pub use level::{LevelShape, LevelShapes, MAX_AXIS_EXTENT, MAX_LEVEL};
pub use octant::{parent_coords, ChildOffset};

pub mod prelude {
    pub use super::{Axis3, ChildOffset, Face, LevelShape, LevelShapes, StructureError};
}
