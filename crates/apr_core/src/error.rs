use thiserror::Error;

/// A violated precondition on the inputs of a particle cell structure.
///
/// These are only produced at the construction boundary. Once a structure exists, its invariants are assumed.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StructureError {
    #[error("level range {level_min}..={level_max} is empty or exceeds the maximum level {max_level}")]
    InvalidLevelRange {
        level_min: u8,
        level_max: u8,
        max_level: u8,
    },
    #[error("finest shape [y={y_num}, x={x_num}, z={z_num}] exceeds the per-axis limit of {limit}")]
    ShapeTooLarge {
        y_num: usize,
        x_num: usize,
        z_num: usize,
        limit: usize,
    },
    #[error("shape [y={y_num}, x={x_num}, z={z_num}] has an empty axis")]
    EmptyShape {
        y_num: usize,
        x_num: usize,
        z_num: usize,
    },
    #[error("expected {expected} occupancy levels, got {actual}")]
    LevelCountMismatch { expected: usize, actual: usize },
    #[error("occupancy buffer for level {level} has {actual} voxels, but the level shape holds {expected}")]
    VoxelCountMismatch {
        level: u8,
        expected: usize,
        actual: usize,
    },
    #[error("invalid cell status {value} at level {level}, voxel {index}")]
    InvalidStatus { level: u8, index: usize, value: u8 },
}
