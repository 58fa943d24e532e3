//! Resolution levels and their per-level lattice shapes.
//!
//! A level `L` halves the linear resolution of level `L + 1` in every axis, so the shapes form an image pyramid whose finest
//! level (`level_max`) is the pixel grid. Columns are addressed by `offset = x_num * z + x`, and dense per-level buffers are laid
//! out with `y` varying fastest, then `x`, then `z`.

use crate::{ceil_div_pow2, ceil_log2, StructureError};

use core::convert::TryFrom;
use core::ops::RangeInclusive;
use itertools::iproduct;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The largest supported resolution level.
pub const MAX_LEVEL: u8 = 15;

/// The largest supported extent of any axis at the finest level.
///
/// Bounded so that a column always has fewer than `2^13` node words and a parent column fewer than `2^12`.
pub const MAX_AXIS_EXTENT: usize = 1 << 12;

/// Number of cells along each axis of a single resolution level.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct LevelShape {
    pub y_num: usize,
    pub x_num: usize,
    pub z_num: usize,
}

impl LevelShape {
    #[inline]
    pub const fn new(y_num: usize, x_num: usize, z_num: usize) -> Self {
        Self {
            y_num,
            x_num,
            z_num,
        }
    }

    /// Number of `(z, x)` columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.x_num * self.z_num
    }

    /// Number of voxels in a dense buffer of this shape.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.y_num * self.x_num * self.z_num
    }

    #[inline]
    pub fn column_offset(&self, z: usize, x: usize) -> usize {
        debug_assert!(z < self.z_num && x < self.x_num);

        self.x_num * z + x
    }

    /// The inverse of `column_offset`, returning `(z, x)`.
    #[inline]
    pub fn column_coords(&self, offset: usize) -> (usize, usize) {
        (offset / self.x_num, offset % self.x_num)
    }

    /// Applies a signed column step, returning `None` when the result leaves the level.
    #[inline]
    pub fn step_column(&self, z: usize, x: usize, dz: i32, dx: i32) -> Option<(usize, usize)> {
        let z = z as i64 + dz as i64;
        let x = x as i64 + dx as i64;
        if z < 0 || x < 0 || z >= self.z_num as i64 || x >= self.x_num as i64 {
            return None;
        }

        Some((z as usize, x as usize))
    }

    /// Index into a dense `[z][x][y]` buffer.
    #[inline]
    pub fn voxel_index(&self, z: usize, x: usize, y: usize) -> usize {
        debug_assert!(self.contains(z, x, y));

        z * self.x_num * self.y_num + x * self.y_num + y
    }

    #[inline]
    pub fn contains(&self, z: usize, x: usize, y: usize) -> bool {
        z < self.z_num && x < self.x_num && y < self.y_num
    }

    /// All `(z, x)` column coordinates in column offset order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..self.z_num, 0..self.x_num)
    }

    /// The shape of the next coarser level.
    #[inline]
    pub fn coarsened(&self) -> Self {
        Self::new(
            ceil_div_pow2(self.y_num, 1),
            ceil_div_pow2(self.x_num, 1),
            ceil_div_pow2(self.z_num, 1),
        )
    }

    fn is_empty(&self) -> bool {
        self.num_voxels() == 0
    }
}

/// The shapes of every level in `level_min..=level_max`.
///
/// Serialized as the level range and the finest shape, and validated by `from_finest` when deserialized.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "PyramidDef", into = "PyramidDef")
)]
pub struct LevelShapes {
    level_min: u8,
    level_max: u8,
    // Indexed by `level - level_min`.
    shapes: Vec<LevelShape>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
struct PyramidDef {
    level_min: u8,
    level_max: u8,
    finest: LevelShape,
}

impl From<LevelShapes> for PyramidDef {
    fn from(shapes: LevelShapes) -> Self {
        Self {
            level_min: shapes.level_min,
            level_max: shapes.level_max,
            finest: *shapes.shape(shapes.level_max),
        }
    }
}

impl TryFrom<PyramidDef> for LevelShapes {
    type Error = StructureError;

    fn try_from(def: PyramidDef) -> Result<Self, StructureError> {
        Self::from_finest(def.level_min, def.level_max, def.finest)
    }
}

impl LevelShapes {
    /// Builds the pyramid from the shape of the finest level. Each coarser level rounds up when halving, so a cell at level
    /// `L` always has its parent at `(z / 2, x / 2, y / 2)` on level `L - 1`.
    pub fn from_finest(level_min: u8, level_max: u8, finest: LevelShape) -> Result<Self, StructureError> {
        if level_min > level_max || level_max > MAX_LEVEL {
            return Err(StructureError::InvalidLevelRange {
                level_min,
                level_max,
                max_level: MAX_LEVEL,
            });
        }
        if finest.is_empty() {
            return Err(StructureError::EmptyShape {
                y_num: finest.y_num,
                x_num: finest.x_num,
                z_num: finest.z_num,
            });
        }
        if finest.y_num > MAX_AXIS_EXTENT || finest.x_num > MAX_AXIS_EXTENT || finest.z_num > MAX_AXIS_EXTENT {
            return Err(StructureError::ShapeTooLarge {
                y_num: finest.y_num,
                x_num: finest.x_num,
                z_num: finest.z_num,
                limit: MAX_AXIS_EXTENT,
            });
        }

        let shapes = (level_min..=level_max)
            .map(|level| {
                let power = (level_max - level) as u32;
                LevelShape::new(
                    ceil_div_pow2(finest.y_num, power),
                    ceil_div_pow2(finest.x_num, power),
                    ceil_div_pow2(finest.z_num, power),
                )
            })
            .collect();

        Ok(Self {
            level_min,
            level_max,
            shapes,
        })
    }

    /// The pyramid for an image of shape `image`, where `level_max` is the smallest level whose `2^level_max` covers the longest
    /// image axis. `level_min` is clamped to `level_max`.
    pub fn for_image(image: LevelShape, level_min: u8) -> Result<Self, StructureError> {
        let longest = image.y_num.max(image.x_num).max(image.z_num);
        let level_max = ceil_log2(longest).min(u8::MAX as u32) as u8;

        Self::from_finest(level_min.min(level_max), level_max, image)
    }

    #[inline]
    pub fn level_min(&self) -> u8 {
        self.level_min
    }

    #[inline]
    pub fn level_max(&self) -> u8 {
        self.level_max
    }

    #[inline]
    pub fn levels(&self) -> RangeInclusive<u8> {
        self.level_min..=self.level_max
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn contains_level(&self, level: u8) -> bool {
        self.levels().contains(&level)
    }

    /// The shape of `level`.
    ///
    /// # Panics
    ///
    /// If `level` is outside `level_min..=level_max`.
    #[inline]
    pub fn shape(&self, level: u8) -> &LevelShape {
        assert!(
            self.contains_level(level),
            "level {} outside {}..={}",
            level,
            self.level_min,
            self.level_max
        );

        &self.shapes[(level - self.level_min) as usize]
    }

    /// Like `shape`, but `None` for levels outside the pyramid.
    #[inline]
    pub fn get(&self, level: u8) -> Option<&LevelShape> {
        if self.contains_level(level) {
            Some(&self.shapes[(level - self.level_min) as usize])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &LevelShape)> {
        self.levels().zip(self.shapes.iter())
    }

    /// The pyramid restricted to `level_min..=new_level_max`.
    pub fn truncated(&self, new_level_max: u8) -> Self {
        assert!(new_level_max >= self.level_min && new_level_max <= self.level_max);

        Self {
            level_min: self.level_min,
            level_max: new_level_max,
            shapes: self.shapes[..=(new_level_max - self.level_min) as usize].to_vec(),
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
