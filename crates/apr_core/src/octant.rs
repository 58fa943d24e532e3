//! Octree addressing between a level and the next finer level.
//!
//! A cell `(z, x, y)` on level `L` is covered by the 2x2x2 group of cells `(2z + dz, 2x + dx, 2y + dy)` on level `L + 1`. The
//! parent of any cell is found by halving each coordinate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The position of a child inside its parent's 2x2x2 group. Each component is 0 or 1.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ChildOffset {
    pub y: u8,
    pub x: u8,
    pub z: u8,
}

impl ChildOffset {
    /// All eight offsets in particle order: `y` varies fastest, then `x`, then `z`.
    pub const ALL: [ChildOffset; 8] = [
        ChildOffset::new(0, 0, 0),
        ChildOffset::new(1, 0, 0),
        ChildOffset::new(0, 1, 0),
        ChildOffset::new(1, 1, 0),
        ChildOffset::new(0, 0, 1),
        ChildOffset::new(1, 0, 1),
        ChildOffset::new(0, 1, 1),
        ChildOffset::new(1, 1, 1),
    ];

    #[inline]
    pub const fn new(y: u8, x: u8, z: u8) -> Self {
        Self { y, x, z }
    }

    /// The offset of the cell `(z, x, y)` inside its parent.
    #[inline]
    pub fn of_cell(z: usize, x: usize, y: usize) -> Self {
        Self::new((y & 1) as u8, (x & 1) as u8, (z & 1) as u8)
    }

    /// Index into `ChildOffset::ALL`.
    #[inline]
    pub fn index(&self) -> usize {
        (self.y + 2 * self.x + 4 * self.z) as usize
    }

    /// Which of the four child columns `(x0,z0), (x1,z0), (x0,z1), (x1,z1)` this offset lies in.
    #[inline]
    pub fn column_slot(&self) -> usize {
        (self.x + 2 * self.z) as usize
    }

    /// The `(z, x, y)` of this child of the parent at `(z, x, y)`.
    #[inline]
    pub fn child_of(&self, z: usize, x: usize, y: usize) -> (usize, usize, usize) {
        (
            2 * z + self.z as usize,
            2 * x + self.x as usize,
            2 * y + self.y as usize,
        )
    }
}

/// The `(z, x, y)` of the parent of the cell at `(z, x, y)`.
#[inline]
pub fn parent_coords(z: usize, x: usize, y: usize) -> (usize, usize, usize) {
    (z / 2, x / 2, y / 2)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
