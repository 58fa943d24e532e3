//! Fixed-width node words of the gap-encoded index.
//!
//! Every column of the index is a sequence of 64-bit `NodeWord`s. The lowest bit discriminates the two kinds of word:
//!
//! - **gap marker** (bit 0 set): a run of unoccupied y-coordinates. Stores `next_y`, the y of the cell that follows the gap, and
//!   `prev_y`, the y of the cell that precedes it. Also stores the relative level of the +y neighbour of the preceding cell and
//!   the -y neighbour of the following cell, since those neighbours are not reachable by a word offset. The trailing sentinel of
//!   a column carries the `END` flag.
//! - **particle cell** (bit 0 clear): a single occupied y-coordinate, which is implied by the preceding words. Stores a status
//!   and, for each of the four lateral faces, a neighbour index and the neighbour's relative level.
//!
//! ```text
//! gap:   | 63..38 unused | 37..36 -y level | 35..34 +y level | 33..18 prev_y | 17..2 next_y | 1 END | 0 = 1 |
//! cell:  | 63 unused | 62..48 -z | 47..33 +z | 32..18 -x | 17..3 +x | 2..1 status | 0 = 0 |
//!          each lateral field = 13-bit index, then 2-bit level
//! ```
//!
//! `ParentWord` is an overlay that parallels the node words one-to-one and carries the octree links.

use apr_core::Face;

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Index value meaning "no neighbour". Word 0 of every column is a gap marker, so no cell ever has index 0.
pub const NO_NEIGHBOUR: u16 = 0;

/// The largest index that fits in a lateral neighbour field or a child slot.
pub const MAX_NODE_INDEX: usize = (1 << INDEX_BITS) - 1;

/// The largest index that fits in a parent field.
pub const MAX_PARENT_INDEX: usize = (1 << PARENT_BITS) - 1;

const GAP_BIT: u64 = 1;
const END_BIT: u64 = 1 << 1;

const Y_BITS: u32 = 16;
const Y_MASK: u64 = (1 << Y_BITS) - 1;
const NEXT_Y_SHIFT: u32 = 2;
const PREV_Y_SHIFT: u32 = 18;
const YP_LEVEL_SHIFT: u32 = 34;
const YM_LEVEL_SHIFT: u32 = 36;

const LEVEL_MASK: u64 = 0b11;

const STATUS_SHIFT: u32 = 1;
const STATUS_MASK: u64 = 0b11;

const INDEX_BITS: u32 = 13;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;
const LATERAL_SHIFT: u32 = 3;
const LATERAL_FIELD_BITS: u32 = INDEX_BITS + 2;

const PARENT_BITS: u32 = 12;
const PARENT_MASK: u64 = (1 << PARENT_BITS) - 1;
const CHILD_SHIFT: u32 = PARENT_BITS;

/// The relative resolution level of a face neighbour.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NeighbourLevel {
    None = 0,
    Same = 1,
    /// The neighbour is a larger cell on level `L - 1`.
    Coarser = 2,
    /// The neighbour is one of several smaller cells on level `L + 1`.
    Finer = 3,
}

impl NeighbourLevel {
    #[inline]
    fn from_bits(bits: u64) -> Self {
        match bits & LEVEL_MASK {
            0 => NeighbourLevel::None,
            1 => NeighbourLevel::Same,
            2 => NeighbourLevel::Coarser,
            _ => NeighbourLevel::Finer,
        }
    }
}

/// The status of an occupied particle cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CellStatus {
    /// A real particle cell. In a parent tree, a cell with at least one real child.
    Real = 1,
    /// A real particle cell on the boundary of a region of constant level.
    Boundary = 2,
    /// A parent-only cell, whose descendants are all ghosts or real cells at least two levels down.
    Ghost = 3,
}

impl CellStatus {
    /// Decodes an occupancy value. Zero means "unoccupied".
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CellStatus::Real),
            2 => Some(CellStatus::Boundary),
            3 => Some(CellStatus::Ghost),
            _ => None,
        }
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One word of a column in the gap-encoded index. See the module docs for the layout.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, Pod, Zeroable)]
#[repr(transparent)]
pub struct NodeWord(pub u64);

impl NodeWord {
    /// A gap marker preceding the cell at `next_y`. `prev_y` is where the previous run ended.
    #[inline]
    pub fn gap(next_y: usize, prev_y: usize) -> Self {
        assert!(next_y as u64 <= Y_MASK && prev_y as u64 <= Y_MASK);

        let mut word = Self(GAP_BIT | (next_y as u64) << NEXT_Y_SHIFT | (prev_y as u64) << PREV_Y_SHIFT);
        word.set_y_neighbour_level(Face::YPlus, NeighbourLevel::None);
        word.set_y_neighbour_level(Face::YMinus, NeighbourLevel::None);

        word
    }

    /// The trailing sentinel of a column of length `y_num`, whose last cell is at `prev_y`.
    #[inline]
    pub fn gap_end(y_num: usize, prev_y: usize) -> Self {
        let word = Self::gap(y_num, prev_y);

        Self(word.0 | END_BIT)
    }

    /// A particle cell with no lateral neighbours.
    #[inline]
    pub fn cell(status: CellStatus) -> Self {
        let mut word = Self((status as u64) << STATUS_SHIFT);
        for face in Face::LATERAL.iter() {
            word.clear_lateral(*face);
        }

        word
    }

    #[inline]
    pub fn is_gap(&self) -> bool {
        self.0 & GAP_BIT != 0
    }

    #[inline]
    pub fn is_cell(&self) -> bool {
        !self.is_gap()
    }

    /// True for the trailing sentinel of a column.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.is_gap() && self.0 & END_BIT != 0
    }

    #[inline]
    pub fn next_y(&self) -> usize {
        debug_assert!(self.is_gap());

        ((self.0 >> NEXT_Y_SHIFT) & Y_MASK) as usize
    }

    #[inline]
    pub fn prev_y(&self) -> usize {
        debug_assert!(self.is_gap());

        ((self.0 >> PREV_Y_SHIFT) & Y_MASK) as usize
    }

    /// For `YPlus`, the level of the +y neighbour of the cell before this gap. For `YMinus`, the level of the -y neighbour of the
    /// cell after this gap.
    #[inline]
    pub fn y_neighbour_level(&self, face: Face) -> NeighbourLevel {
        debug_assert!(self.is_gap());

        NeighbourLevel::from_bits(self.0 >> y_level_shift(face))
    }

    #[inline]
    pub fn set_y_neighbour_level(&mut self, face: Face, level: NeighbourLevel) {
        debug_assert!(self.is_gap());

        let shift = y_level_shift(face);
        self.0 = (self.0 & !(LEVEL_MASK << shift)) | (level as u64) << shift;
    }

    #[inline]
    pub fn status(&self) -> CellStatus {
        debug_assert!(self.is_cell());

        let code = ((self.0 >> STATUS_SHIFT) & STATUS_MASK) as u8;
        match CellStatus::from_u8(code) {
            Some(status) => status,
            None => panic!("corrupt particle cell word {:#x} with status code {}", self.0, code),
        }
    }

    /// The neighbour link across a lateral face, as `(level, index)`. The index is `NO_NEIGHBOUR` iff the level is `None`.
    #[inline]
    pub fn lateral(&self, face: Face) -> (NeighbourLevel, u16) {
        debug_assert!(self.is_cell());

        let shift = lateral_shift(face);
        let index = ((self.0 >> shift) & INDEX_MASK) as u16;
        let level = NeighbourLevel::from_bits(self.0 >> (shift + INDEX_BITS));

        (level, index)
    }

    #[inline]
    pub fn lateral_level(&self, face: Face) -> NeighbourLevel {
        self.lateral(face).0
    }

    /// Overwrites the link across a lateral face. Exactly one relative level holds per face.
    #[inline]
    pub fn set_lateral(&mut self, face: Face, level: NeighbourLevel, index: usize) {
        debug_assert!(self.is_cell());
        assert!(
            index <= MAX_NODE_INDEX,
            "neighbour index {} does not fit in {} bits",
            index,
            INDEX_BITS
        );
        assert_eq!(
            level == NeighbourLevel::None,
            index == NO_NEIGHBOUR as usize,
            "neighbour level {:?} inconsistent with index {}",
            level,
            index
        );

        let shift = lateral_shift(face);
        let field_mask = ((1 << LATERAL_FIELD_BITS) - 1) << shift;
        let field = (index as u64 | (level as u64) << INDEX_BITS) << shift;
        self.0 = (self.0 & !field_mask) | field;
    }

    #[inline]
    pub fn clear_lateral(&mut self, face: Face) {
        self.set_lateral(face, NeighbourLevel::None, NO_NEIGHBOUR as usize);
    }
}

impl fmt::Debug for NodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_gap() {
            f.debug_struct(if self.is_end() { "GapEnd" } else { "Gap" })
                .field("next_y", &self.next_y())
                .field("prev_y", &self.prev_y())
                .field("yp", &self.y_neighbour_level(Face::YPlus))
                .field("ym", &self.y_neighbour_level(Face::YMinus))
                .finish()
        } else {
            f.debug_struct("Cell")
                .field("status", &self.status())
                .field("xp", &self.lateral(Face::XPlus))
                .field("xm", &self.lateral(Face::XMinus))
                .field("zp", &self.lateral(Face::ZPlus))
                .field("zm", &self.lateral(Face::ZMinus))
                .finish()
        }
    }
}

#[inline]
fn y_level_shift(face: Face) -> u32 {
    match face {
        Face::YPlus => YP_LEVEL_SHIFT,
        Face::YMinus => YM_LEVEL_SHIFT,
        _ => panic!("{:?} is not a y face", face),
    }
}

#[inline]
fn lateral_shift(face: Face) -> u32 {
    match face.lateral_index() {
        Some(i) => LATERAL_SHIFT + i as u32 * LATERAL_FIELD_BITS,
        None => panic!("{:?} is not a lateral face", face),
    }
}

/// Octree links of one node, parallel to its `NodeWord`.
///
/// ```text
/// | 63..51 child (x1,z1) | 50..38 child (x0,z1) | 37..25 child (x1,z0) | 24..12 child (x0,z0) | 11..0 parent |
/// ```
///
/// A child slot holds the index of the child at `y = 2 * y_parent` in that child column. The child at `2 * y_parent + 1`, if
/// present, is the word right after it.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, Pod, Zeroable)]
#[repr(transparent)]
pub struct ParentWord(pub u64);

impl ParentWord {
    /// Index of the parent in its level `L - 1` column.
    #[inline]
    pub fn parent(&self) -> Option<u16> {
        match (self.0 & PARENT_MASK) as u16 {
            NO_NEIGHBOUR => None,
            j => Some(j),
        }
    }

    #[inline]
    pub fn set_parent(&mut self, index: usize) {
        assert!(
            index > 0 && index <= MAX_PARENT_INDEX,
            "parent index {} does not fit in {} bits",
            index,
            PARENT_BITS
        );

        self.0 = (self.0 & !PARENT_MASK) | index as u64;
    }

    /// The first child in child column `slot`, see `ChildOffset::column_slot`.
    #[inline]
    pub fn child(&self, slot: usize) -> Option<u16> {
        match ((self.0 >> child_shift(slot)) & INDEX_MASK) as u16 {
            NO_NEIGHBOUR => None,
            j => Some(j),
        }
    }

    #[inline]
    pub fn set_child(&mut self, slot: usize, index: usize) {
        assert!(
            index > 0 && index <= MAX_NODE_INDEX,
            "child index {} does not fit in {} bits",
            index,
            INDEX_BITS
        );

        let shift = child_shift(slot);
        self.0 = (self.0 & !(INDEX_MASK << shift)) | (index as u64) << shift;
    }
}

impl fmt::Debug for ParentWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentWord")
            .field("parent", &self.parent())
            .field("children", &[self.child(0), self.child(1), self.child(2), self.child(3)])
            .finish()
    }
}

#[inline]
fn child_shift(slot: usize) -> u32 {
    assert!(slot < 4, "child slot {} out of range", slot);

    CHILD_SHIFT + slot as u32 * INDEX_BITS
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

    #[test]
    #[should_panic]
    fn corrupt_status_is_fatal() {
        NodeWord(0).status();
    }

    #[test]
    fn gap_fields() {
        let mut gap = NodeWord::gap(4095, 17);

        assert!(gap.is_gap());
        assert!(!gap.is_end());
        assert_eq!(gap.next_y(), 4095);
        assert_eq!(gap.prev_y(), 17);
        assert_eq!(gap.y_neighbour_level(Face::YPlus), NeighbourLevel::None);

        gap.set_y_neighbour_level(Face::YMinus, NeighbourLevel::Finer);
        assert_eq!(gap.y_neighbour_level(Face::YMinus), NeighbourLevel::Finer);
        assert_eq!(gap.y_neighbour_level(Face::YPlus), NeighbourLevel::None);
        assert_eq!(gap.next_y(), 4095);

        let end = NodeWord::gap_end(12, 11);
        assert!(end.is_end());
        assert_eq!(end.next_y(), 12);
        assert_eq!(end.prev_y(), 11);
    }

    #[test]
    fn lateral_fields_are_independent() {
        let mut cell = NodeWord::cell(CellStatus::Boundary);

        assert!(cell.is_cell());
        assert_eq!(cell.status(), CellStatus::Boundary);
        for face in Face::LATERAL.iter() {
            assert_eq!(cell.lateral(*face), (NeighbourLevel::None, NO_NEIGHBOUR));
        }

        cell.set_lateral(Face::XPlus, NeighbourLevel::Same, MAX_NODE_INDEX);
        cell.set_lateral(Face::ZMinus, NeighbourLevel::Finer, 3);
        assert_eq!(cell.lateral(Face::XPlus), (NeighbourLevel::Same, MAX_NODE_INDEX as u16));
        assert_eq!(cell.lateral(Face::XMinus), (NeighbourLevel::None, NO_NEIGHBOUR));
        assert_eq!(cell.lateral(Face::ZPlus), (NeighbourLevel::None, NO_NEIGHBOUR));
        assert_eq!(cell.lateral(Face::ZMinus), (NeighbourLevel::Finer, 3));
        assert_eq!(cell.status(), CellStatus::Boundary);
        assert!(cell.is_cell());

        // Overwriting replaces both index and level.
        cell.set_lateral(Face::XPlus, NeighbourLevel::Coarser, 1);
        assert_eq!(cell.lateral(Face::XPlus), (NeighbourLevel::Coarser, 1));
        cell.clear_lateral(Face::ZMinus);
        assert_eq!(cell.lateral(Face::ZMinus), (NeighbourLevel::None, NO_NEIGHBOUR));
    }

    #[test]
    #[should_panic]
    fn lateral_index_overflow_is_fatal() {
        let mut cell = NodeWord::cell(CellStatus::Real);
        cell.set_lateral(Face::XMinus, NeighbourLevel::Same, MAX_NODE_INDEX + 1);
    }

    #[test]
    #[should_panic]
    fn same_level_link_requires_an_index() {
        let mut cell = NodeWord::cell(CellStatus::Real);
        cell.set_lateral(Face::XMinus, NeighbourLevel::Same, NO_NEIGHBOUR as usize);
    }

    #[test]
    fn parent_word_slots() {
        let mut word = ParentWord::default();
        assert_eq!(word.parent(), None);
        assert_eq!(word.child(3), None);

        word.set_parent(MAX_PARENT_INDEX);
        for slot in 0..4 {
            word.set_child(slot, 100 + slot);
        }
        assert_eq!(word.parent(), Some(MAX_PARENT_INDEX as u16));
        for slot in 0..4 {
            assert_eq!(word.child(slot), Some(100 + slot as u16));
        }

        word.set_child(1, MAX_NODE_INDEX);
        assert_eq!(word.child(0), Some(100));
        assert_eq!(word.child(1), Some(MAX_NODE_INDEX as u16));
        assert_eq!(word.child(2), Some(102));
        assert_eq!(word.parent(), Some(MAX_PARENT_INDEX as u16));
    }

    #[test]
    fn status_codes() {
        for value in 1..=3 {
            assert_eq!(CellStatus::from_u8(value).map(CellStatus::to_u8), Some(value));
        }
        assert_eq!(CellStatus::from_u8(0), None);
        assert_eq!(CellStatus::from_u8(4), None);
    }
}
