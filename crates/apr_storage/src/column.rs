//! Decoding a single column of node words.
//!
//! The y-coordinate of a cell is never stored. It is implied by walking the column from its leading gap marker: a gap sets the
//! running y to its `next_y`, and each cell consumes one y. Everything here is a linear walk of that kind, or a lock-step merge of
//! two such walks.

use crate::{CellStatus, NodeWord};

use core::iter::Peekable;

/// Iterates over the cells of a column as `(j, y)` pairs, in increasing `y`.
#[derive(Clone)]
pub struct ColumnCells<'a> {
    words: &'a [NodeWord],
    j: usize,
    y: usize,
}

impl<'a> ColumnCells<'a> {
    #[inline]
    pub fn new(words: &'a [NodeWord]) -> Self {
        Self { words, j: 0, y: 0 }
    }
}

impl<'a> Iterator for ColumnCells<'a> {
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(word) = self.words.get(self.j) {
            let j = self.j;
            self.j += 1;
            if word.is_gap() {
                if word.is_end() {
                    self.j = self.words.len();
                    return None;
                }
                self.y = word.next_y();
            } else {
                let y = self.y;
                self.y += 1;
                return Some((j, y));
            }
        }

        None
    }
}

/// A forward-only cursor over the cells of a column, used to merge it against another monotonic walk.
///
/// `seek` takes a `map` applied to each cell's y before comparison, which lets the same merge match equal y's (same level), halved
/// y's (a finer column against a coarser target) and so on. Seeking never consumes the matched cell, so successive targets may
/// match the same cell.
pub struct ColumnCursor<'a> {
    cells: Peekable<ColumnCells<'a>>,
}

impl<'a> ColumnCursor<'a> {
    #[inline]
    pub fn new(words: &'a [NodeWord]) -> Self {
        Self {
            cells: ColumnCells::new(words).peekable(),
        }
    }

    /// Finds the first remaining cell with `map(y) == target`, skipping cells with `map(y) < target`. Targets passed to successive
    /// calls must be non-decreasing.
    #[inline]
    pub fn seek(&mut self, target: usize, map: impl Fn(usize) -> usize) -> Option<usize> {
        while let Some(&(j, y)) = self.cells.peek() {
            let mapped = map(y);
            if mapped < target {
                self.cells.next();
            } else if mapped == target {
                return Some(j);
            } else {
                return None;
            }
        }

        None
    }
}

/// The word index of the cell at `y`, if occupied.
pub fn find_y(words: &[NodeWord], y: usize) -> Option<usize> {
    ColumnCells::new(words)
        .take_while(|&(_, cell_y)| cell_y <= y)
        .find(|&(_, cell_y)| cell_y == y)
        .map(|(j, _)| j)
}

/// The y-coordinate of the cell at word `j`, recovered from the nearest preceding gap marker.
///
/// # Panics
///
/// If word `j` is not a cell.
pub fn y_at(words: &[NodeWord], j: usize) -> usize {
    assert!(words[j].is_cell(), "word {} is not a particle cell", j);

    let gap_j = (0..j).rev().find(|&i| words[i].is_gap()).unwrap_or(0);

    words[gap_j].next_y() + (j - gap_j - 1)
}

/// A maximal run of consecutive occupied y's in one column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CellRun {
    pub y_begin: usize,
    /// Exclusive.
    pub y_end: usize,
    /// Global particle index of the cell at `y_begin`.
    pub global_index_begin: u64,
}

impl CellRun {
    #[inline]
    pub fn len(&self) -> usize {
        self.y_end - self.y_begin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y_end == self.y_begin
    }
}

/// Iterates over the runs of a column, numbering particles from `global_index_begin`.
pub struct ColumnRuns<'a> {
    words: &'a [NodeWord],
    // Position of the next gap marker to inspect.
    gap_j: usize,
    next_global_index: u64,
}

impl<'a> ColumnRuns<'a> {
    pub fn new(words: &'a [NodeWord], global_index_begin: u64) -> Self {
        Self {
            words,
            gap_j: 0,
            next_global_index: global_index_begin,
        }
    }
}

impl<'a> Iterator for ColumnRuns<'a> {
    type Item = CellRun;

    fn next(&mut self) -> Option<Self::Item> {
        let gap = self.words.get(self.gap_j)?;
        if gap.is_end() {
            return None;
        }

        let first_cell = self.gap_j + 1;
        let len = self.words[first_cell..]
            .iter()
            .take_while(|word| word.is_cell())
            .count();
        let run = CellRun {
            y_begin: gap.next_y(),
            y_end: gap.next_y() + len,
            global_index_begin: self.next_global_index,
        };
        self.gap_j = first_cell + len;
        self.next_global_index += len as u64;

        Some(run)
    }
}

/// Encodes one column of occupancy into `words`, which must be exactly `encoded_len(occupancy)` long.
pub fn encode_column(occupancy: &[u8], words: &mut [NodeWord]) {
    let mut j = 0;
    let mut prev_y = 0;
    let mut in_run = false;
    for (y, &value) in occupancy.iter().enumerate() {
        match CellStatus::from_u8(value) {
            Some(status) => {
                if !in_run {
                    words[j] = NodeWord::gap(y, prev_y);
                    j += 1;
                    in_run = true;
                }
                words[j] = NodeWord::cell(status);
                j += 1;
                prev_y = y;
            }
            None => in_run = false,
        }
    }
    words[j] = NodeWord::gap_end(occupancy.len(), prev_y);
    j += 1;

    assert_eq!(j, words.len(), "column size pass and write pass disagree");
}

/// Number of words needed to encode a column: one per cell, one per run, and the trailing sentinel.
pub fn encoded_len(occupancy: &[u8]) -> usize {
    let mut len = 1;
    let mut in_run = false;
    for &value in occupancy.iter() {
        if value != 0 {
            len += if in_run { 1 } else { 2 };
            in_run = true;
        } else {
            in_run = false;
        }
    }

    len
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

    use pretty_assertions::assert_eq;

    fn encode(occupancy: &[u8]) -> Vec<NodeWord> {
        let mut words = vec![NodeWord::default(); encoded_len(occupancy)];
        encode_column(occupancy, &mut words);

        words
    }

    #[test]
    fn encodes_runs_with_gap_markers() {
        let words = encode(&[1, 0, 2, 1]);

        assert_eq!(
            words,
            vec![
                NodeWord::gap(0, 0),
                NodeWord::cell(CellStatus::Real),
                NodeWord::gap(2, 0),
                NodeWord::cell(CellStatus::Boundary),
                NodeWord::cell(CellStatus::Real),
                NodeWord::gap_end(4, 3),
            ]
        );
        assert_eq!(ColumnCells::new(&words).collect::<Vec<_>>(), vec![(1, 0), (3, 2), (4, 3)]);
    }

    #[test]
    fn empty_column_is_one_sentinel() {
        let words = encode(&[0, 0, 0]);

        assert_eq!(words, vec![NodeWord::gap_end(3, 0)]);
        assert_eq!(ColumnCells::new(&words).count(), 0);
        assert_eq!(ColumnRuns::new(&words, 0).count(), 0);
    }

    #[test]
    fn find_and_recover_y() {
        let words = encode(&[0, 1, 1, 0, 0, 1, 0, 1]);

        for (j, y) in ColumnCells::new(&words) {
            assert_eq!(find_y(&words, y), Some(j));
            assert_eq!(y_at(&words, j), y);
        }
        assert_eq!(find_y(&words, 0), None);
        assert_eq!(find_y(&words, 4), None);
        assert_eq!(find_y(&words, 8), None);
    }

    #[test]
    fn runs_carry_global_indices() {
        let words = encode(&[1, 1, 0, 1, 0, 0, 1, 1]);

        let runs: Vec<_> = ColumnRuns::new(&words, 10).collect();
        assert_eq!(
            runs,
            vec![
                CellRun {
                    y_begin: 0,
                    y_end: 2,
                    global_index_begin: 10
                },
                CellRun {
                    y_begin: 3,
                    y_end: 4,
                    global_index_begin: 12
                },
                CellRun {
                    y_begin: 6,
                    y_end: 8,
                    global_index_begin: 13
                },
            ]
        );
    }

    #[test]
    fn cursor_merges_monotonic_targets() {
        let words = encode(&[0, 1, 0, 1, 1, 0, 1, 0]);
        let mut cursor = ColumnCursor::new(&words);

        // Same-level merge.
        assert_eq!(cursor.seek(0, |y| y), None);
        assert_eq!(cursor.seek(1, |y| y), Some(1));
        assert_eq!(cursor.seek(1, |y| y), Some(1));
        assert_eq!(cursor.seek(2, |y| y), None);
        assert_eq!(cursor.seek(4, |y| y), Some(4));

        // Halving merge finds the lowest cell of each pair.
        let mut cursor = ColumnCursor::new(&words);
        assert_eq!(cursor.seek(0, |y| y / 2), Some(1));
        assert_eq!(cursor.seek(1, |y| y / 2), Some(3));
        assert_eq!(cursor.seek(2, |y| y / 2), Some(4));
        assert_eq!(cursor.seek(3, |y| y / 2), Some(6));
        assert_eq!(cursor.seek(4, |y| y / 2), None);
    }
}
