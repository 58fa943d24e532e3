//! The linear particle iterator.
//!
//! Particles are visited level by level, coarsest first, then by `z`, then `x`, then `y` within the column. The position of a
//! particle in this order is its global index, and every per-particle array must use the same order.

use crate::{GapIndex, PcKey};

use core::ops::RangeInclusive;

/// A visited particle cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Particle {
    pub global_index: u64,
    pub key: PcKey,
    pub level: u8,
    pub z: usize,
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IteratorState {
    BeforeStart,
    /// On a particle cell, which `current` returns.
    Positioned,
    Exhausted,
}

/// A forward cursor over the particle cells of a range of levels.
///
/// The explicit protocol is `begin` followed by `advance` until it returns `false`, reading `current` at each step. As an
/// `Iterator`, each `next` is an `advance` (which begins when needed) followed by `current`.
#[derive(Clone)]
pub struct LinearParticleIterator<'a> {
    index: &'a GapIndex,
    levels: RangeInclusive<u8>,
    first_global_index: u64,
    end_global_index: u64,

    state: IteratorState,
    level: u8,
    offset: usize,
    j: usize,
    y: usize,
    global_index: u64,
}

impl<'a> LinearParticleIterator<'a> {
    /// Iterates over `levels`, whose first particle has `first_global_index` and whose particles end at `end_global_index`.
    pub(crate) fn new(
        index: &'a GapIndex,
        levels: RangeInclusive<u8>,
        first_global_index: u64,
        end_global_index: u64,
    ) -> Self {
        Self {
            index,
            level: *levels.start(),
            levels,
            first_global_index,
            end_global_index,
            state: IteratorState::BeforeStart,
            offset: 0,
            j: 0,
            y: 0,
            global_index: first_global_index,
        }
    }

    #[inline]
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Moves to the first particle. Returns `false` if there are none.
    pub fn begin(&mut self) -> bool {
        self.level = *self.levels.start();
        self.offset = 0;
        self.j = 0;
        self.y = 0;
        self.global_index = self.first_global_index;

        self.scan()
    }

    /// Moves to the next particle. Returns `false` once exhausted.
    pub fn advance(&mut self) -> bool {
        match self.state {
            IteratorState::BeforeStart => self.begin(),
            IteratorState::Positioned => {
                self.j += 1;
                self.y += 1;
                self.global_index += 1;
                self.scan()
            }
            IteratorState::Exhausted => false,
        }
    }

    /// The particle the iterator is positioned on.
    pub fn current(&self) -> Option<Particle> {
        if self.state != IteratorState::Positioned {
            return None;
        }

        let (z, x) = self.index.shapes().shape(self.level).column_coords(self.offset);

        Some(Particle {
            global_index: self.global_index,
            key: PcKey::new(self.level, z, x, self.j),
            level: self.level,
            z,
            x,
            y: self.y,
        })
    }

    // Finds the first cell at or after the current word, moving on to later columns and levels as needed.
    fn scan(&mut self) -> bool {
        while self.level <= *self.levels.end() {
            let columns = self.index.level_columns(self.level);
            while let Some(words) = columns.get(self.offset) {
                while let Some(word) = words.get(self.j) {
                    if word.is_cell() {
                        self.state = IteratorState::Positioned;
                        return true;
                    }
                    if word.is_end() {
                        break;
                    }
                    self.y = word.next_y();
                    self.j += 1;
                }
                self.offset += 1;
                self.j = 0;
            }
            self.level += 1;
            self.offset = 0;
        }

        debug_assert_eq!(self.global_index, self.end_global_index);
        self.state = IteratorState::Exhausted;

        false
    }
}

impl<'a> Iterator for LinearParticleIterator<'a> {
    type Item = Particle;

    #[inline]
    fn next(&mut self) -> Option<Particle> {
        if self.advance() {
            self.current()
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.state {
            IteratorState::BeforeStart => self.end_global_index - self.first_global_index,
            IteratorState::Positioned => self.end_global_index - self.global_index - 1,
            IteratorState::Exhausted => 0,
        } as usize;

        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for LinearParticleIterator<'a> {}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
