//! Bit-packed addresses of nodes in the gap-encoded index.

use std::fmt;

const J_BITS: u32 = 14;
const X_BITS: u32 = 13;
const Z_BITS: u32 = 13;
const LEVEL_BITS: u32 = 5;

const J_SHIFT: u32 = 0;
const X_SHIFT: u32 = J_SHIFT + J_BITS;
const Z_SHIFT: u32 = X_SHIFT + X_BITS;
const LEVEL_SHIFT: u32 = Z_SHIFT + Z_BITS;

/// The address of one node word: `(level, z, x, j)`, where `j` is the position of the word inside the `(level, z, x)` column.
///
/// Keys are plain values. They do not borrow the index they point into, so a key can outlive any particular structure, and it is
/// up to the caller to only use it with the structure it came from.
///
/// Offsetting a key never carries across fields. After `offset_x` or `offset_z`, the `j` field still refers to the old column
/// and must be re-resolved.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PcKey(pub u64);

impl PcKey {
    pub const MAX_J: usize = (1 << J_BITS) - 1;
    pub const MAX_X: usize = (1 << X_BITS) - 1;
    pub const MAX_Z: usize = (1 << Z_BITS) - 1;
    pub const MAX_LEVEL: u8 = (1 << LEVEL_BITS) - 1;

    /// # Panics
    ///
    /// If any field exceeds its bit width.
    #[inline]
    pub fn new(level: u8, z: usize, x: usize, j: usize) -> Self {
        let mut key = Self(0);
        key.set_level(level);
        key.set_z(z);
        key.set_x(x);
        key.set_j(j);

        key
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.get(LEVEL_SHIFT, LEVEL_BITS) as u8
    }

    #[inline]
    pub fn z(&self) -> usize {
        self.get(Z_SHIFT, Z_BITS) as usize
    }

    #[inline]
    pub fn x(&self) -> usize {
        self.get(X_SHIFT, X_BITS) as usize
    }

    #[inline]
    pub fn j(&self) -> usize {
        self.get(J_SHIFT, J_BITS) as usize
    }

    #[inline]
    pub fn set_level(&mut self, level: u8) {
        self.set(LEVEL_SHIFT, LEVEL_BITS, level as u64, "level");
    }

    #[inline]
    pub fn set_z(&mut self, z: usize) {
        self.set(Z_SHIFT, Z_BITS, z as u64, "z");
    }

    #[inline]
    pub fn set_x(&mut self, x: usize) {
        self.set(X_SHIFT, X_BITS, x as u64, "x");
    }

    #[inline]
    pub fn set_j(&mut self, j: usize) {
        self.set(J_SHIFT, J_BITS, j as u64, "j");
    }

    #[inline]
    pub fn with_j(mut self, j: usize) -> Self {
        self.set_j(j);

        self
    }

    /// # Panics
    ///
    /// If the result is negative or does not fit.
    #[inline]
    pub fn offset_x(&mut self, delta: i32) {
        let x = offset(self.x(), delta, "x");
        self.set_x(x);
    }

    #[inline]
    pub fn offset_z(&mut self, delta: i32) {
        let z = offset(self.z(), delta, "z");
        self.set_z(z);
    }

    #[inline]
    pub fn offset_j(&mut self, delta: i32) {
        let j = offset(self.j(), delta, "j");
        self.set_j(j);
    }

    /// `(z, x)` of the column this key points into.
    #[inline]
    pub fn column(&self) -> (usize, usize) {
        (self.z(), self.x())
    }

    #[inline]
    fn get(&self, shift: u32, bits: u32) -> u64 {
        (self.0 >> shift) & ((1 << bits) - 1)
    }

    #[inline]
    fn set(&mut self, shift: u32, bits: u32, value: u64, field: &str) {
        let mask = (1 << bits) - 1;
        assert!(value <= mask, "key field {} = {} does not fit in {} bits", field, value, bits);

        self.0 = (self.0 & !(mask << shift)) | value << shift;
    }
}

#[inline]
fn offset(value: usize, delta: i32, field: &str) -> usize {
    let result = value as i64 + delta as i64;
    assert!(result >= 0, "key field {} offset {} + {} is negative", field, value, delta);

    result as usize
}

impl fmt::Debug for PcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PcKey {{ level: {}, z: {}, x: {}, j: {} }}",
            self.level(),
            self.z(),
            self.x(),
            self.j()
        )
    }
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
    fn fields_round_trip_at_limits() {
        let key = PcKey::new(PcKey::MAX_LEVEL, PcKey::MAX_Z, PcKey::MAX_X, PcKey::MAX_J);

        assert_eq!(key.level(), PcKey::MAX_LEVEL);
        assert_eq!(key.z(), PcKey::MAX_Z);
        assert_eq!(key.x(), PcKey::MAX_X);
        assert_eq!(key.j(), PcKey::MAX_J);

        let key = PcKey::new(0, 0, 0, 0);
        assert_eq!(key, PcKey::default());
    }

    #[test]
    fn setters_only_touch_their_field() {
        let mut key = PcKey::new(7, 100, 200, 300);

        key.set_x(5);
        assert_eq!((key.level(), key.z(), key.x(), key.j()), (7, 100, 5, 300));
        key.set_j(1);
        assert_eq!((key.level(), key.z(), key.x(), key.j()), (7, 100, 5, 1));
        key.set_level(2);
        assert_eq!((key.level(), key.z(), key.x(), key.j()), (2, 100, 5, 1));
    }

    #[test]
    fn offsets_do_not_carry() {
        let mut key = PcKey::new(3, 4, 5, 6);

        key.offset_x(-5);
        key.offset_z(2);
        key.offset_j(-1);
        assert_eq!((key.level(), key.z(), key.x(), key.j()), (3, 6, 0, 5));
        assert_eq!(key.column(), (6, 0));
    }

    #[test]
    #[should_panic]
    fn negative_offset_is_fatal() {
        let mut key = PcKey::new(3, 0, 0, 1);
        key.offset_z(-1);
    }

    #[test]
    #[should_panic]
    fn oversized_field_is_fatal() {
        PcKey::new(1, PcKey::MAX_Z + 1, 0, 0);
    }
}
