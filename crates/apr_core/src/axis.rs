#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Either the Y, X, or Z axis.
///
/// Y is listed first because it is the axis along which a column is stored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Axis3 {
    Y = 0,
    X = 1,
    Z = 2,
}

impl Axis3 {
    pub const ALL: [Axis3; 3] = [Axis3::Y, Axis3::X, Axis3::Z];

    /// The index for a `[y, x, z]` triple's component on this axis.
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The `[dy, dx, dz]` unit vector.
    pub fn get_unit_vector(&self) -> [i32; 3] {
        match self {
            Axis3::Y => [1, 0, 0],
            Axis3::X => [0, 1, 0],
            Axis3::Z => [0, 0, 1],
        }
    }
}

/// One of the six axis-aligned face directions of a particle cell.
///
/// The discriminants follow the conventional ordering `[+y, -y, +x, -x, +z, -z]`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Face {
    YPlus = 0,
    YMinus = 1,
    XPlus = 2,
    XMinus = 3,
    ZPlus = 4,
    ZMinus = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::YPlus,
        Face::YMinus,
        Face::XPlus,
        Face::XMinus,
        Face::ZPlus,
        Face::ZMinus,
    ];

    /// The faces whose neighbours live in a different column.
    pub const LATERAL: [Face; 4] = [Face::XPlus, Face::XMinus, Face::ZPlus, Face::ZMinus];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[inline]
    pub fn axis(&self) -> Axis3 {
        match self {
            Face::YPlus | Face::YMinus => Axis3::Y,
            Face::XPlus | Face::XMinus => Axis3::X,
            Face::ZPlus | Face::ZMinus => Axis3::Z,
        }
    }

    /// +1 or -1.
    #[inline]
    pub fn sign(&self) -> i32 {
        match self {
            Face::YPlus | Face::XPlus | Face::ZPlus => 1,
            Face::YMinus | Face::XMinus | Face::ZMinus => -1,
        }
    }

    #[inline]
    pub fn opposite(&self) -> Face {
        match self {
            Face::YPlus => Face::YMinus,
            Face::YMinus => Face::YPlus,
            Face::XPlus => Face::XMinus,
            Face::XMinus => Face::XPlus,
            Face::ZPlus => Face::ZMinus,
            Face::ZMinus => Face::ZPlus,
        }
    }

    /// The `[dy, dx, dz]` step from a cell to its neighbour across this face.
    #[inline]
    pub fn get_vector(&self) -> [i32; 3] {
        let [dy, dx, dz] = self.axis().get_unit_vector();
        let s = self.sign();

        [dy * s, dx * s, dz * s]
    }

    /// Column step `(dx, dz)`. Zero for the y faces.
    #[inline]
    pub fn column_step(&self) -> (i32, i32) {
        let [_, dx, dz] = self.get_vector();

        (dx, dz)
    }

    #[inline]
    pub fn is_lateral(&self) -> bool {
        self.axis() != Axis3::Y
    }

    /// Position of this face among `Face::LATERAL`, if it is a lateral face.
    #[inline]
    pub fn lateral_index(&self) -> Option<usize> {
        match self {
            Face::YPlus | Face::YMinus => None,
            Face::XPlus => Some(0),
            Face::XMinus => Some(1),
            Face::ZPlus => Some(2),
            Face::ZMinus => Some(3),
        }
    }

    pub fn from_vector(v: [i32; 3]) -> Option<Self> {
        match v {
            [1, 0, 0] => Some(Face::YPlus),
            [-1, 0, 0] => Some(Face::YMinus),
            [0, 1, 0] => Some(Face::XPlus),
            [0, -1, 0] => Some(Face::XMinus),
            [0, 0, 1] => Some(Face::ZPlus),
            [0, 0, -1] => Some(Face::ZMinus),
            _ => None,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
