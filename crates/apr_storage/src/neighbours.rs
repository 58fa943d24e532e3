//! Face neighbour resolution.
//!
//! Lateral faces (+x, -x, +z, -z) are resolved per level and face by merging each column against the adjacent column in lock-step
//! along y. Both walks are monotonic, so a column pair costs O(column length). When no neighbour of the same level exists, the
//! coarser candidate on level `L - 1` and then the finer candidates on level `L + 1` are tried, in that order. The found link is
//! stored in the cell's lateral field for that face.
//!
//! The +y and -y faces need no index: a same-level neighbour along y is always the adjacent word. Only the relative level of a
//! cross-level neighbour is stored, in the gap marker between the cell and the empty y beside it.
//!
//! Every pass is split into a read-only phase that collects the links of each column and an apply phase in which each column only
//! writes its own words.

use crate::{
    column::{y_at, ColumnCells, ColumnCursor},
    parallel::{map_range, zip_apply},
    AccessConfig, GapIndex, NeighbourLevel, PcKey,
};

use apr_core::prelude::*;
use itertools::iproduct;

/// The neighbour of a cell across one face.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FaceNeighbour {
    /// The face is on the boundary of the image, or nothing is active beside it.
    None,
    Same(PcKey),
    /// A larger cell on level `L - 1`.
    Coarser(PcKey),
    /// The up-to-4 cells on level `L + 1` that touch the face. They are ordered by the two in-face axes, in the order `y`, `x`,
    /// `z`, with the first varying fastest.
    Finer([Option<PcKey>; 4]),
}

impl FaceNeighbour {
    #[inline]
    pub fn level(&self) -> NeighbourLevel {
        match self {
            FaceNeighbour::None => NeighbourLevel::None,
            FaceNeighbour::Same(_) => NeighbourLevel::Same,
            FaceNeighbour::Coarser(_) => NeighbourLevel::Coarser,
            FaceNeighbour::Finer(_) => NeighbourLevel::Finer,
        }
    }

    /// Every neighbouring key, in order.
    pub fn keys(&self) -> impl Iterator<Item = PcKey> {
        let keys = match *self {
            FaceNeighbour::None => [None; 4],
            FaceNeighbour::Same(k) | FaceNeighbour::Coarser(k) => [Some(k), None, None, None],
            FaceNeighbour::Finer(ks) => ks,
        };

        IntoIterator::into_iter(keys).flatten()
    }
}

// (j, level, neighbour index)
type LateralLink = (usize, NeighbourLevel, usize);
// (gap j, face, level)
type YLink = (usize, Face, NeighbourLevel);

/// Writes every neighbour link of `index` in place.
pub fn resolve_neighbours(index: &mut GapIndex, config: &AccessConfig) {
    let shapes = index.shapes().clone();
    for (level, shape) in shapes.iter() {
        let parallel = config.is_parallel(shape);

        for &face in Face::LATERAL.iter() {
            let _span = tracing::debug_span!("resolve_lateral", level, ?face).entered();

            let links = map_range(shape.num_columns(), parallel, |offset| {
                let (z, x) = shape.column_coords(offset);
                lateral_links(index, config, level, z, x, face)
            });
            zip_apply(index.level_columns_mut(level), links, parallel, |words, links| {
                for (j, neighbour_level, neighbour_j) in links {
                    words[j].set_lateral(face, neighbour_level, neighbour_j);
                }
            });
        }

        if config.resolve_cross_level {
            let _span = tracing::debug_span!("resolve_y", level).entered();

            let links = map_range(shape.num_columns(), parallel, |offset| {
                let (z, x) = shape.column_coords(offset);
                y_links(index, level, z, x)
            });
            zip_apply(index.level_columns_mut(level), links, parallel, |words, links| {
                for (j, face, neighbour_level) in links {
                    words[j].set_y_neighbour_level(face, neighbour_level);
                }
            });
        }
    }
}

fn lateral_links(
    index: &GapIndex,
    config: &AccessConfig,
    level: u8,
    z: usize,
    x: usize,
    face: Face,
) -> Vec<LateralLink> {
    let shapes = index.shapes();
    let shape = shapes.shape(level);
    let (dx, dz) = face.column_step();

    // Outside the image there is nothing to link, on any level.
    let (zn, xn) = match shape.step_column(z, x, dz, dx) {
        Some(c) => c,
        None => return Vec::new(),
    };

    let mut same = ColumnCursor::new(index.column(level, zn, xn));

    // A coarser neighbour must be a different cell than this cell's own parent.
    let mut coarser = if config.resolve_cross_level && level > shapes.level_min() && (zn / 2, xn / 2) != (z / 2, x / 2) {
        Some(ColumnCursor::new(index.column(level - 1, zn / 2, xn / 2)))
    } else {
        None
    };

    // The near child column first, so its index is the one recorded when both touch the face.
    let mut finer = [None, None];
    if config.resolve_cross_level && level < shapes.level_max() {
        let finer_shape = shapes.shape(level + 1);
        for (cursor, (zf, xf)) in finer.iter_mut().zip(IntoIterator::into_iter(touching_child_columns(zn, xn, face))) {
            if zf < finer_shape.z_num && xf < finer_shape.x_num {
                *cursor = Some(ColumnCursor::new(index.column(level + 1, zf, xf)));
            }
        }
    }

    let mut links = Vec::new();
    for (j, y) in ColumnCells::new(index.column(level, z, x)) {
        let link = if let Some(jn) = same.seek(y, |yn| yn) {
            Some((NeighbourLevel::Same, jn))
        } else if let Some(jn) = coarser.as_mut().and_then(|c| c.seek(y / 2, |yn| yn)) {
            Some((NeighbourLevel::Coarser, jn))
        } else if let Some(jn) = finer.iter_mut().flatten().find_map(|c| c.seek(y, |yn| yn / 2)) {
            Some((NeighbourLevel::Finer, jn))
        } else {
            None
        };

        if let Some((neighbour_level, jn)) = link {
            links.push((j, neighbour_level, jn));
        }
    }

    links
}

/// The `(z, x)` of the two level `L + 1` columns that touch the face of the level `L` column `(zn, xn)` facing back across
/// `face`. The near column, with the lower coordinate along the other lateral axis, comes first.
#[inline]
fn touching_child_columns(zn: usize, xn: usize, face: Face) -> [(usize, usize); 2] {
    let (zf, xf) = match face {
        Face::XPlus => (2 * zn, 2 * xn),
        Face::XMinus => (2 * zn, 2 * xn + 1),
        Face::ZPlus => (2 * zn, 2 * xn),
        Face::ZMinus => (2 * zn + 1, 2 * xn),
        _ => panic!("{:?} is not a lateral face", face),
    };
    let (zs, xs) = if face.axis() == Axis3::X { (1, 0) } else { (0, 1) };

    [(zf, xf), (zf + zs, xf + xs)]
}

fn y_links(index: &GapIndex, level: u8, z: usize, x: usize) -> Vec<YLink> {
    let shapes = index.shapes();
    let y_num = shapes.shape(level).y_num;
    let words = index.column(level, z, x);

    let parent_column = if level > shapes.level_min() {
        Some(index.column(level - 1, z / 2, x / 2))
    } else {
        None
    };
    // All four child columns touch the y faces.
    let mut child_columns = Vec::with_capacity(4);
    if level < shapes.level_max() {
        let child_shape = shapes.shape(level + 1);
        for (zc, xc) in iproduct!(2 * z..2 * z + 2, 2 * x..2 * x + 2) {
            if zc < child_shape.z_num && xc < child_shape.x_num {
                child_columns.push(index.column(level + 1, zc, xc));
            }
        }
    }

    // One cursor per face and column, since the targets of each are monotonic.
    let mut coarser_up = parent_column.map(ColumnCursor::new);
    let mut coarser_down = parent_column.map(ColumnCursor::new);
    let mut finer_up: Vec<_> = child_columns.iter().map(|&c| ColumnCursor::new(c)).collect();
    let mut finer_down: Vec<_> = child_columns.iter().map(|&c| ColumnCursor::new(c)).collect();

    let mut links = Vec::new();
    for (j, gap) in words.iter().enumerate().filter(|(_, w)| w.is_gap()) {
        // The cell before this gap, looking up.
        if j > 0 {
            let y = gap.prev_y();
            let yn = y + 1;
            if yn < y_num {
                let coarser = yn / 2 != y / 2
                    && coarser_up
                        .as_mut()
                        .and_then(|c| c.seek(yn / 2, |yp| yp))
                        .is_some();
                let neighbour_level = if coarser {
                    NeighbourLevel::Coarser
                } else if finer_up.iter_mut().any(|c| c.seek(2 * yn, |yc| yc).is_some()) {
                    NeighbourLevel::Finer
                } else {
                    NeighbourLevel::None
                };
                links.push((j, Face::YPlus, neighbour_level));
            }
        }

        // The cell after this gap, looking down.
        if !gap.is_end() && gap.next_y() > 0 {
            let y = gap.next_y();
            let yn = y - 1;
            let coarser = yn / 2 != y / 2
                && coarser_down
                    .as_mut()
                    .and_then(|c| c.seek(yn / 2, |yp| yp))
                    .is_some();
            let neighbour_level = if coarser {
                NeighbourLevel::Coarser
            } else if finer_down.iter_mut().any(|c| c.seek(2 * yn + 1, |yc| yc).is_some()) {
                NeighbourLevel::Finer
            } else {
                NeighbourLevel::None
            };
            links.push((j, Face::YMinus, neighbour_level));
        }
    }

    links
}

/// The neighbour of the cell at `key` across `face`, decoded from the links written by `resolve_neighbours`.
pub fn face_neighbour(index: &GapIndex, key: PcKey, face: Face) -> FaceNeighbour {
    let words = index.column(key.level(), key.z(), key.x());
    let j = key.j();
    assert!(words[j].is_cell(), "{:?} is not a particle cell", key);

    if face.is_lateral() {
        lateral_neighbour(index, key, face)
    } else {
        let y = y_at(words, j);
        let (adjacent_j, yn) = match face {
            Face::YPlus => (j + 1, y as i64 + 1),
            _ => (j - 1, y as i64 - 1),
        };
        let adjacent = words[adjacent_j];
        if adjacent.is_cell() {
            return FaceNeighbour::Same(key.with_j(adjacent_j));
        }

        let (level, z, x) = (key.level(), key.z(), key.x());
        match adjacent.y_neighbour_level(face) {
            NeighbourLevel::Coarser => index
                .find_cell(level - 1, z / 2, x / 2, yn as usize / 2)
                .map_or(FaceNeighbour::None, FaceNeighbour::Coarser),
            NeighbourLevel::Finer => {
                let yc = if face == Face::YPlus { 2 * yn as usize } else { 2 * yn as usize + 1 };
                let mut cells = [None; 4];
                for (slot, cell) in cells.iter_mut().enumerate() {
                    let (dx, dz) = (slot & 1, slot >> 1);
                    *cell = index.find_cell(level + 1, 2 * z + dz, 2 * x + dx, yc);
                }
                FaceNeighbour::Finer(cells)
            }
            _ => FaceNeighbour::None,
        }
    }
}

fn lateral_neighbour(index: &GapIndex, key: PcKey, face: Face) -> FaceNeighbour {
    let (level, z, x) = (key.level(), key.z(), key.x());
    let (neighbour_level, jn) = index.get(key).lateral(face);
    let jn = jn as usize;
    if neighbour_level == NeighbourLevel::None {
        return FaceNeighbour::None;
    }

    let (dx, dz) = face.column_step();
    let (zn, xn) = (
        (z as i64 + dz as i64) as usize,
        (x as i64 + dx as i64) as usize,
    );

    match neighbour_level {
        NeighbourLevel::Same => FaceNeighbour::Same(PcKey::new(level, zn, xn, jn)),
        NeighbourLevel::Coarser => FaceNeighbour::Coarser(PcKey::new(level - 1, zn / 2, xn / 2, jn)),
        NeighbourLevel::Finer => {
            let [(zf, xf), (zs, xs)] = touching_child_columns(zn, xn, face);
            let this_y = index.y_of(key);

            // The stored index points into the near column whenever that column touches the face.
            let near = index.column(level + 1, zf, xf);
            let near_touches = near.get(jn).map_or(false, |w| w.is_cell()) && y_at(near, jn) / 2 == this_y;

            let mut cells = [None; 4];
            if near_touches {
                if y_at(near, jn) == 2 * this_y {
                    cells[0] = Some(PcKey::new(level + 1, zf, xf, jn));
                    if near.get(jn + 1).map_or(false, |w| w.is_cell()) {
                        cells[1] = Some(PcKey::new(level + 1, zf, xf, jn + 1));
                    }
                } else {
                    cells[1] = Some(PcKey::new(level + 1, zf, xf, jn));
                }
            }
            for dy in 0..2 {
                cells[2 + dy] = index.find_cell(level + 1, zs, xs, 2 * this_y + dy);
            }

            FaceNeighbour::Finer(cells)
        }
        NeighbourLevel::None => FaceNeighbour::None,
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
    use crate::{CellStatus, ParticleCellAccess, ParticleCellTree};

    use pretty_assertions::assert_eq;

    // A level 1 cell at the origin, next to a column of level 2 cells along +x and below a pair of level 2 cells along +y.
    fn mixed_levels(config: AccessConfig) -> ParticleCellAccess {
        let shapes = LevelShapes::from_finest(1, 2, LevelShape::new(4, 4, 1)).unwrap();
        let mut tree = ParticleCellTree::new(shapes);
        tree.insert(1, 0, 0, 0, CellStatus::Real);
        for &(x, y) in [(2, 0), (2, 1), (0, 2), (0, 3)].iter() {
            tree.insert(2, 0, x, y, CellStatus::Real);
        }

        ParticleCellAccess::build_with_config(&tree, config)
    }

    #[test]
    fn same_level_links_are_symmetric() {
        let shapes = LevelShapes::from_finest(0, 0, LevelShape::new(8, 3, 2)).unwrap();
        let mut tree = ParticleCellTree::new(shapes);
        for &(z, x, y) in [(0, 0, 5), (0, 1, 5), (0, 1, 6), (1, 1, 6), (1, 2, 0)].iter() {
            tree.insert(0, z, x, y, CellStatus::Real);
        }
        let access = ParticleCellAccess::build(&tree);
        let key = |z, x, y| access.find_cell(0, z, x, y).unwrap();

        assert_eq!(access.face_neighbour(key(0, 0, 5), Face::XPlus), FaceNeighbour::Same(key(0, 1, 5)));
        assert_eq!(access.face_neighbour(key(0, 1, 5), Face::XMinus), FaceNeighbour::Same(key(0, 0, 5)));
        assert_eq!(access.face_neighbour(key(0, 1, 6), Face::ZPlus), FaceNeighbour::Same(key(1, 1, 6)));
        assert_eq!(access.face_neighbour(key(1, 1, 6), Face::ZMinus), FaceNeighbour::Same(key(0, 1, 6)));
        assert_eq!(access.face_neighbour(key(0, 1, 6), Face::XMinus), FaceNeighbour::None);
        assert_eq!(access.face_neighbour(key(1, 2, 0), Face::XMinus), FaceNeighbour::None);
        assert_eq!(access.face_neighbour(key(1, 2, 0), Face::XPlus), FaceNeighbour::None);
        assert_eq!(access.face_neighbour(key(0, 1, 5), Face::YPlus), FaceNeighbour::Same(key(0, 1, 6)));
    }

    #[test]
    fn lateral_cross_level_links() {
        let access = mixed_levels(AccessConfig::default());
        let coarse = access.find_cell(1, 0, 0, 0).unwrap();
        let fine_0 = access.find_cell(2, 0, 2, 0).unwrap();
        let fine_1 = access.find_cell(2, 0, 2, 1).unwrap();

        assert_eq!(
            access.face_neighbour(coarse, Face::XPlus),
            FaceNeighbour::Finer([Some(fine_0), Some(fine_1), None, None])
        );
        assert_eq!(access.face_neighbour(fine_0, Face::XMinus), FaceNeighbour::Coarser(coarse));
        assert_eq!(access.face_neighbour(fine_1, Face::XMinus), FaceNeighbour::Coarser(coarse));
        assert_eq!(access.face_neighbour(coarse, Face::XMinus), FaceNeighbour::None);
    }

    #[test]
    fn y_cross_level_links() {
        let access = mixed_levels(AccessConfig::default());
        let coarse = access.find_cell(1, 0, 0, 0).unwrap();
        let fine_2 = access.find_cell(2, 0, 0, 2).unwrap();
        let fine_3 = access.find_cell(2, 0, 0, 3).unwrap();

        assert_eq!(access.face_neighbour(fine_2, Face::YMinus), FaceNeighbour::Coarser(coarse));
        assert_eq!(access.face_neighbour(coarse, Face::YPlus), FaceNeighbour::Finer([Some(fine_2), None, None, None]));
        assert_eq!(access.face_neighbour(fine_2, Face::YPlus), FaceNeighbour::Same(fine_3));
        assert_eq!(access.face_neighbour(fine_3, Face::YPlus), FaceNeighbour::None);
    }

    // A level 1 cell at the origin of a 4x4x4 pyramid, with `fine` cells on level 2.
    fn coarse_beside(fine: &[(usize, usize, usize)]) -> (ParticleCellAccess, PcKey) {
        let shapes = LevelShapes::from_finest(1, 2, LevelShape::new(4, 4, 4)).unwrap();
        let mut tree = ParticleCellTree::new(shapes);
        tree.insert(1, 0, 0, 0, CellStatus::Real);
        for &(z, x, y) in fine.iter() {
            tree.insert(2, z, x, y, CellStatus::Real);
        }
        let access = ParticleCellAccess::build(&tree);
        let coarse = access.find_cell(1, 0, 0, 0).unwrap();

        (access, coarse)
    }

    #[test]
    fn finer_cells_in_the_far_child_column() {
        let (access, coarse) = coarse_beside(&[(1, 2, 0), (1, 2, 1)]);
        let fine = |y| access.find_cell(2, 1, 2, y);
        assert_eq!(
            access.face_neighbour(coarse, Face::XPlus),
            FaceNeighbour::Finer([None, None, fine(0), fine(1)])
        );
        assert_eq!(access.face_neighbour(fine(1).unwrap(), Face::XMinus), FaceNeighbour::Coarser(coarse));

        let (access, coarse) = coarse_beside(&[(2, 1, 1)]);
        let fine = access.find_cell(2, 2, 1, 1);
        assert_eq!(
            access.face_neighbour(coarse, Face::ZPlus),
            FaceNeighbour::Finer([None, None, None, fine])
        );
        assert_eq!(access.face_neighbour(fine.unwrap(), Face::ZMinus), FaceNeighbour::Coarser(coarse));
    }

    #[test]
    fn finer_cells_fill_every_slot() {
        let (access, coarse) = coarse_beside(&[(2, 0, 0), (2, 0, 1), (2, 1, 0), (2, 1, 1)]);
        let fine = |x, y| access.find_cell(2, 2, x, y);

        assert_eq!(
            access.face_neighbour(coarse, Face::ZPlus),
            FaceNeighbour::Finer([fine(0, 0), fine(0, 1), fine(1, 0), fine(1, 1)])
        );
        assert_eq!(access.face_neighbour(coarse, Face::XPlus), FaceNeighbour::None);
    }

    #[test]
    fn y_finer_cells_in_any_child_column() {
        let (access, coarse) = coarse_beside(&[(0, 1, 2)]);
        assert_eq!(
            access.face_neighbour(coarse, Face::YPlus),
            FaceNeighbour::Finer([None, access.find_cell(2, 0, 1, 2), None, None])
        );

        let (access, coarse) = coarse_beside(&[(1, 1, 2), (1, 0, 3)]);
        assert_eq!(
            access.face_neighbour(coarse, Face::YPlus),
            FaceNeighbour::Finer([None, None, None, access.find_cell(2, 1, 1, 2)])
        );
    }

    #[test]
    fn cross_level_resolution_can_be_disabled() {
        let access = mixed_levels(AccessConfig {
            resolve_cross_level: false,
            ..Default::default()
        });
        let coarse = access.find_cell(1, 0, 0, 0).unwrap();
        let fine_2 = access.find_cell(2, 0, 0, 2).unwrap();

        assert_eq!(access.face_neighbour(coarse, Face::XPlus), FaceNeighbour::None);
        assert_eq!(access.face_neighbour(coarse, Face::YPlus), FaceNeighbour::None);
        assert_eq!(access.face_neighbour(fine_2, Face::YMinus), FaceNeighbour::None);
    }

    #[test]
    fn neighbour_keys_flatten_finer_cells() {
        let a = PcKey::new(1, 0, 0, 1);
        let b = PcKey::new(1, 0, 0, 2);

        assert_eq!(FaceNeighbour::Finer([None, Some(a), None, Some(b)]).keys().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(FaceNeighbour::Same(a).keys().count(), 1);
        assert_eq!(FaceNeighbour::None.keys().count(), 0);
        assert_eq!(FaceNeighbour::Coarser(a).level(), NeighbourLevel::Coarser);
    }
}
