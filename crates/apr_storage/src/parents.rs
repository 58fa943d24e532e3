//! Parent and child links between adjacent levels.
//!
//! The links live in a `ParentInfo` overlay that parallels the gap index word for word. They are resolved in two phases, both
//! lock-step merges along y like the lateral neighbour merge, except that the level `L - 1` side is compared against halved y's.
//!
//! 1. For each level `L > level_min`, every cell finds its parent at `y / 2` in the column `(z / 2, x / 2)` of level `L - 1`.
//! 2. For each level `L < level_max`, every cell finds the first child at `2 * y` in each of its four child columns on `L + 1`.
//!
//! Splitting the phases by the side that is written means each task only writes the words of its own column.

use crate::{
    column::{ColumnCells, ColumnCursor},
    parallel::{map_range, zip_apply},
    AccessConfig, Ancestry, GapIndex, ParentInfo, PcKey,
};

use apr_core::prelude::*;

/// Resolves the parent and child links of every cell in `index`.
///
/// With `Ancestry::Closed`, every cell above `level_min` is expected to have a parent. A missing parent is then reported as an
/// error and fails a debug assertion, since it means the index does not match its tree.
pub fn resolve_parents(index: &GapIndex, ancestry: Ancestry, config: &AccessConfig) -> ParentInfo {
    let mut info = ParentInfo::zeroed_like(index);
    let shapes = index.shapes().clone();

    for level in (shapes.level_min() + 1)..=shapes.level_max() {
        let shape = shapes.shape(level);
        let parallel = config.is_parallel(shape);
        let _span = tracing::debug_span!("link_parents", level).entered();

        let links = map_range(shape.num_columns(), parallel, |offset| {
            let (z, x) = shape.column_coords(offset);
            parent_links(index, ancestry, level, z, x)
        });
        zip_apply(info.level_columns_mut(level), links, parallel, |words, links| {
            for (j, parent_j) in links {
                words[j].set_parent(parent_j);
            }
        });
    }

    for level in shapes.level_min()..shapes.level_max() {
        let shape = shapes.shape(level);
        let parallel = config.is_parallel(shape);
        let _span = tracing::debug_span!("link_children", level).entered();

        let links = map_range(shape.num_columns(), parallel, |offset| {
            let (z, x) = shape.column_coords(offset);
            child_links(index, level, z, x)
        });
        zip_apply(info.level_columns_mut(level), links, parallel, |words, links| {
            for (j, slot, child_j) in links {
                words[j].set_child(slot, child_j);
            }
        });
    }

    info
}

fn parent_links(index: &GapIndex, ancestry: Ancestry, level: u8, z: usize, x: usize) -> Vec<(usize, usize)> {
    let mut parents = ColumnCursor::new(index.column(level - 1, z / 2, x / 2));

    let mut links = Vec::new();
    for (j, y) in ColumnCells::new(index.column(level, z, x)) {
        match parents.seek(y / 2, |yp| yp) {
            Some(parent_j) => links.push((j, parent_j)),
            None => {
                if ancestry == Ancestry::Closed {
                    tracing::error!(level, z, x, j, y, "particle cell has no parent in an ancestor-closed tree");
                    debug_assert!(false, "missing parent for cell at level {} z {} x {} j {}", level, z, x, j);
                }
            }
        }
    }

    links
}

// (parent j, slot, child j)
fn child_links(index: &GapIndex, level: u8, z: usize, x: usize) -> Vec<(usize, usize, usize)> {
    let child_shape = index.shapes().shape(level + 1);
    let parents = index.column(level, z, x);

    let mut links = Vec::new();
    for slot in 0..4 {
        let (dx, dz) = (slot & 1, slot >> 1);
        let (zc, xc) = (2 * z + dz, 2 * x + dx);
        if zc >= child_shape.z_num || xc >= child_shape.x_num {
            continue;
        }

        let mut children = ColumnCursor::new(index.column(level + 1, zc, xc));
        for (j, y) in ColumnCells::new(parents) {
            if let Some(child_j) = children.seek(2 * y, |yc| yc) {
                links.push((j, slot, child_j));
            }
        }
    }

    links
}

/// The parent of the cell at `key`, if it has one.
pub fn parent(info: &ParentInfo, key: PcKey) -> Option<PcKey> {
    let parent_j = info.get(key).parent()?;

    Some(PcKey::new(key.level() - 1, key.z() / 2, key.x() / 2, parent_j as usize))
}

/// The children of the cell at `key`, ordered like `ChildOffset::ALL`.
pub fn children(index: &GapIndex, info: &ParentInfo, key: PcKey) -> [Option<PcKey>; 8] {
    let mut result = [None; 8];

    let level = key.level();
    let child_shape = match index.shapes().get(level + 1) {
        Some(s) => *s,
        None => return result,
    };
    let (z, x, y) = (key.z(), key.x(), index.y_of(key));
    let word = info.get(key);

    for offset in ChildOffset::ALL.iter() {
        let (zc, xc, yc) = offset.child_of(z, x, y);
        if !child_shape.contains(zc, xc, yc) {
            continue;
        }

        result[offset.index()] = match (word.child(offset.column_slot()), offset.y) {
            (Some(first_j), 0) => Some(PcKey::new(level + 1, zc, xc, first_j as usize)),
            (Some(first_j), _) => {
                // The odd child directly follows the even one when both are active.
                let second_j = first_j as usize + 1;
                if index.column(level + 1, zc, xc)[second_j].is_cell() {
                    Some(PcKey::new(level + 1, zc, xc, second_j))
                } else {
                    None
                }
            }
            (None, 0) => None,
            (None, _) => index.find_cell(level + 1, zc, xc, yc),
        };
    }

    result
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
