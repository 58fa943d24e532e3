//! Construction of the gap-encoded index from a particle cell tree.
//!
//! Each level is built in two passes over its columns. The size pass counts the exact number of words each column needs, then
//! every column is allocated once and the write pass fills it in place. Columns are independent, so both passes run in parallel
//! on large levels.

use crate::{
    column::{encode_column, encoded_len},
    parallel::{for_each_mut, map_range},
    AccessConfig, GapIndex, NodeWord, ParticleCellTree,
};

use apr_core::prelude::*;

use bytemuck::Zeroable;

/// Encodes every level of `tree`, coarsest first. The result has no neighbour links yet.
pub fn build_gap_index(tree: &ParticleCellTree, config: &AccessConfig) -> GapIndex {
    let shapes = tree.shapes().clone();
    let levels = shapes
        .iter()
        .map(|(level, shape)| build_level(tree, level, shape, config))
        .collect();

    GapIndex::from_levels(shapes, levels)
}

fn build_level(
    tree: &ParticleCellTree,
    level: u8,
    shape: &LevelShape,
    config: &AccessConfig,
) -> Vec<Vec<NodeWord>> {
    let parallel = config.is_parallel(shape);
    let _span = tracing::debug_span!("build_level", level, parallel).entered();

    let sizes = {
        let _span = tracing::debug_span!("size_pass").entered();
        map_range(shape.num_columns(), parallel, |offset| {
            let (z, x) = shape.column_coords(offset);
            encoded_len(tree.column(level, z, x))
        })
    };

    let mut columns: Vec<Vec<NodeWord>> = sizes
        .into_iter()
        .map(|size| vec![NodeWord::zeroed(); size])
        .collect();

    let _span = tracing::debug_span!("write_pass").entered();
    for_each_mut(&mut columns, parallel, |offset, words| {
        let (z, x) = shape.column_coords(offset);
        encode_column(tree.column(level, z, x), words);
    });

    columns
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
    use crate::{column::ColumnCells, CellStatus};

    use utilities::data_sets::random_levels;

    fn random_tree(level_min: u8, level_max: u8, finest: [usize; 3], density: f64, seed: u64) -> ParticleCellTree {
        let (shapes, levels) = random_levels(level_min, level_max, finest, density, seed);

        ParticleCellTree::from_levels(shapes, levels).unwrap()
    }

    #[test]
    fn sizes_are_cells_plus_runs_plus_sentinel() {
        let shapes = LevelShapes::from_finest(0, 1, LevelShape::new(8, 2, 1)).unwrap();
        let mut tree = ParticleCellTree::new(shapes);
        for &y in [0, 1, 2, 5, 7].iter() {
            tree.insert(1, 0, 1, y, CellStatus::Real);
        }

        let index = build_gap_index(&tree, &AccessConfig::default());

        assert_eq!(index.size_at(1, 0, 1), 5 + 3 + 1);
        assert_eq!(index.size_at(1, 0, 0), 1);
        assert_eq!(index.size_at(0, 0, 0), 1);
        assert!(index.column(1, 0, 0)[0].is_end());
    }

    #[test]
    fn serial_and_parallel_builds_are_identical() {
        let tree = random_tree(3, 5, [20, 12, 9], 0.3, 7);

        let serial = build_gap_index(
            &tree,
            &AccessConfig {
                parallel_threshold: usize::MAX,
                ..Default::default()
            },
        );
        let parallel = build_gap_index(
            &tree,
            &AccessConfig {
                parallel_threshold: 0,
                ..Default::default()
            },
        );

        assert_eq!(serial, parallel);
    }

    #[test]
    fn decoded_cells_match_tree() {
        let tree = random_tree(2, 4, [16, 16, 16], 0.2, 3);
        let index = build_gap_index(&tree, &AccessConfig::default());

        for (level, shape) in tree.shapes().iter() {
            for (z, x) in shape.columns() {
                let decoded: Vec<usize> = ColumnCells::new(index.column(level, z, x)).map(|(_, y)| y).collect();
                let expected: Vec<usize> = (0..shape.y_num).filter(|&y| tree.is_occupied(level, z, x, y)).collect();
                assert_eq!(decoded, expected);
            }
        }
    }
}
