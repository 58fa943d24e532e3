use apr_core::prelude::*;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Dense status buffers for `level_min..=level_max`, one per level, in the layout expected by `ParticleCellTree::from_levels`.
pub type LevelBuffers = (LevelShapes, Vec<Vec<u8>>);

/// Every cell of every level is independently active with probability `density`, with a random status.
///
/// Levels overlap freely, so the result is not ancestor-closed and does not partition space like an APR does.
pub fn random_levels(level_min: u8, level_max: u8, finest_yxz: [usize; 3], density: f64, seed: u64) -> LevelBuffers {
    let [y_num, x_num, z_num] = finest_yxz;
    let shapes = LevelShapes::from_finest(level_min, level_max, LevelShape::new(y_num, x_num, z_num))
        .expect("invalid random data set");

    let mut rng = StdRng::seed_from_u64(seed);
    let levels: Vec<Vec<u8>> = shapes
        .iter()
        .map(|(_, shape)| {
            (0..shape.num_voxels())
                .map(|_| if rng.gen_bool(density) { rng.gen_range(1..=3) } else { 0 })
                .collect()
        })
        .collect();

    (shapes, levels)
}

/// An APR-like partition of a cube of `edge_length` around a sphere of radius `edge_length / 4`.
///
/// Starting from every cell of `level_min`, a cell is refined into its children when the sphere's surface passes within one cell
/// width of its center, until `level_max`. Every other visited cell is active, so each location is covered by exactly one level
/// and resolution increases toward the surface.
pub fn sphere_levels(level_min: u8, level_max: u8, edge_length: usize) -> LevelBuffers {
    let shapes = LevelShapes::from_finest(level_min, level_max, LevelShape::new(edge_length, edge_length, edge_length))
        .expect("invalid sphere data set");
    let center = edge_length as f32 / 2.0;
    let radius = edge_length as f32 / 4.0;

    let mut levels: Vec<Vec<u8>> = shapes.iter().map(|(_, s)| vec![0; s.num_voxels()]).collect();

    let coarsest = *shapes.shape(level_min);
    let mut frontier: Vec<(usize, usize, usize)> = coarsest
        .columns()
        .flat_map(|(z, x)| (0..coarsest.y_num).map(move |y| (z, x, y)))
        .collect();

    for (i, (level, shape)) in shapes.iter().enumerate() {
        let cell_width = (1usize << (level_max - level)) as f32;
        let child_shape = shapes.get(level + 1).copied();

        let mut next = Vec::new();
        for (z, x, y) in frontier.into_iter() {
            let to_center = |c: usize| (c as f32 + 0.5) * cell_width - center;
            let distance = (to_center(z).powi(2) + to_center(x).powi(2) + to_center(y).powi(2)).sqrt();

            match child_shape {
                Some(child_shape) if (distance - radius).abs() < cell_width => {
                    for offset in ChildOffset::ALL.iter() {
                        let (zc, xc, yc) = offset.child_of(z, x, y);
                        if child_shape.contains(zc, xc, yc) {
                            next.push((zc, xc, yc));
                        }
                    }
                }
                _ => levels[i][shape.voxel_index(z, x, y)] = 1,
            }
        }
        frontier = next;
    }

    (shapes, levels)
}
