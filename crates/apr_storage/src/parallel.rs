//! Fork-join helpers over the columns of one level.
//!
//! Each helper runs either on the rayon pool or serially on the calling thread, so small levels do not pay for task dispatch. The
//! result is identical either way.

use rayon::prelude::*;

/// Maps `f` over `0..n`, collecting in index order.
pub(crate) fn map_range<R, F>(n: usize, parallel: bool, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Calls `f(i, &mut items[i])` for every item.
pub(crate) fn for_each_mut<T, F>(items: &mut [T], parallel: bool, f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    if parallel {
        items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item));
    } else {
        items.iter_mut().enumerate().for_each(|(i, item)| f(i, item));
    }
}

/// Consumes one update per item, calling `f(&mut items[i], updates[i])`.
pub(crate) fn zip_apply<T, A, F>(items: &mut [T], updates: Vec<A>, parallel: bool, f: F)
where
    T: Send,
    A: Send,
    F: Fn(&mut T, A) + Sync + Send,
{
    assert_eq!(items.len(), updates.len());

    if parallel {
        items
            .par_iter_mut()
            .zip(updates.into_par_iter())
            .for_each(|(item, update)| f(item, update));
    } else {
        items
            .iter_mut()
            .zip(updates.into_iter())
            .for_each(|(item, update)| f(item, update));
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
    fn serial_and_parallel_agree() {
        for &parallel in [false, true].iter() {
            let squares = map_range(1000, parallel, |i| i * i);
            assert_eq!(squares[999], 999 * 999);

            let mut items = vec![0; 1000];
            for_each_mut(&mut items, parallel, |i, item| *item = 2 * i);
            zip_apply(&mut items, squares, parallel, |item, square| *item += square);
            assert_eq!(items[10], 20 + 100);
        }
    }
}
