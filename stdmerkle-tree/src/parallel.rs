//! Fan-out helpers that fall back to a plain iterator when the `parallel`
//! feature is off. Output order always matches input order.

use crate::hash::{combine, Hash, MerkleHasher};

/// Evaluate `f` for every index in `0..len`.
pub(crate) fn map_range<R, F>(len: usize, parallel: bool, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    #[cfg(feature = "parallel")]
    let out = if parallel {
        use rayon::prelude::*;
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let out = {
        let _ = parallel;
        (0..len).map(f).collect()
    };
    out
}

/// One level up: adjacent pairs are combined, an unpaired trailing node is
/// promoted unchanged.
pub(crate) fn combine_level<H: MerkleHasher>(level: &[Hash], parallel: bool) -> Vec<Hash> {
    map_range(level.len().div_ceil(2), parallel, |i| {
        let left = &level[2 * i];
        match level.get(2 * i + 1) {
            Some(right) => combine::<H>(left, right),
            None => *left,
        }
    })
}
