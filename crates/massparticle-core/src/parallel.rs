#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluate `f` for every index in `0..count` and collect the results in index order.
///
/// Runs on the rayon pool when the `parallel` feature is enabled. `f` only
/// reads shared state, so both paths produce identical output.
pub(crate) fn map_indices<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..count).into_par_iter().map(f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(f).collect()
    }
}
