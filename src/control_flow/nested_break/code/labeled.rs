//! Labeled block break carrying the result.

use super::TARGET;

#[inline(never)]
pub fn find_labeled(n1: usize, n2: usize) -> Option<(usize, usize)> {
    'outer: {
        for i in 0..n1 {
            for j in 0..n2 {
                if (i, j) == TARGET {
                    break 'outer Some((i, j));
                }
            }
        }
        None
    }
}
