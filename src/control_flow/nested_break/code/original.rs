//! Reference implementation: a `found` flag carried out of the inner loop.

use super::TARGET;

#[inline(never)]
pub fn find_with_flag(n1: usize, n2: usize) -> Option<(usize, usize)> {
    let mut found = None;
    for i in 0..n1 {
        for j in 0..n2 {
            if (i, j) == TARGET {
                found = Some((i, j));
                break;
            }
        }
        if found.is_some() {
            break;
        }
    }
    found
}
