//! Single-loop variants that flatten the grid into one iterator.

use super::TARGET;

#[inline(never)]
pub fn find_in_product(n1: usize, n2: usize) -> Option<(usize, usize)> {
    (0..n1)
        .flat_map(|i| (0..n2).map(move |j| (i, j)))
        .find(|&pair| pair == TARGET)
}

/// Row-major walk over `0..n1 × 0..n2`
struct PairIter {
    i: usize,
    j: usize,
    n1: usize,
    n2: usize,
}

impl PairIter {
    fn new(n1: usize, n2: usize) -> Self {
        Self { i: 0, j: 0, n1, n2 }
    }
}

impl Iterator for PairIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.n2 == 0 || self.i >= self.n1 {
            return None;
        }
        let pair = (self.i, self.j);
        self.j += 1;
        if self.j == self.n2 {
            self.j = 0;
            self.i += 1;
        }
        Some(pair)
    }
}

#[inline(never)]
pub fn find_pair_iter(n1: usize, n2: usize) -> Option<(usize, usize)> {
    PairIter::new(n1, n2).find(|&pair| pair == TARGET)
}
