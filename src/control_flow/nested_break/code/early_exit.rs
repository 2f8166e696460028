//! Leaving both loops by returning from a function.

use std::ops::ControlFlow;

use super::TARGET;

#[inline(never)]
pub fn find_early_return(n1: usize, n2: usize) -> Option<(usize, usize)> {
    for i in 0..n1 {
        for j in 0..n2 {
            if (i, j) == TARGET {
                return Some((i, j));
            }
        }
    }
    None
}

/// Short-circuits both `try_for_each` levels with `ControlFlow::Break`.
#[inline(never)]
pub fn find_control_flow(n1: usize, n2: usize) -> Option<(usize, usize)> {
    let flow = (0..n1).try_for_each(|i| {
        (0..n2).try_for_each(|j| {
            if (i, j) == TARGET {
                ControlFlow::Break((i, j))
            } else {
                ControlFlow::Continue(())
            }
        })
    });
    match flow {
        ControlFlow::Break(pair) => Some(pair),
        ControlFlow::Continue(()) => None,
    }
}
