//! Implementation variants for leaving a doubly nested loop

pub mod early_exit;
pub mod iterators;
pub mod labeled;
pub mod original;

use crate::utils::VariantInfo;

/// Scan `0..n1 × 0..n2` row by row and return the first pair matching the
/// target, or `None` when the grid never reaches it.
pub type BreakFn = fn(usize, usize) -> Option<(usize, usize)>;

/// Pair every variant looks for
pub const TARGET: (usize, usize) = (2, 2);

/// Returns all available variants
pub fn get_variants() -> Vec<VariantInfo<BreakFn>> {
    vec![
        VariantInfo {
            name: "original",
            description: "Flag checked by the outer loop after the inner break",
            function: original::find_with_flag,
        },
        VariantInfo {
            name: "product",
            description: "flat_map over the Cartesian product with find",
            function: iterators::find_in_product,
        },
        VariantInfo {
            name: "labeled_break",
            description: "break 'outer with the value",
            function: labeled::find_labeled,
        },
        VariantInfo {
            name: "early_return",
            description: "Nested loops in a helper that returns on match",
            function: early_exit::find_early_return,
        },
        VariantInfo {
            name: "control_flow",
            description: "try_for_each short-circuiting with ControlFlow::Break",
            function: early_exit::find_control_flow,
        },
        VariantInfo {
            name: "pair_iter",
            description: "Hand-written row-major pair iterator",
            function: iterators::find_pair_iter,
        },
    ]
}
