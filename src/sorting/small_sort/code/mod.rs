//! Implementation variants for sorting short `u32` vectors

pub mod insertion;
pub mod original;
pub mod unstable;

use crate::utils::VariantInfo;

/// Sorts the slice in place, ascending
pub type SortFn = fn(&mut [u32]);

/// Returns all available variants
pub fn get_variants() -> Vec<VariantInfo<SortFn>> {
    vec![
        VariantInfo {
            name: "stable",
            description: "slice::sort (stable merge sort)",
            function: original::sort_stable,
        },
        VariantInfo {
            name: "unstable",
            description: "slice::sort_unstable (pattern-defeating quicksort)",
            function: unstable::sort_unstable,
        },
        VariantInfo {
            name: "insertion",
            description: "Hand-written insertion sort",
            function: insertion::insertion_sort,
        },
    ]
}
