//! Sorting micro-benchmarks.

pub mod small_sort;
