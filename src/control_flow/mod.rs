//! Control flow micro-benchmarks.

pub mod nested_break;
