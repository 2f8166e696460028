//! # Small Sort Comparison
//!
//! Standard library sorts against insertion sort on short vectors. Inputs
//! are generated in the untimed setup step, so only the sort is measured.

pub mod code;
pub mod test;

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CandidateFailure, ConfigError};
use crate::grid::Axes;
use crate::registry::{Candidate, CandidateRegistry, Suite};

const INPUT_SEED: u64 = 0x12345678;

/// Initial arrangement of the input vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrder {
    Random,
    Sorted,
    Reversed,
}

impl InputOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sorted => "sorted",
            Self::Reversed => "reversed",
        }
    }
}

impl FromStr for InputOrder {
    type Err = CandidateFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "sorted" => Ok(Self::Sorted),
            "reversed" => Ok(Self::Reversed),
            other => Err(CandidateFailure::new(format!("unknown input order '{other}'"))),
        }
    }
}

/// Deterministic input of `len` values in the given arrangement
pub fn generate_input(len: usize, order: InputOrder) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(INPUT_SEED);
    let mut data: Vec<u32> = (0..len).map(|_| rng.random()).collect();
    match order {
        InputOrder::Random => {}
        InputOrder::Sorted => data.sort_unstable(),
        InputOrder::Reversed => data.sort_unstable_by(|a, b| b.cmp(a)),
    }
    data
}

pub struct SmallSortSuite;

impl Suite for SmallSortSuite {
    fn name(&self) -> &'static str {
        "small_sort"
    }

    fn description(&self) -> &'static str {
        "Stable, unstable and insertion sort on short u32 vectors"
    }

    fn category(&self) -> &'static str {
        "sorting"
    }

    fn candidates(&self) -> Result<CandidateRegistry, ConfigError> {
        CandidateRegistry::from_candidates(code::get_variants().into_iter().map(|v| {
            let func = v.function;
            Candidate::with_setup(
                v.name,
                &["len", "order"],
                |args| {
                    let order: InputOrder = args.str("order")?.parse()?;
                    Ok(generate_input(args.usize("len")?, order))
                },
                move |data: &mut Vec<u32>| {
                    func(std::hint::black_box(data.as_mut_slice()));
                    std::hint::black_box(data);
                    Ok(())
                },
            )
            .describe(v.description)
        }))
    }

    fn default_axes(&self) -> Axes {
        Axes::new()
            .with_methods(code::get_variants().iter().map(|v| v.name))
            .with_axis("len", [16i64, 64, 256])
            .with_axis("order", ["random", "sorted", "reversed"])
    }

    fn verify(&self) -> Result<(), String> {
        test::verify_all()
    }
}
