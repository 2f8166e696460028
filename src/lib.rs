//! # rankbench
//!
//! Micro-benchmark comparison harness. Candidates are timed over a parameter
//! grid with best-of sampling, compared per group of identical parameters,
//! and ranked with a Bayesian skill model.

pub mod config;
pub mod control_flow;
pub mod error;
pub mod grid;
pub mod harness;
pub mod rating;
pub mod registry;
pub mod report;
pub mod sorting;
pub mod utils;

/// Re-export tui from utils
pub use utils::tui;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::config::BenchConfig;
    pub use crate::error::{BenchError, CandidateFailure, ConfigError};
    pub use crate::grid::{Arguments, Axes, Configuration, DerivedAxis, ParamValue};
    pub use crate::harness::{analyze, run_suite, Harness};
    pub use crate::rating::{Ranking, Rating, RatingState, SkillEngine};
    pub use crate::registry::{build_registry, Candidate, CandidateRegistry, Suite};
    pub use crate::report::BenchReport;
    pub use crate::utils::timer::{PinStrategy, TimingConfig};
}

#[cfg(test)]
mod tests {
    use crate::registry::build_registry;

    #[test]
    fn test_all_suites_registry_verify() {
        let registry = build_registry();
        let suites = registry.all();

        println!("Verifying {} suites...", suites.len());

        for suite in suites {
            println!("Verifying suite: {}", suite.name());
            match suite.verify() {
                Ok(_) => println!("  ✅ Suite '{}' passed verification", suite.name()),
                Err(e) => panic!("  ❌ Suite '{}' failed verification: {}", suite.name(), e),
            }
        }
    }
}
