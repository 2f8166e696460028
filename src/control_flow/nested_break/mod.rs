//! # Nested Break Comparison
//!
//! Ways to leave two nested loops as soon as a pair is found.

pub mod code;
pub mod test;

use crate::error::ConfigError;
use crate::grid::{Axes, DerivedAxis, ParamValue};
use crate::registry::{Candidate, CandidateRegistry, Suite};

pub struct NestedBreakSuite;

impl Suite for NestedBreakSuite {
    fn name(&self) -> &'static str {
        "nested_break"
    }

    fn description(&self) -> &'static str {
        "Leaving a doubly nested loop: flags, labels, early return and iterators"
    }

    fn category(&self) -> &'static str {
        "control_flow"
    }

    fn candidates(&self) -> Result<CandidateRegistry, ConfigError> {
        CandidateRegistry::from_candidates(code::get_variants().into_iter().map(|v| {
            let func = v.function;
            Candidate::with_setup(
                v.name,
                &["n1", "n2"],
                |args| Ok((args.usize("n1")?, args.usize("n2")?)),
                move |&mut (n1, n2): &mut (usize, usize)| {
                    std::hint::black_box(func(
                        std::hint::black_box(n1),
                        std::hint::black_box(n2),
                    ));
                    Ok(())
                },
            )
            .describe(v.description)
        }))
    }

    fn default_axes(&self) -> Axes {
        Axes::new()
            .with_methods(code::get_variants().iter().map(|v| v.name))
            .with_axis("n1", 0..10i64)
            .with_axis("n2", 0..10i64)
    }

    fn derived_axes(&self) -> Vec<DerivedAxis> {
        vec![DerivedAxis::new("size", |config| {
            let n1 = config.get("n1").and_then(ParamValue::as_i64).unwrap_or(0);
            let n2 = config.get("n2").and_then(ParamValue::as_i64).unwrap_or(0);
            ParamValue::from(n1 * n2)
        })]
    }

    fn verify(&self) -> Result<(), String> {
        test::verify_all()
    }
}
