//! End-to-end benchmark pipeline.
//!
//! `collect` walks the grid and times every configuration; `analyze` turns
//! the samples into statistics, group rankings and skill ratings. Nothing is
//! analyzed until every configuration has been measured.

use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::{BenchError, CandidateExecutionError, ConfigError};
use crate::grid::{Configuration, DerivedAxis, GridDriver};
use crate::rating::SkillEngine;
use crate::registry::{CandidateRegistry, Suite};
use crate::report::{self, BenchReport};
use crate::utils::stats::{Aggregator, SampleRecord};
use crate::utils::timer::TrialRunner;

/// Runs one benchmark declaration against one candidate registry.
pub struct Harness<'r> {
    registry: &'r CandidateRegistry,
    config: BenchConfig,
    derived: Vec<DerivedAxis>,
    runner: TrialRunner,
}

impl<'r> Harness<'r> {
    /// Validates the whole declaration before anything is timed.
    pub fn new(registry: &'r CandidateRegistry, config: BenchConfig) -> Result<Self, ConfigError> {
        config.validate(registry)?;
        let runner = TrialRunner::new(config.timing.clone())?;
        Ok(Self {
            registry,
            config,
            derived: Vec::new(),
            runner,
        })
    }

    pub fn with_derived(mut self, derived: Vec<DerivedAxis>) -> Self {
        self.derived = derived;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Time every configuration of the grid, in enumeration order.
    ///
    /// The first candidate failure aborts the run with the failing
    /// configuration attached.
    pub fn collect(&self) -> Result<Vec<SampleRecord>, BenchError> {
        let driver = GridDriver::new(self.registry);
        let total = self.config.axes.grid_size().ok_or(ConfigError::GridTooLarge)?;
        info!(
            configurations = total,
            num_trials = self.config.timing.num_trials,
            best_of = self.config.timing.best_of,
            "collecting samples"
        );

        let mut records = Vec::with_capacity(total);
        for (index, configuration) in self.config.axes.enumerate().enumerate() {
            let (candidate, args) = driver.dispatch(&configuration)?;
            debug!(index, total, configuration = %configuration, "measuring");

            let samples = self.runner.run(candidate, &args).map_err(|source| {
                CandidateExecutionError {
                    candidate: candidate.name().to_string(),
                    configuration: configuration.key(),
                    source,
                }
            })?;

            records.push(SampleRecord {
                candidate: candidate.name().to_string(),
                derived: self.derive(&configuration),
                configuration,
                samples,
            });
        }

        Ok(records)
    }

    /// Statistics, rankings and ratings for collected records
    pub fn analyze(&self, records: &[SampleRecord]) -> Result<BenchReport, BenchError> {
        analyze(records, &self.config)
    }

    pub fn run(&self) -> Result<BenchReport, BenchError> {
        let records = self.collect()?;
        self.analyze(&records)
    }

    fn derive(&self, configuration: &Configuration) -> Configuration {
        let mut derived = Configuration::new();
        for axis in &self.derived {
            derived.insert(axis.name(), axis.compute(configuration));
        }
        derived
    }
}

/// Aggregate records, fold group rankings into ratings in group order and
/// predict final win probabilities.
pub fn analyze(records: &[SampleRecord], config: &BenchConfig) -> Result<BenchReport, BenchError> {
    let methods = config.axes.method_names()?;
    let aggregator = Aggregator::new(config.epsilon, methods.clone());
    let groups = aggregator.aggregate(records)?;

    let engine = SkillEngine::new(config.model.clone())?;
    let state = engine.update_all(engine.seed(methods), groups.iter().map(|g| &g.ranking))?;
    let win = engine.predict_win(&state);
    info!(
        groups = groups.len(),
        matches = state.matches(),
        "ratings updated"
    );

    let rows = report::long_form(records, &groups, config.record_all);
    let rankings = report::ranking_table(&state, &win);

    Ok(BenchReport {
        num_trials: config.timing.num_trials,
        best_of: config.timing.best_of,
        rows,
        groups,
        ratings: state,
        rankings,
    })
}

/// Run a suite over its default axes with the given timing and model.
///
/// Axes in `config` win when present.
pub fn run_suite(suite: &dyn Suite, config: BenchConfig) -> Result<BenchReport, BenchError> {
    let registry = suite.candidates()?;
    let config = if config.axes.is_empty() {
        config.with_axes(suite.default_axes())
    } else {
        config
    };
    info!(suite = suite.name(), "running suite");
    Harness::new(&registry, config)?
        .with_derived(suite.derived_axes())
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CandidateFailure;
    use crate::grid::{Axes, ParamValue};
    use crate::registry::Candidate;
    use crate::report::RowStatistic;
    use crate::utils::timer::{PinStrategy, TimingConfig, TrialSamples};
    use std::time::Duration;

    fn quiet(num_trials: usize, best_of: usize) -> TimingConfig {
        TimingConfig {
            num_trials,
            best_of,
            warmup_iterations: 0,
            pin_strategy: PinStrategy::Off,
        }
    }

    fn two_candidates() -> CandidateRegistry {
        CandidateRegistry::from_candidates([
            Candidate::new("a", &["x"], |args| {
                std::hint::black_box(args.usize("x")?);
                Ok(())
            }),
            Candidate::new("b", &["x", "y"], |args| {
                std::hint::black_box(args.usize("x")? + args.usize("y")?);
                Ok(())
            }),
        ])
        .unwrap()
    }

    fn grid() -> Axes {
        Axes::new()
            .with_methods(["a", "b"])
            .with_axis("x", [1i64, 2, 3])
            .with_axis("y", [1i64, 2, 3])
    }

    /// A takes 10 s and B 5 s on every configuration
    fn synthetic_records(axes: &Axes) -> Vec<SampleRecord> {
        axes.enumerate()
            .map(|configuration| {
                let secs = match configuration.method() {
                    Some("a") => 10,
                    _ => 5,
                };
                SampleRecord {
                    candidate: configuration.method().unwrap_or_default().to_string(),
                    derived: Configuration::new(),
                    configuration,
                    samples: TrialSamples::from_robust(vec![Duration::from_secs(secs); 2]),
                }
            })
            .collect()
    }

    #[test]
    fn test_faster_candidate_wins() {
        let config = BenchConfig::default()
            .with_axes(grid())
            .with_timing(quiet(2, 1));
        let report = analyze(&synthetic_records(&config.axes), &config).unwrap();

        assert_eq!(report.groups.len(), 9);
        assert!(report
            .groups
            .iter()
            .all(|g| g.ranking.placements() == ["b", "a"]));
        for group in &report.groups {
            assert!((group.entry("b").unwrap().mean_speedup - 2.0).abs() < 1e-9);
            assert_eq!(group.entry("a").unwrap().mean_speedup, 1.0);
        }

        let a = report.ratings.get("a").unwrap();
        let b = report.ratings.get("b").unwrap();
        assert!(b.mu > a.mu);
        assert_eq!(report.ratings.matches(), 9);

        let winner = report.winner().unwrap();
        assert_eq!(winner.candidate, "b");
        assert!(report.rankings[0].win_probability > report.rankings[1].win_probability);
        let total: f64 = report.rankings.iter().map(|r| r.win_probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_candidate_group_leaves_ratings() {
        let axes = Axes::new().with_methods(["a", "b"]).with_axis("x", [1i64]);
        let config = BenchConfig::default().with_axes(axes.clone()).with_timing(quiet(2, 1));
        let only_a: Vec<SampleRecord> = synthetic_records(&axes)
            .into_iter()
            .filter(|r| r.candidate == "a")
            .collect();

        let report = analyze(&only_a, &config).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.ratings.matches(), 0);
        assert_eq!(report.ratings.get("a"), Some(config.model.prior()));
        assert_eq!(report.ratings.get("b"), Some(config.model.prior()));
    }

    #[test]
    fn test_long_form_rows() {
        let config = BenchConfig::default()
            .with_axes(grid())
            .with_timing(quiet(2, 1));
        let records = synthetic_records(&config.axes);
        let report = analyze(&records, &config).unwrap();
        assert_eq!(report.rows_for(RowStatistic::Time).count(), 18 * 2);
        assert_eq!(report.rows_for(RowStatistic::Mean).count(), 18);
        assert_eq!(report.rows_for(RowStatistic::MeanSpeedup).count(), 18);

        let config = BenchConfig {
            record_all: false,
            ..config
        };
        let report = analyze(&records, &config).unwrap();
        assert_eq!(report.rows_for(RowStatistic::Time).count(), 0);
    }

    #[test]
    fn test_harness_run_collects_every_configuration() {
        let registry = two_candidates();
        let config = BenchConfig::default()
            .with_axes(grid())
            .with_timing(quiet(4, 2));
        let harness = Harness::new(&registry, config)
            .unwrap()
            .with_derived(vec![DerivedAxis::new("size", |c| {
                let x = c.get("x").and_then(ParamValue::as_i64).unwrap_or(0);
                let y = c.get("y").and_then(ParamValue::as_i64).unwrap_or(0);
                ParamValue::from(x * y)
            })]);

        let records = harness.collect().unwrap();
        assert_eq!(records.len(), 18);
        assert!(records.iter().all(|r| r.samples.robust.len() == 2));
        assert_eq!(records[0].configuration.key(), "method=a,x=1,y=1");
        assert_eq!(records[17].derived.get("size"), Some(&ParamValue::from(9i64)));

        let report = harness.analyze(&records).unwrap();
        assert_eq!(report.groups.len(), 9);
        assert_eq!(report.rankings.len(), 2);
    }

    #[test]
    fn test_failing_candidate_aborts() {
        let registry = CandidateRegistry::from_candidates([
            Candidate::new("ok", &[], |_| Ok(())),
            Candidate::new("bad", &["n"], |args| {
                if args.usize("n")? == 2 {
                    Err(CandidateFailure::new("boom"))
                } else {
                    Ok(())
                }
            }),
        ])
        .unwrap();
        let config = BenchConfig::default()
            .with_axes(Axes::new().with_methods(["ok", "bad"]).with_axis("n", [1i64, 2]))
            .with_timing(quiet(1, 1));

        let err = Harness::new(&registry, config).unwrap().run().unwrap_err();
        match err {
            BenchError::CandidateExecution(e) => {
                assert_eq!(e.candidate, "bad");
                assert_eq!(e.configuration, "method=bad,n=2");
                assert_eq!(e.source.message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_method_rejected_before_timing() {
        let registry = two_candidates();
        let config = BenchConfig::default()
            .with_axes(Axes::new().with_methods(["a", "zzz"]))
            .with_timing(quiet(1, 1));
        assert!(matches!(
            Harness::new(&registry, config),
            Err(ConfigError::UnknownCandidate { .. })
        ));
    }

    #[test]
    fn test_run_suite_with_explicit_axes() {
        let registry = crate::registry::build_registry();
        let suite = registry.find("nested_break").unwrap();
        let config = BenchConfig::default()
            .with_axes(
                Axes::new()
                    .with_methods(["original", "labeled_break"])
                    .with_axis("n1", [2i64])
                    .with_axis("n2", [3i64]),
            )
            .with_timing(quiet(2, 1));
        let report = run_suite(suite, config).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.ratings.len(), 2);
        assert!(report
            .rows
            .iter()
            .all(|row| row.derived.get("size") == Some(&ParamValue::from(6i64))));
    }

    #[test]
    fn test_run_suite_falls_back_to_default_axes() {
        let registry = crate::registry::build_registry();
        let suite = registry.find("small_sort").unwrap();
        let config = BenchConfig::default().with_timing(quiet(1, 1));
        assert!(config.axes.is_empty());

        let report = run_suite(suite, config).unwrap();
        let expected = suite.default_axes();
        assert_eq!(report.groups.len(), 9);
        assert_eq!(report.ratings.len(), expected.method_names().unwrap().len());
        assert_eq!(report.groups[0].key.key(), "len=16,order=random");
    }
}
