//! Candidate and suite registries.
//!
//! Candidates are looked up by name through an explicit [`CandidateRegistry`]
//! handed to the grid driver. Suites bundle a candidate registry with the
//! default axes it is benchmarked over.

use crate::error::{CandidateFailure, ConfigError};
use crate::grid::{Arguments, Axes, DerivedAxis};
use std::sync::Arc;

/// A call ready to be timed. Setup has already happened.
///
/// The runner invokes it through `&mut self` and drops it only after the
/// clock has been read, so releasing captured state is never measured.
pub trait Prepared {
    fn call(&mut self) -> Result<(), CandidateFailure>;
}

impl<F> Prepared for F
where
    F: FnMut() -> Result<(), CandidateFailure>,
{
    fn call(&mut self) -> Result<(), CandidateFailure> {
        self()
    }
}

pub type PreparedCall = Box<dyn Prepared>;

type PrepareFn = dyn Fn(&Arguments) -> Result<PreparedCall, CandidateFailure> + Send + Sync;

/// A named implementation under comparison.
///
/// Invoking a candidate happens in two steps: `prepare` runs any setup
/// outside the timer and returns the call that the runner measures.
pub struct Candidate {
    name: String,
    description: String,
    params: Vec<String>,
    prepare: Box<PrepareFn>,
}

impl Candidate {
    /// Candidate without setup. Argument lookups inside `run` are timed
    /// with it; use [`Candidate::with_setup`] to bind them beforehand.
    pub fn new<F>(name: impl Into<String>, params: &[&str], run: F) -> Self
    where
        F: Fn(&Arguments) -> Result<(), CandidateFailure> + Send + Sync + 'static,
    {
        let run = Arc::new(run);
        Self::from_prepare(name, params, move |args: &Arguments| {
            let run = Arc::clone(&run);
            let args = args.clone();
            Ok(Box::new(move || (*run)(&args)) as PreparedCall)
        })
    }

    /// Candidate whose input is built by `setup` before the timer starts.
    /// Only `run` is measured; the setup value is dropped after the clock
    /// stops.
    pub fn with_setup<S, Setup, Run>(
        name: impl Into<String>,
        params: &[&str],
        setup: Setup,
        run: Run,
    ) -> Self
    where
        S: 'static,
        Setup: Fn(&Arguments) -> Result<S, CandidateFailure> + Send + Sync + 'static,
        Run: Fn(&mut S) -> Result<(), CandidateFailure> + Send + Sync + 'static,
    {
        let run = Arc::new(run);
        Self::from_prepare(name, params, move |args: &Arguments| {
            let mut state = setup(args)?;
            let run = Arc::clone(&run);
            Ok(Box::new(move || (*run)(&mut state)) as PreparedCall)
        })
    }

    fn from_prepare<P>(name: impl Into<String>, params: &[&str], prepare: P) -> Self
    where
        P: Fn(&Arguments) -> Result<PreparedCall, CandidateFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            params: params.iter().map(|p| p.to_string()).collect(),
            prepare: Box::new(prepare),
        }
    }

    /// Attach a human-readable description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameter names this candidate accepts as arguments
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn accepts(&self, param: &str) -> bool {
        self.params.iter().any(|p| p == param)
    }

    /// Run setup and return the call to time.
    pub fn prepare(&self, args: &Arguments) -> Result<PreparedCall, CandidateFailure> {
        (self.prepare)(args)
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Candidates by unique name, in registration order.
#[derive(Debug, Default)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn from_candidates<I>(candidates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut registry = Self::new();
        for candidate in candidates {
            registry.register(candidate)?;
        }
        Ok(registry)
    }

    /// Register a candidate; names must be unique
    pub fn register(&mut self, candidate: Candidate) -> Result<(), ConfigError> {
        if self.find(candidate.name()).is_some() {
            return Err(ConfigError::DuplicateCandidate {
                name: candidate.name().to_string(),
            });
        }
        self.candidates.push(candidate);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.name() == name)
    }

    pub fn all(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Trait that every benchmark suite implements
pub trait Suite: Send + Sync {
    /// Name of the suite (e.g., "nested_break")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Category (e.g., "control_flow", "sorting")
    fn category(&self) -> &'static str;

    /// Fresh registry of the competing candidates
    fn candidates(&self) -> Result<CandidateRegistry, ConfigError>;

    /// Grid the suite is benchmarked over unless the caller overrides it
    fn default_axes(&self) -> Axes;

    /// Report-only values computed from each configuration
    fn derived_axes(&self) -> Vec<DerivedAxis> {
        Vec::new()
    }

    /// Verify correctness of all candidates against the reference
    fn verify(&self) -> Result<(), String>;
}

/// Registry of all benchmark suites
pub struct SuiteRegistry {
    suites: Vec<Box<dyn Suite>>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self { suites: Vec::new() }
    }

    pub fn register<S: Suite + 'static>(&mut self, suite: S) {
        self.suites.push(Box::new(suite));
    }

    pub fn all(&self) -> &[Box<dyn Suite>] {
        &self.suites
    }

    /// Find suite by name
    pub fn find(&self, name: &str) -> Option<&dyn Suite> {
        self.suites
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn list_names(&self) -> Vec<&'static str> {
        self.suites.iter().map(|s| s.name()).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&dyn Suite> {
        self.suites
            .iter()
            .filter(|s| s.category() == category)
            .map(|s| s.as_ref())
            .collect()
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default registry with all suites
pub fn build_registry() -> SuiteRegistry {
    let mut registry = SuiteRegistry::new();

    registry.register(crate::control_flow::nested_break::NestedBreakSuite);
    registry.register(crate::sorting::small_sort::SmallSortSuite);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ParamValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_duplicate_candidate_rejected() {
        let mut registry = CandidateRegistry::new();
        registry.register(Candidate::new("a", &[], |_| Ok(()))).unwrap();
        assert_eq!(
            registry.register(Candidate::new("a", &[], |_| Ok(()))),
            Err(ConfigError::DuplicateCandidate {
                name: "a".to_string()
            })
        );
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn test_setup_runs_at_prepare_time() {
        static SETUPS: AtomicUsize = AtomicUsize::new(0);
        let candidate = Candidate::with_setup(
            "sum",
            &["n"],
            |args| {
                SETUPS.fetch_add(1, Ordering::SeqCst);
                Ok((0..args.usize("n")?).collect::<Vec<usize>>())
            },
            |data| {
                if data.iter().sum::<usize>() == 6 {
                    Ok(())
                } else {
                    Err(CandidateFailure::new("wrong sum"))
                }
            },
        );
        let args = Arguments::from_pairs([("n", ParamValue::from(4i64))]);
        let mut call = candidate.prepare(&args).unwrap();
        assert_eq!(SETUPS.load(Ordering::SeqCst), 1);
        assert!(call.call().is_ok());
        assert!(call.call().is_ok());
        assert_eq!(SETUPS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_suite_registry_lookup() {
        let registry = build_registry();
        assert!(registry.find("nested_break").is_some());
        assert!(registry.find("small_sort").is_some());
        assert!(registry.find("missing").is_none());
        assert_eq!(registry.by_category("sorting").len(), 1);
    }

    #[test]
    fn test_default_axes_name_registered_candidates() {
        for suite in build_registry().all() {
            let candidates = suite.candidates().unwrap();
            let axes = suite.default_axes();
            axes.validate().unwrap();
            for name in axes.method_names().unwrap() {
                assert!(candidates.find(&name).is_some(), "{} missing", name);
            }
        }
    }
}
