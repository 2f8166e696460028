//! Timed trial runner.
//!
//! Runs a candidate `num_trials` times under a monotonic clock and keeps,
//! from each contiguous chunk of `best_of` durations, only the minimum.
//! Wall-clock timings are right-skewed by scheduler noise; the chunk minimum
//! is the robust estimate that feeds the statistics.
//!
//! Each iteration is: prepare (untimed setup) -> clock start -> call ->
//! clock stop. Nothing else sits between the two clock reads.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cpu_affinity::CpuPinGuard;
use crate::error::{CandidateFailure, ConfigError};
use crate::grid::Arguments;
use crate::registry::{Candidate, PreparedCall};

/// Time one expression, returning `(elapsed, value)`.
#[macro_export]
macro_rules! measure {
    ($e:expr) => {{
        let start = ::std::time::Instant::now();
        let value = ::std::hint::black_box($e);
        (start.elapsed(), value)
    }};
}

// ============================================================================
// Configuration
// ============================================================================

/// CPU pinning strategy during measurements
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinStrategy {
    /// Never pin
    Off,
    /// Pin once for the whole run of a candidate
    #[default]
    Global,
    /// Pin/unpin around each measured call
    PerExecution,
}

/// Configuration for timing measurements
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Measured calls per configuration (default: 100)
    pub num_trials: usize,
    /// Chunk size for best-of selection; must divide `num_trials` (default: 10)
    pub best_of: usize,
    /// Untimed calls before measuring (default: 10)
    pub warmup_iterations: usize,
    /// CPU pinning strategy (default: Global)
    pub pin_strategy: PinStrategy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            num_trials: 100,
            best_of: 10,
            warmup_iterations: 10,
            pin_strategy: PinStrategy::default(),
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trials == 0 {
            return Err(ConfigError::InvalidTrialCount {
                num_trials: self.num_trials,
            });
        }
        if self.best_of == 0 || self.best_of > self.num_trials {
            return Err(ConfigError::InvalidBestOf {
                best_of: self.best_of,
                num_trials: self.num_trials,
            });
        }
        if self.num_trials % self.best_of != 0 {
            return Err(ConfigError::BestOfNotDivisor {
                best_of: self.best_of,
                num_trials: self.num_trials,
            });
        }
        Ok(())
    }

    /// Number of robust samples one run produces
    pub fn robust_count(&self) -> usize {
        self.num_trials / self.best_of.max(1)
    }
}

// ============================================================================
// Samples
// ============================================================================

/// Durations recorded for one (candidate, configuration) pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialSamples {
    /// Every measured call, in execution order
    pub raw: Vec<Duration>,
    /// Minimum of each `best_of` chunk of `raw`
    pub robust: Vec<Duration>,
}

impl TrialSamples {
    /// Build from raw durations, chunking by `best_of`
    pub fn from_raw(raw: Vec<Duration>, best_of: usize) -> Self {
        let robust = robust_times(&raw, best_of);
        Self { raw, robust }
    }

    /// Samples whose raw and robust series are the same values
    pub fn from_robust(robust: Vec<Duration>) -> Self {
        Self {
            raw: robust.clone(),
            robust,
        }
    }
}

/// Minimum of each contiguous `best_of` chunk. A trailing partial chunk is
/// dropped.
pub fn robust_times(raw: &[Duration], best_of: usize) -> Vec<Duration> {
    if best_of == 0 {
        return Vec::new();
    }
    raw.chunks_exact(best_of)
        .filter_map(|chunk| chunk.iter().min().copied())
        .collect()
}

// ============================================================================
// Runner
// ============================================================================

/// Executes candidates serially, one measured call at a time.
#[derive(Clone, Debug)]
pub struct TrialRunner {
    config: TimingConfig,
}

impl TrialRunner {
    pub fn new(config: TimingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Measure `candidate` with `args`.
    ///
    /// Returns exactly `num_trials / best_of` robust samples. The first
    /// failing call (returned error or panic) aborts the run.
    pub fn run(
        &self,
        candidate: &Candidate,
        args: &Arguments,
    ) -> Result<TrialSamples, CandidateFailure> {
        let config = &self.config;

        let global_pin = (config.pin_strategy == PinStrategy::Global).then(CpuPinGuard::new);
        if let Some(guard) = &global_pin {
            if !guard.is_pinned() {
                warn!(candidate = candidate.name(), "CPU pinning unavailable, timing unpinned");
            }
        }

        for _ in 0..config.warmup_iterations {
            let call = candidate.prepare(args)?;
            timed_call(call)?;
        }

        let mut raw = Vec::with_capacity(config.num_trials);
        for _ in 0..config.num_trials {
            let call = candidate.prepare(args)?;
            let _per_exec_pin =
                (config.pin_strategy == PinStrategy::PerExecution).then(CpuPinGuard::new);
            raw.push(timed_call(call)?);
        }

        let samples = TrialSamples::from_raw(raw, config.best_of);
        debug!(
            candidate = candidate.name(),
            raw = samples.raw.len(),
            robust = samples.robust.len(),
            "trial run complete"
        );
        Ok(samples)
    }
}

/// Time exactly the prepared call. Panics are turned into failures.
///
/// `call` is dropped after the clock stops.
fn timed_call(mut call: PreparedCall) -> Result<Duration, CandidateFailure> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| crate::measure!(call.call())));
    drop(call);
    match outcome {
        Ok((elapsed, Ok(()))) => Ok(elapsed),
        Ok((_, Err(failure))) => Err(failure),
        Err(payload) => Err(CandidateFailure::new(format!(
            "candidate panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
