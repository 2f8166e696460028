//! Utility modules for benchmarking and execution.

pub mod cpu_affinity;
pub mod stats;
pub mod timer;
pub mod tui;

// Re-export commonly used items
pub use cpu_affinity::CpuPinGuard;
pub use stats::{Aggregator, ConfigStats, Group, SampleRecord};
pub use timer::{PinStrategy, TimingConfig, TrialRunner, TrialSamples};

/// Information about an implementation variant.
/// Generic over F which is the function signature.
pub struct VariantInfo<F> {
    /// Unique identifier for this variant (e.g., "original", "labeled_break")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// The specific implementation function
    pub function: F,
}
