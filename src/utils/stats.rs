//! Statistics aggregator.
//!
//! Reduces robust samples into `{min, mean}` per (candidate, configuration),
//! groups candidates compared on the same non-method parameters, computes
//! speedups relative to the slowest member and produces each group's
//! ranking.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use super::timer::TrialSamples;
use crate::error::DegenerateStatisticError;
use crate::grid::{Configuration, METHOD_AXIS};
use crate::rating::Ranking;

/// Default floor applied to a statistic before dividing by it (seconds)
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Samples collected for one (candidate, configuration) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub candidate: String,
    /// Full configuration, `method` included
    pub configuration: Configuration,
    /// Report-only values computed from the configuration
    pub derived: Configuration,
    pub samples: TrialSamples,
}

/// Which summary statistic to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Min,
    Mean,
}

impl Statistic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Mean => "mean",
        }
    }
}

/// Summary of the robust samples of one (candidate, configuration), seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfigStats {
    pub min: f64,
    pub mean: f64,
    pub samples: usize,
}

impl ConfigStats {
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = samples.iter().min()?.as_secs_f64();
        let total: f64 = samples.iter().map(Duration::as_secs_f64).sum();
        Some(Self {
            min,
            mean: total / samples.len() as f64,
            samples: samples.len(),
        })
    }

    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Min => self.min,
            Statistic::Mean => self.mean,
        }
    }
}

/// One candidate's standing inside a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    pub candidate: String,
    pub configuration: Configuration,
    pub derived: Configuration,
    pub stats: ConfigStats,
    pub min_speedup: f64,
    pub mean_speedup: f64,
}

/// Candidates measured under identical non-method parameters: one "match".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    /// Configuration with the `method` axis removed
    pub key: Configuration,
    /// Entries in measurement order
    pub entries: Vec<GroupEntry>,
    /// Candidates fastest first by mean
    pub ranking: Ranking,
}

impl Group {
    fn new(key: Configuration) -> Self {
        Self {
            key,
            entries: Vec::new(),
            ranking: Ranking::default(),
        }
    }

    pub fn entry(&self, candidate: &str) -> Option<&GroupEntry> {
        self.entries.iter().find(|e| e.candidate == candidate)
    }
}

/// Groups records and derives per-group statistics.
#[derive(Debug, Clone)]
pub struct Aggregator {
    epsilon: f64,
    method_order: Vec<String>,
}

impl Aggregator {
    /// `method_order` is the declared method axis; it breaks ranking ties.
    pub fn new(epsilon: f64, method_order: Vec<String>) -> Self {
        Self {
            epsilon,
            method_order,
        }
    }

    /// Summarize and group all records.
    ///
    /// Groups come out in order of first appearance in `records`, which
    /// for enumerated grids is the same on every run.
    pub fn aggregate(
        &self,
        records: &[SampleRecord],
    ) -> Result<Vec<Group>, DegenerateStatisticError> {
        let mut groups: Vec<Group> = Vec::new();

        for record in records {
            let stats = ConfigStats::from_samples(&record.samples.robust).ok_or_else(|| {
                DegenerateStatisticError::NoSamples {
                    candidate: record.candidate.clone(),
                    configuration: record.configuration.key(),
                }
            })?;
            for statistic in [Statistic::Min, Statistic::Mean] {
                let value = stats.get(statistic);
                if !value.is_finite() || value < 0.0 {
                    return Err(DegenerateStatisticError::InvalidValue {
                        candidate: record.candidate.clone(),
                        statistic: statistic.as_str(),
                        value,
                    });
                }
            }

            // Matched on typed values: `1`, `1.0` and `"1"` are distinct groups.
            let key = record.configuration.without(METHOD_AXIS);
            let slot = match groups.iter().position(|g| g.key == key) {
                Some(slot) => slot,
                None => {
                    groups.push(Group::new(key));
                    groups.len() - 1
                }
            };
            groups[slot].entries.push(GroupEntry {
                candidate: record.candidate.clone(),
                configuration: record.configuration.clone(),
                derived: record.derived.clone(),
                stats,
                min_speedup: 1.0,
                mean_speedup: 1.0,
            });
        }

        for group in &mut groups {
            let min_speedups = self.speedups(group, Statistic::Min)?;
            let mean_speedups = self.speedups(group, Statistic::Mean)?;
            for (entry, (min_s, mean_s)) in group
                .entries
                .iter_mut()
                .zip(min_speedups.into_iter().zip(mean_speedups))
            {
                entry.min_speedup = min_s.1;
                entry.mean_speedup = mean_s.1;
            }
            group.ranking = self.rank(&group.entries);
        }

        Ok(groups)
    }

    /// `max(stat over group) / stat(candidate)` per entry, entry order.
    ///
    /// Values below epsilon are floored before the division, so the slowest
    /// candidate gets exactly 1.0 and nothing divides by zero.
    pub fn speedups(
        &self,
        group: &Group,
        statistic: Statistic,
    ) -> Result<Vec<(String, f64)>, DegenerateStatisticError> {
        if group.entries.is_empty() {
            return Err(DegenerateStatisticError::EmptyGroup {
                group: group.key.key(),
            });
        }

        let floored: Vec<f64> = group
            .entries
            .iter()
            .map(|entry| {
                let value = entry.stats.get(statistic);
                if value < self.epsilon {
                    warn!(
                        candidate = %entry.candidate,
                        statistic = statistic.as_str(),
                        value,
                        epsilon = self.epsilon,
                        "statistic below epsilon, flooring"
                    );
                    self.epsilon
                } else {
                    value
                }
            })
            .collect();
        let max = floored.iter().copied().fold(f64::MIN, f64::max);

        Ok(group
            .entries
            .iter()
            .zip(floored)
            .map(|(entry, value)| (entry.candidate.clone(), max / value))
            .collect())
    }

    /// Ascending mean; ties keep declared method order.
    pub fn rank(&self, entries: &[GroupEntry]) -> Ranking {
        let mut order: Vec<&GroupEntry> = entries.iter().collect();
        order.sort_by_key(|entry| self.declared_position(&entry.candidate));
        order.sort_by(|a, b| a.stats.mean.total_cmp(&b.stats.mean));
        Ranking::new(order.into_iter().map(|entry| entry.candidate.clone()))
    }

    fn declared_position(&self, candidate: &str) -> usize {
        self.method_order
            .iter()
            .position(|name| name == candidate)
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ParamValue;

    fn record(method: &str, n: i64, nanos: &[u64]) -> SampleRecord {
        SampleRecord {
            candidate: method.to_string(),
            configuration: Configuration::from_pairs([
                ("method", ParamValue::from(method)),
                ("n", ParamValue::from(n)),
            ]),
            derived: Configuration::new(),
            samples: TrialSamples::from_robust(
                nanos.iter().map(|&v| Duration::from_nanos(v)).collect(),
            ),
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(DEFAULT_EPSILON, vec!["a".into(), "b".into(), "c".into()])
    }

    #[test]
    fn test_config_stats() {
        let samples = [
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ];
        let stats = ConfigStats::from_samples(&samples).unwrap();
        assert!((stats.min - 0.010).abs() < 1e-12);
        assert!((stats.mean - 0.020).abs() < 1e-12);
        assert_eq!(stats.samples, 3);
        assert!(ConfigStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_groups_by_non_method_axes() {
        let records = vec![
            record("a", 1, &[100]),
            record("a", 2, &[100]),
            record("b", 1, &[50]),
            record("b", 2, &[200]),
        ];
        let groups = aggregator().aggregate(&records).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.key(), "n=1");
        assert_eq!(groups[1].key.key(), "n=2");
        assert_eq!(groups[0].ranking.placements(), ["b", "a"]);
        assert_eq!(groups[1].ranking.placements(), ["a", "b"]);
    }

    #[test]
    fn test_same_display_different_type_stays_apart() {
        let mut float_record = record("b", 1, &[50]);
        float_record.configuration.insert("n", 1.0);
        let mut text_record = record("c", 1, &[70]);
        text_record.configuration.insert("n", "1");

        let groups = aggregator()
            .aggregate(&[record("a", 1, &[100]), float_record, text_record])
            .unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.entries.len() == 1));
    }

    #[test]
    fn test_speedup_invariants() {
        let records = vec![
            record("a", 1, &[400, 400]),
            record("b", 1, &[100, 300]),
            record("c", 1, &[100, 100]),
        ];
        let groups = aggregator().aggregate(&records).unwrap();
        let group = &groups[0];

        let slowest = group.entry("a").unwrap();
        assert_eq!(slowest.mean_speedup, 1.0);
        assert_eq!(slowest.min_speedup, 1.0);

        let fastest = group.entry("c").unwrap();
        let best = group
            .entries
            .iter()
            .map(|e| e.mean_speedup)
            .fold(f64::MIN, f64::max);
        assert_eq!(fastest.mean_speedup, best);
        assert!((fastest.mean_speedup - 4.0).abs() < 1e-9);
        assert!((group.entry("b").unwrap().mean_speedup - 2.0).abs() < 1e-9);
        assert!((group.entry("b").unwrap().min_speedup - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_is_floored() {
        let records = vec![record("a", 1, &[0]), record("b", 1, &[1000])];
        let groups = aggregator().aggregate(&records).unwrap();
        let zero = groups[0].entry("a").unwrap();
        assert!(zero.mean_speedup.is_finite());
        assert!((zero.mean_speedup - 1e-6 / DEFAULT_EPSILON).abs() < 1e-3);
        assert_eq!(groups[0].entry("b").unwrap().mean_speedup, 1.0);
    }

    #[test]
    fn test_all_zero_group_is_all_ones() {
        let records = vec![record("a", 1, &[0]), record("b", 1, &[0])];
        let groups = aggregator().aggregate(&records).unwrap();
        assert!(groups[0].entries.iter().all(|e| e.mean_speedup == 1.0));
    }

    #[test]
    fn test_ties_keep_declared_order() {
        let records = vec![
            record("c", 1, &[100]),
            record("a", 1, &[100]),
            record("b", 1, &[100]),
        ];
        let groups = aggregator().aggregate(&records).unwrap();
        assert_eq!(groups[0].ranking.placements(), ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_samples_error() {
        let mut bad = record("a", 1, &[]);
        bad.samples = TrialSamples::default();
        assert!(matches!(
            aggregator().aggregate(&[bad]),
            Err(DegenerateStatisticError::NoSamples { .. })
        ));
    }

    #[test]
    fn test_speedups_empty_group_error() {
        let group = Group::new(Configuration::from_pairs([("n", 1i64)]));
        assert!(matches!(
            aggregator().speedups(&group, Statistic::Mean),
            Err(DegenerateStatisticError::EmptyGroup { .. })
        ));
    }
}
