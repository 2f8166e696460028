//! Benchmark report: the long-form time table and the ranking summary.
//!
//! Both tables are plain data meant for an external renderer; CSV and JSON
//! export live here because every renderer wants them.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::grid::Configuration;
use crate::rating::RatingState;
use crate::utils::stats::{Group, SampleRecord};

/// Statistic carried by a long-form row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatistic {
    /// One robust sample (seconds)
    Time,
    Min,
    Mean,
    MinSpeedup,
    MeanSpeedup,
}

impl RowStatistic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Min => "min",
            Self::Mean => "mean",
            Self::MinSpeedup => "min_speedup",
            Self::MeanSpeedup => "mean_speedup",
        }
    }
}

/// One long-form row: `{configuration..., candidate, statistic, value}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRow {
    pub configuration: Configuration,
    pub derived: Configuration,
    pub candidate: String,
    pub statistic: RowStatistic,
    pub value: f64,
}

/// One line of the ranking summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub candidate: String,
    pub mu: f64,
    pub sigma: f64,
    pub ordinal: f64,
    pub win_probability: f64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub num_trials: usize,
    pub best_of: usize,
    /// Long-form table
    pub rows: Vec<TimeRow>,
    /// Per-group statistics and rankings, in processing order
    pub groups: Vec<Group>,
    /// Final rating state
    pub ratings: RatingState,
    /// Ranking summary, highest win probability first
    pub rankings: Vec<RankingRow>,
}

impl BenchReport {
    /// Fastest candidate overall
    pub fn winner(&self) -> Option<&RankingRow> {
        self.rankings.first()
    }

    pub fn rows_for(&self, statistic: RowStatistic) -> impl Iterator<Item = &TimeRow> {
        self.rows.iter().filter(move |row| row.statistic == statistic)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Build the long-form table.
///
/// With `record_all`, every robust sample becomes a `time` row; summary and
/// speedup rows follow for every (candidate, configuration).
pub fn long_form(records: &[SampleRecord], groups: &[Group], record_all: bool) -> Vec<TimeRow> {
    let mut rows = Vec::new();

    if record_all {
        for record in records {
            for sample in &record.samples.robust {
                rows.push(TimeRow {
                    configuration: record.configuration.clone(),
                    derived: record.derived.clone(),
                    candidate: record.candidate.clone(),
                    statistic: RowStatistic::Time,
                    value: sample.as_secs_f64(),
                });
            }
        }
    }

    for entry in groups.iter().flat_map(|g| &g.entries) {
        for (statistic, value) in [
            (RowStatistic::Min, entry.stats.min),
            (RowStatistic::Mean, entry.stats.mean),
            (RowStatistic::MinSpeedup, entry.min_speedup),
            (RowStatistic::MeanSpeedup, entry.mean_speedup),
        ] {
            rows.push(TimeRow {
                configuration: entry.configuration.clone(),
                derived: entry.derived.clone(),
                candidate: entry.candidate.clone(),
                statistic,
                value,
            });
        }
    }

    rows
}

/// Ranking summary sorted by descending win probability; ties keep state order.
pub fn ranking_table(state: &RatingState, win: &[(String, f64)]) -> Vec<RankingRow> {
    let mut rows: Vec<RankingRow> = state
        .iter()
        .map(|(name, rating)| RankingRow {
            candidate: name.to_string(),
            mu: rating.mu,
            sigma: rating.sigma,
            ordinal: rating.ordinal(),
            win_probability: win
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, p)| *p)
                .unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| b.win_probability.total_cmp(&a.win_probability));
    rows
}

/// Export the long-form table to a CSV file.
///
/// Columns: every configuration and derived name in first-seen order, then
/// `candidate,statistic,value`. Missing cells are left empty.
pub fn export_csv(path: impl AsRef<Path>, rows: &[TimeRow]) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_csv(&mut file, rows)?;
    file.flush()
}

pub fn write_csv<W: Write>(out: &mut W, rows: &[TimeRow]) -> std::io::Result<()> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for (name, _) in row.configuration.iter().chain(row.derived.iter()) {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
    }

    let mut header: Vec<String> = columns.iter().map(|c| csv_field(c)).collect();
    header.extend(["candidate", "statistic", "value"].map(String::from));
    writeln!(out, "{}", header.join(","))?;

    for row in rows {
        let mut fields: Vec<String> = columns
            .iter()
            .map(|c| {
                row.configuration
                    .get(c)
                    .or_else(|| row.derived.get(c))
                    .map(|v| csv_field(&v.to_string()))
                    .unwrap_or_default()
            })
            .collect();
        fields.push(csv_field(&row.candidate));
        fields.push(row.statistic.as_str().to_string());
        fields.push(row.value.to_string());
        writeln!(out, "{}", fields.join(","))?;
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
