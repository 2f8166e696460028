//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI.

use crate::grid::Axes;
use crate::registry::{Suite, SuiteRegistry};
use crate::report::{BenchReport, RankingRow};
use crate::utils::stats::Group;
use terminal_size::{terminal_size, Width};

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Human-readable duration from seconds
pub fn format_seconds(secs: f64) -> String {
    if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else if secs >= 1e-6 {
        format!("{:.3} µs", secs * 1e6)
    } else {
        format!("{:.1} ns", secs * 1e9)
    }
}

/// Lines of the suite info box; methods and axes come from `axes`
fn suite_info_lines(suite: &dyn Suite, axes: &Axes) -> [String; 5] {
    let methods = axes.method_names().unwrap_or_default().join(", ");
    [
        format!("Suite:     {}", suite.name()),
        format!("Category:  {}", suite.category()),
        suite.description().to_string(),
        format!("Methods:   {}", methods),
        format!(
            "Axes:      {} ({} configurations)",
            axes.names().join(" × "),
            axes.grid_size().unwrap_or(0)
        ),
    ]
}

/// Print suite info box for the grid actually being run
pub fn print_suite_info_box(suite: &dyn Suite, axes: &Axes) {
    let term_width = get_term_width();
    let max_content_width = term_width.saturating_sub(4).max(40);

    let lines = suite_info_lines(suite, axes);

    let content_width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(60)
        .min(max_content_width);
    let border = "─".repeat(content_width + 2);

    println!("┌{}┐", border);
    for (i, line) in lines.iter().enumerate() {
        if i == 3 {
            println!("├{}┤", border);
        }
        println!(
            "│ {:<width$} │",
            truncate(line, content_width),
            width = content_width
        );
    }
    println!("└{}┘", border);
    println!();
}

/// Print per-group statistics: one block per group, entries fastest first
pub fn print_statistics_table(groups: &[Group]) {
    let term_width = get_term_width();
    let fixed_width = 50;
    let name_col_width = term_width.saturating_sub(fixed_width).max(15);
    let table_width = name_col_width + 48;

    for group in groups {
        let title = if group.key.is_empty() {
            "(all)".to_string()
        } else {
            group.key.to_string()
        };
        println!("  {}", truncate(&title, table_width));
        println!("  {}", "─".repeat(table_width));
        println!(
            "  {:<n_width$} {:>12} {:>12} {:>10} {:>10}",
            "Candidate",
            "Min",
            "Mean",
            "Min x",
            "Mean x",
            n_width = name_col_width
        );
        println!("  {}", "─".repeat(table_width));

        for name in group.ranking.placements() {
            let Some(entry) = group.entry(name) else {
                continue;
            };
            println!(
                "  {:<n_width$} {:>12} {:>12} {:>9.2}x {:>9.2}x",
                truncate(&entry.candidate, name_col_width),
                format_seconds(entry.stats.min),
                format_seconds(entry.stats.mean),
                entry.min_speedup,
                entry.mean_speedup,
                n_width = name_col_width
            );
        }
        println!();
    }
}

/// Print the final ranking summary
pub fn print_rankings_table(rows: &[RankingRow]) {
    if rows.is_empty() {
        return;
    }

    let term_width = get_term_width();
    let name_col_width = term_width.saturating_sub(56).max(15);
    let table_width = name_col_width + 52;

    println!("  Rankings");
    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:>4} {:<n_width$} {:>10} {:>10} {:>10} {:>12}",
        "#",
        "Candidate",
        "Mu",
        "Sigma",
        "Ordinal",
        "P(win)",
        n_width = name_col_width
    );
    println!("  {}", "─".repeat(table_width));
    for (i, row) in rows.iter().enumerate() {
        println!(
            "  {:>4} {:<n_width$} {:>10.3} {:>10.3} {:>10.3} {:>11.2}%",
            i + 1,
            truncate(&row.candidate, name_col_width),
            row.mu,
            row.sigma,
            row.ordinal,
            row.win_probability * 100.0,
            n_width = name_col_width
        );
    }
    println!();
}

/// Print a whole report; `summary` skips the per-group tables
pub fn print_report(report: &BenchReport, summary: bool) {
    println!(
        "  {} trials, best of {} ({} robust samples per configuration)",
        report.num_trials,
        report.best_of,
        report.num_trials / report.best_of.max(1)
    );
    println!();
    if !summary {
        print_statistics_table(&report.groups);
    }
    print_rankings_table(&report.rankings);
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " rankbench ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!(
        "║{}{}{}║",
        " ".repeat(padding),
        title,
        " ".repeat(right_padding)
    );
    println!("╚{}╝", border);
    println!();
}

/// Print the list of available suites
pub fn print_available_suites(registry: &SuiteRegistry) {
    println!("Available suites:");
    println!();
    for suite in registry.all() {
        println!(
            "  {:<20} [{}] - {}",
            suite.name(),
            suite.category(),
            suite.description()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_long_candidate_name", 10), "a_long_...");
        assert_eq!(truncate("µµµµµ", 5), "µµµµµ");
    }

    #[test]
    fn test_info_box_describes_given_axes() {
        let suite = crate::sorting::small_sort::SmallSortSuite;
        let axes = Axes::new()
            .with_methods(["unstable"])
            .with_axis("len", [16i64])
            .with_axis("order", ["sorted"]);
        let lines = suite_info_lines(&suite, &axes);
        assert_eq!(lines[3], "Methods:   unstable");
        assert_eq!(lines[4], "Axes:      method × len × order (1 configurations)");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2.5), "2.500 s");
        assert_eq!(format_seconds(0.0025), "2.500 ms");
        assert_eq!(format_seconds(2.5e-6), "2.500 µs");
        assert_eq!(format_seconds(2.5e-9), "2.5 ns");
    }
}
