use std::io::IsTerminal;
use owo_colors::OwoColorize;

use super::merge::ScoreStats;
use crate::scoring::ScoreBreakdown;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with one decimal place (87.26 -> "87.3")
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Score with a traffic-light color: green from 70, yellow from 40, red below
fn colored_score(score: f64, use_colors: bool) -> String {
    let text = format_score(score);
    if !use_colors {
        return text;
    }
    if score >= 70.0 {
        text.green().to_string()
    } else if score >= 40.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// One-line result of a `rate` lookup: "Project 1234: 87.3/100"
pub fn format_rating(id: u64, score: f64, use_colors: bool) -> String {
    if use_colors {
        format!("Project {}: {}/100", id.bold(), colored_score(score, true))
    } else {
        format!("Project {}: {}/100", id, format_score(score))
    }
}

/// Per-criterion table for verbose output.
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines: Vec<String> = breakdown
        .criteria
        .iter()
        .map(|c| {
            format!(
                "  {:<18} {:>5} x {:.2} = {:>5.2}",
                c.criterion.label(),
                format_score(c.score),
                c.criterion.weight(),
                c.contribution()
            )
        })
        .collect();
    lines.push(format!(
        "  {:<18} {}",
        "Total",
        colored_score(breakdown.total, use_colors)
    ));
    lines.join("\n")
}

/// Summary printed after a shard run
pub fn format_shard_summary(projects: usize, skipped: usize, shards: usize, dir: &str) -> String {
    let mut out = format!("Wrote {} projects into {} shards in {}", projects, shards, dir);
    if skipped > 0 {
        out.push_str(&format!(" ({} rows without a numeric ID skipped)", skipped));
    }
    out
}

/// Score statistics printed after a merge
pub fn format_stats(stats: Option<&ScoreStats>, use_colors: bool) -> String {
    let Some(stats) = stats else {
        return "No scored projects found.".to_string();
    };
    let title = if use_colors {
        "Score statistics:".bold().to_string()
    } else {
        "Score statistics:".to_string()
    };
    format!(
        "{}\n  Projects with scores: {}\n  Average score: {:.2}\n  Min score: {:.2}\n  Max score: {:.2}",
        title, stats.count, stats.mean, stats.min, stats.max
    )
}
