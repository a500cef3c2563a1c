use std::io::IsTerminal;
use std::str::FromStr;

use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::error::ScoreError;
use crate::leaderboard::RankedChampion;
use crate::ledger::{ItemScore, ScoreEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ScoreError::UnsupportedMode {
                kind: "output format",
                value: s.to_string(),
                expected: "table, tsv, json",
            }),
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Signed point value: "+3", "-2", "0"
pub fn format_points(points: i64) -> String {
    if points > 0 {
        format!("+{}", points)
    } else {
        points.to_string()
    }
}

fn colored_points(points: i64, width: usize, use_colors: bool) -> String {
    let padded = format!("{:>width$}", format_points(points), width = width);
    if !use_colors {
        padded
    } else if points > 0 {
        padded.green().to_string()
    } else if points < 0 {
        padded.red().to_string()
    } else {
        padded.dimmed().to_string()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn fit_to_terminal(text: &str, fixed_width: usize) -> String {
    match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => truncate_text(text, width - fixed_width),
        // Very narrow terminal
        Some(_) => truncate_text(text, 20),
        None => text.to_string(),
    }
}

/// Leaderboard table: position, score, closed/total actions, late
/// actions, champion. No headers.
pub fn format_ranking_table(ranking: &[RankedChampion], use_colors: bool) -> String {
    if ranking.is_empty() {
        return "No champions found.".to_string();
    }

    let score_width = 6;
    let counts_width = 7;
    let separator = "  ";

    ranking
        .iter()
        .map(|ranked| {
            let s = &ranked.summary;
            let index_str = format!("{:>2}.", ranked.position);
            let score_str = colored_points(s.total_score, score_width, use_colors);
            let counts = format!(
                "{:>width$}",
                format!("{}/{}", s.actions_closed, s.actions_total),
                width = counts_width
            );
            let late = if s.actions_late > 0 {
                format!("{} late", s.actions_late)
            } else {
                String::new()
            };
            let late = format!("{:<7}", late);

            let fixed_width = 3 + 1 + score_width + counts_width + 7 + separator.len() * 3;
            let label = fit_to_terminal(&s.champion.label, fixed_width);

            if use_colors {
                let label = if s.is_unassigned() {
                    label.dimmed().to_string()
                } else {
                    label.bold().to_string()
                };
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str,
                    separator,
                    counts,
                    separator,
                    late.yellow(),
                    separator,
                    label
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_str, separator, counts, separator, late, separator, label
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leaderboard as tab-separated values for scripting (no headers, no colors).
/// Columns: position, key, label, total, created, closed, on_time, late,
/// aging, analysis, actions_total, actions_closed, actions_late,
/// analyses_open, analyses_closed
pub fn format_ranking_tsv(ranking: &[RankedChampion]) -> String {
    ranking
        .iter()
        .map(|ranked| {
            let s = &ranked.summary;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                ranked.position,
                s.champion.key,
                s.champion.label,
                s.total_score,
                s.created_points,
                s.closed_points,
                s.on_time_bonus,
                s.late_penalty,
                s.aging_penalty,
                s.analysis_points,
                s.actions_total,
                s.actions_closed,
                s.actions_late,
                s.analyses_open,
                s.analyses_closed
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per ledger event: points, rule code, item, champion, details.
pub fn format_ledger_table(ledger: &[ScoreEvent], use_colors: bool) -> String {
    if ledger.is_empty() {
        return "No score events.".to_string();
    }

    let code_width = ledger
        .iter()
        .map(|e| e.rule_code.chars().count())
        .max()
        .unwrap_or(0);
    let item_width = ledger
        .iter()
        .map(|e| e.item_id.chars().count())
        .max()
        .unwrap_or(0);

    ledger
        .iter()
        .map(|event| {
            let points = colored_points(event.points, 4, use_colors);
            let code = format!("{:<width$}", event.rule_code, width = code_width);
            let item = format!("{:<width$}", event.item_id, width = item_width);
            if use_colors {
                format!(
                    "{}  {}  {}  {}  {}",
                    points,
                    code.cyan(),
                    item,
                    event.champion.label.yellow(),
                    event.details.dimmed()
                )
            } else {
                format!(
                    "{}  {}  {}  {}  {}",
                    points, code, item, event.champion.label, event.details
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Columns: as_of, champion key, item_type, item_id, rule_code, points, details
pub fn format_ledger_tsv(ledger: &[ScoreEvent]) -> String {
    ledger
        .iter()
        .map(|e| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                e.as_of, e.champion.key, e.item_type, e.item_id, e.rule_code, e.points, e.details
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn on_time_marker(on_time: Option<bool>) -> &'static str {
    match on_time {
        Some(true) => "on time",
        Some(false) => "late",
        None => "-",
    }
}

/// Multi-line view of one champion: summary counts then one line per item.
pub fn format_champion_detail(
    ranked: &RankedChampion,
    items: &[&ItemScore],
    use_colors: bool,
) -> String {
    let s = &ranked.summary;
    let header = format!(
        "#{} {} ({})\n  Score: {} (created {}, closed {}, on-time {}, late {}, aging {}, analyses {})\n  Actions: {} total, {} closed, {} late\n  Analyses: {} open, {} closed (5WHY {}, A3 {}, 8D {})",
        ranked.position,
        s.champion.label,
        s.champion.key,
        s.total_score,
        s.created_points,
        s.closed_points,
        s.on_time_bonus,
        s.late_penalty,
        s.aging_penalty,
        s.analysis_points,
        s.actions_total,
        s.actions_closed,
        s.actions_late,
        s.analyses_open,
        s.analyses_closed,
        s.closed_5why,
        s.closed_a3,
        s.closed_8d
    );
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    let item_width = items
        .iter()
        .map(|i| i.item_id.chars().count())
        .max()
        .unwrap_or(0);
    let lines = items.iter().map(|item| {
        let points = colored_points(item.points, 4, use_colors);
        format!(
            "  {}  {:<8}  {:<width$}  {}",
            points,
            item.kind,
            item.item_id,
            on_time_marker(item.on_time),
            width = item_width
        )
    });

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON for any serializable result.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ScoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}
