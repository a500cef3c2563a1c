pub mod formatter;

pub use formatter::{
    format_champion_detail, format_json, format_ledger_table, format_ledger_tsv, format_points,
    format_ranking_table, format_ranking_tsv, should_use_colors, OutputFormat,
};
