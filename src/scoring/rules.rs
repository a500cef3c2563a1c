//! The fixed point-rule table.
//!
//! Rule codes are part of the audit ledger and must stay stable.

use crate::records::AnalysisType;

pub const ACT_CREATE: &str = "ACT_CREATE";
pub const ACT_CLOSE_BASE: &str = "ACT_CLOSE_BASE";
pub const ACT_ON_TIME_BONUS: &str = "ACT_ON_TIME_BONUS";
pub const ACT_LATE_PENALTY: &str = "ACT_LATE_PENALTY";
pub const PEN_ACT_LATE_14D: &str = "PEN_ACT_LATE_14D";
pub const PEN_ACT_LATE_30D: &str = "PEN_ACT_LATE_30D";
pub const PEN_OPEN_ANALYSIS_30D: &str = "PEN_OPEN_ANALYSIS_30D";
pub const PEN_OPEN_ANALYSIS_90D: &str = "PEN_OPEN_ANALYSIS_90D";

pub const ACT_CREATE_POINTS: i64 = 1;
pub const ACT_CLOSE_BASE_POINTS: i64 = 3;
pub const ACT_ON_TIME_BONUS_POINTS: i64 = 2;
pub const ACT_LATE_PENALTY_POINTS: i64 = -2;

/// Flat action aging: (threshold in days, rule code, points). Each fires at
/// most once and they stack.
pub const ACTION_AGING_STEPS: [(i64, &str, i64); 2] = [
    (14, PEN_ACT_LATE_14D, -1),
    (30, PEN_ACT_LATE_30D, -3),
];

/// Periodic open-analysis aging: (threshold in days, rule code, points per
/// started period). Both tiers fire once past 90 days.
pub const ANALYSIS_AGING_TIERS: [(i64, &str, i64); 2] = [
    (30, PEN_OPEN_ANALYSIS_30D, -2),
    (90, PEN_OPEN_ANALYSIS_90D, -5),
];
pub const ANALYSIS_AGING_PERIOD_DAYS: i64 = 30;

/// Prefix shared by every aging-penalty rule code.
pub const AGING_CODE_PREFIX: &str = "PEN_";
/// Prefix of the synthetic item id carried by aging-penalty events.
pub const AGING_ITEM_PREFIX: &str = "aging:";
/// Prefix shared by every analysis rule code.
pub const ANALYSIS_CODE_PREFIX: &str = "AN_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisPoints {
    pub close_base: i64,
    pub on_time_bonus: i64,
    pub sla_days: i64,
}

pub fn analysis_points(analysis_type: AnalysisType) -> AnalysisPoints {
    match analysis_type {
        AnalysisType::FiveWhy => AnalysisPoints {
            close_base: 5,
            on_time_bonus: 2,
            sla_days: 14,
        },
        AnalysisType::A3 => AnalysisPoints {
            close_base: 8,
            on_time_bonus: 3,
            sla_days: 30,
        },
        AnalysisType::EightD => AnalysisPoints {
            close_base: 10,
            on_time_bonus: 5,
            sla_days: 45,
        },
    }
}

pub fn analysis_close_code(analysis_type: AnalysisType) -> String {
    format!("AN_{}_CLOSE_BASE", analysis_type.code())
}

pub fn analysis_on_time_code(analysis_type: AnalysisType) -> String {
    format!("AN_{}_ON_TIME_BONUS", analysis_type.code())
}

/// True for the action on-time bonus and every analysis SLA bonus.
pub fn is_on_time_code(code: &str) -> bool {
    code == ACT_ON_TIME_BONUS
        || (code.starts_with(ANALYSIS_CODE_PREFIX) && code.ends_with("_ON_TIME_BONUS"))
}

/// Which rule families are active. The action-only variant is the full
/// rule set with analysis rules disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub analyses_enabled: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            analyses_enabled: true,
        }
    }
}

impl RuleSet {
    pub fn actions_only() -> Self {
        Self {
            analyses_enabled: false,
        }
    }
}
