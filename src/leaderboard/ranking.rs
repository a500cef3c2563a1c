use std::cmp::Ordering;

use serde::Serialize;

use super::aggregate::ChampionScoreSummary;
use crate::records::ChampionKey;

/// Leaderboard order. Identified champions come before the unassigned
/// bucket, then higher score, then more closed actions, then label
/// (case-insensitive, then exact), then identity key. Distinct identities
/// never compare equal.
pub fn compare_summaries(a: &ChampionScoreSummary, b: &ChampionScoreSummary) -> Ordering {
    a.is_unassigned()
        .cmp(&b.is_unassigned())
        .then_with(|| b.total_score.cmp(&a.total_score))
        .then_with(|| b.actions_closed.cmp(&a.actions_closed))
        .then_with(|| {
            a.champion
                .label
                .to_lowercase()
                .cmp(&b.champion.label.to_lowercase())
        })
        .then_with(|| a.champion.label.cmp(&b.champion.label))
        .then_with(|| a.champion.key.cmp(&b.champion.key))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedChampion {
    /// 1-based leaderboard position.
    pub position: usize,
    #[serde(flatten)]
    pub summary: ChampionScoreSummary,
}

pub fn rank(mut summaries: Vec<ChampionScoreSummary>) -> Vec<RankedChampion> {
    summaries.sort_by(compare_summaries);
    summaries
        .into_iter()
        .enumerate()
        .map(|(i, summary)| RankedChampion {
            position: i + 1,
            summary,
        })
        .collect()
}

/// Look up a champion by identity key ("id:7", "label:Kim", "unassigned"),
/// bare id, or label (case-insensitive). Ids win over labels.
pub fn find_champion<'a>(ranking: &'a [RankedChampion], query: &str) -> Option<&'a RankedChampion> {
    let query = query.trim();
    ranking
        .iter()
        .find(|r| {
            let key = &r.summary.champion.key;
            key.to_string() == query || matches!(key, ChampionKey::Id(id) if id == query)
        })
        .or_else(|| {
            let wanted = query.to_lowercase();
            ranking
                .iter()
                .find(|r| r.summary.champion.label.to_lowercase() == wanted)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ChampionRef;
    use pretty_assertions::assert_eq;

    fn summary(key: ChampionKey, label: &str, score: i64, closed: u32) -> ChampionScoreSummary {
        ChampionScoreSummary {
            champion: ChampionRef {
                key,
                label: label.to_string(),
            },
            total_score: score,
            created_points: 0,
            closed_points: 0,
            on_time_bonus: 0,
            late_penalty: 0,
            aging_penalty: 0,
            analysis_points: 0,
            actions_total: closed,
            actions_closed: closed,
            actions_late: 0,
            analyses_open: 0,
            analyses_closed: 0,
            closed_5why: 0,
            closed_a3: 0,
            closed_8d: 0,
        }
    }

    fn id(s: &str) -> ChampionKey {
        ChampionKey::Id(s.to_string())
    }

    fn labels(ranked: &[RankedChampion]) -> Vec<&str> {
        ranked
            .iter()
            .map(|r| r.summary.champion.label.as_str())
            .collect()
    }

    #[test]
    fn test_rank_by_score_then_closed_count() {
        let ranked = rank(vec![
            summary(id("1"), "Alex", 5, 1),
            summary(id("2"), "Kim", 9, 0),
            summary(id("3"), "Sam", 5, 3),
        ]);
        assert_eq!(labels(&ranked), vec!["Kim", "Sam", "Alex"]);
        assert_eq!(
            ranked.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_equal_score_and_closed_resolve_by_label_case_insensitive() {
        let ranked = rank(vec![
            summary(id("1"), "bob", 4, 2),
            summary(id("2"), "Alice", 4, 2),
            summary(id("3"), "carol", 4, 2),
        ]);
        assert_eq!(labels(&ranked), vec!["Alice", "bob", "carol"]);
    }

    #[test]
    fn test_unassigned_always_last() {
        let ranked = rank(vec![
            summary(ChampionKey::Unassigned, "Unassigned", 100, 10),
            summary(id("1"), "Alex", -5, 0),
        ]);
        assert_eq!(labels(&ranked), vec!["Alex", "Unassigned"]);
    }

    #[test]
    fn test_identical_labels_are_still_strictly_ordered() {
        let a = summary(id("1"), "Alex", 3, 1);
        let b = summary(id("2"), "Alex", 3, 1);
        let c = summary(ChampionKey::Label("alex".to_string()), "alex", 3, 1);

        assert_eq!(compare_summaries(&a, &b), Ordering::Less);
        assert_eq!(compare_summaries(&b, &a), Ordering::Greater);
        assert_ne!(compare_summaries(&a, &c), Ordering::Equal);

        let forward = rank(vec![a.clone(), b.clone(), c.clone()]);
        let backward = rank(vec![c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_find_champion() {
        let ranked = rank(vec![
            summary(id("7"), "Kim Lee", 4, 1),
            summary(ChampionKey::Label("7".to_string()), "7", 2, 0),
            summary(ChampionKey::Unassigned, "Unassigned", 1, 0),
        ]);

        let by_id = find_champion(&ranked, "7").unwrap();
        assert_eq!(by_id.summary.champion.label, "Kim Lee");
        let by_key = find_champion(&ranked, "label:7").unwrap();
        assert_eq!(by_key.position, 2);
        let by_label = find_champion(&ranked, "kim lee").unwrap();
        assert_eq!(by_label.position, 1);
        assert!(find_champion(&ranked, "unassigned").unwrap().summary.is_unassigned());
        assert!(find_champion(&ranked, "nobody").is_none());
    }
}
