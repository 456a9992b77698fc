//! Ranking and the week-over-week movement state machine.

use sim_core::{ChartEntity, ChartEntry, Movement};
use std::collections::HashMap;

/// An item eligible for a chart this week, before ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub entity: ChartEntity,
    pub title: String,
    pub artist: String,
    pub is_player: bool,
    pub score: f64,
    pub metric_primary: u64,
    pub metric_secondary: u64,
    /// Whether the item has appeared on any chart before this week.
    pub has_charted: bool,
}

/// Classify a rank change against last week's snapshot.
///
/// Example:
/// assert_eq!(classify_movement(None, 5, false), Movement::New);
/// assert_eq!(classify_movement(Some(8), 5, true), Movement::Up);
pub fn classify_movement(previous_rank: Option<u32>, rank: u32, has_charted: bool) -> Movement {
    match previous_rank {
        None if has_charted => Movement::ReEntry,
        None => Movement::New,
        Some(prev) if rank < prev => Movement::Up,
        Some(prev) if rank > prev => Movement::Down,
        Some(_) => Movement::Stable,
    }
}

/// Build one ranked row, carrying weeks-on-chart and the sticky peak forward
/// from the previous entry for the same item.
pub fn entry_for(rank: u32, candidate: Candidate, previous: Option<&ChartEntry>) -> ChartEntry {
    let previous_rank = previous.map(|p| p.rank);
    ChartEntry {
        rank,
        previous_rank,
        movement: classify_movement(previous_rank, rank, candidate.has_charted),
        weeks_on_chart: previous.map_or(0, |p| p.weeks_on_chart) + 1,
        peak_rank: previous.map_or(rank, |p| p.peak_rank.min(rank)),
        entity: candidate.entity,
        title: candidate.title,
        artist: candidate.artist,
        is_player: candidate.is_player,
        score: candidate.score,
        metric_primary: candidate.metric_primary,
        metric_secondary: candidate.metric_secondary,
    }
}

/// Drop non-positive scores, sort by score descending (ties by entity id
/// ascending), keep the top `limit` and assign dense ranks from 1.
///
/// Deterministic in its inputs: the order of `candidates` does not matter.
pub fn rank_candidates(
    mut candidates: Vec<Candidate>,
    previous: &[ChartEntry],
    limit: usize,
) -> Vec<ChartEntry> {
    candidates.retain(|c| c.score.is_finite() && c.score > 0.0);
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.entity.cmp(&b.entity))
    });
    candidates.truncate(limit);

    let before: HashMap<&ChartEntity, &ChartEntry> =
        previous.iter().map(|e| (&e.entity, e)).collect();
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let prev = before.get(&c.entity).copied();
            entry_for(i as u32 + 1, c, prev)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::SongId;

    fn candidate(id: &str, score: f64, has_charted: bool) -> Candidate {
        Candidate {
            entity: ChartEntity::Song(SongId(id.into())),
            title: id.to_uppercase(),
            artist: "Artist".into(),
            is_player: id == "me",
            score,
            metric_primary: score as u64,
            metric_secondary: 0,
            has_charted,
        }
    }

    fn field(target: f64, has_charted: bool) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = (0..10)
            .map(|i| candidate(&format!("other-{i}"), 100.0 - 10.0 * i as f64, true))
            .collect();
        out.push(candidate("me", target, has_charted));
        out
    }

    fn find<'a>(entries: &'a [ChartEntry], id: &str) -> Option<&'a ChartEntry> {
        entries
            .iter()
            .find(|e| e.entity == ChartEntity::Song(SongId(id.into())))
    }

    #[test]
    fn weeks_and_peak_follow_rank_sequence() {
        let mut previous = Vec::new();
        let mut charted = false;
        let mut seen = Vec::new();
        // Scores that place "me" at rank 10, 3 and 7 against a fixed field.
        for score in [15.0, 85.0, 45.0] {
            let chart = rank_candidates(field(score, charted), &previous, 100);
            let me = find(&chart, "me").cloned().expect("charted");
            seen.push((me.rank, me.weeks_on_chart, me.peak_rank));
            charted = true;
            previous = chart;
        }
        assert_eq!(seen, vec![(10, 1, 10), (3, 2, 3), (7, 3, 3)]);
    }

    #[test]
    fn new_then_reentry() {
        let first = rank_candidates(field(50.0, false), &[], 100);
        assert_eq!(find(&first, "me").map(|e| e.movement), Some(Movement::New));

        let gap = rank_candidates(field(0.0, true), &first, 100);
        assert!(find(&gap, "me").is_none());

        let back = rank_candidates(field(50.0, true), &gap, 100);
        let me = find(&back, "me").cloned().expect("back on chart");
        assert_eq!(me.movement, Movement::ReEntry);
        assert_eq!(me.weeks_on_chart, 1);
        assert_eq!(me.previous_rank, None);
    }

    #[test]
    fn up_down_stable() {
        assert_eq!(classify_movement(Some(5), 5, true), Movement::Stable);
        assert_eq!(classify_movement(Some(5), 9, true), Movement::Down);
        assert_eq!(classify_movement(Some(5), 1, true), Movement::Up);
    }

    #[test]
    fn ties_break_by_id_and_ranks_are_dense() {
        let chart = rank_candidates(
            vec![
                candidate("b", 10.0, false),
                candidate("a", 10.0, false),
                candidate("c", 20.0, false),
                candidate("z", 0.0, false),
                candidate("n", f64::NAN, false),
            ],
            &[],
            100,
        );
        let ids: Vec<_> = chart.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        let ranks: Vec<_> = chart.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn truncates_to_limit() {
        let many: Vec<_> = (0..150)
            .map(|i| candidate(&format!("s{i:03}"), 1000.0 - i as f64, false))
            .collect();
        let chart = rank_candidates(many, &[], 100);
        assert_eq!(chart.len(), 100);
        assert_eq!(chart.last().map(|e| e.rank), Some(100));
    }

    proptest! {
        #[test]
        fn ranking_is_idempotent_and_order_free(scores in proptest::collection::vec(0.0f64..500.0, 0..40)) {
            let items: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| candidate(&format!("s{i:02}"), s.floor(), i % 2 == 0))
                .collect();
            let mut reversed = items.clone();
            reversed.reverse();
            let once = rank_candidates(items.clone(), &[], 100);
            let twice = rank_candidates(items, &[], 100);
            let flipped = rank_candidates(reversed, &[], 100);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(&once, &flipped);
            for (i, e) in once.iter().enumerate() {
                prop_assert_eq!(e.rank, i as u32 + 1);
                prop_assert!(e.peak_rank <= e.rank);
            }
        }
    }
}
