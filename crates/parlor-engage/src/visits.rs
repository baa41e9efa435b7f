//! Per-user bounded visit history.
//!
//! Append-only, deduplicated, capped at MAX_VISITS entries. Stored oldest
//! first; eviction pops from the front. A deque holds the ordered visits and
//! a set index keeps the duplicate check O(1).

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parlor_types::Visit;

/// Maximum visits retained per user. Older entries are evicted first.
pub const MAX_VISITS: usize = 100;

#[derive(Debug, Default)]
pub struct VisitHistory {
    visits: VecDeque<Visit>,
    seen: HashSet<Uuid>,
}

impl VisitHistory {
    pub fn new() -> Self {
        Self {
            visits: VecDeque::with_capacity(MAX_VISITS),
            seen: HashSet::with_capacity(MAX_VISITS),
        }
    }

    /// Record a visit. Returns true if a new entry was appended.
    ///
    /// A convo already present anywhere in the history is a full no-op: no
    /// timestamp refresh, no reordering. Revisiting therefore does NOT move
    /// a convo toward the front of `visited()` — recency reflects first
    /// visit, not last.
    pub fn visit(&mut self, convo_id: Uuid, at: DateTime<Utc>) -> bool {
        if !self.seen.insert(convo_id) {
            return false;
        }
        self.visits.push_back(Visit {
            convo_id,
            visited_at: at,
        });
        while self.visits.len() > MAX_VISITS {
            if let Some(evicted) = self.visits.pop_front() {
                self.seen.remove(&evicted.convo_id);
            }
        }
        true
    }

    /// Timestamp of the stored visit for `convo_id`, if any. An evicted
    /// visit is indistinguishable from never-visited, by design.
    pub fn last_visit_time(&self, convo_id: Uuid) -> Option<DateTime<Utc>> {
        if !self.seen.contains(&convo_id) {
            return None;
        }
        self.visits
            .iter()
            .find(|v| v.convo_id == convo_id)
            .map(|v| v.visited_at)
    }

    /// Visits most-recently-visited first (reverse of insertion order).
    pub fn visited(&self) -> impl Iterator<Item = &Visit> {
        self.visits.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_revisit_is_noop() {
        let mut history = VisitHistory::new();
        let convo = Uuid::new_v4();

        assert!(history.visit(convo, ts(10)));
        assert!(!history.visit(convo, ts(20)));

        assert_eq!(history.len(), 1);
        // the original timestamp survives the revisit
        assert_eq!(history.last_visit_time(convo), Some(ts(10)));
    }

    #[test]
    fn test_capacity_bound_and_eviction_order() {
        let mut history = VisitHistory::new();
        let convos: Vec<Uuid> = (0..101).map(|_| Uuid::new_v4()).collect();
        for (i, convo) in convos.iter().enumerate() {
            history.visit(*convo, ts(i as i64));
        }

        assert_eq!(history.len(), MAX_VISITS);
        // oldest entry pushed out
        assert_eq!(history.last_visit_time(convos[0]), None);
        assert!(history.last_visit_time(convos[1]).is_some());

        // most recent first, i.e. convos[100] down to convos[1]
        let order: Vec<Uuid> = history.visited().map(|v| v.convo_id).collect();
        let expected: Vec<Uuid> = convos[1..].iter().rev().copied().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_evicted_convo_can_be_visited_again() {
        let mut history = VisitHistory::new();
        let first = Uuid::new_v4();
        history.visit(first, ts(0));
        for i in 0..MAX_VISITS {
            history.visit(Uuid::new_v4(), ts(1 + i as i64));
        }
        assert_eq!(history.last_visit_time(first), None);

        // eviction cleared the dedup index too, so this appends
        assert!(history.visit(first, ts(500)));
        assert_eq!(history.last_visit_time(first), Some(ts(500)));
        assert_eq!(history.len(), MAX_VISITS);
    }

    #[test]
    fn test_visited_reflects_first_visit_order() {
        let mut history = VisitHistory::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        history.visit(a, ts(1));
        history.visit(b, ts(2));
        history.visit(c, ts(3));

        // revisiting a does not move it to the front
        history.visit(a, ts(4));
        let order: Vec<Uuid> = history.visited().map(|v| v.convo_id).collect();
        assert_eq!(order, vec![c, b, a]);
    }
}
