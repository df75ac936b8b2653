//! Duplicate reconciliation: at most one record per course code.
//!
//! A grade sheet may list the same course several times: the original
//! attempt plus RP/RT-marked retakes, or the same row twice because of text
//! extraction noise. Candidates are folded into a [`CourseMap`] as they are
//! produced, with retakes taking priority over originals and the best retake
//! winning among retakes.

use crate::output::CourseRecord;
use std::collections::HashMap;
use tracing::debug;

/// What [`CourseMap::handle_duplicate`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First record for this code.
    Inserted,
    /// The candidate displaced the existing record.
    Replaced,
    /// The existing record was kept; the candidate was dropped.
    Kept,
}

/// Records keyed by course code, remembering first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CourseMap {
    records: Vec<CourseRecord>,
    index: HashMap<String, usize>,
}

impl CourseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, course_code: &str) -> Option<&CourseRecord> {
        self.index.get(course_code).map(|&i| &self.records[i])
    }

    /// Fold `candidate` into the map.
    ///
    /// | existing | candidate | result |
    /// |----------|-----------|--------|
    /// | none     | any       | insert |
    /// | original | retake    | replace |
    /// | retake   | original  | keep |
    /// | retake   | retake    | higher grade points, ties keep existing |
    /// | original | original  | keep first |
    pub fn handle_duplicate(&mut self, candidate: CourseRecord) -> MergeOutcome {
        let Some(&slot) = self.index.get(&candidate.course_code) else {
            self.index
                .insert(candidate.course_code.clone(), self.records.len());
            self.records.push(candidate);
            return MergeOutcome::Inserted;
        };

        let existing = &self.records[slot];
        let replace = match (existing.is_retake(), candidate.is_retake()) {
            (false, true) => true,
            (true, true) => candidate.grade_points > existing.grade_points,
            (true, false) | (false, false) => false,
        };

        if replace {
            debug!(
                "{}: replacing {:.2} with {:.2} (retake={})",
                candidate.course_code,
                existing.grade_points,
                candidate.grade_points,
                candidate.is_retake()
            );
            self.records[slot] = candidate;
            MergeOutcome::Replaced
        } else {
            debug!("{}: keeping existing record", candidate.course_code);
            MergeOutcome::Kept
        }
    }

    pub fn into_records(self) -> Vec<CourseRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RetakeType;

    fn original(gp: f64) -> CourseRecord {
        CourseRecord::extracted("CSE110", 3.0, gp, None, false)
    }

    fn retake(gp: f64) -> CourseRecord {
        CourseRecord::extracted("CSE110", 3.0, gp, Some(RetakeType::Rp), false)
    }

    fn fold(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
        let mut map = CourseMap::new();
        for r in records {
            map.handle_duplicate(r);
        }
        map.into_records()
    }

    #[test]
    fn retake_beats_original_in_either_order() {
        let a = fold(vec![original(2.0), retake(3.7)]);
        let b = fold(vec![retake(3.7), original(2.0)]);
        assert_eq!(a, vec![retake(3.7)]);
        assert_eq!(b, vec![retake(3.7)]);
    }

    #[test]
    fn best_retake_wins_in_either_order() {
        assert_eq!(fold(vec![retake(3.0), retake(3.7)]), vec![retake(3.7)]);
        assert_eq!(fold(vec![retake(3.7), retake(3.0)]), vec![retake(3.7)]);
    }

    #[test]
    fn retake_tie_keeps_existing() {
        let mut first = retake(3.0);
        first.retake = Some(RetakeType::Rt);
        let mut map = CourseMap::new();
        map.handle_duplicate(first.clone());
        assert_eq!(map.handle_duplicate(retake(3.0)), MergeOutcome::Kept);
        assert_eq!(map.into_records(), vec![first]);
    }

    #[test]
    fn duplicate_originals_keep_first() {
        assert_eq!(fold(vec![original(2.0), original(4.0)]), vec![original(2.0)]);
    }

    #[test]
    fn same_candidate_twice_is_idempotent() {
        assert_eq!(fold(vec![original(3.3), original(3.3)]), fold(vec![original(3.3)]));
        assert_eq!(fold(vec![retake(3.3), retake(3.3)]), fold(vec![retake(3.3)]));
    }

    #[test]
    fn first_seen_order_preserved() {
        let recs = fold(vec![
            CourseRecord::extracted("MAT110", 3.0, 3.3, None, false),
            CourseRecord::extracted("CSE110", 3.0, 4.0, None, false),
            CourseRecord::extracted("MAT110", 3.0, 4.0, Some(RetakeType::Rt), false),
        ]);
        let codes: Vec<_> = recs.iter().map(|r| r.course_code.as_str()).collect();
        assert_eq!(codes, vec!["MAT110", "CSE110"]);
        assert_eq!(recs[0].grade_points, 4.0);
    }
}
