//! Shared schedule data model: `WeekAssignment`, `Week`, `Schedule`, and the
//! counting helpers C7's objective and the validator both need. Mirrors the
//! nested-dict shape `schedule.py` builds up inside `Scheduler`, but as
//! typed, owned Rust values rather than a single mutable object the whole
//! pipeline mutates in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::roundrobin::Pairing;
use crate::{SlotId, TeamId};

/// level -> team -> season referee tally.
pub type RefCounts = HashMap<String, HashMap<TeamId, u32>>;

/// One level's placement for one week: three index-aligned vectors, one
/// entry per game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAssignment {
    pub slot_vector: Vec<SlotId>,
    pub pairing_vector: Vec<Pairing>,
    pub referee_vector: Vec<TeamId>,
}

impl WeekAssignment {
    pub fn num_games(&self) -> usize {
        self.pairing_vector.len()
    }
}

/// One week's placement across every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub levels: HashMap<String, WeekAssignment>,
}

/// A complete, fully-placed season: `total_weeks` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub weeks: Vec<Week>,
}

impl Schedule {
    pub fn first_half_weeks(&self, first_half_weeks: usize) -> &[Week] {
        &self.weeks[..first_half_weeks]
    }
}

/// level -> team -> slot -> season play count.
pub fn compute_team_play_counts(schedule: &Schedule) -> HashMap<String, HashMap<TeamId, HashMap<SlotId, u32>>> {
    let mut counts: HashMap<String, HashMap<TeamId, HashMap<SlotId, u32>>> = HashMap::new();
    for week in &schedule.weeks {
        for (level, assignment) in &week.levels {
            let level_counts = counts.entry(level.clone()).or_default();
            for (i, &(a, b)) in assignment.pairing_vector.iter().enumerate() {
                let slot = assignment.slot_vector[i];
                *level_counts.entry(a).or_default().entry(slot).or_insert(0) += 1;
                *level_counts.entry(b).or_default().entry(slot).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// level -> team -> season referee count.
pub fn compute_overall_ref_counts(schedule: &Schedule) -> HashMap<String, HashMap<TeamId, u32>> {
    let mut counts: HashMap<String, HashMap<TeamId, u32>> = HashMap::new();
    for week in &schedule.weeks {
        for (level, assignment) in &week.levels {
            let level_counts = counts.entry(level.clone()).or_default();
            for &referee in &assignment.referee_vector {
                *level_counts.entry(referee).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Zero-initialized tallies for every team in every level, used as the
/// starting point for a half-solve.
pub fn zero_ref_counts(config: &Config) -> HashMap<String, HashMap<TeamId, u32>> {
    config
        .levels
        .iter()
        .map(|level| {
            let teams = config.num_teams(level);
            let zeros = (0..teams).map(|t| (t, 0)).collect();
            (level.clone(), zeros)
        })
        .collect()
}

/// Per-slot game count across every level for one week.
pub fn courts_used_per_slot(week: &Week) -> HashMap<SlotId, u32> {
    let mut used: HashMap<SlotId, u32> = HashMap::new();
    for assignment in week.levels.values() {
        for &slot in &assignment.slot_vector {
            *used.entry(slot).or_insert(0) += 1;
        }
    }
    used
}

/// Invariant 2: the exact per-slot game count for `week_index` must match
/// `courts_per_slot[s][week_index]` for every slot, not merely stay within
/// capacity. Used by C7's hard feasibility re-check after a move.
pub fn is_week_global_valid(week: &Week, week_index: usize, config: &Config) -> bool {
    let used = courts_used_per_slot(week);
    for slot in 1..=config.num_slots {
        let expected = config
            .courts_per_slot
            .get(&slot)
            .and_then(|counts| counts.get(week_index))
            .copied()
            .unwrap_or(0);
        let got = used.get(&slot).copied().unwrap_or(0);
        if got != expected {
            return false;
        }
    }
    true
}
