//! Schedule balance statistics (supplemented feature, grounded in
//! `stats.py::print_statistics`): a human-readable summary of play-slot and
//! referee-count balance over a finished [`Schedule`], used by the CLI to
//! report how balanced a found schedule turned out to be. Not part of the
//! hard-constraint search itself; purely a read of data the engine already
//! produces.

use std::collections::HashMap;
use std::fmt;

use crate::schedule::{compute_overall_ref_counts, compute_team_play_counts, Schedule};
use crate::{SlotId, TeamId};

#[derive(Debug, Clone, Default)]
pub struct LevelStats {
    pub play_counts: HashMap<TeamId, HashMap<SlotId, u32>>,
    pub referee_counts: HashMap<TeamId, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleStats {
    pub by_level: HashMap<String, LevelStats>,
}

pub fn compute(schedule: &Schedule) -> ScheduleStats {
    let play_counts = compute_team_play_counts(schedule);
    let referee_counts = compute_overall_ref_counts(schedule);

    let mut by_level: HashMap<String, LevelStats> = HashMap::new();
    for (level, teams) in play_counts {
        by_level.entry(level).or_default().play_counts = teams;
    }
    for (level, teams) in referee_counts {
        by_level.entry(level).or_default().referee_counts = teams;
    }
    ScheduleStats { by_level }
}

impl fmt::Display for ScheduleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels: Vec<&String> = self.by_level.keys().collect();
        levels.sort();
        for level in levels {
            let stats = &self.by_level[level];
            writeln!(f, "level {level}:")?;

            let mut teams: Vec<&TeamId> = stats.play_counts.keys().collect();
            teams.sort();
            for team in teams {
                let slots = &stats.play_counts[team];
                let mut slot_ids: Vec<&SlotId> = slots.keys().collect();
                slot_ids.sort();
                let slot_summary = slot_ids
                    .iter()
                    .map(|&&s| format!("slot {s}: {}", slots[&s]))
                    .collect::<Vec<_>>()
                    .join(", ");
                let ref_count = stats.referee_counts.get(team).copied().unwrap_or(0);
                writeln!(f, "  team {team}: plays [{slot_summary}], refereed {ref_count} games")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::WeekAssignment;
    use crate::Week;

    #[test]
    fn reports_play_and_referee_counts() {
        let mut week = Week::default();
        week.levels.insert(
            "A".to_string(),
            WeekAssignment {
                slot_vector: vec![2],
                pairing_vector: vec![(0, 1)],
                referee_vector: vec![3],
            },
        );
        let schedule = Schedule { weeks: vec![week] };
        let stats = compute(&schedule);
        assert_eq!(stats.by_level["A"].play_counts[&0][&2], 1);
        assert_eq!(stats.by_level["A"].referee_counts[&3], 1);
        assert!(!stats.to_string().is_empty());
    }
}
