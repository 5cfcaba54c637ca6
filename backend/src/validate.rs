//! Full validation pass (P1–P8 / invariants 1-8 of the data model).
//!
//! `schedule.py::validate_schedule` returns `(bool, message)`; here a
//! structured `ValidationFailure` carries which property failed and with
//! what data, so a discarded attempt can be logged meaningfully (C8 still
//! just discards it and tries again either way; only the log line reads
//! the detail).

use std::collections::HashSet;

use crate::config::Config;
use crate::schedule::{compute_overall_ref_counts, compute_team_play_counts, is_week_global_valid, Schedule};
use crate::slots::is_feasible_slot_vector;
use crate::SlotId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("level {level:?}: pair ({a},{b}) appears {got} times, expected {low} or {high}")]
    PairingCoverage {
        level: String,
        a: u16,
        b: u16,
        got: u32,
        low: u32,
        high: u32,
    },

    #[error("week {week} slot {slot}: {got} games scheduled, expected {expected}")]
    CourtCapacity {
        week: usize,
        slot: SlotId,
        got: u32,
        expected: u32,
    },

    #[error("week {week} level {level:?}: slot vector {slots:?} is not a valid contiguous assignment")]
    SlotContiguity {
        week: usize,
        level: String,
        slots: Vec<SlotId>,
    },

    #[error("level {level:?} team {team}: played {got} games in slot {slot}, limit is {limit}")]
    PlayLimit {
        level: String,
        team: u16,
        slot: SlotId,
        got: u32,
        limit: u32,
    },

    #[error("level {level:?} team {team}: refereed {got} games, expected between {min} and {max}")]
    RefereeLimit {
        level: String,
        team: u16,
        got: u32,
        min: u32,
        max: u32,
    },

    #[error("week {week} level {level:?} game {game}: referee {referee} is one of the players")]
    SelfReferee {
        week: usize,
        level: String,
        game: usize,
        referee: u16,
    },

    #[error("week {week} level {level:?} game {game}: referee {referee} is not playing in an adjacent slot")]
    RefereeNotAdjacent {
        week: usize,
        level: String,
        game: usize,
        referee: u16,
    },

    #[error("level {level:?}: week {week} pairings do not match their mirror week {mirror_week}")]
    MirrorMismatch {
        level: String,
        week: usize,
        mirror_week: usize,
    },
}

/// Checks every invariant in §3 of the schedule against `config`. Returns
/// the first violation found; order follows the invariant numbering.
pub fn validate(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    check_pairing_coverage(schedule, config)?;
    check_court_capacity(schedule, config)?;
    check_slot_contiguity(schedule, config)?;
    check_play_limits(schedule, config)?;
    check_referee_limits(schedule, config)?;
    check_self_referee(schedule)?;
    check_referee_adjacency(schedule)?;
    check_mirror(schedule, config)?;
    Ok(())
}

fn check_pairing_coverage(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    for level in &config.levels {
        let n = config.num_teams(level);
        if n < 2 {
            continue;
        }
        let rounds_len = (n - 1) as usize;
        let floor = config.total_weeks / rounds_len;
        let ceil = if config.total_weeks % rounds_len == 0 {
            floor
        } else {
            floor + 1
        };

        let mut counts: std::collections::HashMap<(u16, u16), u32> = std::collections::HashMap::new();
        for week in &schedule.weeks {
            if let Some(assignment) = week.levels.get(level) {
                for &(a, b) in &assignment.pairing_vector {
                    *counts.entry((a, b)).or_insert(0) += 1;
                }
            }
        }

        for a in 0..n {
            for b in (a + 1)..n {
                let got = counts.get(&(a, b)).copied().unwrap_or(0);
                if got != floor as u32 && got != ceil as u32 {
                    return Err(ValidationFailure::PairingCoverage {
                        level: level.clone(),
                        a,
                        b,
                        got,
                        low: floor as u32,
                        high: ceil as u32,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_court_capacity(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    for (week_index, week) in schedule.weeks.iter().enumerate() {
        if !is_week_global_valid(week, week_index, config) {
            let used = crate::schedule::courts_used_per_slot(week);
            for slot in 1..=config.num_slots {
                let expected = config
                    .courts_per_slot
                    .get(&slot)
                    .and_then(|c| c.get(week_index))
                    .copied()
                    .unwrap_or(0);
                let got = used.get(&slot).copied().unwrap_or(0);
                if got != expected {
                    return Err(ValidationFailure::CourtCapacity {
                        week: week_index,
                        slot,
                        got,
                        expected,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_slot_contiguity(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    for (week_index, week) in schedule.weeks.iter().enumerate() {
        for (level, assignment) in &week.levels {
            let teams = config.num_teams(level);
            if !is_feasible_slot_vector(&assignment.slot_vector, teams) {
                return Err(ValidationFailure::SlotContiguity {
                    week: week_index,
                    level: level.clone(),
                    slots: assignment.slot_vector.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_play_limits(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    let play_counts = compute_team_play_counts(schedule);
    for (level, by_team) in &play_counts {
        for (&team, by_slot) in by_team {
            for (&slot, &got) in by_slot {
                let limit = config.slot_limits.get(&slot).copied().unwrap_or(u32::MAX);
                if got > limit {
                    return Err(ValidationFailure::PlayLimit {
                        level: level.clone(),
                        team,
                        slot,
                        got,
                        limit,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_referee_limits(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    let ref_counts = compute_overall_ref_counts(schedule);
    for level in &config.levels {
        let n = config.num_teams(level);
        let level_counts = ref_counts.get(level);
        for team in 0..n {
            let got = level_counts.and_then(|m| m.get(&team)).copied().unwrap_or(0);
            if got < config.min_referee_count || got > config.max_referee_count {
                return Err(ValidationFailure::RefereeLimit {
                    level: level.clone(),
                    team,
                    got,
                    min: config.min_referee_count,
                    max: config.max_referee_count,
                });
            }
        }
    }
    Ok(())
}

fn check_self_referee(schedule: &Schedule) -> Result<(), ValidationFailure> {
    for (week_index, week) in schedule.weeks.iter().enumerate() {
        for (level, assignment) in &week.levels {
            for (game, &(a, b)) in assignment.pairing_vector.iter().enumerate() {
                let referee = assignment.referee_vector[game];
                if referee == a || referee == b {
                    return Err(ValidationFailure::SelfReferee {
                        week: week_index,
                        level: level.clone(),
                        game,
                        referee,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_referee_adjacency(schedule: &Schedule) -> Result<(), ValidationFailure> {
    for (week_index, week) in schedule.weeks.iter().enumerate() {
        for (level, assignment) in &week.levels {
            for (game, &referee) in assignment.referee_vector.iter().enumerate() {
                let game_slot = assignment.slot_vector[game];
                let plays_adjacent = assignment
                    .pairing_vector
                    .iter()
                    .enumerate()
                    .any(|(j, &(a, b))| {
                        j != game
                            && (a == referee || b == referee)
                            && (assignment.slot_vector[j] as i32 - game_slot as i32).abs() == 1
                    });
                if !plays_adjacent {
                    return Err(ValidationFailure::RefereeNotAdjacent {
                        week: week_index,
                        level: level.clone(),
                        game,
                        referee,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_mirror(schedule: &Schedule, config: &Config) -> Result<(), ValidationFailure> {
    for level in &config.levels {
        for week in 0..config.first_half_weeks {
            let mirror_week = week + config.first_half_weeks;
            let a: HashSet<_> = schedule.weeks[week].levels[level]
                .pairing_vector
                .iter()
                .copied()
                .collect();
            let b: HashSet<_> = schedule.weeks[mirror_week].levels[level]
                .pairing_vector
                .iter()
                .copied()
                .collect();
            if a != b {
                return Err(ValidationFailure::MirrorMismatch {
                    level: level.clone(),
                    week,
                    mirror_week,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{find_schedule, FindOptions};

    fn s1_config() -> Config {
        crate::test_fixtures::scenario_s1()
    }

    #[test]
    fn validation_is_idempotent() {
        let config = s1_config();
        let options = FindOptions {
            max_attempts: 200,
            ..FindOptions::default()
        };
        let run = find_schedule(&config, &options).expect("config is valid");
        if let Some(schedule) = run.schedule {
            let first = validate(&schedule, &config);
            let second = validate(&schedule, &config);
            assert_eq!(first, second);
        }
    }
}
