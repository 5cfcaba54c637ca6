//! Config validator (C1).
//!
//! `Config` is the engine's only input: an immutable value describing levels,
//! team counts, weeks, slots, court capacity, and balance-objective weights.
//! `validate` checks internal consistency before any search begins; the
//! checks mirror `schedule.py`'s `_validate_config`, one distinct error
//! variant per check rather than a single catch-all message.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{SlotId, TeamId};

/// A time slot within a game day. Slots are numbered `1..=num_slots`.
pub type Slot = SlotId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ordered level identifiers; iteration order is the order levels are
    /// assigned within a week during the backtracking search.
    pub levels: Vec<String>,
    pub teams_per_level: HashMap<String, TeamId>,
    /// Team names by level, in index order. Used only at the output
    /// boundary (`Schedule::to_output`); the solver itself works on
    /// integer team indices.
    pub team_names_by_level: HashMap<String, Vec<String>>,
    pub first_half_weeks: usize,
    pub total_weeks: usize,
    pub num_slots: Slot,
    /// slot -> one court count per week, length `total_weeks`.
    pub courts_per_slot: HashMap<Slot, Vec<u32>>,
    /// slot -> season-long cap on games one team may play in that slot.
    pub slot_limits: HashMap<Slot, u32>,
    pub min_referee_count: u32,
    pub max_referee_count: u32,
    pub priority_slots: Vec<Slot>,
    pub priority_multiplier: f64,
}

impl Config {
    pub fn num_teams(&self, level: &str) -> TeamId {
        self.teams_per_level.get(level).copied().unwrap_or(0)
    }

    pub fn num_games(&self, level: &str) -> usize {
        (self.num_teams(level) / 2) as usize
    }

    pub fn total_games_per_round(&self) -> u32 {
        self.teams_per_level
            .values()
            .map(|&n| (n / 2) as u32)
            .sum()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("level {level:?} has an odd team count ({count}); bye rounds are not supported")]
    OddTeamCount { level: String, count: TeamId },

    #[error("total_weeks ({total}) must equal 2 * first_half_weeks ({half})")]
    WeekCountMismatch { total: usize, half: usize },

    #[error(
        "week {week}: courts_per_slot sums to {got} games but {expected} games are played per round"
    )]
    CourtCapacityMismatch { week: usize, got: u32, expected: u32 },

    #[error("courts_per_slot has slot {slot} outside the valid range 1..={max}")]
    SlotOutOfRange { slot: Slot, max: Slot },

    #[error(
        "courts_per_slot[{slot}] has {got} week entries, expected total_weeks ({expected})"
    )]
    CourtsLengthMismatch { slot: Slot, got: usize, expected: usize },

    #[error("min_referee_count ({min}) must be <= max_referee_count ({max})")]
    InvalidRefereeBounds { min: u32, max: u32 },

    #[error("priority slot {slot} is outside the valid range 1..={max}")]
    PriorityOutOfRange { slot: Slot, max: Slot },

    #[error("num_slots must be positive")]
    ZeroSlots,
}

/// Checks `config` for internal consistency. Non-fatal issues (the
/// slot-limit-sum heuristic) are logged via `log::warn!`, not returned.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.num_slots == 0 {
        return Err(ConfigError::ZeroSlots);
    }

    for (level, &count) in &config.teams_per_level {
        if count % 2 != 0 {
            return Err(ConfigError::OddTeamCount {
                level: level.clone(),
                count,
            });
        }
    }

    if config.total_weeks != 2 * config.first_half_weeks {
        return Err(ConfigError::WeekCountMismatch {
            total: config.total_weeks,
            half: config.first_half_weeks,
        });
    }

    for (&slot, counts) in &config.courts_per_slot {
        if slot < 1 || slot > config.num_slots {
            return Err(ConfigError::SlotOutOfRange {
                slot,
                max: config.num_slots,
            });
        }
        if counts.len() != config.total_weeks {
            return Err(ConfigError::CourtsLengthMismatch {
                slot,
                got: counts.len(),
                expected: config.total_weeks,
            });
        }
    }

    let expected_games = config.total_games_per_round();
    for week in 0..config.total_weeks {
        let got: u32 = config
            .courts_per_slot
            .values()
            .map(|counts| counts.get(week).copied().unwrap_or(0))
            .sum();
        if got != expected_games {
            return Err(ConfigError::CourtCapacityMismatch {
                week,
                got,
                expected: expected_games,
            });
        }
    }

    if config.min_referee_count > config.max_referee_count {
        return Err(ConfigError::InvalidRefereeBounds {
            min: config.min_referee_count,
            max: config.max_referee_count,
        });
    }

    for &slot in &config.priority_slots {
        if slot < 1 || slot > config.num_slots {
            return Err(ConfigError::PriorityOutOfRange {
                slot,
                max: config.num_slots,
            });
        }
    }

    // Each team plays exactly one game per week in its level, so the
    // average number of games a team plays across the season is just
    // total_weeks; compare that against how many games slot_limits allows
    // in total.
    let slot_limit_sum: u32 = config.slot_limits.values().sum();
    let avg_games_per_team = config.total_weeks as f64;
    if (slot_limit_sum as f64) < avg_games_per_team {
        log::warn!(
            "slot_limits sum to {slot_limit_sum}, below the average {avg_games_per_team:.1} \
             games a team plays across the season; some teams may be unschedulable"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        let mut teams_per_level = HashMap::new();
        teams_per_level.insert("A".to_string(), 6);
        let mut courts_per_slot = HashMap::new();
        courts_per_slot.insert(1, vec![3; 10]);
        let mut slot_limits = HashMap::new();
        slot_limits.insert(1, 10);
        Config {
            levels: vec!["A".to_string()],
            teams_per_level,
            team_names_by_level: HashMap::new(),
            first_half_weeks: 5,
            total_weeks: 10,
            num_slots: 1,
            courts_per_slot,
            slot_limits,
            min_referee_count: 0,
            max_referee_count: 10,
            priority_slots: vec![1],
            priority_multiplier: 1.0,
        }
    }

    #[test]
    fn accepts_a_consistent_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn rejects_odd_team_counts() {
        let mut config = base_config();
        config.teams_per_level.insert("A".to_string(), 5);
        match validate(&config) {
            Err(ConfigError::OddTeamCount { count, .. }) => assert_eq!(count, 5),
            other => panic!("expected OddTeamCount, got {other:?}"),
        }
    }

    #[test]
    fn rejects_week_count_mismatch() {
        let mut config = base_config();
        config.total_weeks = 11;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::WeekCountMismatch { .. })
        ));
    }

    #[test]
    fn rejects_court_capacity_mismatch() {
        let mut config = base_config();
        config.courts_per_slot.get_mut(&1).unwrap()[0] = 10;
        match validate(&config) {
            Err(ConfigError::CourtCapacityMismatch { week, .. }) => assert_eq!(week, 0),
            other => panic!("expected CourtCapacityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_referee_bounds() {
        let mut config = base_config();
        config.min_referee_count = 5;
        config.max_referee_count = 3;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidRefereeBounds { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_slot() {
        let mut config = base_config();
        config.courts_per_slot.insert(2, vec![0; 10]);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::SlotOutOfRange { .. })
        ));
    }
}
