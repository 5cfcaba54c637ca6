//! Literal scenario configs (S1-S6) shared by unit tests across modules.
//! Integration tests under `tests/` construct their own copies since they
//! compile against the public API only.

use std::collections::HashMap;

use crate::config::Config;

/// Scenario S1, canonical config: three 6-team levels, 5 first-half weeks,
/// 4 slots.
pub(crate) fn scenario_s1() -> Config {
    let mut teams_per_level = HashMap::new();
    teams_per_level.insert("A".to_string(), 6);
    teams_per_level.insert("B".to_string(), 6);
    teams_per_level.insert("C".to_string(), 6);

    let mut courts_per_slot = HashMap::new();
    courts_per_slot.insert(1, vec![1, 1, 2, 2, 2, 2, 2, 2, 2, 2]);
    courts_per_slot.insert(2, vec![3, 3, 2, 2, 2, 2, 2, 2, 2, 2]);
    courts_per_slot.insert(3, vec![2, 2, 2, 2, 2, 2, 2, 2, 2, 2]);
    courts_per_slot.insert(4, vec![3, 3, 3, 3, 3, 3, 3, 3, 3, 3]);

    let mut slot_limits = HashMap::new();
    slot_limits.insert(1, 4);
    slot_limits.insert(2, 6);
    slot_limits.insert(3, 6);
    slot_limits.insert(4, 4);

    Config {
        levels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        teams_per_level,
        team_names_by_level: HashMap::new(),
        first_half_weeks: 5,
        total_weeks: 10,
        num_slots: 4,
        courts_per_slot,
        slot_limits,
        min_referee_count: 3,
        max_referee_count: 7,
        priority_slots: vec![1, 4],
        priority_multiplier: 100.0,
    }
}

/// Scenario S2, round-robin only: a single 4-team level, 2 slots.
pub(crate) fn scenario_s2() -> Config {
    let mut teams_per_level = HashMap::new();
    teams_per_level.insert("A".to_string(), 4);

    let mut courts_per_slot = HashMap::new();
    courts_per_slot.insert(1, vec![1, 1, 1, 1, 1, 1]);
    courts_per_slot.insert(2, vec![1, 1, 1, 1, 1, 1]);

    let mut slot_limits = HashMap::new();
    slot_limits.insert(1, 3);
    slot_limits.insert(2, 3);

    Config {
        levels: vec!["A".to_string()],
        teams_per_level,
        team_names_by_level: HashMap::new(),
        first_half_weeks: 3,
        total_weeks: 6,
        num_slots: 2,
        courts_per_slot,
        slot_limits,
        min_referee_count: 1,
        max_referee_count: 5,
        priority_slots: vec![],
        priority_multiplier: 1.0,
    }
}

/// Scenario S3, infeasible by capacity: S1 with `courts_per_slot[1][0]`
/// bumped past the total games played per round.
pub(crate) fn scenario_s3_bad_capacity() -> Config {
    let mut config = scenario_s1();
    config.courts_per_slot.get_mut(&1).unwrap()[0] = 10;
    config
}

/// Scenario S4, infeasible by referee bounds: S1 with a single-value
/// referee window that's too narrow for the season length to satisfy.
pub(crate) fn scenario_s4_narrow_referee_bounds() -> Config {
    let mut config = scenario_s1();
    config.min_referee_count = 5;
    config.max_referee_count = 5;
    config
}
