//! Balancer (C7): simulated-annealing local search over the combined
//! schedule, preserving every hard constraint.
//!
//! Grounded in `schedule.py::balance_schedule` for the move definitions and
//! acceptance rule, and in `algorithm/practices.rs` for the general shape of
//! a hand-rolled annealer (temperature-proportional perturbation, then
//! score, then accept/reject); that file drives the perturbation through
//! argmin's `Anneal` trait, which doesn't fit a move that can be rejected
//! outright on hard infeasibility before the objective is even computed, so
//! the mechanics here are direct.

use rand::Rng;

use crate::config::Config;
use crate::referee::assign_referees;
use crate::schedule::{
    compute_overall_ref_counts, compute_team_play_counts, is_week_global_valid, Schedule,
    WeekAssignment,
};
use crate::slots::SlotVectorCache;

#[derive(Debug, Clone)]
pub struct BalancerParams {
    pub max_iterations: u32,
    pub weight_play: f64,
    pub weight_ref: f64,
    pub cooling_rate: f64,
    pub initial_temp: f64,
    pub candidate_prob: f64,
    pub swap_prob: f64,
    /// Squared-overage penalty coefficient for play-limit violations in the
    /// objective. A constant `1e6` in the original; exposed here as a
    /// tunable.
    pub violation_penalty: f64,
}

impl Default for BalancerParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            weight_play: 0.1,
            weight_ref: 10.0,
            cooling_rate: 0.9,
            initial_temp: 5.0,
            candidate_prob: 1.0,
            swap_prob: 0.0,
            violation_penalty: 1e6,
        }
    }
}

/// Play-limit violation penalty, summed over every level/team/slot.
pub fn play_imbalance(schedule: &Schedule, config: &Config, violation_penalty: f64) -> f64 {
    let counts = compute_team_play_counts(schedule);
    let mut total = 0.0;
    for by_team in counts.values() {
        for by_slot in by_team.values() {
            for (&slot, &count) in by_slot {
                let limit = config.slot_limits.get(&slot).copied().unwrap_or(u32::MAX);
                if count > limit {
                    let over = (count - limit) as f64;
                    let mut penalty = violation_penalty * over * over;
                    if config.priority_slots.contains(&slot) {
                        penalty *= config.priority_multiplier;
                    }
                    total += penalty;
                }
            }
        }
    }
    total
}

/// Sum, over every level, of the variance of that level's per-team season
/// referee count.
pub fn ref_imbalance(schedule: &Schedule, config: &Config) -> f64 {
    let counts = compute_overall_ref_counts(schedule);
    let mut total = 0.0;
    for level in &config.levels {
        let n = config.num_teams(level);
        if n == 0 {
            continue;
        }
        let level_counts = counts.get(level);
        let values: Vec<f64> = (0..n)
            .map(|t| level_counts.and_then(|m| m.get(&t)).copied().unwrap_or(0) as f64)
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        total += variance;
    }
    total
}

pub fn composite_objective(schedule: &Schedule, config: &Config, params: &BalancerParams) -> f64 {
    params.weight_play * play_imbalance(schedule, config, params.violation_penalty)
        + params.weight_ref * ref_imbalance(schedule, config)
}

/// Undo log for one move: the `(week, level)` entries it overwrote and what
/// they held before.
struct Undo {
    entries: Vec<(usize, String, WeekAssignment)>,
}

impl Undo {
    fn weeks_touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(week, _, _)| *week)
    }

    fn apply(self, schedule: &mut Schedule) {
        for (week, level, previous) in self.entries {
            schedule.weeks[week].levels.insert(level, previous);
        }
    }
}

/// Candidate move: re-slot one `(week, level)` in the first half to a
/// different candidate slot vector, with fresh referees, and regenerate the
/// mirror week's referees to match (its slot vector is unchanged). Returns
/// `None` (no mutation) if no alternative slot vector exists or either
/// referee regeneration is infeasible.
fn candidate_move(
    schedule: &mut Schedule,
    config: &Config,
    cache: &SlotVectorCache,
    rng: &mut impl Rng,
) -> Option<Undo> {
    if config.first_half_weeks == 0 || config.levels.is_empty() {
        return None;
    }
    let week = rng.gen_range(0..config.first_half_weeks);
    let mirror_week = week + config.first_half_weeks;
    let level = config.levels[rng.gen_range(0..config.levels.len())].clone();

    let current = schedule.weeks[week].levels.get(&level)?.clone();
    let mirror_current = schedule.weeks[mirror_week].levels.get(&level)?.clone();

    let num_teams = config.num_teams(&level);
    let new_slots = cache
        .shuffled(num_teams, config.num_slots, rng)
        .into_iter()
        .find(|candidate| *candidate != current.slot_vector)?;

    // REDESIGN FLAG: preserve cumulative season tallies when regenerating
    // referees here, for both the primary and mirror week, rather than the
    // fresh-zeroed counts the original used (see DESIGN.md).
    let running = compute_overall_ref_counts(schedule);
    let level_tally = running.get(&level).cloned().unwrap_or_default();

    let new_referees = assign_referees(&new_slots, &current.pairing_vector, &level_tally)?;
    let new_mirror_referees = assign_referees(
        &mirror_current.slot_vector,
        &mirror_current.pairing_vector,
        &level_tally,
    )?;

    let undo = Undo {
        entries: vec![
            (week, level.clone(), current.clone()),
            (mirror_week, level.clone(), mirror_current.clone()),
        ],
    };

    schedule.weeks[week].levels.insert(
        level.clone(),
        WeekAssignment {
            slot_vector: new_slots,
            pairing_vector: current.pairing_vector,
            referee_vector: new_referees,
        },
    );
    schedule.weeks[mirror_week].levels.insert(
        level.clone(),
        WeekAssignment {
            slot_vector: mirror_current.slot_vector,
            pairing_vector: mirror_current.pairing_vector,
            referee_vector: new_mirror_referees,
        },
    );

    Some(undo)
}

/// Swap move: exchange one level's placement between two distinct
/// first-half weeks, and simultaneously between their mirror weeks.
fn swap_move(schedule: &mut Schedule, config: &Config, rng: &mut impl Rng) -> Option<Undo> {
    if config.first_half_weeks < 2 || config.levels.is_empty() {
        return None;
    }
    let w1 = rng.gen_range(0..config.first_half_weeks);
    let w2 = loop {
        let candidate = rng.gen_range(0..config.first_half_weeks);
        if candidate != w1 {
            break candidate;
        }
    };
    let level = config.levels[rng.gen_range(0..config.levels.len())].clone();
    let m1 = w1 + config.first_half_weeks;
    let m2 = w2 + config.first_half_weeks;

    let a1 = schedule.weeks[w1].levels.get(&level)?.clone();
    let a2 = schedule.weeks[w2].levels.get(&level)?.clone();
    let am1 = schedule.weeks[m1].levels.get(&level)?.clone();
    let am2 = schedule.weeks[m2].levels.get(&level)?.clone();

    let undo = Undo {
        entries: vec![
            (w1, level.clone(), a1.clone()),
            (w2, level.clone(), a2.clone()),
            (m1, level.clone(), am1.clone()),
            (m2, level.clone(), am2.clone()),
        ],
    };

    schedule.weeks[w1].levels.insert(level.clone(), a2);
    schedule.weeks[w2].levels.insert(level.clone(), a1);
    schedule.weeks[m1].levels.insert(level.clone(), am2);
    schedule.weeks[m2].levels.insert(level.clone(), am1);

    Some(undo)
}

/// Runs the annealer for `params.max_iterations` iterations over `schedule`,
/// returning the (possibly improved) result. Never returns a schedule that
/// violates the hard per-slot court-capacity invariant for any week it
/// touched, even when an improving move is rejected by the Metropolis
/// criterion; the check happens before acceptance is even considered.
pub fn balance(
    mut schedule: Schedule,
    config: &Config,
    cache: &SlotVectorCache,
    params: &BalancerParams,
    rng: &mut impl Rng,
) -> Schedule {
    let mut temperature = params.initial_temp;
    let mut current_obj = composite_objective(&schedule, config, params);
    let total_prob = params.candidate_prob + params.swap_prob;

    for iteration in 0..params.max_iterations {
        let use_candidate = if total_prob <= 0.0 {
            true
        } else {
            rng.gen::<f64>() < params.candidate_prob / total_prob
        };

        let undo = if use_candidate {
            candidate_move(&mut schedule, config, cache, rng)
        } else {
            swap_move(&mut schedule, config, rng)
        };

        let Some(undo) = undo else {
            temperature = (temperature * params.cooling_rate).max(1e-6);
            continue;
        };

        let feasible = undo
            .weeks_touched()
            .all(|week| is_week_global_valid(&schedule.weeks[week], week, config));

        if !feasible {
            undo.apply(&mut schedule);
            temperature = (temperature * params.cooling_rate).max(1e-6);
            continue;
        }

        let candidate_obj = composite_objective(&schedule, config, params);
        let delta = candidate_obj - current_obj;
        let accept = delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp();

        if accept {
            current_obj = candidate_obj;
        } else {
            undo.apply(&mut schedule);
        }

        log::debug!("balance iteration {iteration}: objective={current_obj:.3} T={temperature:.4}");
        temperature = (temperature * params.cooling_rate).max(1e-6);
    }

    schedule
}
