//! Referee assigner (C4).
//!
//! Given a level's candidate slot vector and its (fixed-for-the-round)
//! pairing vector, picks one referee per game: a team from the same level,
//! not playing in that game, playing some other game in the round, in a
//! slot exactly one away from the game it referees. Two-stage algorithm:
//! greedy first, exhaustive fallback on deadlock, matching
//! `schedule.py::get_ref_assignment`/`candidate_referees_for_game`.

use std::collections::HashMap;

use itertools::Itertools;

use crate::roundrobin::Pairing;
use crate::{SlotId, TeamId};

/// Eligible referees for game `game_index`, given the round's slot vector
/// and pairing vector.
pub fn candidate_referees_for_game(
    slot_vector: &[SlotId],
    pairings: &[Pairing],
    game_index: usize,
) -> Vec<TeamId> {
    let (p1, p2) = pairings[game_index];
    let game_slot = slot_vector[game_index];

    let mut candidates = Vec::new();
    for (j, &(a, b)) in pairings.iter().enumerate() {
        if j == game_index {
            continue;
        }
        let other_slot = slot_vector[j];
        if (other_slot as i32 - game_slot as i32).abs() != 1 {
            continue;
        }
        for team in [a, b] {
            if team != p1 && team != p2 {
                candidates.push(team);
            }
        }
    }
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

/// Assigns one referee per game in `pairings`/`slot_vector`, minimizing the
/// total running tally of teams pressed into refereeing. Returns `None` if
/// no assignment leaves every game refereed by a distinct team.
pub fn assign_referees(
    slot_vector: &[SlotId],
    pairings: &[Pairing],
    running_tally: &HashMap<TeamId, u32>,
) -> Option<Vec<TeamId>> {
    let num_games = pairings.len();
    let eligible: Vec<Vec<TeamId>> = (0..num_games)
        .map(|i| candidate_referees_for_game(slot_vector, pairings, i))
        .collect();

    if let Some(assignment) = greedy_assign(&eligible, running_tally) {
        return Some(assignment);
    }
    exhaustive_assign(&eligible, running_tally)
}

fn tally_of(running_tally: &HashMap<TeamId, u32>, team: TeamId) -> u32 {
    running_tally.get(&team).copied().unwrap_or(0)
}

/// Orders games by ascending candidate-pool size, then for each picks the
/// unused eligible candidate with the smallest running tally.
fn greedy_assign(
    eligible: &[Vec<TeamId>],
    running_tally: &HashMap<TeamId, u32>,
) -> Option<Vec<TeamId>> {
    let mut order: Vec<usize> = (0..eligible.len()).collect();
    order.sort_by_key(|&i| eligible[i].len());

    let mut assignment: Vec<Option<TeamId>> = vec![None; eligible.len()];
    let mut used = std::collections::HashSet::new();

    for &game_index in &order {
        let pick = eligible[game_index]
            .iter()
            .filter(|t| !used.contains(*t))
            .min_by_key(|&&t| tally_of(running_tally, t));
        match pick {
            Some(&team) => {
                used.insert(team);
                assignment[game_index] = Some(team);
            }
            None => return None,
        }
    }

    assignment.into_iter().collect()
}

/// Enumerates the Cartesian product of eligible sets, keeping only
/// all-distinct assignments, and returns the one with minimum total running
/// tally.
fn exhaustive_assign(
    eligible: &[Vec<TeamId>],
    running_tally: &HashMap<TeamId, u32>,
) -> Option<Vec<TeamId>> {
    if eligible.iter().any(|c| c.is_empty()) {
        return None;
    }

    eligible
        .iter()
        .map(|c| c.iter().copied())
        .multi_cartesian_product()
        .filter(|assignment| {
            let mut seen = std::collections::HashSet::new();
            assignment.iter().all(|t| seen.insert(*t))
        })
        .min_by_key(|assignment| assignment.iter().map(|&t| tally_of(running_tally, t)).sum::<u32>())
}
