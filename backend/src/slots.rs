//! Candidate-slot enumerator (C3).
//!
//! For a level with `g = teams/2` games and `S` slots, enumerates every
//! tuple in `{1..=S}^g` that could plausibly host one round: no slot
//! over-concentrated, at least two distinct slots used, and the slots used
//! form a contiguous integer range. The result depends only on `(teams,
//! num_slots)`, so it's cached once per pair and cloned-and-shuffled at each
//! call site (spec.md Design Notes: "cache per pair").

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{SlotId, TeamId};

pub type SlotVector = Vec<SlotId>;

/// Enumerates all feasible slot vectors for a level with `teams` teams and
/// `num_slots` slots available.
pub fn generate_level_slot_assignments(teams: TeamId, num_slots: SlotId) -> Vec<SlotVector> {
    let games = (teams / 2) as usize;
    let max_per_slot = (teams / 3) as usize;
    if games == 0 || num_slots == 0 {
        return Vec::new();
    }

    let slot_range: Vec<SlotId> = (1..=num_slots).collect();
    std::iter::repeat(slot_range.into_iter())
        .take(games)
        .multi_cartesian_product()
        .filter(|candidate| is_feasible(candidate, max_per_slot))
        .collect()
}

/// Whether `candidate` is a legal slot vector for a level with `teams`
/// teams: no slot over-concentrated, ≥2 distinct slots used, contiguous.
/// Exposed so the validator (P3) can re-check an already-built schedule with
/// the exact same rule the enumerator used to produce it.
pub fn is_feasible_slot_vector(candidate: &[SlotId], teams: TeamId) -> bool {
    is_feasible(candidate, (teams / 3) as usize)
}

fn is_feasible(candidate: &[SlotId], max_per_slot: usize) -> bool {
    let mut counts: HashMap<SlotId, usize> = HashMap::new();
    for &slot in candidate {
        *counts.entry(slot).or_insert(0) += 1;
    }
    if counts.values().any(|&c| c > max_per_slot) {
        return false;
    }

    let used: HashSet<SlotId> = counts.keys().copied().collect();
    if used.len() < 2 {
        return false;
    }

    let min = *used.iter().min().unwrap();
    let max = *used.iter().max().unwrap();
    (max - min + 1) as usize == used.len()
}

/// Memoizes `generate_level_slot_assignments` by `(teams, num_slots)`, shared
/// across one driver run's attempts. Not a process-global `static`; each
/// call to `find_schedule` owns its own cache.
#[derive(Default)]
pub struct SlotVectorCache {
    entries: Mutex<HashMap<(TeamId, SlotId), Arc<Vec<SlotVector>>>>,
}

impl SlotVectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_compute(&self, teams: TeamId, num_slots: SlotId) -> Arc<Vec<SlotVector>> {
        let key = (teams, num_slots);
        let mut entries = self.entries.lock().expect("slot vector cache poisoned");
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(generate_level_slot_assignments(teams, num_slots)))
            .clone()
    }

    /// Returns a freshly-shuffled clone of the candidates for `(teams,
    /// num_slots)`, diversifying each caller's search order independently of
    /// the cached canonical order.
    pub fn shuffled(&self, teams: TeamId, num_slots: SlotId, rng: &mut impl Rng) -> Vec<SlotVector> {
        let canonical = self.get_or_compute(teams, num_slots);
        let mut candidates = (*canonical).clone();
        candidates.shuffle(rng);
        candidates
    }
}
