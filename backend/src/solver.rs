//! Half-schedule solver (C5) and mirror solver (C6).
//!
//! Both are depth-first backtracking searches over a flattened sequence of
//! `(week, level)` decision points, sharing one engine (`search_step`). C5
//! searches pairings *and* slots/referees for the first half; C6 reuses the
//! first half's pairings and searches only slots/referees for the mirror
//! weeks. The only difference between them is where a level's pairing
//! vector comes from for a given week, captured by the `PairingSource`
//! trait (`schedule.py` duplicates the whole backtracking function for
//! this; here it's one engine parameterized over the pairing source).
//!
//! Per spec.md's Design Notes, every commit at a decision point is undone
//! exactly (slot usage, referee tallies, and the week-assignment entry
//! together) on backtrack, and usage resets to zero at every week boundary;
//! courts are a per-week capacity, not cumulative across weeks.

use std::collections::HashMap;

use rand::Rng;

use crate::config::Config;
use crate::referee::assign_referees;
use crate::roundrobin::Pairing;
use crate::schedule::{RefCounts, Week, WeekAssignment};
use crate::slots::SlotVectorCache;
use crate::SlotId;

/// Supplies the fixed pairing vector for a given level and (half-relative)
/// week index.
pub trait PairingSource {
    fn pairing_for(&self, level: &str, week: usize) -> &[Pairing];
}

/// C5's pairing source: the round-robin rounds themselves, one round per
/// week.
pub struct RoundRobinPairings<'a>(pub &'a HashMap<String, Vec<Vec<Pairing>>>);

impl PairingSource for RoundRobinPairings<'_> {
    fn pairing_for(&self, level: &str, week: usize) -> &[Pairing] {
        let rounds = &self.0[level];
        // Cycle through the round-robin length when first_half_weeks
        // doesn't divide it evenly: the "cycling pairing requirement" a
        // league with more weeks than round_robin_length needs.
        &rounds[week % rounds.len()]
    }
}

/// C6's pairing source: the already-solved first half, indexed by the same
/// week number (mirror weeks reuse pairings week-aligned).
pub struct MirrorPairings<'a>(pub &'a [Week]);

impl PairingSource for MirrorPairings<'_> {
    fn pairing_for(&self, level: &str, week: usize) -> &[Pairing] {
        &self.0[week].levels[level].pairing_vector
    }
}

struct SolveCtx<'a, P: PairingSource> {
    config: &'a Config,
    pairings: &'a P,
    cache: &'a SlotVectorCache,
    num_weeks: usize,
    /// Offset into `config.courts_per_slot`: 0 for the first half,
    /// `first_half_weeks` for the mirror half.
    week_offset: usize,
}

/// Runs the backtracking search. `initial_ref_counts` carries tallies
/// forward from a previous half-solve (the mirror solve continues from
/// where the first half left off); pass zeroed tallies for a fresh solve.
fn solve<P: PairingSource>(
    ctx: &SolveCtx<P>,
    rng: &mut impl Rng,
    initial_ref_counts: RefCounts,
) -> Option<(Vec<Week>, RefCounts)> {
    let num_levels = ctx.config.levels.len();
    let mut schedule: Vec<Week> = (0..ctx.num_weeks).map(|_| Week::default()).collect();
    let mut ref_counts = initial_ref_counts;
    let mut global_usage = zero_usage(ctx.config);

    let total_steps = ctx.num_weeks * num_levels;
    if search_step(
        ctx,
        0,
        total_steps,
        num_levels,
        rng,
        &mut schedule,
        &mut ref_counts,
        &mut global_usage,
    ) {
        Some((schedule, ref_counts))
    } else {
        None
    }
}

fn zero_usage(config: &Config) -> HashMap<SlotId, u32> {
    (1..=config.num_slots).map(|s| (s, 0)).collect()
}

#[allow(clippy::too_many_arguments)]
fn search_step<P: PairingSource>(
    ctx: &SolveCtx<P>,
    step: usize,
    total_steps: usize,
    num_levels: usize,
    rng: &mut impl Rng,
    schedule: &mut Vec<Week>,
    ref_counts: &mut RefCounts,
    global_usage: &mut HashMap<SlotId, u32>,
) -> bool {
    if step == total_steps {
        return true;
    }

    let week = step / num_levels;
    let level_idx = step % num_levels;
    let level = &ctx.config.levels[level_idx];
    let full_week_index = week + ctx.week_offset;

    // Court usage resets every week: save the prior state so it can be
    // restored if this entire week turns out infeasible.
    let saved_usage = if level_idx == 0 {
        let saved = global_usage.clone();
        for v in global_usage.values_mut() {
            *v = 0;
        }
        Some(saved)
    } else {
        None
    };

    let num_teams = ctx.config.num_teams(level);
    let pairing = ctx.pairings.pairing_for(level, week).to_vec();
    let candidates = ctx.cache.shuffled(num_teams, ctx.config.num_slots, rng);

    for candidate in &candidates {
        let mut candidate_count: HashMap<SlotId, u32> = HashMap::new();
        for &s in candidate {
            *candidate_count.entry(s).or_insert(0) += 1;
        }

        let feasible = (1..=ctx.config.num_slots).all(|s| {
            let usage = global_usage.get(&s).copied().unwrap_or(0);
            let add = candidate_count.get(&s).copied().unwrap_or(0);
            let cap = ctx
                .config
                .courts_per_slot
                .get(&s)
                .and_then(|weeks| weeks.get(full_week_index))
                .copied()
                .unwrap_or(0);
            usage + add <= cap
        });
        if !feasible {
            continue;
        }

        let level_tally = ref_counts.entry(level.clone()).or_default();
        let Some(referees) = assign_referees(candidate, &pairing, level_tally) else {
            log::debug!("week {week} level {level}: no referee assignment for candidate {candidate:?}");
            continue;
        };

        // Commit.
        for s in 1..=ctx.config.num_slots {
            *global_usage.entry(s).or_insert(0) += candidate_count.get(&s).copied().unwrap_or(0);
        }
        let level_tally = ref_counts.entry(level.clone()).or_default();
        for &r in &referees {
            *level_tally.entry(r).or_insert(0) += 1;
        }
        schedule[week].levels.insert(
            level.clone(),
            WeekAssignment {
                slot_vector: candidate.clone(),
                pairing_vector: pairing.clone(),
                referee_vector: referees.clone(),
            },
        );

        if search_step(
            ctx,
            step + 1,
            total_steps,
            num_levels,
            rng,
            schedule,
            ref_counts,
            global_usage,
        ) {
            return true;
        }

        // Undo.
        schedule[week].levels.remove(level);
        let level_tally = ref_counts.get_mut(level).expect("level tally committed above");
        for &r in &referees {
            let count = level_tally.get_mut(&r).expect("referee tally committed above");
            debug_assert!(*count > 0, "referee tally underflow during backtrack undo");
            *count -= 1;
        }
        for s in 1..=ctx.config.num_slots {
            let usage = global_usage.get_mut(&s).expect("usage initialized for every slot");
            *usage -= candidate_count.get(&s).copied().unwrap_or(0);
        }
    }

    if let Some(saved) = saved_usage {
        *global_usage = saved;
    }
    log::debug!("week {week} level {level}: exhausted all candidates, backtracking");
    false
}

/// C5: backtracks over weeks `0..first_half_weeks`, producing fresh
/// pairings (from C2), slots, and referees for each. Fails (returns `None`)
/// if the entire search space is exhausted; callers surface this as
/// `InfeasibleHalf` by discarding the attempt.
pub fn solve_half_schedule(
    config: &Config,
    round_robin_pairings: &HashMap<String, Vec<Vec<Pairing>>>,
    cache: &SlotVectorCache,
    rng: &mut impl Rng,
) -> Option<(Vec<Week>, RefCounts)> {
    let ctx = SolveCtx {
        config,
        pairings: &RoundRobinPairings(round_robin_pairings),
        cache,
        num_weeks: config.first_half_weeks,
        week_offset: 0,
    };
    solve(&ctx, rng, crate::schedule::zero_ref_counts(config))
}

/// C6: backtracks over the mirror weeks, reusing `first_half`'s pairings
/// week-aligned and carrying its referee tallies forward as the starting
/// point. Fails (returns `None`) if the mirror search space is exhausted;
/// callers surface this as `InfeasibleMirror`.
pub fn solve_second_half(
    config: &Config,
    first_half: &[Week],
    initial_ref_counts: RefCounts,
    cache: &SlotVectorCache,
    rng: &mut impl Rng,
) -> Option<(Vec<Week>, RefCounts)> {
    let ctx = SolveCtx {
        config,
        pairings: &MirrorPairings(first_half),
        cache,
        num_weeks: config.first_half_weeks,
        week_offset: config.first_half_weeks,
    };
    solve(&ctx, rng, initial_ref_counts)
}
