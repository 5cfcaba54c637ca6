//! Attempt driver (C8).
//!
//! One attempt is C2 → C5 → C6 → C7 → full validation; the driver retries
//! until one attempt validates, `max_attempts` is exhausted, or cancellation
//! is observed. Batches of `num_cores * 2` attempts run through a `rayon`
//! parallel iterator, mirroring the batched-Monte-Carlo pattern in
//! `wc-simulation`'s `SimulationRunner::run`; each attempt gets its own
//! `ChaCha8Rng` seeded from `(base_seed, attempt_index)`, so a fixed
//! `rng_seed` with `num_cores == 1` reproduces byte-for-byte.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::balance::{balance, BalancerParams};
use crate::config::{self, Config, ConfigError};
use crate::roundrobin::{generate_round_robin_pairings, Pairing};
use crate::schedule::Schedule;
use crate::slots::SlotVectorCache;
use crate::solver::{solve_half_schedule, solve_second_half};
use crate::validate;

#[derive(Debug, Clone)]
pub struct FindOptions {
    pub max_attempts: u64,
    pub num_cores: usize,
    pub balancer_params: BalancerParams,
    pub rng_seed: Option<u64>,
    /// Cooperative cancellation flag, polled between batches. `None` means
    /// the search is never cancelled externally.
    pub cancellation: Option<Arc<AtomicBool>>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            num_cores: 1,
            balancer_params: BalancerParams::default(),
            rng_seed: None,
            cancellation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FindFailure {
    #[error("search cancelled")]
    Cancelled,
    #[error("exhausted {attempts} attempts without finding a valid schedule")]
    Exhausted { attempts: u64 },
}

#[derive(Debug)]
pub struct FindResult {
    pub schedule: Option<Schedule>,
    pub attempts_made: u64,
    pub failure: Option<FindFailure>,
}

/// Runs the search. Validates `config` first (an invalid config never
/// counts as an attempt and is surfaced immediately); otherwise attempts
/// run until success, `max_attempts` is exhausted, or cancellation is
/// observed.
pub fn find_schedule(config: &Config, options: &FindOptions) -> Result<FindResult, ConfigError> {
    config::validate(config)?;

    let cache = SlotVectorCache::new();
    let batch_size = if options.num_cores <= 1 {
        1u64
    } else {
        (options.num_cores as u64) * 2
    };

    let mut attempts_made: u64 = 0;

    loop {
        if is_cancelled(&options.cancellation) {
            return Ok(FindResult {
                schedule: None,
                attempts_made,
                failure: Some(FindFailure::Cancelled),
            });
        }
        if attempts_made >= options.max_attempts {
            return Ok(FindResult {
                schedule: None,
                attempts_made,
                failure: Some(FindFailure::Exhausted { attempts: attempts_made }),
            });
        }

        let remaining = options.max_attempts - attempts_made;
        let this_batch = batch_size.min(remaining).max(1);

        log::info!("starting batch of {this_batch} attempts ({attempts_made} so far)");

        let found = run_batch(config, &cache, options, attempts_made, this_batch);
        attempts_made += this_batch;

        if let Some(schedule) = found {
            return Ok(FindResult {
                schedule: Some(schedule),
                attempts_made,
                failure: None,
            });
        }
    }
}

fn run_batch(
    config: &Config,
    cache: &SlotVectorCache,
    options: &FindOptions,
    attempts_so_far: u64,
    batch_size: u64,
) -> Option<Schedule> {
    if options.num_cores <= 1 {
        for i in 0..batch_size {
            let seed = seed_for(
                options.rng_seed.unwrap_or(0),
                attempts_so_far + i,
                options.rng_seed.is_some(),
            );
            if let Some(schedule) = run_attempt(config, cache, &options.balancer_params, seed) {
                return Some(schedule);
            }
        }
        None
    } else {
        use rayon::prelude::*;
        let base_seed = options.rng_seed.unwrap_or(0);
        let has_seed = options.rng_seed.is_some();
        (0..batch_size)
            .into_par_iter()
            .map(|i| {
                let seed = seed_for(base_seed, attempts_so_far + i, has_seed);
                run_attempt(config, cache, &options.balancer_params, seed)
            })
            .find_map_first(|schedule| schedule)
    }
}

/// Derives a per-attempt seed from the base seed and the attempt's global
/// index. When no base seed was supplied, fall back to fresh OS randomness
/// per attempt; reproducibility is only promised when `rng_seed` is set.
fn seed_for(base_seed: u64, attempt_index: u64, has_explicit_seed: bool) -> u64 {
    if has_explicit_seed {
        base_seed.wrapping_add(attempt_index)
    } else {
        rand::thread_rng().gen()
    }
}

fn is_cancelled(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().map(|f| f.load(Ordering::Relaxed)).unwrap_or(false)
}

/// One attempt: fresh round-robin pairings, first-half solve, mirror solve,
/// balance, then full validation. Returns `None` at the first failing step.
fn run_attempt(
    config: &Config,
    cache: &SlotVectorCache,
    balancer_params: &BalancerParams,
    seed: u64,
) -> Option<Schedule> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let round_robin_pairings: HashMap<String, Vec<Vec<Pairing>>> = config
        .levels
        .iter()
        .map(|level| (level.clone(), generate_round_robin_pairings(config.num_teams(level))))
        .collect();

    let (first_half, ref_counts) = solve_half_schedule(config, &round_robin_pairings, cache, &mut rng)?;
    let (second_half, _) = solve_second_half(config, &first_half, ref_counts, cache, &mut rng)?;

    let mut weeks = first_half;
    weeks.extend(second_half);
    let schedule = balance(
        Schedule { weeks },
        config,
        cache,
        balancer_params,
        &mut rng,
    );

    match validate::validate(&schedule, config) {
        Ok(()) => Some(schedule),
        Err(failure) => {
            log::debug!("attempt seed={seed} discarded: {failure}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_surfaced_before_any_attempt() {
        let mut config = crate::test_fixtures::scenario_s1();
        config.total_weeks = 11;
        let err = find_schedule(&config, &FindOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::WeekCountMismatch { .. }));
    }

    #[test]
    fn cancellation_is_observed_before_the_first_batch() {
        let config = crate::test_fixtures::scenario_s1();
        let cancelled = Arc::new(AtomicBool::new(true));
        let options = FindOptions {
            max_attempts: 1_000_000,
            cancellation: Some(cancelled),
            ..FindOptions::default()
        };
        let run = find_schedule(&config, &options).unwrap();
        assert!(run.schedule.is_none());
        assert_eq!(run.failure, Some(FindFailure::Cancelled));
        assert_eq!(run.attempts_made, 0);
    }

    #[test]
    fn exhausted_when_max_attempts_is_too_small_to_explore() {
        let config = crate::test_fixtures::scenario_s4_narrow_referee_bounds();
        let options = FindOptions {
            max_attempts: 5,
            ..FindOptions::default()
        };
        let run = find_schedule(&config, &options).unwrap();
        assert!(run.schedule.is_none());
        assert!(matches!(run.failure, Some(FindFailure::Exhausted { attempts: 5 })));
    }
}
