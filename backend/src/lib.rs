//! Round-robin league schedule search engine.
//!
//! Given a [`Config`] describing levels, team counts, weeks, slots, and
//! court capacity, [`find_schedule`] searches for a [`Schedule`] satisfying
//! every hard constraint (play counts, court capacity, referee rules, the
//! mirror pairing requirement) and improves its secondary balance
//! objectives with a simulated-annealing local search, retrying randomized
//! attempts in parallel until one validates or the attempt budget runs out.
//!
//! The crate never touches a filesystem, a socket, or an environment
//! variable, and never configures a logger itself; callers (the `cli`
//! binary, or any other embedder) own that.
//!
//! Team and level identities are represented as small integers
//! (`TeamId`/level names are plain `String` keys) keyed by position in the
//! config-provided name tables; name lookups only happen at the output
//! boundary ([`output`]).

pub mod balance;
pub mod config;
pub mod driver;
pub mod output;
pub mod referee;
pub mod roundrobin;
pub mod schedule;
pub mod slots;
pub mod solver;
pub mod stats;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_fixtures;

/// A team's index within its level, `0..teams_per_level[level]`.
pub type TeamId = u16;

/// A time slot within a game day, numbered `1..=num_slots`.
pub type SlotId = u8;

pub use balance::BalancerParams;
pub use config::{Config, ConfigError};
pub use driver::{find_schedule, FindFailure, FindOptions, FindResult};
pub use output::OutputSchedule;
pub use roundrobin::Pairing;
pub use schedule::{Schedule, Week, WeekAssignment};
pub use stats::ScheduleStats;
pub use validate::ValidationFailure;
