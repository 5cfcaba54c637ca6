mod logging;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use backend::{find_schedule, Config, FindFailure, FindOptions};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the search engine against a built-in example config and print a
    /// balance report, without writing anything to disk.
    Playground,
    /// Search for a schedule satisfying a config file and write the result.
    Generate {
        /// Path to a JSON-encoded Config. Falls back to the built-in
        /// example (the same shape the Playground command uses) when
        /// omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to write the formatted schedule, JSON-encoded.
        #[arg(long, default_value = "schedule.json")]
        out: PathBuf,
        #[arg(long, default_value_t = 2000)]
        max_attempts: u64,
        #[arg(long, default_value_t = 1)]
        num_cores: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    logging::init_logger(None, true);
    let args = Args::parse();

    match args.cmd {
        Commands::Playground => run_generate(example_config(), FindOptions::default()),
        Commands::Generate {
            config,
            out,
            max_attempts,
            num_cores,
            seed,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => example_config(),
            };
            let options = FindOptions {
                max_attempts,
                num_cores,
                rng_seed: seed,
                ..FindOptions::default()
            };
            run_generate_and_write(config, options, &out)
        }
    }
}

fn load_config(path: &PathBuf) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn run_generate(config: Config, options: FindOptions) -> Result<()> {
    run_generate_and_write(config, options, &PathBuf::from("schedule.json"))
}

fn run_generate_and_write(config: Config, options: FindOptions, out: &PathBuf) -> Result<()> {
    let run = find_schedule(&config, &options).context("config failed validation")?;

    match run.schedule {
        Some(schedule) => {
            log::info!("found a valid schedule after {} attempts", run.attempts_made);
            let stats = backend::stats::compute(&schedule);
            println!("{stats}");

            let output = schedule.to_output(&config);
            let json = serde_json::to_string_pretty(&output).context("serializing schedule")?;
            fs::write(out, json).with_context(|| format!("writing schedule to {}", out.display()))?;
            println!("wrote {}", out.display());
            Ok(())
        }
        None => match run.failure {
            Some(FindFailure::Cancelled) => {
                anyhow::bail!("search cancelled after {} attempts", run.attempts_made)
            }
            Some(FindFailure::Exhausted { attempts }) => {
                anyhow::bail!("exhausted {attempts} attempts without finding a valid schedule")
            }
            None => anyhow::bail!("search ended without a schedule or a recorded failure reason"),
        },
    }
}

/// The same config as scenario S1 in the engine's test suite: three 6-team
/// levels, 5 first-half weeks, 4 slots.
fn example_config() -> Config {
    use std::collections::HashMap;

    let mut teams_per_level = HashMap::new();
    teams_per_level.insert("A".to_string(), 6);
    teams_per_level.insert("B".to_string(), 6);
    teams_per_level.insert("C".to_string(), 6);

    let mut team_names_by_level = HashMap::new();
    for level in ["A", "B", "C"] {
        team_names_by_level.insert(
            level.to_string(),
            (0..6).map(|i| format!("{level}{i}")).collect(),
        );
    }

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
        team_names_by_level,
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
