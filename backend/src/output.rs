//! External schedule format (§6): a language-neutral, JSON-shaped view of a
//! [`Schedule`], mapping internal team indices out through
//! `Config::team_names_by_level`. Mirrors `utils.py`'s
//! `convert_to_formatted_schedule`.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::Config;
use crate::schedule::Schedule;
use crate::TeamId;

#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub level: String,
    pub teams: [String; 2],
    #[serde(rename = "ref")]
    pub referee: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekRecord {
    /// 1-based week number.
    pub week: usize,
    pub slots: HashMap<String, Vec<GameRecord>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSchedule {
    pub weeks: Vec<WeekRecord>,
}

impl Schedule {
    /// Converts to the language-neutral output format, resolving team
    /// indices to names via `config.team_names_by_level`. Falls back to the
    /// numeric index as a string when a level has no name table, so this
    /// never panics on an incomplete `Config`.
    pub fn to_output(&self, config: &Config) -> OutputSchedule {
        let weeks = self
            .weeks
            .iter()
            .enumerate()
            .map(|(i, week)| week_record(i, week, config))
            .collect();
        OutputSchedule { weeks }
    }
}

fn week_record(index: usize, week: &crate::schedule::Week, config: &Config) -> WeekRecord {
    let mut slots: HashMap<String, Vec<GameRecord>> = HashMap::new();
    for (level, assignment) in &week.levels {
        let names = config.team_names_by_level.get(level);
        for (game, &(a, b)) in assignment.pairing_vector.iter().enumerate() {
            let slot = assignment.slot_vector[game];
            let referee = assignment.referee_vector[game];
            let record = GameRecord {
                level: level.clone(),
                teams: [team_name(names, a), team_name(names, b)],
                referee: team_name(names, referee),
            };
            slots.entry(slot.to_string()).or_default().push(record);
        }
    }
    WeekRecord {
        week: index + 1,
        slots,
    }
}

fn team_name(names: Option<&Vec<String>>, team: TeamId) -> String {
    names
        .and_then(|n| n.get(team as usize))
        .cloned()
        .unwrap_or_else(|| team.to_string())
}
