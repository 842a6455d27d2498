use crate::config::{validate_settings, DEFAULT_API_BASE_URL};
use crate::core::ConfigProvider;
use crate::domain::model::OccupancyKey;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "timetable-admin")]
#[command(about = "Administer scheduling constraints and the weekly timetable")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "60", help = "Length of a placed session")]
    pub session_minutes: u32,

    #[arg(long, default_value = "8")]
    pub first_hour: u32,

    #[arg(long, default_value = "20")]
    pub last_hour: u32,

    #[arg(long, value_enum, default_value_t = OccupancyKey::DayHour)]
    pub occupancy_key: OccupancyKey,

    #[arg(long, help = "Read settings from a TOML file instead of these flags")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scheduling rules
    #[command(subcommand)]
    Constraints(ConstraintsCommand),
    /// Weekly timetable
    #[command(subcommand)]
    Timetable(TimetableCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConstraintsCommand {
    /// List all rules
    List,
    /// Show the valid targets for a level
    Targets { level: String },
    /// Show the rule values a constraint type accepts
    Domain { type_name: String },
    /// Create a rule, or update it when --id is given
    Save {
        #[arg(long)]
        id: Option<i64>,
        #[arg(long = "type")]
        type_id: i64,
        #[arg(long, default_value = "Global")]
        level: String,
        #[arg(long, default_value = "0")]
        target: String,
        #[arg(long, default_value = "")]
        rule: String,
        #[arg(long)]
        inactive: bool,
    },
    /// Enable or disable a rule
    Toggle {
        id: i64,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    /// Delete a rule
    Delete { id: i64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TimetableCommand {
    /// Print the week grid, for the first semester when none is given
    Show { semester: Option<String> },
    /// Place a session into a free slot
    Place {
        semester: String,
        day: String,
        time: String,
        #[arg(long)]
        module: Option<i64>,
        #[arg(long)]
        room: Option<i64>,
    },
    /// Remove a placed session
    Remove { semester: String, id: i64 },
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn session_minutes(&self) -> u32 {
        self.session_minutes
    }

    fn first_hour(&self) -> u32 {
        self.first_hour
    }

    fn last_hour(&self) -> u32 {
        self.last_hour
    }

    fn occupancy_key(&self) -> OccupancyKey {
        self.occupancy_key
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["timetable-admin", "constraints", "list"]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.occupancy_key, OccupancyKey::DayHour);
        assert_eq!(config.grid_settings().session_minutes, 60);
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.command,
            Command::Constraints(ConstraintsCommand::List)
        ));
    }

    #[test]
    fn test_place_arguments() {
        let config = CliConfig::parse_from([
            "timetable-admin",
            "--occupancy-key",
            "day-hour-room",
            "timetable",
            "place",
            "2024S1",
            "Monday",
            "09:00",
            "--module",
            "3",
        ]);
        assert_eq!(config.occupancy_key, OccupancyKey::DayHourRoom);
        match config.command {
            Command::Timetable(TimetableCommand::Place { module, room, .. }) => {
                assert_eq!(module, Some(3));
                assert_eq!(room, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_session_length() {
        let config = CliConfig::parse_from([
            "timetable-admin",
            "--session-minutes",
            "600",
            "constraints",
            "list",
        ]);
        assert!(config.validate().is_err());
    }
}
