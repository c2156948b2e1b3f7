//! Command-line interface for fuellog.
//!
//! This module provides the CLI structure for the `fuellog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ChatCommand, ConfigCommand, NormsArgs, StatusCommand, TripsCommand, VehicleCommand,
};

/// fuellog - Fuel norms and trip logs for vehicle fleets
///
/// Register vehicles with their consumption norms, then enter trips in a
/// chat session to get the fuel used per road type.
#[derive(Debug, Parser)]
#[command(name = "fuellog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive chat session on the terminal
    Chat(ChatCommand),

    /// Manage registered vehicles
    #[command(subcommand)]
    Vehicle(VehicleCommand),

    /// Show the trip log of a user
    Trips(TripsCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "fuellog");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_with_user() {
        let cli = Cli::try_parse_from(["fuellog", "chat", "--user", "42"]).unwrap();
        match cli.command {
            Command::Chat(cmd) => assert_eq!(cmd.user.as_deref(), Some("42")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_vehicle_add() {
        let cli =
            Cli::try_parse_from(["fuellog", "vehicle", "add", "X001", "8.5", "6.2", "7.1", "1.0"])
                .unwrap();
        match cli.command {
            Command::Vehicle(VehicleCommand::Add { id, norms }) => {
                assert_eq!(id, "X001");
                assert_eq!(norms.district, "7.1");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_vehicle_add_needs_four_norms() {
        assert!(Cli::try_parse_from(["fuellog", "vehicle", "add", "X001", "8.5", "6.2"]).is_err());
    }

    #[test]
    fn test_parse_vehicle_delete() {
        let cli = Cli::try_parse_from(["fuellog", "vehicle", "delete", "X001", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Vehicle(VehicleCommand::Delete { yes: true, .. })
        ));
    }

    #[test]
    fn test_parse_trips_json() {
        let cli = Cli::try_parse_from(["fuellog", "trips", "42", "--json"]).unwrap();
        match cli.command {
            Command::Trips(cmd) => {
                assert_eq!(cmd.user, "42");
                assert!(cmd.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["fuellog", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["fuellog", "-v", "status"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["fuellog", "config", "validate", "--file", "/tmp/x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
