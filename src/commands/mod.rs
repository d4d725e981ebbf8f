//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap crate.
//! Each service gets its own command group; the shared parameters live in [`params`].

use clap::{ArgMatches, Command};

pub mod base_repo;
pub mod config;
pub mod metastore;
pub mod params;
pub mod pid;

pub use params::{
    COMMAND_BASE_REPO, COMMAND_CONFIG, COMMAND_METASTORE, COMMAND_PID, PARAMETER_AUTH,
    PARAMETER_DEBUG, PARAMETER_OUTPUT, PARAMETER_RENDER_AS,
};

/// Build the complete command tree.
pub fn cli_command() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::auth_parameter())
        .arg(params::no_auth_parameter())
        .arg(params::render_as_parameter())
        .arg(params::output_parameter())
        .arg(params::debug_parameter())
        .subcommand(base_repo::base_repo_command())
        .subcommand(metastore::metastore_command())
        .subcommand(pid::pid_command())
        .subcommand(config::config_command())
}

/// Parse the process arguments.
pub fn create_cli_commands() -> ArgMatches {
    cli_command().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::params::*;

    #[test]
    fn test_command_tree_is_consistent() {
        cli_command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let matches = cli_command()
            .try_get_matches_from([
                "kitdm",
                COMMAND_BASE_REPO,
                COMMAND_GET_RESOURCE,
                "-i",
                "a",
                "b",
                "--auth",
                "-r",
                "list",
            ])
            .unwrap();

        let (_, group) = matches.subcommand().unwrap();
        let (name, operation) = group.subcommand().unwrap();
        assert_eq!(name, COMMAND_GET_RESOURCE);
        assert!(operation.get_flag(PARAMETER_AUTH));
        assert_eq!(operation.get_one::<String>(PARAMETER_RENDER_AS).unwrap(), "list");
        let ids: Vec<&String> = operation.get_many::<String>(PARAMETER_IDENTIFIER).unwrap().collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_last_auth_switch_wins() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", "--auth", "--no-auth", COMMAND_CONFIG, COMMAND_PATH])
            .unwrap();
        assert!(!matches.get_flag(PARAMETER_AUTH));
    }

    #[test]
    fn test_historic_alias_and_defaults() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", COMMAND_METASTORE, "getSchemas"])
            .unwrap();

        let (_, group) = matches.subcommand().unwrap();
        let (name, operation) = group.subcommand().unwrap();
        assert_eq!(name, COMMAND_GET_SCHEMAS);
        assert_eq!(operation.get_one::<u32>(PARAMETER_PAGE), Some(&0));
        assert_eq!(operation.get_one::<u32>(PARAMETER_SIZE), Some(&20));
    }

    #[test]
    fn test_no_soft_switch() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", COMMAND_BASE_REPO, COMMAND_DELETE_RESOURCE, "-i", "x", "--no-soft"])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, operation) = group.subcommand().unwrap();
        assert!(operation.get_flag(PARAMETER_NO_SOFT));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let result = cli_command().try_get_matches_from([
            "kitdm",
            COMMAND_BASE_REPO,
            COMMAND_GET_RESOURCES,
            "--from",
            "someday",
        ]);
        assert!(result.is_err());
    }
}
