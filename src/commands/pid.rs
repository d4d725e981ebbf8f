//! Typed PID Maker command definitions.

use crate::commands::params::{
    dry_run_parameter, from_parameter, identifier_parameter, identifiers_parameter,
    metadata_parameter, modified_from_parameter, modified_until_parameter, page_parameter,
    size_parameter, until_parameter, validate_parameter, COMMAND_CREATE_RECORD,
    COMMAND_GET_KNOWN_PID, COMMAND_GET_KNOWN_PIDS, COMMAND_GET_PID, COMMAND_PID,
    COMMAND_UPDATE_RECORD,
};
use clap::Command;

/// Create the pid command with all its subcommands.
pub fn pid_command() -> Command {
    Command::new(COMMAND_PID)
        .about("Manage PID records in a Typed PID Maker instance")
        .visible_alias("typed-pid-maker")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_CREATE_RECORD)
                .about("Create a new PID record")
                .visible_alias("createRecord")
                .arg(metadata_parameter().required(true).help("Path to the PID record"))
                .arg(dry_run_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET_PID)
                .about("Resolve one or more PIDs to their records")
                .visible_alias("getPid")
                .arg(identifiers_parameter())
                .arg(validate_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET_KNOWN_PID)
                .about("Show creation and modification details of one or more known PIDs")
                .visible_alias("getKnownPid")
                .arg(identifiers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET_KNOWN_PIDS)
                .about("List known PIDs, optionally filtered by creation or modification time")
                .visible_alias("getKnownPids")
                .arg(from_parameter())
                .arg(until_parameter())
                .arg(modified_from_parameter())
                .arg(modified_until_parameter())
                .arg(page_parameter())
                .arg(size_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE_RECORD)
                .about("Replace a PID record")
                .visible_alias("updateRecord")
                .arg(identifier_parameter())
                .arg(metadata_parameter().required(true).help("Path to the PID record")),
        )
}
