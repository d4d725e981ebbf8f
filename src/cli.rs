use crate::{
    actions::{self, utils::GlobalOptions},
    commands::{COMMAND_BASE_REPO, COMMAND_CONFIG, COMMAND_METASTORE, COMMAND_PID},
    configuration::Configuration,
    error::CliError,
};
use clap::ArgMatches;
use tracing::{debug, trace};

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    let message = match sub_matches.subcommand() {
        Some(m) => m.0,
        None => "unknown",
    };

    message.to_string()
}

/// Runs the operation selected on the command line.
///
/// The configuration is only loaded for commands that talk to a service.
pub async fn execute_command(matches: &ArgMatches) -> Result<(), CliError> {
    let (group, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| CliError::UnsupportedSubcommand(extract_subcommand_name(matches)))?;
    trace!("Command group \"{}\"", group);

    // global arguments given after the subcommand are propagated back to the root
    let options = GlobalOptions::from_matches(matches);
    debug!("Global options: {:?}", options);

    if group == COMMAND_CONFIG {
        return Ok(actions::config::execute(sub_matches, &options)?);
    }

    let configuration = Configuration::load_default()?;

    match group {
        COMMAND_BASE_REPO => actions::base_repo::execute(sub_matches, &configuration, &options).await?,
        COMMAND_METASTORE => actions::metastore::execute(sub_matches, &configuration, &options).await?,
        COMMAND_PID => actions::pid::execute(sub_matches, &configuration, &options).await?,
        _ => return Err(CliError::UnsupportedSubcommand(extract_subcommand_name(matches))),
    }

    Ok(())
}
