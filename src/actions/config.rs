use crate::{
    actions::{utils::GlobalOptions, CliActionError},
    commands::params::{COMMAND_CONFIG, COMMAND_PATH, COMMAND_SHOW},
    configuration::Configuration,
};
use clap::ArgMatches;
use std::fs::File;
use tracing::trace;

/// Prints the location of the properties file that would be loaded.
pub fn print_configuration_path() -> Result<(), CliActionError> {
    let path = Configuration::configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}

/// Prints the effective configuration, or writes it to the output file.
pub fn show_configuration(options: &GlobalOptions) -> Result<(), CliActionError> {
    let configuration = Configuration::load_default()?;

    match &options.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliActionError::OutputError {
                path: path.clone(),
                source,
            })?;
            configuration.write(file)?;
            println!("Output written to {}", path.display());
        }
        None => configuration.write(std::io::stdout())?,
    }
    Ok(())
}

pub fn execute(sub_matches: &ArgMatches, options: &GlobalOptions) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_PATH, _)) => {
            trace!("Executing \"{} {}\"...", COMMAND_CONFIG, COMMAND_PATH);
            print_configuration_path()
        }
        Some((COMMAND_SHOW, _)) => {
            trace!("Executing \"{} {}\"...", COMMAND_CONFIG, COMMAND_SHOW);
            show_configuration(options)
        }
        Some((name, _)) => Err(CliActionError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliActionError::UnsupportedSubcommand(COMMAND_CONFIG.to_string())),
    }
}
