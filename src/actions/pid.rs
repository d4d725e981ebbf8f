//! Typed PID Maker operations.

use crate::{
    access::QueryParams,
    actions::{
        utils::{access_client, emit, identifier, read_all, required_path, GlobalOptions},
        CliActionError,
    },
    commands::params::*,
    configuration::Configuration,
    param_utils::identifiers,
    services::{PidTarget, ResourceClient, TypedPidClient, Upload},
};
use clap::ArgMatches;
use tracing::trace;

fn client(configuration: &Configuration) -> Result<TypedPidClient, CliActionError> {
    let settings = configuration.type_pid_maker()?;
    let access = access_client(configuration, &settings.server_url)?;
    Ok(TypedPidClient::new(access, settings.clone()))
}

/// Filters of the known-PID listing, which names its ranges differently from the other services.
fn known_pids_query(matches: &ArgMatches) -> QueryParams {
    QueryParams::new()
        .with("created_after", matches.get_one::<String>(PARAMETER_FROM))
        .with("created_before", matches.get_one::<String>(PARAMETER_UNTIL))
        .with("modified_after", matches.get_one::<String>(PARAMETER_MODIFIED_FROM))
        .with("modified_until", matches.get_one::<String>(PARAMETER_MODIFIED_UNTIL))
        .with(PARAMETER_PAGE, matches.get_one::<u32>(PARAMETER_PAGE))
        .with(PARAMETER_SIZE, matches.get_one::<u32>(PARAMETER_SIZE))
}

fn pid_query(matches: &ArgMatches) -> QueryParams {
    let validation = matches.get_flag(PARAMETER_VALIDATE).then_some("true");
    QueryParams::new().with("validation", validation)
}

pub async fn execute(
    sub_matches: &ArgMatches,
    configuration: &Configuration,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let Some((command, matches)) = sub_matches.subcommand() else {
        return Err(CliActionError::UnsupportedSubcommand(COMMAND_PID.to_string()));
    };
    trace!("Executing \"{} {}\"...", COMMAND_PID, command);

    let mut client = client(configuration)?;
    let auth = options.auth;

    match command {
        COMMAND_CREATE_RECORD => {
            let target = PidTarget::NewRecord {
                dry_run: matches.get_flag(PARAMETER_DRY_RUN),
            };
            let upload = Upload::metadata(required_path(matches, PARAMETER_METADATA)?);
            let created = client.create(&target, &upload, auth).await?;
            emit(&client, created, options)
        }
        COMMAND_GET_PID => {
            let targets: Vec<PidTarget> = identifiers(matches, PARAMETER_IDENTIFIER)
                .into_iter()
                .map(PidTarget::Record)
                .collect();
            let records = read_all(&mut client, &targets, &pid_query(matches), auth).await?;
            emit(&client, records, options)
        }
        COMMAND_GET_KNOWN_PID => {
            let targets: Vec<PidTarget> = identifiers(matches, PARAMETER_IDENTIFIER)
                .into_iter()
                .map(|pid| PidTarget::Known(Some(pid)))
                .collect();
            let known = read_all(&mut client, &targets, &QueryParams::new(), auth).await?;
            emit(&client, known, options)
        }
        COMMAND_GET_KNOWN_PIDS => {
            let known = client
                .get(&PidTarget::Known(None), &known_pids_query(matches), auth)
                .await?;
            emit(&client, known, options)
        }
        COMMAND_UPDATE_RECORD => {
            let target = PidTarget::Record(identifier(matches)?);
            let upload = Upload::metadata(required_path(matches, PARAMETER_METADATA)?);
            let updated = client.update(&target, &upload, auth).await?;
            emit(&client, updated, options)
        }
        _ => Err(CliActionError::UnsupportedSubcommand(command.to_string())),
    }
}
