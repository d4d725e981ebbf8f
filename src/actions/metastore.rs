//! MetaStore operations.

use crate::{
    access::{DeleteMode, QueryParams},
    actions::{
        utils::{access_client, delete_all, emit, emit_bytes, identifier, read_all, upload, GlobalOptions},
        CliActionError,
    },
    commands::params::*,
    configuration::Configuration,
    param_utils::{identifiers, range_and_pagination_query, version_parameter_value},
    services::{MetastoreClient, MetastoreKind, MetastoreTarget, ResourceClient},
};
use clap::ArgMatches;
use tracing::trace;

fn client(configuration: &Configuration) -> Result<MetastoreClient, CliActionError> {
    let settings = configuration.metastore()?;
    let access = access_client(configuration, &settings.server_url)?;
    Ok(MetastoreClient::new(access, settings.clone()))
}

fn comma_joined(matches: &ArgMatches, name: &str) -> Option<String> {
    let values = identifiers(matches, name);
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

/// Listing query of `get-documents`: range and paging, then the resource and schema filters.
fn documents_query(matches: &ArgMatches) -> QueryParams {
    range_and_pagination_query(matches)
        .with("resourceId", comma_joined(matches, PARAMETER_RELATED_RESOURCE))
        .with("schemaId", comma_joined(matches, PARAMETER_SCHEMA_ID))
}

async fn get(
    client: &mut MetastoreClient,
    kind: MetastoreKind,
    matches: &ArgMatches,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let ids = identifiers(matches, PARAMETER_IDENTIFIER);
    let query = QueryParams::new().with(PARAMETER_VERSION, version_parameter_value(matches, ids.len()));
    let targets: Vec<MetastoreTarget> = ids
        .into_iter()
        .map(|id| MetastoreTarget::single(kind, id))
        .collect();
    let records = read_all(client, &targets, &query, options.auth).await?;
    emit(client, records, options)
}

async fn delete(
    client: &mut MetastoreClient,
    kind: MetastoreKind,
    label: &str,
    matches: &ArgMatches,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let mode = DeleteMode::from_soft(!matches.get_flag(PARAMETER_NO_SOFT));
    let targets: Vec<(String, MetastoreTarget)> = identifiers(matches, PARAMETER_IDENTIFIER)
        .into_iter()
        .map(|id| (id.clone(), MetastoreTarget::single(kind, id)))
        .collect();
    delete_all(client, label, &targets, mode, options.auth).await
}

pub async fn execute(
    sub_matches: &ArgMatches,
    configuration: &Configuration,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let Some((command, matches)) = sub_matches.subcommand() else {
        return Err(CliActionError::UnsupportedSubcommand(COMMAND_METASTORE.to_string()));
    };
    trace!("Executing \"{} {}\"...", COMMAND_METASTORE, command);

    let mut client = client(configuration)?;
    let auth = options.auth;

    match command {
        COMMAND_CREATE_SCHEMA | COMMAND_CREATE_DOCUMENT => {
            let kind = if command == COMMAND_CREATE_SCHEMA {
                MetastoreKind::Schema
            } else {
                MetastoreKind::Document
            };
            let created = client
                .create(&MetastoreTarget::collection(kind), &upload(matches), auth)
                .await?;
            emit(&client, created, options)
        }
        COMMAND_GET_SCHEMA => get(&mut client, MetastoreKind::Schema, matches, options).await,
        COMMAND_GET_DOCUMENT => get(&mut client, MetastoreKind::Document, matches, options).await,
        COMMAND_GET_SCHEMAS => {
            let query = range_and_pagination_query(matches);
            let records = client
                .get(&MetastoreTarget::collection(MetastoreKind::Schema), &query, auth)
                .await?;
            emit(&client, records, options)
        }
        COMMAND_GET_DOCUMENTS => {
            let query = documents_query(matches);
            let records = client
                .get(&MetastoreTarget::collection(MetastoreKind::Document), &query, auth)
                .await?;
            emit(&client, records, options)
        }
        COMMAND_DOWNLOAD_SCHEMA | COMMAND_DOWNLOAD_DOCUMENT => {
            let kind = if command == COMMAND_DOWNLOAD_SCHEMA {
                MetastoreKind::Schema
            } else {
                MetastoreKind::Document
            };
            let target = MetastoreTarget::single(kind, identifier(matches)?);
            let version = matches.get_one::<u64>(PARAMETER_VERSION).copied();
            let bytes = client.download(&target, version, auth).await?;
            emit_bytes(&bytes, options)
        }
        COMMAND_UPDATE_SCHEMA | COMMAND_UPDATE_DOCUMENT => {
            let kind = if command == COMMAND_UPDATE_SCHEMA {
                MetastoreKind::Schema
            } else {
                MetastoreKind::Document
            };
            let target = MetastoreTarget::single(kind, identifier(matches)?);
            let updated = client.update(&target, &upload(matches), auth).await?;
            emit(&client, updated, options)
        }
        COMMAND_DELETE_SCHEMA => {
            delete(&mut client, MetastoreKind::Schema, "Schema", matches, options).await
        }
        COMMAND_DELETE_DOCUMENT => {
            delete(&mut client, MetastoreKind::Document, "Document", matches, options).await
        }
        _ => Err(CliActionError::UnsupportedSubcommand(command.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli_command;

    #[test]
    fn test_documents_query_filters() {
        let matches = cli_command()
            .try_get_matches_from([
                "kitdm",
                COMMAND_METASTORE,
                COMMAND_GET_DOCUMENTS,
                "--schema-id",
                "dc",
                "datacite",
                "--related-resource",
                "r1",
                "-s",
                "50",
            ])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, operation) = group.subcommand().unwrap();

        assert_eq!(
            documents_query(operation).apply("api/v1/metadata"),
            "api/v1/metadata?page=0&size=50&resourceId=r1&schemaId=dc%2Cdatacite"
        );
    }

    #[test]
    fn test_documents_query_without_filters() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", COMMAND_METASTORE, COMMAND_GET_DOCUMENTS])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, operation) = group.subcommand().unwrap();

        assert_eq!(
            documents_query(operation).apply("api/v1/metadata"),
            "api/v1/metadata?page=0&size=20"
        );
    }
}
