//! base-repo operations.

use crate::{
    access::{DeleteMode, QueryParams},
    actions::{
        utils::{
            access_client, delete_all, emit, emit_bytes, identifier, read_all, required_path,
            upload, GlobalOptions,
        },
        CliActionError,
    },
    commands::params::*,
    configuration::Configuration,
    param_utils::{identifiers, range_and_pagination_query, version_parameter_value},
    services::{BaseRepoClient, BaseRepoTarget, ResourceClient, Upload},
};
use clap::ArgMatches;
use tracing::trace;

fn client(configuration: &Configuration) -> Result<BaseRepoClient, CliActionError> {
    let settings = configuration.base_repo()?;
    let access = access_client(configuration, &settings.server_url)?;
    Ok(BaseRepoClient::new(access, settings.clone()))
}

fn relative_path(matches: &ArgMatches) -> Option<&str> {
    matches
        .get_one::<String>(PARAMETER_RELATIVE_PATH)
        .map(String::as_str)
}

/// Query of a content read: folders are paged, single files may be versioned.
fn content_query(matches: &ArgMatches, relative_path: &str, identifiers: usize) -> QueryParams {
    if relative_path.ends_with('/') {
        QueryParams::new()
            .with(PARAMETER_PAGE, matches.get_one::<u32>(PARAMETER_PAGE))
            .with(PARAMETER_SIZE, matches.get_one::<u32>(PARAMETER_SIZE))
    } else {
        QueryParams::new().with(PARAMETER_VERSION, version_parameter_value(matches, identifiers))
    }
}

pub async fn execute(
    sub_matches: &ArgMatches,
    configuration: &Configuration,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let Some((command, matches)) = sub_matches.subcommand() else {
        return Err(CliActionError::UnsupportedSubcommand(COMMAND_BASE_REPO.to_string()));
    };
    trace!("Executing \"{} {}\"...", COMMAND_BASE_REPO, command);

    let mut client = client(configuration)?;
    let auth = options.auth;

    match command {
        COMMAND_CREATE_RESOURCE => {
            let upload = Upload::metadata(required_path(matches, PARAMETER_METADATA)?);
            let created = client.create(&BaseRepoTarget::Resources, &upload, auth).await?;
            emit(&client, created, options)
        }
        COMMAND_CREATE_CONTENT => {
            let target = BaseRepoTarget::Content {
                resource_id: identifier(matches)?,
                relative_path: relative_path(matches).unwrap_or(DEFAULT_RELATIVE_PATH).to_string(),
            };
            let created = client.create(&target, &upload(matches), auth).await?;
            emit(&client, created, options)
        }
        COMMAND_GET_RESOURCES => {
            let query = range_and_pagination_query(matches);
            let resources = client.get(&BaseRepoTarget::Resources, &query, auth).await?;
            emit(&client, resources, options)
        }
        COMMAND_GET_RESOURCE => {
            let ids = identifiers(matches, PARAMETER_IDENTIFIER);
            let query =
                QueryParams::new().with(PARAMETER_VERSION, version_parameter_value(matches, ids.len()));
            let targets: Vec<BaseRepoTarget> = ids.into_iter().map(BaseRepoTarget::Resource).collect();
            let resources = read_all(&mut client, &targets, &query, auth).await?;
            emit(&client, resources, options)
        }
        COMMAND_GET_CONTENT => {
            let ids = identifiers(matches, PARAMETER_IDENTIFIER);
            let path = relative_path(matches).unwrap_or(DEFAULT_RELATIVE_PATH);
            let query = content_query(matches, path, ids.len());
            let targets: Vec<BaseRepoTarget> = ids
                .iter()
                .map(|id| BaseRepoTarget::Content {
                    resource_id: id.clone(),
                    relative_path: path.to_string(),
                })
                .collect();
            let content = read_all(&mut client, &targets, &query, auth).await?;
            emit(&client, content, options)
        }
        COMMAND_DOWNLOAD_CONTENT => {
            let target = BaseRepoTarget::Content {
                resource_id: identifier(matches)?,
                relative_path: relative_path(matches).unwrap_or(DEFAULT_RELATIVE_PATH).to_string(),
            };
            let version = matches.get_one::<u64>(PARAMETER_VERSION).copied();
            let bytes = client.download(&target, version, auth).await?;
            emit_bytes(&bytes, options)
        }
        COMMAND_UPDATE_RESOURCE => {
            let target = BaseRepoTarget::Resource(identifier(matches)?);
            let upload = Upload::metadata(required_path(matches, PARAMETER_METADATA)?);
            let updated = client.update(&target, &upload, auth).await?;
            emit(&client, updated, options)
        }
        COMMAND_PATCH_RESOURCE => {
            let patch = required_path(matches, PARAMETER_PAYLOAD)?;
            let mut patched = Vec::new();
            for id in identifiers(matches, PARAMETER_IDENTIFIER) {
                let target = BaseRepoTarget::Resource(id);
                patched.extend(client.patch(&target, &patch, auth).await?);
            }
            emit(&client, patched, options)
        }
        COMMAND_PATCH_CONTENT => {
            let patch = required_path(matches, PARAMETER_PAYLOAD)?;
            let path = relative_path(matches)
                .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_RELATIVE_PATH.to_string()))?;
            let target = BaseRepoTarget::for_identifier(&identifier(matches)?, Some(path));
            let patched = client.patch(&target, &patch, auth).await?;
            emit(&client, patched, options)
        }
        COMMAND_DELETE_RESOURCE => {
            let mode = DeleteMode::from_soft(!matches.get_flag(PARAMETER_NO_SOFT));
            let targets: Vec<(String, BaseRepoTarget)> = identifiers(matches, PARAMETER_IDENTIFIER)
                .into_iter()
                .map(|id| (id.clone(), BaseRepoTarget::Resource(id)))
                .collect();
            delete_all(&mut client, "Resource", &targets, mode, auth).await
        }
        COMMAND_DELETE_CONTENT => {
            let id = identifier(matches)?;
            let path = relative_path(matches)
                .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_RELATIVE_PATH.to_string()))?;
            let targets = vec![(
                format!("{}/data/{}", id, path.trim_start_matches('/')),
                BaseRepoTarget::Content {
                    resource_id: id.clone(),
                    relative_path: path.to_string(),
                },
            )];
            delete_all(&mut client, "Content", &targets, DeleteMode::Hard, auth).await
        }
        _ => Err(CliActionError::UnsupportedSubcommand(command.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli_command;

    fn leaf(args: &[&str]) -> ArgMatches {
        let matches = cli_command().try_get_matches_from(args).unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, operation) = group.subcommand().unwrap();
        operation.clone()
    }

    #[test]
    fn test_folder_content_query_is_paged() {
        let matches = leaf(&[
            "kitdm", COMMAND_BASE_REPO, COMMAND_GET_CONTENT, "-i", "r1", "-v", "3", "-s", "5",
        ]);
        let query = content_query(&matches, "/", 1);
        assert_eq!(query.apply("x"), "x?page=0&size=5");
    }

    #[test]
    fn test_file_content_query_is_versioned() {
        let matches = leaf(&[
            "kitdm", COMMAND_BASE_REPO, COMMAND_GET_CONTENT, "-i", "r1", "--relative-path", "a.txt", "-v", "3",
        ]);
        assert_eq!(content_query(&matches, "a.txt", 1).apply("x"), "x?version=3");
        assert_eq!(content_query(&matches, "a.txt", 2).apply("x"), "x");
    }
}
