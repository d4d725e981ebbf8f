//! Helpers shared by the service actions: client construction, batch execution
//! and output handling.

use crate::{
    access::{AccessClient, DeleteMode, QueryParams},
    actions::CliActionError,
    commands::params::{
        PARAMETER_AUTH, PARAMETER_IDENTIFIER, PARAMETER_METADATA, PARAMETER_OUTPUT,
        PARAMETER_PAYLOAD, PARAMETER_RENDER_AS,
    },
    configuration::Configuration,
    credentials::PromptingCredentials,
    error_utils,
    format::{Formattable, OutputFormat, RenderFormat},
    http_utils::{HttpClient, HttpRequestConfig},
    keycloak::KeycloakClient,
    services::{ResourceClient, Upload},
    session::SessionManager,
};
use clap::ArgMatches;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// Options every operation honours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub auth: bool,
    pub render_as: RenderFormat,
    pub output: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let render_as = matches
            .get_one::<String>(PARAMETER_RENDER_AS)
            .and_then(|value| RenderFormat::from_str(value).ok())
            .unwrap_or_default();

        Self {
            auth: matches.get_flag(PARAMETER_AUTH),
            render_as,
            output: matches.get_one::<PathBuf>(PARAMETER_OUTPUT).cloned(),
        }
    }
}

/// The single identifier of an operation.
pub fn identifier(matches: &ArgMatches) -> Result<String, CliActionError> {
    matches
        .get_one::<String>(PARAMETER_IDENTIFIER)
        .cloned()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_IDENTIFIER.to_string()))
}

pub fn path_argument(matches: &ArgMatches, name: &str) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(name).cloned()
}

pub fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf, CliActionError> {
    path_argument(matches, name).ok_or_else(|| CliActionError::MissingRequiredArgument(name.to_string()))
}

/// Metadata and payload files as far as they were given.
pub fn upload(matches: &ArgMatches) -> Upload {
    Upload::new(
        path_argument(matches, PARAMETER_METADATA),
        path_argument(matches, PARAMETER_PAYLOAD),
    )
}

/// A session manager backed by the configured Keycloak, or one that rejects
/// authenticated calls if no Keycloak is configured.
pub fn session_manager(configuration: &Configuration) -> Result<SessionManager, CliActionError> {
    match configuration.keycloak() {
        Some(keycloak) => {
            trace!("Using Keycloak realm {} at {}", keycloak.realm_name, keycloak.server_url);
            let identity = KeycloakClient::new(
                keycloak.server_url.as_str(),
                &keycloak.realm_name,
                &keycloak.client_id,
            )?;
            let credentials =
                PromptingCredentials::new(keycloak.username.clone(), keycloak.password.clone());
            Ok(SessionManager::new(Arc::new(identity), Arc::new(credentials)))
        }
        None => {
            debug!("No keycloak section configured, authentication is unavailable");
            Ok(SessionManager::unauthenticated())
        }
    }
}

pub fn access_client(configuration: &Configuration, server_url: &Url) -> Result<AccessClient, CliActionError> {
    let transport = HttpClient::new(HttpRequestConfig::default())?;
    Ok(AccessClient::new(
        server_url.as_str(),
        Arc::new(transport),
        session_manager(configuration)?,
    ))
}

/// Reads every target and concatenates the results. The first failure aborts the batch.
pub async fn read_all<C: ResourceClient>(
    client: &mut C,
    targets: &[C::Target],
    query: &QueryParams,
    auth: bool,
) -> Result<Vec<Value>, CliActionError> {
    let mut results = Vec::new();
    for target in targets {
        results.extend(client.get(target, query, auth).await?);
    }
    Ok(results)
}

/// Deletes every target, reporting failures without stopping.
///
/// `targets` pairs the identifier shown to the user with the target itself.
pub async fn delete_all<C: ResourceClient>(
    client: &mut C,
    label: &str,
    targets: &[(String, C::Target)],
    mode: DeleteMode,
    auth: bool,
) -> Result<(), CliActionError> {
    let mut failed = 0;
    for (identifier, target) in targets {
        match client.delete(target, mode, auth).await {
            Ok(outcome) => println!("{} {} {}", label, identifier, outcome),
            Err(e) => {
                failed += 1;
                error_utils::report_error_with_message(
                    &e,
                    &format!("{} {} could not be deleted.", label, identifier),
                );
            }
        }
    }

    if failed > 0 {
        return Err(CliActionError::PartialFailure {
            failed,
            total: targets.len(),
        });
    }
    Ok(())
}

fn write_output(path: &PathBuf, content: &[u8]) -> Result<(), CliActionError> {
    fs::write(path, content).map_err(|source| CliActionError::OutputError {
        path: path.clone(),
        source,
    })?;
    println!("Output written to {}", path.display());
    Ok(())
}

/// Renders `values` and prints them, or writes them to the output file.
pub fn emit<C: ResourceClient>(
    client: &C,
    values: Vec<Value>,
    options: &GlobalOptions,
) -> Result<(), CliActionError> {
    let rendered = client.render(values, options.render_as);

    match &options.output {
        Some(path) => {
            let text = rendered.format(&OutputFormat::for_path(path))?;
            write_output(path, text.as_bytes())
        }
        None => {
            let text = rendered.format(&OutputFormat::Text)?;
            if !text.is_empty() {
                println!("{}", text);
            }
            Ok(())
        }
    }
}

/// Writes downloaded bytes unchanged to the output file or stdout.
pub fn emit_bytes(bytes: &[u8], options: &GlobalOptions) -> Result<(), CliActionError> {
    match &options.output {
        Some(path) => write_output(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli_command;
    use tempfile::TempDir;

    #[test]
    fn test_global_options_defaults() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", "config", "path"])
            .unwrap();
        let (_, config) = matches.subcommand().unwrap();
        let (_, leaf) = config.subcommand().unwrap();

        let options = GlobalOptions::from_matches(leaf);

        assert!(!options.auth);
        assert_eq!(options.render_as, RenderFormat::Table);
        assert!(options.output.is_none());
    }

    #[test]
    fn test_global_options_from_flags() {
        let matches = cli_command()
            .try_get_matches_from(["kitdm", "-a", "-r", "raw", "-o", "out.json", "config", "show"])
            .unwrap();

        let options = GlobalOptions::from_matches(&matches);

        assert!(options.auth);
        assert_eq!(options.render_as, RenderFormat::Raw);
        assert_eq!(options.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_emit_bytes_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("download.bin");
        let options = GlobalOptions {
            output: Some(path.clone()),
            ..GlobalOptions::default()
        };

        emit_bytes(&[1, 2, 3], &options).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unauthenticated_session_without_keycloak() {
        let configuration = Configuration::default();
        let manager = session_manager(&configuration).unwrap();
        assert!(manager.session().access_token().is_none());
    }
}
