//! Shared command parameters for all CLI commands.
//!
//! This module defines the parameter names and argument builders that are used
//! across the base-repo, MetaStore and Typed PID Maker command groups.

use crate::format::RenderFormat;
use crate::param_utils::query_date_value_parser;
use clap::{value_parser, Arg, ArgAction};
use std::path::PathBuf;

// Command groups
pub const COMMAND_BASE_REPO: &str = "base-repo";
pub const COMMAND_METASTORE: &str = "metastore";
pub const COMMAND_PID: &str = "pid";
pub const COMMAND_CONFIG: &str = "config";

// base-repo operations
pub const COMMAND_CREATE_RESOURCE: &str = "create-resource";
pub const COMMAND_CREATE_CONTENT: &str = "create-content";
pub const COMMAND_GET_RESOURCE: &str = "get-resource";
pub const COMMAND_GET_RESOURCES: &str = "get-resources";
pub const COMMAND_GET_CONTENT: &str = "get-content";
pub const COMMAND_DOWNLOAD_CONTENT: &str = "download-content";
pub const COMMAND_UPDATE_RESOURCE: &str = "update-resource";
pub const COMMAND_PATCH_RESOURCE: &str = "patch-resource";
pub const COMMAND_PATCH_CONTENT: &str = "patch-content";
pub const COMMAND_DELETE_RESOURCE: &str = "delete-resource";
pub const COMMAND_DELETE_CONTENT: &str = "delete-content";

// MetaStore operations
pub const COMMAND_CREATE_SCHEMA: &str = "create-schema";
pub const COMMAND_CREATE_DOCUMENT: &str = "create-document";
pub const COMMAND_GET_SCHEMA: &str = "get-schema";
pub const COMMAND_GET_SCHEMAS: &str = "get-schemas";
pub const COMMAND_GET_DOCUMENT: &str = "get-document";
pub const COMMAND_GET_DOCUMENTS: &str = "get-documents";
pub const COMMAND_DOWNLOAD_SCHEMA: &str = "download-schema";
pub const COMMAND_DOWNLOAD_DOCUMENT: &str = "download-document";
pub const COMMAND_UPDATE_SCHEMA: &str = "update-schema";
pub const COMMAND_UPDATE_DOCUMENT: &str = "update-document";
pub const COMMAND_DELETE_SCHEMA: &str = "delete-schema";
pub const COMMAND_DELETE_DOCUMENT: &str = "delete-document";

// Typed PID Maker operations
pub const COMMAND_CREATE_RECORD: &str = "create-record";
pub const COMMAND_GET_PID: &str = "get-pid";
pub const COMMAND_GET_KNOWN_PID: &str = "get-known-pid";
pub const COMMAND_GET_KNOWN_PIDS: &str = "get-known-pids";
pub const COMMAND_UPDATE_RECORD: &str = "update-record";

// Config commands
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SHOW: &str = "show";

// Global parameter names
pub const PARAMETER_AUTH: &str = "auth";
pub const PARAMETER_NO_AUTH: &str = "no-auth";
pub const PARAMETER_RENDER_AS: &str = "render-as";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_DEBUG: &str = "debug";

// Parameter names. Page and size double as query parameter names.
pub const PARAMETER_IDENTIFIER: &str = "identifier";
pub const PARAMETER_METADATA: &str = "metadata";
pub const PARAMETER_PAYLOAD: &str = "payload";
pub const PARAMETER_RELATIVE_PATH: &str = "relative-path";
pub const PARAMETER_VERSION: &str = "version";
pub const PARAMETER_FROM: &str = "from";
pub const PARAMETER_UNTIL: &str = "until";
pub const PARAMETER_MODIFIED_FROM: &str = "modified-from";
pub const PARAMETER_MODIFIED_UNTIL: &str = "modified-until";
pub const PARAMETER_PAGE: &str = "page";
pub const PARAMETER_SIZE: &str = "size";
pub const PARAMETER_SOFT: &str = "soft";
pub const PARAMETER_NO_SOFT: &str = "no-soft";
pub const PARAMETER_DRY_RUN: &str = "dry-run";
pub const PARAMETER_VALIDATE: &str = "validate";
pub const PARAMETER_SCHEMA_ID: &str = "schema-id";
pub const PARAMETER_RELATED_RESOURCE: &str = "related-resource";

pub const DEFAULT_PAGE: &str = "0";
pub const DEFAULT_PAGE_SIZE: &str = "20";
pub const DEFAULT_RELATIVE_PATH: &str = "/";

const DATE_HELP: &str = "Accepts 2023-11-02, 2023-11-02T08:33:00Z, now, today, yesterday or phrases like 'two days ago'";

/// `--auth` enables login before the request, `--no-auth` turns it off again.
pub fn auth_parameter() -> Arg {
    Arg::new(PARAMETER_AUTH)
        .short('a')
        .long(PARAMETER_AUTH)
        .action(ArgAction::SetTrue)
        .overrides_with(PARAMETER_NO_AUTH)
        .global(true)
        .help("Authenticate against the configured Keycloak before each request")
}

pub fn no_auth_parameter() -> Arg {
    Arg::new(PARAMETER_NO_AUTH)
        .long(PARAMETER_NO_AUTH)
        .action(ArgAction::SetTrue)
        .overrides_with(PARAMETER_AUTH)
        .global(true)
        .help("Send requests without authentication (default)")
}

pub fn render_as_parameter() -> Arg {
    Arg::new(PARAMETER_RENDER_AS)
        .short('r')
        .long(PARAMETER_RENDER_AS)
        .num_args(1)
        .env("KITDM_RENDER_AS")
        .default_value("TABLE")
        .global(true)
        .ignore_case(true)
        .value_parser(RenderFormat::names())
        .help("How results are rendered")
}

pub fn output_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long(PARAMETER_OUTPUT)
        .num_args(1)
        .global(true)
        .value_parser(value_parser!(PathBuf))
        .help("Write the result or download to this file (.csv and .json reformat tables)")
}

pub fn debug_parameter() -> Arg {
    Arg::new(PARAMETER_DEBUG)
        .short('d')
        .long(PARAMETER_DEBUG)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

/// One identifier.
pub fn identifier_parameter() -> Arg {
    Arg::new(PARAMETER_IDENTIFIER)
        .short('i')
        .long(PARAMETER_IDENTIFIER)
        .visible_alias("id")
        .num_args(1)
        .required(true)
        .help("A single identifier")
}

/// One or more space-separated identifiers.
pub fn identifiers_parameter() -> Arg {
    Arg::new(PARAMETER_IDENTIFIER)
        .short('i')
        .long(PARAMETER_IDENTIFIER)
        .visible_alias("id")
        .num_args(1..)
        .required(true)
        .action(ArgAction::Append)
        .help("One or more space-separated identifiers")
}

pub fn metadata_parameter() -> Arg {
    Arg::new(PARAMETER_METADATA)
        .short('m')
        .long(PARAMETER_METADATA)
        .num_args(1)
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a JSON document with the metadata of the created or updated element")
}

pub fn payload_parameter() -> Arg {
    Arg::new(PARAMETER_PAYLOAD)
        .short('l')
        .long(PARAMETER_PAYLOAD)
        .num_args(1)
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a payload file: data, a schema, a document or patch instructions")
}

pub fn relative_path_parameter() -> Arg {
    Arg::new(PARAMETER_RELATIVE_PATH)
        .long(PARAMETER_RELATIVE_PATH)
        .alias("relativePath")
        .num_args(1)
        .default_value(DEFAULT_RELATIVE_PATH)
        .help("Relative path of the content below the resource, e.g. file.txt or folder/")
}

pub fn version_parameter() -> Arg {
    Arg::new(PARAMETER_VERSION)
        .short('v')
        .long(PARAMETER_VERSION)
        .num_args(1)
        .value_parser(value_parser!(u64))
        .help("Version to obtain, ignored when several identifiers are given")
}

pub fn from_parameter() -> Arg {
    Arg::new(PARAMETER_FROM)
        .short('f')
        .long(PARAMETER_FROM)
        .alias("fromDate")
        .num_args(1)
        .value_parser(query_date_value_parser)
        .help(format!("Only elements created after this date. {}", DATE_HELP))
}

pub fn until_parameter() -> Arg {
    Arg::new(PARAMETER_UNTIL)
        .short('u')
        .long(PARAMETER_UNTIL)
        .alias("untilDate")
        .num_args(1)
        .value_parser(query_date_value_parser)
        .help(format!("Only elements created before this date. {}", DATE_HELP))
}

pub fn modified_from_parameter() -> Arg {
    Arg::new(PARAMETER_MODIFIED_FROM)
        .long(PARAMETER_MODIFIED_FROM)
        .alias("modifiedFromDate")
        .num_args(1)
        .value_parser(query_date_value_parser)
        .help(format!("Only elements modified after this date. {}", DATE_HELP))
}

pub fn modified_until_parameter() -> Arg {
    Arg::new(PARAMETER_MODIFIED_UNTIL)
        .long(PARAMETER_MODIFIED_UNTIL)
        .alias("modifiedUntilDate")
        .num_args(1)
        .value_parser(query_date_value_parser)
        .help(format!("Only elements modified before this date. {}", DATE_HELP))
}

pub fn page_parameter() -> Arg {
    Arg::new(PARAMETER_PAGE)
        .short('p')
        .long(PARAMETER_PAGE)
        .num_args(1)
        .default_value(DEFAULT_PAGE)
        .value_parser(value_parser!(u32))
        .help("Page of the listing, starting at 0")
}

pub fn size_parameter() -> Arg {
    Arg::new(PARAMETER_SIZE)
        .short('s')
        .long(PARAMETER_SIZE)
        .alias("pageSize")
        .num_args(1)
        .default_value(DEFAULT_PAGE_SIZE)
        .value_parser(value_parser!(u32))
        .help("Number of elements per page (server maximum is 100)")
}

/// `--soft` is the default. `--no-soft` purges in one call.
pub fn soft_parameter() -> Arg {
    Arg::new(PARAMETER_SOFT)
        .long(PARAMETER_SOFT)
        .action(ArgAction::SetTrue)
        .overrides_with(PARAMETER_NO_SOFT)
        .help("Only revoke on the first delete, purge on the second (default)")
}

pub fn no_soft_parameter() -> Arg {
    Arg::new(PARAMETER_NO_SOFT)
        .long(PARAMETER_NO_SOFT)
        .action(ArgAction::SetTrue)
        .overrides_with(PARAMETER_SOFT)
        .help("Revoke and purge within one invocation")
}

pub fn dry_run_parameter() -> Arg {
    Arg::new(PARAMETER_DRY_RUN)
        .long(PARAMETER_DRY_RUN)
        .alias("dryRun")
        .action(ArgAction::SetTrue)
        .help("Only validate the record, nothing is stored")
}

pub fn validate_parameter() -> Arg {
    Arg::new(PARAMETER_VALIDATE)
        .long(PARAMETER_VALIDATE)
        .action(ArgAction::SetTrue)
        .help("Validate the record before it is returned")
}

pub fn schema_id_parameter() -> Arg {
    Arg::new(PARAMETER_SCHEMA_ID)
        .long(PARAMETER_SCHEMA_ID)
        .alias("schemaIds")
        .num_args(1..)
        .action(ArgAction::Append)
        .help("Only documents of these schemas")
}

pub fn related_resource_parameter() -> Arg {
    Arg::new(PARAMETER_RELATED_RESOURCE)
        .long(PARAMETER_RELATED_RESOURCE)
        .alias("relatedResources")
        .num_args(1..)
        .action(ArgAction::Append)
        .help("Only documents describing these resources")
}
