//! MetaStore command definitions.

use crate::commands::params::{
    from_parameter, identifier_parameter, identifiers_parameter, metadata_parameter,
    no_soft_parameter, page_parameter, payload_parameter, related_resource_parameter,
    schema_id_parameter, size_parameter, soft_parameter, until_parameter, version_parameter,
    COMMAND_CREATE_DOCUMENT, COMMAND_CREATE_SCHEMA, COMMAND_DELETE_DOCUMENT,
    COMMAND_DELETE_SCHEMA, COMMAND_DOWNLOAD_DOCUMENT, COMMAND_DOWNLOAD_SCHEMA,
    COMMAND_GET_DOCUMENT, COMMAND_GET_DOCUMENTS, COMMAND_GET_SCHEMA, COMMAND_GET_SCHEMAS,
    COMMAND_METASTORE, COMMAND_UPDATE_DOCUMENT, COMMAND_UPDATE_SCHEMA,
};
use clap::Command;

fn listing(name: &'static str, alias: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .visible_alias(alias)
        .arg(from_parameter())
        .arg(until_parameter())
        .arg(page_parameter())
        .arg(size_parameter())
}

/// Create the metastore command with all its subcommands.
pub fn metastore_command() -> Command {
    Command::new(COMMAND_METASTORE)
        .about("Manage metadata schemas and documents in a MetaStore instance")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_CREATE_SCHEMA)
                .about("Register a new schema")
                .visible_alias("createSchema")
                .arg(metadata_parameter().required(true).help("Path to the schema record"))
                .arg(payload_parameter().required(true).help("Path to the schema document")),
        )
        .subcommand(
            Command::new(COMMAND_CREATE_DOCUMENT)
                .about("Register a new metadata document")
                .visible_alias("createDocument")
                .arg(metadata_parameter().required(true).help("Path to the metadata record"))
                .arg(payload_parameter().required(true).help("Path to the metadata document")),
        )
        .subcommand(
            Command::new(COMMAND_GET_SCHEMA)
                .about("Show one or more schema records")
                .visible_alias("getSchema")
                .arg(identifiers_parameter())
                .arg(version_parameter()),
        )
        .subcommand(listing(
            COMMAND_GET_SCHEMAS,
            "getSchemas",
            "List schema records, optionally filtered by creation time",
        ))
        .subcommand(
            Command::new(COMMAND_GET_DOCUMENT)
                .about("Show one or more metadata records")
                .visible_alias("getDocument")
                .arg(identifiers_parameter())
                .arg(version_parameter()),
        )
        .subcommand(
            listing(
                COMMAND_GET_DOCUMENTS,
                "getDocuments",
                "List metadata records, optionally filtered by schema, resource or creation time",
            )
            .arg(schema_id_parameter())
            .arg(related_resource_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DOWNLOAD_SCHEMA)
                .about("Download a schema document")
                .visible_alias("downloadSchema")
                .arg(identifier_parameter())
                .arg(version_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DOWNLOAD_DOCUMENT)
                .about("Download a metadata document")
                .visible_alias("downloadDocument")
                .arg(identifier_parameter())
                .arg(version_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE_SCHEMA)
                .about("Replace the record and/or document of a schema")
                .visible_alias("updateSchema")
                .arg(identifier_parameter())
                .arg(metadata_parameter())
                .arg(payload_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE_DOCUMENT)
                .about("Replace the record and/or document of a metadata document")
                .visible_alias("updateDocument")
                .arg(identifier_parameter())
                .arg(metadata_parameter())
                .arg(payload_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_SCHEMA)
                .about("Revoke or purge one or more schemas")
                .visible_alias("deleteSchema")
                .arg(identifiers_parameter())
                .arg(soft_parameter())
                .arg(no_soft_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_DOCUMENT)
                .about("Revoke or purge one or more metadata documents")
                .visible_alias("deleteDocument")
                .arg(identifiers_parameter())
                .arg(soft_parameter())
                .arg(no_soft_parameter()),
        )
}
