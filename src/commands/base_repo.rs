//! base-repo command definitions.

use crate::commands::params::{
    from_parameter, identifier_parameter, identifiers_parameter, metadata_parameter,
    no_soft_parameter, page_parameter, payload_parameter, relative_path_parameter,
    size_parameter, soft_parameter, until_parameter, version_parameter,
    COMMAND_BASE_REPO, COMMAND_CREATE_CONTENT, COMMAND_CREATE_RESOURCE,
    COMMAND_DELETE_CONTENT, COMMAND_DELETE_RESOURCE, COMMAND_DOWNLOAD_CONTENT,
    COMMAND_GET_CONTENT, COMMAND_GET_RESOURCE, COMMAND_GET_RESOURCES, COMMAND_PATCH_CONTENT,
    COMMAND_PATCH_RESOURCE, COMMAND_UPDATE_RESOURCE,
};
use clap::Command;

/// Create the base-repo command with all its subcommands.
pub fn base_repo_command() -> Command {
    Command::new(COMMAND_BASE_REPO)
        .about("Manage data resources and their content in a base-repo instance")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_CREATE_RESOURCE)
                .about("Create a new data resource")
                .visible_alias("createResource")
                .arg(metadata_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_CREATE_CONTENT)
                .about("Upload content to a data resource")
                .visible_alias("createContent")
                .arg(identifier_parameter())
                .arg(metadata_parameter())
                .arg(payload_parameter())
                .arg(relative_path_parameter().help(
                    "Where the content is stored. A path ending with a slash gets the local file name appended",
                )),
        )
        .subcommand(
            Command::new(COMMAND_GET_RESOURCE)
                .about("Show one or more data resources")
                .visible_alias("getResource")
                .arg(identifiers_parameter())
                .arg(version_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET_RESOURCES)
                .about("List data resources, optionally filtered by creation time")
                .visible_alias("getResources")
                .arg(from_parameter())
                .arg(until_parameter())
                .arg(page_parameter())
                .arg(size_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET_CONTENT)
                .about("Show content information of one or more data resources")
                .visible_alias("getContent")
                .arg(identifiers_parameter())
                .arg(relative_path_parameter())
                .arg(version_parameter())
                .arg(page_parameter())
                .arg(size_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DOWNLOAD_CONTENT)
                .about("Download a file, or a folder as zip archive")
                .visible_alias("downloadContent")
                .arg(identifier_parameter())
                .arg(relative_path_parameter())
                .arg(version_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPDATE_RESOURCE)
                .about("Replace the metadata of a data resource")
                .visible_alias("updateResource")
                .arg(identifier_parameter())
                .arg(metadata_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_PATCH_RESOURCE)
                .about("Apply a JSON Patch (RFC 6902) to one or more data resources")
                .visible_alias("patchResource")
                .arg(identifiers_parameter())
                .arg(payload_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_PATCH_CONTENT)
                .about("Apply a JSON Patch (RFC 6902) to content information")
                .visible_alias("patchContent")
                .arg(identifier_parameter())
                .arg(relative_path_parameter().required(true).default_value(None::<&str>))
                .arg(payload_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_RESOURCE)
                .about("Revoke or purge one or more data resources")
                .visible_alias("deleteResource")
                .arg(identifiers_parameter())
                .arg(soft_parameter())
                .arg(no_soft_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_CONTENT)
                .about("Delete a single content element")
                .visible_alias("deleteContent")
                .arg(identifier_parameter())
                .arg(relative_path_parameter().required(true).default_value(None::<&str>)),
        )
}
