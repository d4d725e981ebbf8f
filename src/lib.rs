//! The KIT Data Manager CLI client library.
//!
//! This crate provides a command line client for the KIT Data Manager services
//! base-repo, MetaStore and Typed PID Maker. All three share one access layer
//! that handles authentication, optimistic locking and the delete lifecycle.
//!
//! # Modules
//!
//! - `access`: Resource access facade, conditional mutations and soft deletes
//! - `actions`: Execution of the individual CLI operations
//! - `commands`: CLI command definitions
//! - `configuration`: Properties file loading
//! - `format`: Rendering of results as table, list or raw JSON
//! - `services`: Paths, media types and payloads of the three services
//! - `session`: Token session management against an identity provider

pub mod access;
pub mod actions;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod credentials;
pub mod documents;
pub mod error;
pub mod error_utils;
pub mod exit_codes;
pub mod format;
pub mod http_utils;
pub mod keycloak;
pub mod param_utils;
pub mod services;
pub mod session;
