//! Core of the clientperms mapping provider.
//!
//! This crate holds the supported-mod registry that answers client
//! permission queries, the collaborator traits a host game server implements,
//! the admin console commands, and the logging subsystem.

pub mod command;
pub mod logging;
pub mod provider;
pub mod registry;

pub use provider::{
    PermissionChecker, PermissionTable, PermissionsContainer, PermissionsMappingProvider,
};
pub use registry::{ModVersionRegistry, RegistryError, RESERVED_MOD_NAME};
