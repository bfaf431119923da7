//! Error types for Granule.
//!
//! All errors in Granule are strongly typed using thiserror.
//! This enables pattern matching on specific error conditions
//! and provides clear error messages.
//!
//! Every error here is fatal to the command that produced it: the
//! command processor reports the message and aborts that command.
//! Nothing is retried or recovered inside this crate.

use thiserror::Error;

/// Errors raised while constructing or modifying a single extension.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("Extension ID '{id}' must be alphanumeric or underscore characters")]
    InvalidIdentifier {
        id: String,
    },

    #[error("Could not find extension group '{name}'")]
    UnknownGroup {
        name: String,
    },

    #[error("Illegal extension modify command: {reason}")]
    IllegalModifyCommand {
        reason: String,
    },
}

/// Errors raised by the particle-group registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("Group name cannot be empty")]
    EmptyGroupName,

    #[error("Group '{name}' already exists")]
    DuplicateGroup {
        name: String,
    },

    #[error("Cannot define more than {max} groups")]
    TooManyGroups {
        max: usize,
    },
}

/// Errors raised by the extension registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Extension ID '{id}' is already in use")]
    DuplicateExtension {
        id: String,
    },

    #[error("Extension '{id}' does not exist")]
    ExtensionNotFound {
        id: String,
    },

    #[error("Extension command needs at least an ID, a group name, and a style")]
    IllegalCommand,
}

/// Top-level error type for Granule.
///
/// This enum encompasses all possible errors that can occur
/// when using the extension core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GranuleError {
    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Group error: {0}")]
    Group(#[from] GroupError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl GranuleError {
    /// Returns true if this is an extension construction/modify error.
    #[must_use]
    pub const fn is_extension(&self) -> bool {
        matches!(self, Self::Extension(_))
    }

    /// Returns true if this is a group registry error.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Returns true if this is an extension registry error.
    #[must_use]
    pub const fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }
}

/// Result type alias for Granule operations.
pub type GranuleResult<T> = Result<T, GranuleError>;
