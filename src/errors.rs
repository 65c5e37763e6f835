use thiserror::Error;

use crate::pipeline::Collaborator;
use crate::pipeline::StashField;

#[derive(Error, Debug)]
pub enum RagError {
    /// A collaborator answered with a non-success status. Status and body are kept verbatim.
    #[error("{collaborator} returned status {status}: {body}")]
    Collaborator {
        collaborator: Collaborator,
        status: u16,
        body: String,
    },

    /// The collaborator could not be reached, timed out, or sent an unparseable body.
    #[error("Transport error calling {collaborator}: {message}")]
    Transport {
        collaborator: Collaborator,
        message: String,
    },

    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Stash field '{0}' read before any step wrote it")]
    MissingField(StashField),

    #[error("Stash field '{0}' is write-once and was already set")]
    FieldAlreadySet(StashField),

    #[error("Invalid pipeline ordering: {0}")]
    PipelineOrder(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    pub fn transport(collaborator: Collaborator, message: impl Into<String>) -> Self {
        Self::Transport {
            collaborator,
            message: message.into(),
        }
    }

    pub const fn is_collaborator(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Upstream status code, for collaborator errors only
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Collaborator { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream body, for collaborator errors only
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Collaborator { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Short machine-readable name of the error kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Collaborator { .. } => "collaborator_error",
            Self::Transport { .. } => "transport_error",
            Self::Validation(_) => "validation_error",
            Self::MissingField(_) | Self::FieldAlreadySet(_) | Self::PipelineOrder(_) => {
                "pipeline_error"
            }
            Self::ConfigError(_) | Self::TomlParsing(_) => "config_error",
            Self::HttpError(_) | Self::Serialization(_) | Self::Io(_) => "internal_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
