//! Error types for Courier

use thiserror::Error;

/// Result type alias using Courier's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Courier error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Project '{0}' not found. Run `courier projects untracked` to see local projects.")]
    ProjectNotFound(String),

    #[error("Workspace '{0}' not found.")]
    WorkspaceNotFound(String),

    #[error("Organization '{0}' not found. Run `courier orgs list` to see your organizations.")]
    OrganizationNotFound(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Connectivity(String),

    // Bootstrap errors (E200-E299)
    #[error("{0}")]
    Bootstrap(String),

    #[error("Not logged in. Run `courier login` first.")]
    NotAuthenticated,

    // Sync errors (E300-E399)
    #[error("Conflict resolution timed out after {0} seconds")]
    ConflictResolutionTimeout(u64),

    #[error("Conflict resolution was cancelled")]
    ConflictResolutionCancelled,

    #[error("Merge conflict for project {0} was left unresolved")]
    ConflictUnresolved(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // User errors (E700-E799)
    #[error("User cancelled operation")]
    UserCancelled,

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E001",
            Self::WorkspaceNotFound(_) => "E002",
            Self::OrganizationNotFound(_) => "E003",
            Self::NetworkError(_) => "E100",
            Self::Api { .. } => "E101",
            Self::Connectivity(_) => "E102",
            Self::Bootstrap(_) => "E200",
            Self::NotAuthenticated => "E201",
            Self::ConflictResolutionTimeout(_) => "E300",
            Self::ConflictResolutionCancelled => "E301",
            Self::ConflictUnresolved(_) => "E302",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::UserCancelled => "E700",
            Self::InvalidInput(_) => "E800",
            Self::Parse(_) => "E801",
            Self::Serialization(_) => "E802",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ProjectNotFound(_) => Some("courier projects untracked".to_string()),
            Self::OrganizationNotFound(_) => Some("courier orgs list".to_string()),
            Self::NetworkError(_) | Self::Connectivity(_) => {
                Some("Check internet connection".to_string())
            }
            Self::Bootstrap(_) => Some("Contact support if this is a recurring issue".to_string()),
            Self::NotAuthenticated => Some("courier login --session-id <id> --account-id <id>".to_string()),
            Self::ConflictResolutionTimeout(_) => {
                Some("courier config set sync.conflict_timeout_secs <secs>".to_string())
            }
            Self::ConflictUnresolved(_) => Some("courier --conflicts theirs start".to_string()),
            _ => None,
        }
    }

    /// Whether this error came from the remote API or the network layer
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::Api { .. } | Self::Connectivity(_)
        )
    }
}
