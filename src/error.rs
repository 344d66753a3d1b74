//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Crate result alias
pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Validation errors (KG-010 to KG-014)
    // ─────────────────────────────────────────────────────────────
    #[error("KG-010: '{field}' is required")]
    MissingField { field: String },

    #[error("KG-011: '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("KG-012: {reason}")]
    InvalidFile { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Gateway errors (KG-020 to KG-023)
    // ─────────────────────────────────────────────────────────────
    #[error("KG-020: {operation} failed: {message}")]
    Gateway { operation: String, message: String },

    #[error("KG-021: Not signed in")]
    NotAuthenticated,

    #[error("KG-022: Record '{id}' not found in '{table}'")]
    RecordNotFound { table: String, id: String },

    #[error("KG-023: Retry exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    // ─────────────────────────────────────────────────────────────
    // Network / feature errors (KG-030 to KG-033)
    // ─────────────────────────────────────────────────────────────
    #[error("KG-030: Network error: {0}")]
    Network(String),

    #[error("KG-031: {feature} is unavailable: {reason}")]
    FeatureUnavailable { feature: String, reason: String },

    #[error("KG-032: Offline: {url} is not cached")]
    Offline { url: String },

    #[error("KG-033: Timed out after {ms}ms: {operation}")]
    Timeout { operation: String, ms: u64 },

    // ─────────────────────────────────────────────────────────────
    // Config errors (KG-040)
    // ─────────────────────────────────────────────────────────────
    #[error("KG-040: Config error: {reason}")]
    Config { reason: String },
}

impl ShellError {
    /// Shorthand for a failed gateway operation
    pub fn gateway(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Gateway {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a field that failed validation
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised before any gateway call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. } | Self::InvalidFile { .. }
        )
    }

    /// True for transient failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. } | Self::Offline { .. })
    }

    /// Message shown to the user in a notice
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField { field } => format!("Please fill in {}", field),
            Self::InvalidField { field, reason } => format!("{}: {}", field, reason),
            Self::InvalidFile { reason } => reason.clone(),
            Self::Gateway { message, .. } if message.contains("23505") => {
                "This item already exists".to_string()
            }
            Self::Gateway { message, .. } if message.to_lowercase().contains("network") => {
                "Network error. Please check your internet connection.".to_string()
            }
            Self::Gateway { message, .. } => message.clone(),
            Self::NotAuthenticated => "Please sign in to continue".to_string(),
            Self::RecordNotFound { .. } => "No data found".to_string(),
            Self::Network(_) | Self::Offline { .. } => {
                "You are currently offline. Some features may be limited.".to_string()
            }
            Self::FeatureUnavailable { feature, .. } => {
                format!("{} is currently unavailable", feature)
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ShellError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "http request".to_string()),
                ms: 0,
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl FixSuggestion for ShellError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ShellError::Io(_) => Some("Check file path and permissions"),
            ShellError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ShellError::MissingField { .. } => Some("Fill in every required form field"),
            ShellError::InvalidField { .. } => Some("Correct the highlighted field and resubmit"),
            ShellError::InvalidFile { .. } => {
                Some("Use a JPEG, PNG or WebP image smaller than 5MB")
            }
            ShellError::Gateway { .. } => Some("Check gateway URL and key (KHETGO_GATEWAY_URL)"),
            ShellError::NotAuthenticated => Some("Sign in before opening this view"),
            ShellError::RecordNotFound { .. } => Some("Refresh: the record may have been deleted"),
            ShellError::RetryExhausted { .. } => Some("Check connectivity and try again later"),
            ShellError::Network(_) | ShellError::Offline { .. } => {
                Some("Check your internet connection")
            }
            ShellError::FeatureUnavailable { .. } => {
                Some("Set KHETGO_WEATHER_API_KEY / KHETGO_ADVISORY_API_KEY")
            }
            ShellError::Timeout { .. } => Some("Increase the timeout in the config file"),
            ShellError::Config { .. } => Some("Fix the config file or remove it to use defaults"),
        }
    }
}
