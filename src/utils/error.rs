use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Template '{template}' has unresolved placeholders: {}", .missing.join(", "))]
    TemplateError {
        template: String,
        missing: Vec<String>,
    },

    #[error("Model returned HTTP {status}: {message}")]
    ModelResponseError { status: u16, message: String },

    #[error("Model returned an empty answer for step '{step}'")]
    EmptyCompletion { step: String },

    #[error("Chain step '{stage}' failed: {details}")]
    ChainStepError { stage: String, details: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Model,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::ApiError(_) => ErrorCategory::Network,
            AgentError::IoError(_) => ErrorCategory::System,
            AgentError::SerializationError(_) => ErrorCategory::Model,
            AgentError::ConfigValidationError { .. }
            | AgentError::InvalidConfigValueError { .. }
            | AgentError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AgentError::ValidationError { .. } => ErrorCategory::Input,
            AgentError::TemplateError { .. } => ErrorCategory::Processing,
            AgentError::ModelResponseError { .. } | AgentError::EmptyCompletion { .. } => {
                ErrorCategory::Model
            }
            AgentError::ChainStepError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AgentError::ValidationError { .. } => ErrorSeverity::Low,
            AgentError::ApiError(_) | AgentError::EmptyCompletion { .. } => ErrorSeverity::Medium,
            AgentError::ModelResponseError { .. } if self.is_retryable() => ErrorSeverity::Medium,
            AgentError::IoError(_) => ErrorSeverity::Critical,
            AgentError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 可重試的錯誤：逾時、連線失敗、408/409/429 與 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::ApiError(e) => e.is_timeout() || e.is_connect(),
            AgentError::ModelResponseError { status, .. } => {
                matches!(status, 408 | 409 | 429) || (500..=599).contains(status)
            }
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AgentError::ApiError(_) => {
                "Check your network connection and the model API base URL".to_string()
            }
            AgentError::IoError(_) => "Check file permissions and paths".to_string(),
            AgentError::SerializationError(_) => {
                "The provider answered with an unexpected payload; verify the API base URL points to an OpenAI-compatible endpoint".to_string()
            }
            AgentError::ConfigValidationError { field, .. }
            | AgentError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in your configuration", field)
            }
            AgentError::MissingConfigError { field } if field == "model.api_key" => {
                "Set GROQ_API_KEY or pass --api-key".to_string()
            }
            AgentError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            AgentError::ValidationError { .. } => {
                "Type an interest (e.g. praia) or a destination (e.g. Paris)".to_string()
            }
            AgentError::TemplateError { missing, .. } => format!(
                "Make sure the prompt template only uses available placeholders (missing: {})",
                missing.join(", ")
            ),
            AgentError::ModelResponseError { status: 401, .. } => {
                "The API key was rejected; check GROQ_API_KEY".to_string()
            }
            AgentError::ModelResponseError { status: 429, .. } => {
                "Rate limit reached; wait a moment and try again".to_string()
            }
            AgentError::ModelResponseError { .. } => {
                "Check the model name and try again later".to_string()
            }
            AgentError::EmptyCompletion { .. } => {
                "Try again or rephrase the input".to_string()
            }
            AgentError::ChainStepError { .. } => {
                "Run with --verbose to see which prompt failed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the model provider: {}", self),
            ErrorCategory::Model => format!("The model request failed: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Processing => format!("Could not build the answer: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let retryable = [408, 409, 429, 500, 502, 503];
        for status in retryable {
            let err = AgentError::ModelResponseError {
                status,
                message: "x".to_string(),
            };
            assert!(err.is_retryable(), "status {} should be retryable", status);
        }

        let fatal = [400, 401, 403, 404, 422];
        for status in fatal {
            let err = AgentError::ModelResponseError {
                status,
                message: "x".to_string(),
            };
            assert!(!err.is_retryable(), "status {} should not be retryable", status);
        }
    }

    #[test]
    fn test_category_and_severity() {
        let err = AgentError::MissingConfigError {
            field: "model.api_key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("GROQ_API_KEY"));

        let err = AgentError::ValidationError {
            message: "empty".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = AgentError::ModelResponseError {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_template_error_display() {
        let err = AgentError::TemplateError {
            template: "about".to_string(),
            missing: vec!["destination".to_string(), "interest".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Template 'about' has unresolved placeholders: destination, interest"
        );
    }
}
