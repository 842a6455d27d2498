use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing selection: {field} must be chosen before placing a session")]
    MissingSelection { field: String },

    #[error("Slot occupied: {semester} {day} {start_time} already holds entry {entry_id}")]
    SlotOccupied {
        semester: String,
        day: String,
        start_time: String,
        entry_id: i64,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Remote request failed: {0}")]
    RemoteFailure(#[from] reqwest::Error),

    #[error("Remote store returned {status} for {url}")]
    RemoteStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Forbidden,
    Remote,
    Config,
}

impl SchedulerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::MissingSelection { .. } => {
                ErrorCategory::Validation
            }
            Self::SlotOccupied { .. } => ErrorCategory::Conflict,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
            Self::RemoteFailure(_)
            | Self::RemoteStatus { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Remote,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Conflict => 2,
            ErrorCategory::NotFound => 4,
            ErrorCategory::Forbidden => 5,
            ErrorCategory::Remote => 1,
            ErrorCategory::Config => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            SchedulerError::validation("bad target").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            SchedulerError::MissingSelection {
                field: "room_id".to_string()
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            SchedulerError::not_found("Constraint", 7).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            SchedulerError::RemoteStatus {
                status: 500,
                url: "http://localhost/rooms/".to_string()
            }
            .category(),
            ErrorCategory::Remote
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = SchedulerError::not_found("Constraint", 42);
        assert_eq!(err.to_string(), "Constraint not found: 42");
    }
}
