use thiserror::Error;

/// Every way a dispatch can fail. All variants resolve locally to the
/// dispatch call; none escape past the dispatcher boundary.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{message}")]
    PermissionDenied { message: String },
    #[error("{message}")]
    RequirementFailed { message: String },
    #[error("Invalid argument: '{token}'")]
    InvalidArgument { token: String },
    #[error("Incomplete command. Usage: {usage}")]
    IncompleteCommand { usage: String },
    #[error("Internal error: argument '{name}' not found in context (command registration bug)")]
    MissingArgument { name: String },
    #[error("Internal error: argument '{name}' has wrong type (command registration bug)")]
    WrongArgumentType { name: String },
    #[error("{0}")]
    Message(String),
    #[error("An unexpected error occurred while running this command.")]
    Unexpected(#[from] anyhow::Error),
}

impl CommandError {
    /// Shorthand for a user-facing failure raised inside an executor.
    pub fn msg(message: impl Into<String>) -> Self {
        CommandError::Message(message.into())
    }

    /// Internal errors indicate a bug in command registration, not bad
    /// input. The exception policy logs these for operators.
    pub(super) fn is_internal(&self) -> bool {
        matches!(
            self,
            CommandError::MissingArgument { .. } | CommandError::WrongArgumentType { .. }
        )
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
