use thiserror::Error;

/// A command name or description that the platform would reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name of a chat input command cannot have spaces.")]
    NameContainsSpaces,
    #[error("Name of a chat input command must be lowercase.")]
    NameNotLowercase,
    #[error("Name of a chat input command must be less than 32 characters and non empty.")]
    NameLength,
    #[error("Description of a chat input command must be less than 100 characters and non empty.")]
    DescriptionLength,
}

/// Errors raised while turning a callback into a command.
///
/// These are programmer errors: they surface synchronously from the
/// constructors and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Callback for {command} command is missing \"{parameter}\" parameter.")]
    MissingParameter {
        command: String,
        parameter: &'static str,
    },
    #[error("Callback for {command} command has too many parameters.")]
    TooManyParameters { command: String },
    #[error("Parameter {parameter} of {command} command has an unsupported type `{annotation}`.")]
    UnsupportedAnnotation {
        command: String,
        parameter: String,
        annotation: String,
    },
    #[error("Subcommand group {group} is already nested; subcommands can only be nested once.")]
    NestingTooDeep { group: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while a command runs.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A global or per-command check rejected the invocation.
    #[error("{message}")]
    CheckFailure {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
    /// The callback, a hook, or argument resolution failed.
    #[error("Application command raised an exception: {0}")]
    Invoke(#[source] anyhow::Error),
}

impl CommandError {
    pub fn check_failure(message: impl Into<String>) -> Self {
        CommandError::CheckFailure {
            message: message.into(),
            source: None,
        }
    }

    /// The fault the callback raised, if this is an invocation error.
    pub fn original(&self) -> Option<&anyhow::Error> {
        match self {
            CommandError::Invoke(error) => Some(error),
            CommandError::CheckFailure { .. } => None,
        }
    }
}

/// Returned by a callback, check or hook to end the invocation silently.
///
/// After-hooks still run; no error reaches the error handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("application command invocation was cancelled")]
pub struct Cancelled;
