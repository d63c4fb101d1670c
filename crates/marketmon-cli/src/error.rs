use marketmon_core::{FormErrors, GuardDecision, Route};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] marketmon_core::ValidationError),

    #[error("{0}")]
    Form(FormErrors),

    #[error("{path} is not available: {reason}, go to {to}")]
    Redirected {
        path: String,
        to: Route,
        reason: &'static str,
    },

    #[error("{0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] marketmon_core::ConfigError),

    #[error(transparent)]
    Credentials(#[from] marketmon_core::CredentialError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    pub fn redirected(route: Route, decision: GuardDecision) -> Option<Self> {
        match decision {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { to, reason } => Some(Self::Redirected {
                path: route.path(),
                to,
                reason: reason.as_str(),
            }),
        }
    }

    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Form(_) => 2,
            Self::Command(_) => 3,
            Self::Serialization(_) => 4,
            Self::Redirected { .. } => 5,
            Self::Config(_) | Self::Credentials(_) | Self::Io(_) => 10,
            Self::Interrupted => 130,
        }
    }
}
