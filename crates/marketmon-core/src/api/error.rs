use std::fmt::{Display, Formatter};

use crate::credentials::CredentialError;
use crate::http_client::HttpError;

/// Classification of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// 401: missing, invalid or expired token.
    Unauthorized,
    /// 403: authenticated but not allowed.
    Forbidden,
    NotFound,
    /// Any other non-2xx status.
    Rejected,
    /// 2xx with a body that does not match the expected shape.
    Decode,
    /// The stored credential could not be read.
    Credentials,
}

/// Structured API error. View-models collapse it to a fixed store message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    status: Option<u16>,
    transient: bool,
}

impl ApiError {
    pub fn transport(error: &HttpError) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: error.message().to_owned(),
            status: None,
            transient: error.is_transient(),
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Rejected,
        };
        let detail = body.trim();
        let message = if detail.is_empty() {
            format!("backend returned status {status}")
        } else {
            format!("backend returned status {status}: {}", truncate(detail, 200))
        };
        Self {
            kind,
            message,
            status: Some(status),
            transient: status >= 500,
        }
    }

    pub fn decode(error: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: format!("unexpected response body: {error}"),
            status: None,
            transient: false,
        }
    }

    pub fn credentials(error: &CredentialError) -> Self {
        Self {
            kind: ApiErrorKind::Credentials,
            message: error.to_string(),
            status: None,
            transient: false,
        }
    }

    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Timeouts, refused connections and 5xx answers.
    pub const fn is_retryable(&self) -> bool {
        self.transient
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ApiErrorKind::Transport => "api.transport",
            ApiErrorKind::Unauthorized => "api.unauthorized",
            ApiErrorKind::Forbidden => "api.forbidden",
            ApiErrorKind::NotFound => "api.not_found",
            ApiErrorKind::Rejected => "api.rejected",
            ApiErrorKind::Decode => "api.decode",
            ApiErrorKind::Credentials => "api.credentials",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ApiError {}

fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}…", &value[..index]),
        None => value.to_owned(),
    }
}
