use serde::Serialize;

use crate::api::ApiError;
use crate::UtcDateTime;

/// JSON document printed by `marketmon --format json`.
///
/// `data` is always present. A command that could not reach the backend still
/// reports what it had in the store, with the failures listed in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn new(meta: EnvelopeMeta, data: T, errors: Vec<EnvelopeError>) -> Self {
        Self { meta, data, errors }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    pub api_base_url: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(request_id: impl Into<String>, api_base_url: &str, latency_ms: u64) -> Self {
        Self {
            request_id: request_id.into(),
            generated_at: UtcDateTime::now(),
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// One failed backend call.
///
/// `message` is the fixed text the page would show; `detail` keeps what the
/// backend or transport actually said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: &'static str,
    pub message: String,
    pub detail: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl EnvelopeError {
    pub fn from_api(message: &str, error: &ApiError) -> Self {
        Self {
            code: error.code(),
            message: message.to_owned(),
            detail: error.message().to_owned(),
            retryable: error.is_retryable(),
            status: error.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_code_status_and_detail() {
        let api = ApiError::from_status(404, "no such instrument");
        let entry = EnvelopeError::from_api("Instrumento no encontrado", &api);

        assert_eq!(entry.code, "api.not_found");
        assert_eq!(entry.status, Some(404));
        assert_eq!(entry.message, "Instrumento no encontrado");
        assert_eq!(
            entry.detail,
            "backend returned status 404: no such instrument"
        );
        assert!(!entry.retryable);
    }

    #[test]
    fn server_errors_are_marked_retryable() {
        let entry = EnvelopeError::from_api("x", &ApiError::from_status(503, ""));
        assert!(entry.retryable);
    }

    #[test]
    fn empty_sections_are_left_out_of_the_json() {
        let meta = EnvelopeMeta::new("request-12345", "http://localhost:8080/", 0);
        let json = serde_json::to_value(Envelope::new(meta, 1, Vec::new())).expect("serialize");

        assert!(json.get("errors").is_none());
        assert!(json["meta"].get("warnings").is_none());
        assert_eq!(json["meta"]["api_base_url"], "http://localhost:8080");
        assert_eq!(json["data"], 1);
    }
}
