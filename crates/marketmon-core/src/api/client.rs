use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::forms::{LoginForm, RegisterForm};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{AuthResponse, HealthReport, Instrument, InstrumentId, UserSummary};

use super::ApiError;

/// Typed client for the market monitor backend.
///
/// Authenticated calls read the bearer token from the credential store on
/// every request, so a login or logout performed elsewhere is picked up
/// without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_ms: u64,
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_ms: crate::config::DEFAULT_TIMEOUT_MS,
            http,
            credentials,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        http: Arc<dyn HttpClient>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self::new(config.api_base_url.clone(), http, credentials).with_timeout_ms(config.timeout_ms)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthResponse, ApiError> {
        let body = encode(form)?;
        let request = HttpRequest::post(self.url("/auth/login")).with_json_body(body);
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ApiError> {
        let body = encode(form)?;
        let request = HttpRequest::post(self.url("/auth/register")).with_json_body(body);
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn list_instruments(&self) -> Result<Vec<Instrument>, ApiError> {
        self.get_json("/instruments").await
    }

    pub async fn search_instruments(&self, query: &str) -> Result<Vec<Instrument>, ApiError> {
        let path = format!(
            "/instruments/search?q={}",
            urlencoding::encode(query.trim())
        );
        self.get_json(&path).await
    }

    pub async fn get_instrument(&self, id: InstrumentId) -> Result<Instrument, ApiError> {
        self.get_json(&format!("/instruments/{id}")).await
    }

    pub async fn list_favorites(&self) -> Result<Vec<Instrument>, ApiError> {
        self.get_json("/instruments/favorites").await
    }

    pub async fn add_favorite(&self, id: InstrumentId) -> Result<(), ApiError> {
        let request = HttpRequest::post(self.url(&format!("/instruments/{id}/favorite")));
        self.send_authenticated(request).await.map(drop)
    }

    pub async fn remove_favorite(&self, id: InstrumentId) -> Result<(), ApiError> {
        let request = HttpRequest::delete(self.url(&format!("/instruments/{id}/favorite")));
        self.send_authenticated(request).await.map(drop)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.get_json("/admin/users").await
    }

    /// Returns the backend's plain-text confirmation.
    pub async fn update_market_data(&self) -> Result<String, ApiError> {
        let request = HttpRequest::post(self.url("/admin/update-market-data"));
        Ok(self.send_authenticated(request).await?.body)
    }

    pub async fn initialize_instruments(&self) -> Result<String, ApiError> {
        let request = HttpRequest::post(self.url("/admin/initialize-instruments"));
        Ok(self.send_authenticated(request).await?.body)
    }

    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        let response = self.send(HttpRequest::get(self.url("/health"))).await?;
        decode(&response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .send_authenticated(HttpRequest::get(self.url(path)))
            .await?;
        decode(&response)
    }

    async fn send_authenticated(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = match self.credentials.load() {
            Ok(Some(credential)) => request.with_bearer_token(&credential.token),
            Ok(None) => request,
            Err(error) => {
                warn!(%error, "stored credential unreadable");
                return Err(ApiError::credentials(&error));
            }
        };
        self.send(request).await
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = request.with_timeout_ms(self.timeout_ms);
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "backend request");

        let response = self.http.execute(request).await.map_err(|error| {
            warn!(%method, %url, error = error.message(), "backend unreachable");
            ApiError::transport(&error)
        })?;

        debug!(%method, %url, status = response.status, "backend response");
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|error| ApiError::decode(&error))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|error| ApiError::decode(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::credentials::{MemoryCredentialStore, StoredCredential};
    use crate::http_client::{HttpError, HttpMethod, StubHttpClient};
    use crate::{Role, User};

    fn client(stub: &StubHttpClient, credentials: MemoryCredentialStore) -> ApiClient {
        ApiClient::new(
            "http://api.test/",
            Arc::new(stub.clone()),
            Arc::new(credentials),
        )
    }

    fn logged_in() -> MemoryCredentialStore {
        MemoryCredentialStore::with_credential(StoredCredential::new(
            "tok123",
            User::new(1, "Ana", "a@b.com", Role::User),
        ))
    }

    #[tokio::test]
    async fn authenticated_calls_carry_the_stored_token() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments", HttpResponse::ok_json("[]"));

        let instruments = client(&stub, logged_in())
            .list_instruments()
            .await
            .expect("listing succeeds");

        assert!(instruments.is_empty());
        let requests = stub.requests();
        assert_eq!(requests[0].url, "http://api.test/instruments");
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Bearer tok123")
        );
    }

    #[tokio::test]
    async fn login_posts_json_without_authorization() {
        let stub = StubHttpClient::new();
        stub.respond(
            HttpMethod::Post,
            "/auth/login",
            HttpResponse::ok_json(
                r#"{"token":"t","id":2,"name":"Leo","email":"l@x.io","role":"ADMIN"}"#,
            ),
        );

        let response = client(&stub, logged_in())
            .login(&LoginForm::new("l@x.io", "secret1"))
            .await
            .expect("login succeeds");

        assert_eq!(response.role, Role::Admin);
        let request = &stub.requests()[0];
        assert!(!request.headers.contains_key("authorization"));
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap_or_default()).expect("json body");
        assert_eq!(body["email"], "l@x.io");
        assert_eq!(body["password"], "secret1");
    }

    #[tokio::test]
    async fn search_query_is_url_encoded() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments/search", HttpResponse::ok_json("[]"));

        client(&stub, logged_in())
            .search_instruments(" s&p 500 ")
            .await
            .expect("search succeeds");

        assert_eq!(
            stub.requests()[0].url,
            "http://api.test/instruments/search?q=s%26p%20500"
        );
    }

    #[tokio::test]
    async fn status_and_transport_failures_are_classified() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments/5", HttpResponse::empty(404))
            .respond(HttpMethod::Get, "/instruments", HttpResponse::empty(401))
            .fail(
                HttpMethod::Get,
                "/instruments/favorites",
                HttpError::connect("connection refused"),
            )
            .respond(HttpMethod::Get, "/admin/users", HttpResponse::ok_json("{oops"));
        let api = client(&stub, logged_in());

        let not_found = api.get_instrument(InstrumentId::new(5)).await.expect_err("404");
        assert_eq!(not_found.kind(), ApiErrorKind::NotFound);
        assert_eq!(not_found.status(), Some(404));

        let unauthorized = api.list_instruments().await.expect_err("401");
        assert_eq!(unauthorized.kind(), ApiErrorKind::Unauthorized);

        let transport = api.list_favorites().await.expect_err("transport");
        assert_eq!(transport.kind(), ApiErrorKind::Transport);

        let decode = api.list_users().await.expect_err("decode");
        assert_eq!(decode.kind(), ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn favorite_mutations_use_post_and_delete() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Post, "/instruments/3/favorite", HttpResponse::empty(200))
            .respond(HttpMethod::Delete, "/instruments/3/favorite", HttpResponse::empty(204));
        let api = client(&stub, logged_in());

        api.add_favorite(InstrumentId::new(3)).await.expect("add");
        api.remove_favorite(InstrumentId::new(3)).await.expect("remove");

        assert_eq!(stub.request_count(HttpMethod::Post, "/instruments/3/favorite"), 1);
        assert_eq!(stub.request_count(HttpMethod::Delete, "/instruments/3/favorite"), 1);
    }
}
