mod admin;
mod auth;
mod favorites;
mod health;
mod instruments;
mod navigation;

use std::sync::Arc;
use std::time::Instant;

use marketmon_core::{
    guard, ApiClient, AppStore, AuthView, ClientConfig, CredentialStore, Envelope, EnvelopeError,
    EnvelopeMeta, FileCredentialStore, HttpClient, ReqwestHttpClient, Route, ViewContext,
    ViewError, ViewScope,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::cli::{AdminCommand, Cli, Command, FavoriteCommand};
use crate::error::CliError;
use crate::output::{Rendered, Table};

pub struct CommandResult {
    pub data: Value,
    pub headline: Vec<String>,
    pub table: Option<Table>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            headline: Vec::new(),
            table: None,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_headline(mut self, line: impl Into<String>) -> Self {
        self.headline.push(line.into());
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

/// Everything a command needs: the shared view context and the process-wide
/// shutdown token every page scope hangs off.
pub struct Session {
    ctx: ViewContext,
    shutdown: CancellationToken,
}

impl Session {
    pub fn new(ctx: ViewContext, shutdown: CancellationToken) -> Self {
        Self { ctx, shutdown }
    }

    pub fn ctx(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn scope(&self) -> ViewScope {
        ViewScope::child_of(&self.shutdown)
    }

    /// Applies the route guard for the page the command stands for.
    pub fn require(&self, route: Route) -> Result<(), CliError> {
        let credential = self.ctx.store().read(|state| state.session.credential());
        match CliError::redirected(route, guard(route, credential.as_ref())) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Splits a view failure into an envelope entry (backend failures) or a hard
/// CLI error (everything else).
pub fn view_failure(error: ViewError) -> Result<EnvelopeError, CliError> {
    match error {
        ViewError::Api { message, source } => Ok(EnvelopeError::from_api(message, &source)),
        ViewError::Form(errors) => Err(CliError::Form(errors)),
        ViewError::Credentials(error) => Err(CliError::Credentials(error)),
        ViewError::Cancelled => Err(CliError::Interrupted),
        other @ ViewError::NotLoaded => Err(CliError::Command(other.to_string())),
    }
}

pub fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url)?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    if let Some(path) = &cli.credentials {
        config = config.with_credentials_path(path.clone());
    }
    Ok(config)
}

pub fn build_session(
    config: &ClientConfig,
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialStore>,
    shutdown: CancellationToken,
) -> Result<Session, CliError> {
    let api = ApiClient::from_config(config, http, Arc::clone(&credentials));
    let ctx = ViewContext::new(api, AppStore::default(), credentials);

    let restored = AuthView::mount(&ctx).restore().map_err(|error| match error {
        ViewError::Credentials(error) => CliError::Credentials(error),
        other => CliError::Command(other.to_string()),
    })?;
    debug!(signed_in = restored.is_some(), "session restored");

    Ok(Session::new(ctx, shutdown))
}

pub async fn run(cli: &Cli, shutdown: CancellationToken) -> Result<Rendered, CliError> {
    let config = resolve_config(cli)?;
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    let session = build_session(
        &config,
        Arc::new(ReqwestHttpClient::new()),
        credentials,
        shutdown,
    )?;

    execute(&session, &cli.command, &config.api_base_url).await
}

pub async fn execute(
    session: &Session,
    command: &Command,
    api_base_url: &str,
) -> Result<Rendered, CliError> {
    let started = Instant::now();

    let result = match command {
        Command::Login(args) => auth::login(session, args).await?,
        Command::Register(args) => auth::register(session, args).await?,
        Command::Logout => auth::logout(session)?,
        Command::Whoami => auth::whoami(session)?,
        Command::Instruments(args) => instruments::list(session, args).await?,
        Command::Show(args) => instruments::show(session, args).await?,
        Command::Favorites => favorites::list(session).await?,
        Command::Favorite(FavoriteCommand::Add(args)) => {
            favorites::set(session, args, Some(true)).await?
        }
        Command::Favorite(FavoriteCommand::Remove(args)) => {
            favorites::set(session, args, Some(false)).await?
        }
        Command::Favorite(FavoriteCommand::Toggle(args)) => {
            favorites::set(session, args, None).await?
        }
        Command::Admin(AdminCommand::Users) => admin::users(session).await?,
        Command::Admin(AdminCommand::RefreshMarketData) => admin::refresh(session).await?,
        Command::Admin(AdminCommand::InitInstruments) => admin::initialize(session).await?,
        Command::Health => health::run(session).await?,
        Command::Route(args) => navigation::route(session, args)?,
        Command::Nav => navigation::nav(session)?,
    };

    let CommandResult {
        data,
        headline,
        table,
        warnings,
        errors,
    } = result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), api_base_url, latency_ms)
        .with_warnings(warnings);

    Ok(Rendered {
        envelope: Envelope::new(meta, data, errors),
        headline,
        table,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use marketmon_core::{
        ClientConfig, MemoryCredentialStore, Role, StoredCredential, StubHttpClient, User,
    };
    use tokio_util::sync::CancellationToken;

    use super::{build_session, Session};

    pub fn session(stub: &StubHttpClient, role: Option<Role>) -> Session {
        let credentials = match role {
            Some(role) => MemoryCredentialStore::with_credential(StoredCredential::new(
                "tok123",
                User::new(1, "Ana", "a@b.com", role),
            )),
            None => MemoryCredentialStore::new(),
        };
        let config = ClientConfig::from_lookup(|key| {
            (key == "HOME").then(|| String::from("/tmp/marketmon-test"))
        })
        .expect("config");
        build_session(
            &config,
            Arc::new(stub.clone()),
            Arc::new(credentials),
            CancellationToken::new(),
        )
        .expect("session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::InstrumentsArgs;
    use clap::Parser;
    use marketmon_core::{HttpMethod, HttpResponse, Role, StubHttpClient};

    #[test]
    fn unusable_api_url_is_a_config_error() {
        let cli = Cli::try_parse_from([
            "marketmon",
            "health",
            "--api-url",
            "http://host/api?x=1",
            "--credentials",
            "/tmp/marketmon-test-credentials.json",
        ])
        .expect("arguments parse");

        let error = resolve_config(&cli).expect_err("rejected");

        assert!(matches!(error, CliError::Config(_)));
        assert_eq!(error.exit_code(), 10);
    }

    #[tokio::test]
    async fn envelope_carries_request_metadata() {
        let stub = StubHttpClient::new();
        let session = testing::session(&stub, Some(Role::Admin));

        let rendered = execute(&session, &Command::Nav, "http://api.test")
            .await
            .expect("nav");

        let meta = &rendered.envelope.meta;
        assert_eq!(meta.request_id.len(), 36);
        assert_eq!(meta.api_base_url, "http://api.test");
        assert!(rendered.envelope.is_ok());
        assert_eq!(rendered.headline, vec![String::from("Hola, Ana")]);
    }

    #[tokio::test]
    async fn backend_failures_stay_in_the_envelope() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments", HttpResponse::new(502, ""));
        let session = testing::session(&stub, Some(Role::User));

        let rendered = execute(
            &session,
            &Command::Instruments(InstrumentsArgs {
                search: None,
                remote: false,
            }),
            "http://api.test",
        )
        .await
        .expect("soft failure");

        assert!(!rendered.envelope.is_ok());
        assert_eq!(rendered.envelope.errors[0].status, Some(502));
    }

    #[tokio::test]
    async fn shutdown_interrupts_pending_commands() {
        let stub = StubHttpClient::new();
        let session = testing::session(&stub, Some(Role::User));
        session.shutdown.cancel();

        let error = execute(&session, &Command::Favorites, "http://api.test")
            .await
            .err()
            .expect("interrupted");

        assert_eq!(error.exit_code(), 130);
    }
}
