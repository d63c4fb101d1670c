//! Client core for the market monitor dashboard.
//!
//! This crate contains:
//! - Domain models for users, instruments and backend responses
//! - The HTTP transport seam and the typed backend API client
//! - The application state container with its session, instrument and admin stores
//! - Route guard, navigation, form validation and display formatting
//! - Page view-models that tie API calls to store transitions

pub mod api;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod format;
pub mod forms;
pub mod http_client;
pub mod route;
pub mod store;
pub mod views;

pub use api::{ApiClient, ApiError, ApiErrorKind};
pub use config::{ClientConfig, ConfigError};
pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential,
};
pub use domain::{
    AuthResponse, HealthReport, Instrument, InstrumentId, Role, User, UserSummary, UtcDateTime,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::ValidationError;
pub use forms::{FormErrors, LoginForm, RegisterForm};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    StubHttpClient, TransportFailure,
};
pub use route::{greeting, guard, nav_links, GuardDecision, NavLink, RedirectReason, Route};
pub use store::{
    Action, AdminAction, AdminState, AppState, AppStore, FetchKind, FetchTicket,
    InstrumentsAction, InstrumentsState, SessionAction, SessionState,
};
pub use views::{
    AdminView, AuthView, DetailState, DetailView, FavoritesView, InstrumentListView, LoadOutcome,
    ToggleOutcome, ViewContext, ViewError, ViewScope,
};
