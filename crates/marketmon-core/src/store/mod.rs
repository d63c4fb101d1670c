//! Application state container.
//!
//! [`AppState`] is a plain value updated by pure reducers. [`AppStore`] owns
//! the live copy behind a `tokio::sync::watch` channel: every dispatch
//! replaces the state in one step and wakes subscribers. The store is created
//! by the composition root and cloned into each view.

mod admin;
mod instruments;
mod session;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::{Instrument, UserSummary};

pub use admin::{AdminAction, AdminState};
pub use instruments::{InstrumentsAction, InstrumentsState};
pub use session::{SessionAction, SessionState};

/// Every transition the client can make.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Session(SessionAction),
    Instruments(InstrumentsAction),
    Admin(AdminAction),
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<InstrumentsAction> for Action {
    fn from(action: InstrumentsAction) -> Self {
        Self::Instruments(action)
    }
}

impl From<AdminAction> for Action {
    fn from(action: AdminAction) -> Self {
        Self::Admin(action)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: SessionState,
    pub instruments: InstrumentsState,
    pub admin: AdminState,
}

impl AppState {
    pub fn reduce(mut self, action: impl Into<Action>) -> Self {
        self.apply(action.into());
        self
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Session(action) => self.session.apply(action),
            Action::Instruments(action) => self.instruments.apply(action),
            Action::Admin(action) => self.admin.apply(action),
        }
    }
}

/// Collections fetched with a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    InstrumentList,
    Favorites,
    Users,
}

impl FetchKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InstrumentList => "instrument_list",
            Self::Favorites => "favorites",
            Self::Users => "users",
        }
    }
}

/// Proof that a fetch was started. Only the most recent ticket of a kind may
/// write its result into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    kind: FetchKind,
    generation: u64,
}

impl FetchTicket {
    pub const fn kind(self) -> FetchKind {
        self.kind
    }

    pub const fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Generations {
    instrument_list: u64,
    favorites: u64,
    users: u64,
}

impl Generations {
    fn slot(&mut self, kind: FetchKind) -> &mut u64 {
        match kind {
            FetchKind::InstrumentList => &mut self.instrument_list,
            FetchKind::Favorites => &mut self.favorites,
            FetchKind::Users => &mut self.users,
        }
    }
}

struct Shared {
    state: watch::Sender<AppState>,
    generations: Mutex<Generations>,
}

/// Cloneable handle on the live [`AppState`].
#[derive(Clone)]
pub struct AppStore {
    shared: Arc<Shared>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl AppStore {
    pub fn new(initial: AppState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            shared: Arc::new(Shared {
                state,
                generations: Mutex::new(Generations::default()),
            }),
        }
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        self.shared.state.send_modify(|state| state.apply(action));
    }

    pub fn snapshot(&self) -> AppState {
        self.shared.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.shared.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.shared.state.subscribe()
    }

    /// Starts a list fetch: marks the list as loading and supersedes any
    /// earlier list ticket.
    pub fn begin_list_fetch(&self) -> FetchTicket {
        self.begin(
            FetchKind::InstrumentList,
            Some(InstrumentsAction::BeginFetchList.into()),
        )
    }

    pub fn finish_list_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<Instrument>, String>,
    ) -> bool {
        let action = match result {
            Ok(items) => InstrumentsAction::CompleteFetchList(items),
            Err(message) => InstrumentsAction::FailFetchList(message),
        };
        self.finish(ticket, action.into())
    }

    pub fn begin_favorites_fetch(&self) -> FetchTicket {
        self.begin(FetchKind::Favorites, None)
    }

    /// Favorites have no failure state; only successful fetches are applied.
    pub fn finish_favorites_fetch(&self, ticket: FetchTicket, items: Vec<Instrument>) -> bool {
        self.finish(ticket, InstrumentsAction::SetFavorites(items).into())
    }

    pub fn begin_users_fetch(&self) -> FetchTicket {
        self.begin(FetchKind::Users, Some(AdminAction::BeginFetchUsers.into()))
    }

    pub fn finish_users_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<UserSummary>, String>,
    ) -> bool {
        let action = match result {
            Ok(users) => AdminAction::CompleteFetchUsers(users),
            Err(message) => AdminAction::FailFetchUsers(message),
        };
        self.finish(ticket, action.into())
    }

    /// Clears the loading flag of a fetch whose view went away. Does nothing
    /// when a newer fetch already owns the collection.
    pub fn abandon_fetch(&self, ticket: FetchTicket) -> bool {
        let action = match ticket.kind {
            FetchKind::InstrumentList => InstrumentsAction::AbandonFetchList.into(),
            FetchKind::Users => AdminAction::AbandonFetchUsers.into(),
            FetchKind::Favorites => return self.is_current(ticket),
        };
        self.finish(ticket, action)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        *self.generations().slot(ticket.kind) == ticket.generation
    }

    fn begin(&self, kind: FetchKind, action: Option<Action>) -> FetchTicket {
        let mut generations = self.generations();
        let slot = generations.slot(kind);
        *slot += 1;
        let ticket = FetchTicket {
            kind,
            generation: *slot,
        };
        if let Some(action) = action {
            self.shared.state.send_modify(|state| state.apply(action));
        }
        ticket
    }

    fn finish(&self, ticket: FetchTicket, action: Action) -> bool {
        let mut generations = self.generations();
        let latest = *generations.slot(ticket.kind);
        if latest != ticket.generation {
            debug!(
                kind = ticket.kind.as_str(),
                stale = ticket.generation,
                latest,
                "dropping superseded response"
            );
            return false;
        }
        self.shared.state.send_modify(|state| state.apply(action));
        true
    }

    fn generations(&self) -> MutexGuard<'_, Generations> {
        self.shared
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}
