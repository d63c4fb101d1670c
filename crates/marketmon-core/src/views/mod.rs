//! View-models: one per page.
//!
//! A page issues its reads through the [`ApiClient`], writes the results into
//! the [`AppStore`] and renders from store snapshots. Every page owns a
//! [`ViewScope`]; dropping or cancelling the scope abandons whatever the page
//! still has in flight.

mod admin;
mod auth;
mod detail;
mod favorites;
mod instruments;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::credentials::{CredentialError, CredentialStore};
use crate::forms::FormErrors;
use crate::store::{AppStore, InstrumentsAction};
use crate::{Instrument, InstrumentId};

pub use admin::AdminView;
pub use auth::AuthView;
pub use detail::{DetailState, DetailView};
pub use favorites::FavoritesView;
pub use instruments::InstrumentListView;

pub const LOGIN_FAILED: &str = "Credenciales inválidas";
pub const REGISTER_FAILED: &str = "Error al registrar usuario";
pub const INSTRUMENTS_LOAD_FAILED: &str = "Error al cargar instrumentos";
pub const INSTRUMENT_LOAD_FAILED: &str = "Error al cargar el instrumento";
pub const INSTRUMENT_NOT_FOUND: &str = "Instrumento no encontrado";
pub const USERS_LOAD_FAILED: &str = "Error al cargar usuarios";
pub const FAVORITES_LOAD_FAILED: &str = "Error al cargar favoritos";
pub const FAVORITE_UPDATE_FAILED: &str = "Error al actualizar favorito";
pub const MARKET_DATA_UPDATE_FAILED: &str = "Error al actualizar datos de mercado";
pub const INSTRUMENTS_INIT_FAILED: &str = "Error al inicializar instrumentos";

/// Failures surfaced to the caller of a view operation.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("invalid form: {0}")]
    Form(FormErrors),

    /// The fixed message shown to the user, with the structured cause.
    #[error("{message}")]
    Api {
        message: &'static str,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("no instrument loaded")]
    NotLoaded,

    #[error("view closed before the request finished")]
    Cancelled,
}

impl ViewError {
    pub fn api(message: &'static str, source: ApiError) -> Self {
        Self::Api { message, source }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Whether a finished fetch was written into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer fetch of the same collection started meanwhile.
    Superseded,
}

impl LoadOutcome {
    pub(crate) const fn from_applied(applied: bool) -> Self {
        if applied {
            Self::Applied
        } else {
            Self::Superseded
        }
    }
}

/// Result of a favorite toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; carries the new flag.
    Applied { favorite: bool },
    /// Another toggle of the same instrument is still in flight.
    AlreadyPending,
}

/// Dependencies shared by every page, created once by the composition root.
#[derive(Clone)]
pub struct ViewContext {
    api: ApiClient,
    store: AppStore,
    credentials: Arc<dyn CredentialStore>,
    pending_toggles: Arc<Mutex<HashSet<InstrumentId>>>,
}

impl ViewContext {
    pub fn new(api: ApiClient, store: AppStore, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            credentials,
            pending_toggles: Arc::default(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Marks `id` as having a toggle in flight. `None` when one already is.
    pub(crate) fn claim_toggle(&self, id: InstrumentId) -> Option<ToggleClaim> {
        if self.pending().insert(id) {
            Some(ToggleClaim {
                id,
                pending: Arc::clone(&self.pending_toggles),
            })
        } else {
            debug!(%id, "favorite toggle already in flight");
            None
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashSet<InstrumentId>> {
        self.pending_toggles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Server call first, then the same local update on both collections.
    /// `snapshot` fills the favorites entry when the list does not hold `id`.
    pub(crate) async fn set_favorite(
        &self,
        scope: &ViewScope,
        id: InstrumentId,
        favorite: bool,
        snapshot: Option<&Instrument>,
    ) -> Result<ToggleOutcome, ViewError> {
        let Some(_claim) = self.claim_toggle(id) else {
            return Ok(ToggleOutcome::AlreadyPending);
        };

        let call = async {
            if favorite {
                self.api.add_favorite(id).await
            } else {
                self.api.remove_favorite(id).await
            }
        };
        match scope.run(call).await {
            None => Err(ViewError::Cancelled),
            Some(Err(error)) => {
                warn!(%id, favorite, code = error.code(), %error, "favorite update failed");
                Err(ViewError::api(FAVORITE_UPDATE_FAILED, error))
            }
            Some(Ok(())) => {
                self.apply_favorite_locally(id, favorite, snapshot);
                Ok(ToggleOutcome::Applied { favorite })
            }
        }
    }

    fn apply_favorite_locally(
        &self,
        id: InstrumentId,
        favorite: bool,
        snapshot: Option<&Instrument>,
    ) {
        self.store
            .dispatch(InstrumentsAction::SetFavoriteFlag { id, favorite });
        if favorite {
            let known = self
                .store
                .read(|state| state.instruments.find(id).cloned())
                .or_else(|| snapshot.cloned());
            if let Some(instrument) = known {
                self.store
                    .dispatch(InstrumentsAction::UpsertFavoriteEntry(instrument));
            }
        } else {
            self.store
                .dispatch(InstrumentsAction::RemoveFavoriteEntry(id));
        }
    }
}

impl std::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("api", &self.api)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Releases the in-flight marker of a favorite toggle on drop.
pub(crate) struct ToggleClaim {
    id: InstrumentId,
    pending: Arc<Mutex<HashSet<InstrumentId>>>,
}

impl Drop for ToggleClaim {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Lifetime of a mounted page. Cancelled when dropped.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Scope that is also cancelled when `parent` is, e.g. on Ctrl+C.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Handle that can cancel this scope from another task.
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives `future` unless the scope is cancelled first.
    pub async fn run<F>(&self, future: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_scope_skips_the_future() {
        let scope = ViewScope::new();
        scope.cancel();

        let output = scope.run(async { 42 }).await;

        assert_eq!(output, None);
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_work() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });

        let output = scope
            .run(tokio::time::sleep(Duration::from_secs(30)))
            .await;

        assert!(output.is_none());
    }

    #[test]
    fn dropping_a_scope_cancels_its_handle() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        drop(scope);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn parent_cancellation_reaches_child_scope() {
        let parent = CancellationToken::new();
        let scope = ViewScope::child_of(&parent);
        parent.cancel();
        assert!(scope.is_cancelled());
    }
}
