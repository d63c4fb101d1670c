use tracing::warn;

use crate::{Instrument, InstrumentId};

use super::{
    LoadOutcome, ToggleOutcome, ViewContext, ViewError, ViewScope, FAVORITES_LOAD_FAILED,
};

/// The favorites page (`/favorites`).
///
/// Load failures are logged and leave the previous favorites in place; the
/// page has no error banner.
#[derive(Debug)]
pub struct FavoritesView {
    ctx: ViewContext,
    scope: ViewScope,
}

impl FavoritesView {
    pub fn mount(ctx: &ViewContext) -> Self {
        Self::with_scope(ctx, ViewScope::new())
    }

    pub fn with_scope(ctx: &ViewContext, scope: ViewScope) -> Self {
        Self {
            ctx: ctx.clone(),
            scope,
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn load(&self) -> Result<LoadOutcome, ViewError> {
        let store = self.ctx.store();
        let ticket = store.begin_favorites_fetch();

        match self.scope.run(self.ctx.api().list_favorites()).await {
            None => {
                store.abandon_fetch(ticket);
                Err(ViewError::Cancelled)
            }
            Some(Ok(items)) => Ok(LoadOutcome::from_applied(
                store.finish_favorites_fetch(ticket, items),
            )),
            Some(Err(error)) => {
                warn!(code = error.code(), %error, "favorites fetch failed");
                Err(ViewError::api(FAVORITES_LOAD_FAILED, error))
            }
        }
    }

    pub fn favorites(&self) -> Vec<Instrument> {
        self.ctx
            .store()
            .read(|state| state.instruments.favorites().to_vec())
    }

    /// Unmarks `id` and drops it from the page.
    pub async fn remove(&self, id: InstrumentId) -> Result<ToggleOutcome, ViewError> {
        self.ctx.set_favorite(&self.scope, id, false, None).await
    }
}
