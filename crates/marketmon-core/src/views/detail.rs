use tracing::warn;

use crate::api::ApiErrorKind;
use crate::{Instrument, InstrumentId};

use super::{
    ToggleOutcome, ViewContext, ViewError, ViewScope, INSTRUMENT_LOAD_FAILED,
    INSTRUMENT_NOT_FOUND,
};

/// Page-local state of the detail page. Not shared through the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub instrument: Option<Instrument>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DetailState {
    /// Message to show instead of the instrument, if any.
    pub fn banner(&self) -> Option<&str> {
        if self.loading {
            return None;
        }
        match (&self.error, &self.instrument) {
            (Some(error), _) => Some(error),
            (None, None) => Some(INSTRUMENT_NOT_FOUND),
            (None, Some(_)) => None,
        }
    }
}

/// The instrument detail page (`/instrument/:id`).
#[derive(Debug)]
pub struct DetailView {
    ctx: ViewContext,
    scope: ViewScope,
    state: DetailState,
}

impl DetailView {
    pub fn mount(ctx: &ViewContext) -> Self {
        Self::with_scope(ctx, ViewScope::new())
    }

    pub fn with_scope(ctx: &ViewContext, scope: ViewScope) -> Self {
        Self {
            ctx: ctx.clone(),
            scope,
            state: DetailState::default(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub async fn load(&mut self, id: InstrumentId) -> Result<&Instrument, ViewError> {
        self.state.loading = true;
        self.state.error = None;

        let outcome = self.scope.run(self.ctx.api().get_instrument(id)).await;
        self.state.loading = false;
        match outcome {
            None => Err(ViewError::Cancelled),
            Some(Ok(instrument)) => Ok(self.state.instrument.insert(instrument)),
            Some(Err(error)) => {
                let message = if error.kind() == ApiErrorKind::NotFound {
                    INSTRUMENT_NOT_FOUND
                } else {
                    INSTRUMENT_LOAD_FAILED
                };
                warn!(%id, code = error.code(), %error, "instrument fetch failed");
                self.state.instrument = None;
                self.state.error = Some(message.to_owned());
                Err(ViewError::api(message, error))
            }
        }
    }

    /// Flips the favorite flag of the loaded instrument.
    pub async fn toggle_favorite(&mut self) -> Result<ToggleOutcome, ViewError> {
        let Some(instrument) = self.state.instrument.clone() else {
            return Err(ViewError::NotLoaded);
        };
        let outcome = self
            .ctx
            .set_favorite(&self.scope, instrument.id, !instrument.favorite, Some(&instrument))
            .await?;
        if let (ToggleOutcome::Applied { favorite }, Some(shown)) =
            (outcome, self.state.instrument.as_mut())
        {
            shown.favorite = favorite;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClient;
    use crate::credentials::MemoryCredentialStore;
    use crate::http_client::{HttpMethod, HttpResponse, StubHttpClient};
    use crate::store::AppStore;

    fn view(stub: &StubHttpClient) -> DetailView {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let api = ApiClient::new("http://api.test", Arc::new(stub.clone()), credentials.clone());
        DetailView::mount(&ViewContext::new(api, AppStore::default(), credentials))
    }

    #[tokio::test]
    async fn missing_instrument_shows_not_found() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments/77", HttpResponse::empty(404));
        let mut page = view(&stub);

        let error = page.load(InstrumentId::new(77)).await.expect_err("404");

        assert_eq!(error.to_string(), INSTRUMENT_NOT_FOUND);
        assert_eq!(page.state().banner(), Some(INSTRUMENT_NOT_FOUND));
        assert!(!page.state().loading);
    }

    #[tokio::test]
    async fn server_error_shows_generic_message() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments/3", HttpResponse::new(500, "boom"));
        let mut page = view(&stub);

        page.load(InstrumentId::new(3)).await.expect_err("500");

        assert_eq!(page.state().banner(), Some(INSTRUMENT_LOAD_FAILED));
    }

    #[tokio::test]
    async fn toggle_requires_a_loaded_instrument() {
        let stub = StubHttpClient::new();
        let mut page = view(&stub);

        let error = page.toggle_favorite().await.expect_err("nothing loaded");

        assert!(matches!(error, ViewError::NotLoaded));
        assert!(stub.requests().is_empty());
    }
}
