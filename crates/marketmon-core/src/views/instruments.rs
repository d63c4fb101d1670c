use tracing::warn;

use crate::{Instrument, InstrumentId};

use super::{
    LoadOutcome, ToggleOutcome, ViewContext, ViewError, ViewScope, INSTRUMENTS_LOAD_FAILED,
};

/// The instrument list page (`/`).
#[derive(Debug)]
pub struct InstrumentListView {
    ctx: ViewContext,
    scope: ViewScope,
}

impl InstrumentListView {
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

    /// Fetches the full list into the store.
    pub async fn load(&self) -> Result<LoadOutcome, ViewError> {
        let store = self.ctx.store();
        let ticket = store.begin_list_fetch();

        match self.scope.run(self.ctx.api().list_instruments()).await {
            None => {
                store.abandon_fetch(ticket);
                Err(ViewError::Cancelled)
            }
            Some(Ok(items)) => Ok(LoadOutcome::from_applied(
                store.finish_list_fetch(ticket, Ok(items)),
            )),
            Some(Err(error)) => {
                warn!(code = error.code(), %error, "instrument list fetch failed");
                store.finish_list_fetch(ticket, Err(INSTRUMENTS_LOAD_FAILED.to_owned()));
                Err(ViewError::api(INSTRUMENTS_LOAD_FAILED, error))
            }
        }
    }

    /// Server-side search. Results belong to the caller and are not stored.
    pub async fn search(&self, term: &str) -> Result<Vec<Instrument>, ViewError> {
        match self.scope.run(self.ctx.api().search_instruments(term)).await {
            None => Err(ViewError::Cancelled),
            Some(Ok(items)) => Ok(items),
            Some(Err(error)) => {
                warn!(code = error.code(), %error, term, "instrument search failed");
                Err(ViewError::api(INSTRUMENTS_LOAD_FAILED, error))
            }
        }
    }

    /// Client-side filter over the stored list.
    pub fn visible(&self, term: &str) -> Vec<Instrument> {
        self.ctx.store().read(|state| {
            state
                .instruments
                .filtered(term)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Flips the favorite flag of an instrument shown in the list.
    pub async fn toggle_favorite(&self, id: InstrumentId) -> Result<ToggleOutcome, ViewError> {
        let current = self.ctx.store().read(|state| state.instruments.is_favorite(id));
        self.set_favorite(id, !current).await
    }

    pub async fn set_favorite(
        &self,
        id: InstrumentId,
        favorite: bool,
    ) -> Result<ToggleOutcome, ViewError> {
        self.ctx.set_favorite(&self.scope, id, favorite, None).await
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

    fn context(stub: &StubHttpClient) -> ViewContext {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let api = ApiClient::new("http://api.test", Arc::new(stub.clone()), credentials.clone());
        ViewContext::new(api, AppStore::default(), credentials)
    }

    #[tokio::test]
    async fn cancelled_load_abandons_without_error() {
        let stub = StubHttpClient::new();
        let ctx = context(&stub);
        let view = InstrumentListView::mount(&ctx);
        view.scope().cancel();

        let error = view.load().await.expect_err("cancelled");

        assert!(matches!(error, ViewError::Cancelled));
        let state = ctx.store().snapshot();
        assert!(!state.instruments.loading());
        assert_eq!(state.instruments.error(), None);
    }

    #[tokio::test]
    async fn search_leaves_the_store_alone() {
        let stub = StubHttpClient::new();
        stub.respond(
            HttpMethod::Get,
            "/instruments/search",
            HttpResponse::ok_json(
                r#"[{"id":1,"symbol":"AAPL","name":"Apple Inc.","currentPrice":1.0,"dailyChange":0.0,"dailyChangePercent":0.0,"volume":1,"lastUpdated":"2026-10-17T14:05:09Z"}]"#,
            ),
        );
        let ctx = context(&stub);

        let hits = InstrumentListView::mount(&ctx)
            .search("aap")
            .await
            .expect("search");

        assert_eq!(hits.len(), 1);
        assert!(ctx.store().snapshot().instruments.instruments().is_empty());
    }

    #[tokio::test]
    async fn a_row_without_volume_does_not_sink_the_list() {
        let stub = StubHttpClient::new();
        stub.respond(
            HttpMethod::Get,
            "/instruments",
            HttpResponse::ok_json(
                r#"[{"id":1,"symbol":"AAPL","name":"Apple Inc.","currentPrice":189.5,"dailyChange":1.25,"dailyChangePercent":0.66,"volume":100,"lastUpdated":"2026-10-17T14:05:09Z"},
                    {"id":2,"symbol":"SOL","name":"Solana","currentPrice":150.0,"dailyChange":null,"dailyChangePercent":null,"volume":null,"lastUpdated":null}]"#,
            ),
        );
        let ctx = context(&stub);

        let outcome = InstrumentListView::mount(&ctx).load().await.expect("load");

        assert_eq!(outcome, LoadOutcome::Applied);
        let state = ctx.store().snapshot();
        assert_eq!(state.instruments.error(), None);
        let volumes: Vec<Option<u64>> = state
            .instruments
            .instruments()
            .iter()
            .map(|item| item.volume)
            .collect();
        assert_eq!(volumes, vec![Some(100), None]);
    }
}
