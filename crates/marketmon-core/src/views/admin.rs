use tracing::{info, warn};

use crate::api::ApiError;
use crate::UserSummary;

use super::{
    LoadOutcome, ViewContext, ViewError, ViewScope, INSTRUMENTS_INIT_FAILED,
    MARKET_DATA_UPDATE_FAILED, USERS_LOAD_FAILED,
};

/// The admin page (`/admin/users`) and its maintenance actions.
#[derive(Debug)]
pub struct AdminView {
    ctx: ViewContext,
    scope: ViewScope,
}

impl AdminView {
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
        let ticket = store.begin_users_fetch();

        match self.scope.run(self.ctx.api().list_users()).await {
            None => {
                store.abandon_fetch(ticket);
                Err(ViewError::Cancelled)
            }
            Some(Ok(users)) => Ok(LoadOutcome::from_applied(
                store.finish_users_fetch(ticket, Ok(users)),
            )),
            Some(Err(error)) => {
                warn!(code = error.code(), %error, "user list fetch failed");
                store.finish_users_fetch(ticket, Err(USERS_LOAD_FAILED.to_owned()));
                Err(ViewError::api(USERS_LOAD_FAILED, error))
            }
        }
    }

    pub fn users(&self) -> Vec<UserSummary> {
        self.ctx.store().read(|state| state.admin.users().to_vec())
    }

    /// Asks the backend to pull fresh quotes. Returns its confirmation text.
    pub async fn refresh_market_data(&self) -> Result<String, ViewError> {
        let outcome = self.scope.run(self.ctx.api().update_market_data()).await;
        Self::maintenance(outcome, "market data refresh", MARKET_DATA_UPDATE_FAILED)
    }

    pub async fn initialize_instruments(&self) -> Result<String, ViewError> {
        let outcome = self.scope.run(self.ctx.api().initialize_instruments()).await;
        Self::maintenance(outcome, "instrument initialization", INSTRUMENTS_INIT_FAILED)
    }

    fn maintenance(
        outcome: Option<Result<String, ApiError>>,
        task: &'static str,
        failure: &'static str,
    ) -> Result<String, ViewError> {
        match outcome {
            None => Err(ViewError::Cancelled),
            Some(Ok(message)) => {
                info!(task, "maintenance accepted");
                Ok(message)
            }
            Some(Err(error)) => {
                warn!(task, code = error.code(), %error, "maintenance rejected");
                Err(ViewError::api(failure, error))
            }
        }
    }
}
