use tracing::{info, warn};

use crate::api::ApiError;
use crate::credentials::StoredCredential;
use crate::forms::{LoginForm, RegisterForm};
use crate::store::SessionAction;
use crate::{AuthResponse, User};

use super::{ViewContext, ViewError, ViewScope, LOGIN_FAILED, REGISTER_FAILED};

/// Login and register pages plus the logout button.
#[derive(Debug)]
pub struct AuthView {
    ctx: ViewContext,
    scope: ViewScope,
}

impl AuthView {
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

    /// Invalid input is reported without touching the session.
    pub async fn login(&self, form: &LoginForm) -> Result<User, ViewError> {
        form.validate().map_err(ViewError::Form)?;
        self.authenticate(LOGIN_FAILED, self.ctx.api().login(form))
            .await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<User, ViewError> {
        form.validate().map_err(ViewError::Form)?;
        self.authenticate(REGISTER_FAILED, self.ctx.api().register(form))
            .await
    }

    /// Forgets the credential locally. Idempotent.
    pub fn logout(&self) -> Result<(), ViewError> {
        let cleared = self.ctx.credentials().clear();
        self.ctx.store().dispatch(SessionAction::Logout);
        cleared?;
        info!("signed out");
        Ok(())
    }

    /// Loads a previously stored credential into the session.
    pub fn restore(&self) -> Result<Option<User>, ViewError> {
        let Some(credential) = self.ctx.credentials().load()? else {
            return Ok(None);
        };
        let user = credential.user.clone();
        self.ctx.store().dispatch(SessionAction::Restore(credential));
        Ok(Some(user))
    }

    async fn authenticate<F>(&self, failure: &'static str, call: F) -> Result<User, ViewError>
    where
        F: std::future::Future<Output = Result<AuthResponse, ApiError>>,
    {
        let store = self.ctx.store();
        store.dispatch(SessionAction::BeginLogin);

        let response = match self.scope.run(call).await {
            Some(Ok(response)) => response,
            Some(Err(error)) => {
                warn!(code = error.code(), %error, "authentication rejected");
                store.dispatch(SessionAction::FailLogin(failure.to_owned()));
                return Err(ViewError::api(failure, error));
            }
            None => {
                store.dispatch(SessionAction::FailLogin(failure.to_owned()));
                return Err(ViewError::Cancelled);
            }
        };

        let (token, user) = response.into_parts();
        let credential = StoredCredential::new(token.clone(), user.clone());
        if let Err(error) = self.ctx.credentials().save(&credential) {
            warn!(%error, "could not persist credential");
            store.dispatch(SessionAction::FailLogin(failure.to_owned()));
            return Err(error.into());
        }

        store.dispatch(SessionAction::CompleteLogin {
            token,
            user: user.clone(),
        });
        info!(user_id = user.id, role = user.role.as_str(), "signed in");
        Ok(user)
    }
}
