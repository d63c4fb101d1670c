use crate::credentials::StoredCredential;
use crate::User;

/// Token and profile always travel together.
#[derive(Clone, PartialEq, Eq)]
struct Authenticated {
    token: String,
    user: User,
}

impl std::fmt::Debug for Authenticated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticated")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Transitions of the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    BeginLogin,
    CompleteLogin { token: String, user: User },
    FailLogin(String),
    Restore(StoredCredential),
    Logout,
}

/// Authentication status of the running client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    auth: Option<Authenticated>,
    loading: bool,
    error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reducer: returns the state after `action`.
    pub fn reduce(mut self, action: SessionAction) -> Self {
        self.apply(action);
        self
    }

    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::BeginLogin => self.begin_login(),
            SessionAction::CompleteLogin { token, user } => self.complete_login(token, user),
            SessionAction::FailLogin(message) => self.fail_login(message),
            SessionAction::Restore(credential) => self.restore(credential),
            SessionAction::Logout => self.logout(),
        }
    }

    pub fn begin_login(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn complete_login(&mut self, token: impl Into<String>, user: User) {
        self.auth = Some(Authenticated {
            token: token.into(),
            user,
        });
        self.loading = false;
        self.error = None;
    }

    /// Records the failure; an existing session is left as it was.
    pub fn fail_login(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn restore(&mut self, credential: StoredCredential) {
        self.complete_login(credential.token, credential.user);
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.as_ref().map(|auth| &auth.user)
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    pub fn credential(&self) -> Option<StoredCredential> {
        self.auth
            .as_ref()
            .map(|auth| StoredCredential::new(auth.token.clone(), auth.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn ana() -> User {
        User::new(1, "Ana", "a@b.com", Role::User)
    }

    #[test]
    fn begin_sets_loading_and_clears_error() {
        let state = SessionState::new()
            .reduce(SessionAction::FailLogin(String::from("Credenciales inválidas")))
            .reduce(SessionAction::BeginLogin);

        assert!(state.loading());
        assert_eq!(state.error(), None);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn complete_sets_token_and_user_together() {
        let state = SessionState::new()
            .reduce(SessionAction::BeginLogin)
            .reduce(SessionAction::CompleteLogin {
                token: String::from("tok123"),
                user: ana(),
            });

        assert_eq!(state.token(), Some("tok123"));
        assert_eq!(state.user(), Some(&ana()));
        assert!(!state.loading());
        assert!(!state.is_admin());
    }

    #[test]
    fn failure_leaves_credentials_unset() {
        let state = SessionState::new()
            .reduce(SessionAction::BeginLogin)
            .reduce(SessionAction::FailLogin(String::from("Credenciales inválidas")));

        assert_eq!(state.token(), None);
        assert_eq!(state.user(), None);
        assert_eq!(state.error(), Some("Credenciales inválidas"));
        assert!(!state.loading());
    }

    #[test]
    fn logout_resets_everything() {
        let mut state = SessionState::new();
        state.complete_login("tok123", ana());
        state.begin_login();
        state.logout();

        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn restore_behaves_like_completed_login() {
        let state = SessionState::new().reduce(SessionAction::Restore(StoredCredential::new(
            "tok",
            User::new(9, "Root", "r@x.io", Role::Admin),
        )));

        assert!(state.is_admin());
        assert_eq!(state.credential().map(|c| c.token), Some(String::from("tok")));
    }

    #[test]
    fn debug_output_redacts_token() {
        let mut state = SessionState::new();
        state.complete_login("tok123", ana());
        assert!(!format!("{state:?}").contains("tok123"));
    }
}
