use crate::UserSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    BeginFetchUsers,
    CompleteFetchUsers(Vec<UserSummary>),
    FailFetchUsers(String),
    AbandonFetchUsers,
}

/// Registered-user listing shown on the admin page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminState {
    users: Vec<UserSummary>,
    loading: bool,
    error: Option<String>,
}

impl AdminState {
    pub fn reduce(mut self, action: AdminAction) -> Self {
        self.apply(action);
        self
    }

    pub fn apply(&mut self, action: AdminAction) {
        match action {
            AdminAction::BeginFetchUsers => {
                self.loading = true;
                self.error = None;
            }
            AdminAction::CompleteFetchUsers(users) => {
                self.users = users;
                self.loading = false;
            }
            AdminAction::FailFetchUsers(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            AdminAction::AbandonFetchUsers => self.loading = false,
        }
    }

    pub fn users(&self) -> &[UserSummary] {
        &self.users
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
