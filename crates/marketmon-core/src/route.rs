//! Client routes, the access guard in front of them and the role-aware menu.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::credentials::StoredCredential;
use crate::store::SessionState;
use crate::{InstrumentId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Instruments,
    Favorites,
    InstrumentDetail(InstrumentId),
    AdminUsers,
}

impl Route {
    /// Parse a client path. Query string, fragment and a trailing slash are
    /// ignored.
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        let unknown = || ValidationError::UnknownRoute {
            path: path.to_owned(),
        };
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        if !bare.starts_with('/') {
            return Err(unknown());
        }
        let trimmed = bare.trim_end_matches('/');

        match trimmed {
            "" => Ok(Self::Instruments),
            "/login" => Ok(Self::Login),
            "/register" => Ok(Self::Register),
            "/favorites" => Ok(Self::Favorites),
            "/admin/users" => Ok(Self::AdminUsers),
            other => {
                let segment = other.strip_prefix("/instrument/").ok_or_else(unknown)?;
                if segment.contains('/') {
                    return Err(unknown());
                }
                InstrumentId::parse(segment).map(Self::InstrumentDetail)
            }
        }
    }

    pub fn path(self) -> String {
        match self {
            Self::Login => String::from("/login"),
            Self::Register => String::from("/register"),
            Self::Instruments => String::from("/"),
            Self::Favorites => String::from("/favorites"),
            Self::InstrumentDetail(id) => format!("/instrument/{id}"),
            Self::AdminUsers => String::from("/admin/users"),
        }
    }

    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::AdminUsers)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    Unauthenticated,
    NotAdmin,
}

impl RedirectReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotAdmin => "not_admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect { to: Route, reason: RedirectReason },
}

impl GuardDecision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether `route` may render for the stored credential.
///
/// Only presence is checked; an expired token is discovered by the first
/// API call that fails.
pub fn guard(route: Route, credential: Option<&StoredCredential>) -> GuardDecision {
    if route.is_public() {
        return GuardDecision::Allow;
    }
    match credential {
        None => GuardDecision::Redirect {
            to: Route::Login,
            reason: RedirectReason::Unauthenticated,
        },
        Some(credential) if route.requires_admin() && !credential.user.is_admin() => {
            GuardDecision::Redirect {
                to: Route::Instruments,
                reason: RedirectReason::NotAdmin,
            }
        }
        Some(_) => GuardDecision::Allow,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

/// Menu entries for the current session. Empty when nobody is signed in.
pub fn nav_links(session: &SessionState) -> Vec<NavLink> {
    if !session.is_authenticated() {
        return Vec::new();
    }
    let mut links = vec![
        NavLink {
            label: "Instrumentos",
            route: Route::Instruments,
        },
        NavLink {
            label: "Favoritos",
            route: Route::Favorites,
        },
    ];
    if session.is_admin() {
        links.push(NavLink {
            label: "Usuarios",
            route: Route::AdminUsers,
        });
    }
    links
}

pub fn greeting(session: &SessionState) -> Option<String> {
    session.user().map(|user| format!("Hola, {}", user.name))
}
