//! Login and registration form validation.
//!
//! Messages are user-facing and kept in Spanish to match the rest of the UI.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

pub const EMAIL_REQUIRED: &str = "Email requerido";
pub const EMAIL_INVALID: &str = "Email inválido";
pub const PASSWORD_REQUIRED: &str = "Contraseña requerida";
pub const PASSWORD_TOO_SHORT: &str = "Mínimo 6 caracteres";
pub const NAME_REQUIRED: &str = "Nombre requerido";
pub const NAME_TOO_SHORT: &str = "Mínimo 2 caracteres";

const MIN_PASSWORD_CHARS: usize = 6;
const MIN_NAME_CHARS: usize = 2;

/// Field name to message, one entry per invalid field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, &'static str>);

impl FormErrors {
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn check(&mut self, field: &'static str, outcome: Option<&'static str>) {
        if let Some(message) = outcome {
            self.0.insert(field, message);
        }
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&rendered)
    }
}

impl std::error::Error for FormErrors {}

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check("email", check_email(&self.email));
        errors.check("password", check_password(&self.password));
        errors.into_result()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check("name", check_name(&self.name));
        errors.check("email", check_email(&self.email));
        errors.check("password", check_password(&self.password));
        errors.into_result()
    }
}

// Passwords must never reach logs through Debug.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn check_email(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some(EMAIL_REQUIRED);
    }
    if !is_plausible_email(value) {
        return Some(EMAIL_INVALID);
    }
    None
}

fn check_password(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some(PASSWORD_REQUIRED)
    } else if value.chars().count() < MIN_PASSWORD_CHARS {
        Some(PASSWORD_TOO_SHORT)
    } else {
        None
    }
}

fn check_name(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        Some(NAME_REQUIRED)
    } else if value.chars().count() < MIN_NAME_CHARS {
        Some(NAME_TOO_SHORT)
    } else {
        None
    }
}

fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|ch| ch.is_alphanumeric() || ch == '-')
        })
}
