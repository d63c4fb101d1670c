use marketmon_core::{greeting, AuthView, LoginForm, RegisterForm, Route, User};
use serde_json::{json, Value};

use crate::cli::{LoginArgs, RegisterArgs};
use crate::error::CliError;
use crate::output::Table;

use super::{view_failure, CommandResult, Session};

pub async fn login(session: &Session, args: &LoginArgs) -> Result<CommandResult, CliError> {
    session.require(Route::Login)?;
    let view = AuthView::with_scope(session.ctx(), session.scope());
    let outcome = view
        .login(&LoginForm::new(args.email.as_str(), args.password.as_str()))
        .await;
    signed_in(session, outcome.map_err(view_failure))
}

pub async fn register(session: &Session, args: &RegisterArgs) -> Result<CommandResult, CliError> {
    session.require(Route::Register)?;
    let view = AuthView::with_scope(session.ctx(), session.scope());
    let outcome = view
        .register(&RegisterForm::new(
            args.name.as_str(),
            args.email.as_str(),
            args.password.as_str(),
        ))
        .await;
    signed_in(session, outcome.map_err(view_failure))
}

pub fn logout(session: &Session) -> Result<CommandResult, CliError> {
    let was_signed_in = session
        .ctx()
        .store()
        .read(|state| state.session.is_authenticated());
    AuthView::with_scope(session.ctx(), session.scope())
        .logout()
        .map_err(|error| match view_failure(error) {
            Ok(entry) => CliError::Command(entry.message),
            Err(error) => error,
        })?;

    let headline = if was_signed_in {
        "Sesión cerrada"
    } else {
        "No había una sesión abierta"
    };
    Ok(CommandResult::ok(json!({ "signedOut": was_signed_in })).with_headline(headline))
}

pub fn whoami(session: &Session) -> Result<CommandResult, CliError> {
    let user = session
        .ctx()
        .store()
        .read(|state| state.session.user().cloned());
    match user {
        Some(user) => Ok(CommandResult::ok(serde_json::to_value(&user)?)
            .with_table(user_table(&user))),
        None => Ok(CommandResult::ok(Value::Null).with_headline("Sin sesión")),
    }
}

/// Renders a finished login or registration. Backend rejections stay in the
/// envelope; invalid forms and credential failures abort the command.
fn signed_in(
    session: &Session,
    outcome: Result<User, Result<marketmon_core::EnvelopeError, CliError>>,
) -> Result<CommandResult, CliError> {
    match outcome {
        Ok(user) => {
            let mut result =
                CommandResult::ok(serde_json::to_value(&user)?).with_table(user_table(&user));
            if let Some(line) = session.ctx().store().read(|state| greeting(&state.session)) {
                result = result.with_headline(line);
            }
            Ok(result)
        }
        Err(Ok(entry)) => Ok(CommandResult::ok(Value::Null).with_errors(vec![entry])),
        Err(Err(error)) => Err(error),
    }
}

fn user_table(user: &User) -> Table {
    Table::fields(vec![
        ("ID", user.id.to_string()),
        ("Nombre", user.name.clone()),
        ("Email", user.email.clone()),
        ("Rol", user.role.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use marketmon_core::{HttpMethod, HttpResponse, Role, StubHttpClient};

    fn login_args() -> LoginArgs {
        LoginArgs {
            email: String::from("a@b.com"),
            password: String::from("secret1"),
        }
    }

    #[tokio::test]
    async fn successful_login_greets_the_user() {
        let stub = StubHttpClient::new();
        stub.respond(
            HttpMethod::Post,
            "/auth/login",
            HttpResponse::ok_json(
                r#"{"token":"tok123","type":"Bearer","id":1,"name":"Ana","email":"a@b.com","role":"USER"}"#,
            ),
        );
        let session = testing::session(&stub, None);

        let result = login(&session, &login_args()).await.expect("login");

        assert_eq!(result.headline, vec![String::from("Hola, Ana")]);
        assert_eq!(result.data["name"], "Ana");
        assert!(result.errors.is_empty());
        assert!(session
            .ctx()
            .store()
            .read(|state| state.session.is_authenticated()));
    }

    #[tokio::test]
    async fn rejected_login_reports_fixed_message() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Post, "/auth/login", HttpResponse::new(401, "bad"));
        let session = testing::session(&stub, None);

        let result = login(&session, &login_args()).await.expect("soft failure");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Credenciales inválidas");
        assert_eq!(result.errors[0].status, Some(401));
        assert!(result.data.is_null());
    }

    #[tokio::test]
    async fn invalid_form_exits_with_validation_code() {
        let stub = StubHttpClient::new();
        let session = testing::session(&stub, None);

        let error = login(
            &session,
            &LoginArgs {
                email: String::from("not-an-email"),
                password: String::from("x"),
            },
        )
        .await
        .err()
        .expect("form error");

        assert_eq!(error.exit_code(), 2);
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn logout_and_whoami_follow_the_session() {
        let stub = StubHttpClient::new();
        let session = testing::session(&stub, Some(Role::Admin));

        let before = whoami(&session).expect("whoami");
        assert_eq!(before.data["role"], "ADMIN");

        let result = logout(&session).expect("logout");
        assert_eq!(result.data["signedOut"], true);

        let after = whoami(&session).expect("whoami");
        assert!(after.data.is_null());
        assert_eq!(after.headline, vec![String::from("Sin sesión")]);
    }
}
