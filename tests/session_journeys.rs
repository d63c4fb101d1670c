//! Behavior-driven tests for signing in, restoring and signing out.
//!
//! The backend is scripted with the stub transport and the credential lives
//! in a real file under a temporary directory, so each journey exercises the
//! same persistence path the CLI uses.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use marketmon_core::{
    AuthView, CredentialStore, FileCredentialStore, HttpMethod, HttpResponse, InstrumentListView,
    LoginForm, RegisterForm, Role, StubHttpClient, ViewContext, ViewError,
};
use marketmon_tests::view_context;
use tempfile::TempDir;

const ANA: &str =
    r#"{"token":"tok123","type":"Bearer","id":1,"name":"Ana","email":"a@b.com","role":"USER"}"#;

struct Harness {
    _dir: TempDir,
    path: PathBuf,
    stub: StubHttpClient,
    ctx: ViewContext,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("marketmon").join("credentials.json");
    let stub = StubHttpClient::new();
    let ctx = context(&stub, &path);
    Harness {
        _dir: dir,
        path,
        stub,
        ctx,
    }
}

/// A fresh process: new store, same credential file.
fn context(stub: &StubHttpClient, path: &Path) -> ViewContext {
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(path));
    view_context(Arc::new(stub.clone()), credentials)
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn when_login_succeeds_session_holds_token_and_user() {
    // Given: a backend that accepts Ana's credentials
    let h = harness();
    h.stub
        .respond(HttpMethod::Post, "/auth/login", HttpResponse::ok_json(ANA));

    // When: the login form is submitted
    let user = AuthView::mount(&h.ctx)
        .login(&LoginForm::new("a@b.com", "secret1"))
        .await
        .expect("login should succeed");

    // Then: the session is populated and idle
    assert_eq!(user.name, "Ana");
    assert_eq!(user.role, Role::User);
    let state = h.ctx.store().snapshot();
    assert_eq!(state.session.token(), Some("tok123"));
    assert!(!state.session.loading());
    assert_eq!(state.session.error(), None);

    // And: the credential was written to disk
    let stored = FileCredentialStore::new(h.path.clone())
        .load()
        .expect("readable")
        .expect("present");
    assert_eq!(stored.token, "tok123");
    assert_eq!(stored.user, user);

    // And: the request carried the form as JSON
    let requests = h.stub.requests();
    let body = requests[0].body.as_deref().expect("json body");
    let sent: serde_json::Value = serde_json::from_str(body).expect("valid json");
    assert_eq!(sent["email"], "a@b.com");
    assert_eq!(sent["password"], "secret1");
}

#[tokio::test]
async fn when_login_is_rejected_the_fixed_message_is_shown() {
    // Given: a backend that refuses the credentials with its own detail
    let h = harness();
    h.stub.respond(
        HttpMethod::Post,
        "/auth/login",
        HttpResponse::new(401, r#"{"message":"Bad credentials"}"#),
    );

    // When: the login form is submitted
    let error = AuthView::mount(&h.ctx)
        .login(&LoginForm::new("a@b.com", "wrong-password"))
        .await
        .expect_err("login should fail");

    // Then: only the localized message reaches the session
    assert_eq!(error.to_string(), "Credenciales inválidas");
    let state = h.ctx.store().snapshot();
    assert_eq!(state.session.error(), Some("Credenciales inválidas"));
    assert!(!state.session.loading());
    assert!(!state.session.is_authenticated());
    assert!(!h.path.exists());
}

#[tokio::test]
async fn when_the_form_is_invalid_no_request_is_sent() {
    let h = harness();

    let error = AuthView::mount(&h.ctx)
        .register(&RegisterForm::new("", "not-an-email", "1"))
        .await
        .expect_err("invalid form");

    let errors = match error {
        ViewError::Form(errors) => errors,
        other => panic!("expected form errors, got {other:?}"),
    };
    assert_eq!(errors.len(), 3);
    assert!(h.stub.requests().is_empty());
    assert!(!h.ctx.store().snapshot().session.loading());
}

#[tokio::test]
async fn registering_signs_the_new_user_in() {
    let h = harness();
    h.stub.respond(
        HttpMethod::Post,
        "/auth/register",
        HttpResponse::ok_json(
            r#"{"token":"tok456","id":7,"name":"Luis","email":"l@b.com","role":"USER"}"#,
        ),
    );

    let user = AuthView::mount(&h.ctx)
        .register(&RegisterForm::new("Luis", "l@b.com", "secret1"))
        .await
        .expect("register");

    assert_eq!(user.id, 7);
    assert_eq!(h.ctx.store().snapshot().session.token(), Some("tok456"));
}

// =============================================================================
// Restore and logout
// =============================================================================

#[tokio::test]
async fn a_new_process_restores_the_session_and_sends_the_bearer_token() {
    // Given: Ana signed in during an earlier run
    let h = harness();
    h.stub
        .respond(HttpMethod::Post, "/auth/login", HttpResponse::ok_json(ANA));
    AuthView::mount(&h.ctx)
        .login(&LoginForm::new("a@b.com", "secret1"))
        .await
        .expect("login");

    // When: a fresh context starts from the same file and loads the list
    let next = context(&h.stub, &h.path);
    let restored = AuthView::mount(&next).restore().expect("restore");
    h.stub
        .respond(HttpMethod::Get, "/instruments", HttpResponse::ok_json("[]"));
    InstrumentListView::mount(&next)
        .load()
        .await
        .expect("list");

    // Then: the user is back and the request is authenticated
    assert_eq!(restored.map(|user| user.name), Some(String::from("Ana")));
    let last = h.stub.requests().pop().expect("request");
    assert_eq!(
        last.headers.get("authorization").map(String::as_str),
        Some("Bearer tok123")
    );
}

#[tokio::test]
async fn logout_is_idempotent_and_removes_the_file() {
    let h = harness();
    h.stub
        .respond(HttpMethod::Post, "/auth/login", HttpResponse::ok_json(ANA));
    let view = AuthView::mount(&h.ctx);
    view.login(&LoginForm::new("a@b.com", "secret1"))
        .await
        .expect("login");

    view.logout().expect("first logout");
    view.logout().expect("second logout");

    let state = h.ctx.store().snapshot();
    assert_eq!(state.session.token(), None);
    assert_eq!(state.session.user(), None);
    assert!(!h.path.exists());
    assert!(view.restore().expect("restore").is_none());
}
