use marketmon_core::{FavoritesView, InstrumentId, InstrumentListView, Route, ToggleOutcome};
use serde_json::json;

use crate::cli::FavoriteArgs;
use crate::error::CliError;

use super::instruments::instrument_table;
use super::{view_failure, CommandResult, Session};

pub async fn list(session: &Session) -> Result<CommandResult, CliError> {
    session.require(Route::Favorites)?;
    let view = FavoritesView::with_scope(session.ctx(), session.scope());

    let mut errors = Vec::new();
    if let Err(error) = view.load().await {
        errors.push(view_failure(error)?);
    }
    let items = view.favorites();
    Ok(CommandResult::ok(serde_json::to_value(&items)?)
        .with_table(instrument_table(&items))
        .with_errors(errors))
}

/// `Some(flag)` sets the flag, `None` flips whatever the list currently shows.
pub async fn set(
    session: &Session,
    args: &FavoriteArgs,
    favorite: Option<bool>,
) -> Result<CommandResult, CliError> {
    let id = InstrumentId::parse(&args.id)?;
    session.require(Route::Instruments)?;
    let view = InstrumentListView::with_scope(session.ctx(), session.scope());

    // The list supplies the current flag and the row copied into favorites.
    let mut result = CommandResult::ok(json!({ "id": id }));
    if let Err(error) = view.load().await {
        let entry = view_failure(error)?;
        if favorite.is_none() {
            return Ok(result.with_errors(vec![entry]));
        }
        result = result.with_warning(entry.message);
    }

    let outcome = match favorite {
        Some(flag) => view.set_favorite(id, flag).await,
        None => view.toggle_favorite(id).await,
    };
    match outcome {
        Ok(ToggleOutcome::Applied { favorite }) => {
            let symbol = session
                .ctx()
                .store()
                .read(|state| state.instruments.find(id).map(|item| item.symbol.clone()))
                .unwrap_or_else(|| id.to_string());
            let headline = if favorite {
                format!("{symbol} añadido a favoritos")
            } else {
                format!("{symbol} quitado de favoritos")
            };
            Ok(CommandResult {
                data: json!({ "id": id, "favorite": favorite }),
                ..result
            }
            .with_headline(headline))
        }
        Ok(ToggleOutcome::AlreadyPending) => {
            Ok(result.with_warning(format!("instrument {id} already has an update in flight")))
        }
        Err(error) => Ok(result.with_errors(vec![view_failure(error)?])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use marketmon_core::{HttpMethod, HttpResponse, Role, StubHttpClient};

    const LIST: &str = r#"[
        {"id":3,"symbol":"TSLA","name":"Tesla","currentPrice":250.0,"dailyChange":0.0,"dailyChangePercent":0.0,"volume":10,"lastUpdated":"2026-10-17T14:05:09Z","favorite":false}
    ]"#;

    fn args(id: &str) -> FavoriteArgs {
        FavoriteArgs { id: id.to_owned() }
    }

    #[tokio::test]
    async fn toggle_marks_unflagged_instrument() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments", HttpResponse::ok_json(LIST));
        stub.respond(HttpMethod::Post, "/instruments/3/favorite", HttpResponse::empty(200));
        let session = testing::session(&stub, Some(Role::User));

        let result = set(&session, &args("3"), None).await.expect("toggle");

        assert_eq!(result.data["favorite"], true);
        assert_eq!(result.headline, vec![String::from("TSLA añadido a favoritos")]);
        let state = session.ctx().store().snapshot();
        assert!(state.instruments.is_favorite(InstrumentId::new(3)));
        assert_eq!(state.instruments.favorites().len(), 1);
    }

    #[tokio::test]
    async fn rejected_update_keeps_flag_and_reports_error() {
        let stub = StubHttpClient::new();
        stub.respond(HttpMethod::Get, "/instruments", HttpResponse::ok_json(LIST));
        stub.respond(
            HttpMethod::Post,
            "/instruments/3/favorite",
            HttpResponse::new(500, "boom"),
        );
        let session = testing::session(&stub, Some(Role::User));

        let result = set(&session, &args("3"), Some(true)).await.expect("soft failure");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Error al actualizar favorito");
        assert!(!session
            .ctx()
            .store()
            .read(|state| state.instruments.is_favorite(InstrumentId::new(3))));
    }

    #[tokio::test]
    async fn listing_requires_a_session() {
        let stub = StubHttpClient::new();
        let session = testing::session(&stub, None);

        let error = list(&session).await.err().expect("redirect");

        assert_eq!(error.exit_code(), 5);
    }

    #[tokio::test]
    async fn listing_failure_is_reported_in_envelope() {
        let stub = StubHttpClient::new();
        stub.respond(
            HttpMethod::Get,
            "/instruments/favorites",
            HttpResponse::new(503, "down"),
        );
        let session = testing::session(&stub, Some(Role::User));

        let result = list(&session).await.expect("soft failure");

        assert_eq!(result.errors[0].message, "Error al cargar favoritos");
        assert!(result.errors[0].retryable);
        assert!(result.table.expect("table").rows.is_empty());
    }
}
