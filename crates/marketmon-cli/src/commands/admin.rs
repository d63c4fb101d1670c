use marketmon_core::format::format_long_date;
use marketmon_core::{AdminView, Route, UserSummary, ViewError};
use serde_json::{json, Value};

use crate::error::CliError;
use crate::output::Table;

use super::{view_failure, CommandResult, Session};

pub async fn users(session: &Session) -> Result<CommandResult, CliError> {
    session.require(Route::AdminUsers)?;
    let view = AdminView::with_scope(session.ctx(), session.scope());

    let mut errors = Vec::new();
    if let Err(error) = view.load().await {
        errors.push(view_failure(error)?);
    }
    let users = view.users();
    Ok(CommandResult::ok(serde_json::to_value(&users)?)
        .with_table(user_table(&users))
        .with_errors(errors))
}

pub async fn refresh(session: &Session) -> Result<CommandResult, CliError> {
    session.require(Route::AdminUsers)?;
    let view = AdminView::with_scope(session.ctx(), session.scope());
    maintenance("refresh-market-data", view.refresh_market_data().await)
}

pub async fn initialize(session: &Session) -> Result<CommandResult, CliError> {
    session.require(Route::AdminUsers)?;
    let view = AdminView::with_scope(session.ctx(), session.scope());
    maintenance("init-instruments", view.initialize_instruments().await)
}

fn maintenance(
    task: &'static str,
    outcome: Result<String, ViewError>,
) -> Result<CommandResult, CliError> {
    match outcome {
        Ok(message) => {
            let message = message.trim().to_owned();
            let result = CommandResult::ok(json!({ "task": task, "message": message }));
            Ok(if message.is_empty() {
                result.with_headline(format!("{task}: ok"))
            } else {
                result.with_headline(message)
            })
        }
        Err(error) => Ok(CommandResult::ok(Value::Null).with_errors(vec![view_failure(error)?])),
    }
}

fn user_table(users: &[UserSummary]) -> Table {
    let mut table = Table::new(vec!["ID", "NAME", "EMAIL", "CREATED"]);
    for user in users {
        table.push(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            format_long_date(user.created_at.as_deref()),
        ]);
    }
    table
}
