use marketmon_core::{greeting, guard, nav_links, GuardDecision, Route};
use serde_json::json;

use crate::cli::RouteArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

/// Reports what the guard would do for `path` without rendering the page.
pub fn route(session: &Session, args: &RouteArgs) -> Result<CommandResult, CliError> {
    let route = Route::parse(&args.path)?;
    let credential = session
        .ctx()
        .store()
        .read(|state| state.session.credential());

    let result = match guard(route, credential.as_ref()) {
        GuardDecision::Allow => CommandResult::ok(json!({
            "route": route.path(),
            "allowed": true,
        }))
        .with_headline(format!("{route}: allowed")),
        GuardDecision::Redirect { to, reason } => CommandResult::ok(json!({
            "route": route.path(),
            "allowed": false,
            "redirect": to.path(),
            "reason": reason.as_str(),
        }))
        .with_headline(format!("{route}: redirect to {to} ({})", reason.as_str())),
    };
    Ok(result)
}

pub fn nav(session: &Session) -> Result<CommandResult, CliError> {
    let (links, hello) = session
        .ctx()
        .store()
        .read(|state| (nav_links(&state.session), greeting(&state.session)));

    let mut table = Table::new(vec!["LABEL", "PATH"]);
    for link in &links {
        table.push(vec![link.label.to_owned(), link.route.path()]);
    }
    let data = json!({
        "greeting": hello,
        "links": links
            .iter()
            .map(|link| json!({ "label": link.label, "path": link.route.path() }))
            .collect::<Vec<_>>(),
    });

    let mut result = CommandResult::ok(data).with_table(table);
    if let Some(line) = hello {
        result = result.with_headline(line);
    }
    Ok(result)
}
