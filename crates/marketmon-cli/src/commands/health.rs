use marketmon_core::{EnvelopeError, HealthReport};
use serde_json::Value;

use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

const HEALTH_FAILED: &str = "Backend no disponible";

/// Public endpoint; no guard applies.
pub async fn run(session: &Session) -> Result<CommandResult, CliError> {
    let scope = session.scope();
    let Some(outcome) = scope.run(session.ctx().api().health()).await else {
        return Err(CliError::Interrupted);
    };

    match outcome {
        Ok(report) => {
            let result = CommandResult::ok(serde_json::to_value(&report)?)
                .with_table(report_table(&report));
            if report.is_up() {
                Ok(result)
            } else {
                Ok(result.with_warning(format!("backend reports status {}", report.status)))
            }
        }
        Err(error) => Ok(CommandResult::ok(Value::Null)
            .with_errors(vec![EnvelopeError::from_api(HEALTH_FAILED, &error)])),
    }
}

fn report_table(report: &HealthReport) -> Table {
    let mut pairs = vec![("Estado", report.status.clone())];
    if let Some(timestamp) = report.timestamp {
        pairs.push(("Timestamp", timestamp.to_string()));
    }
    if let Some(database) = &report.database {
        let rendered = match database {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        pairs.push(("Base de datos", rendered));
    }
    Table::fields(pairs)
}
