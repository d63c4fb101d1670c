use marketmon_core::format::{
    format_change, format_long_date, format_market_cap, format_optional_price,
    format_time_of_day, format_volume, Trend, NOT_AVAILABLE,
};
use marketmon_core::{DetailView, Instrument, InstrumentId, InstrumentListView, Route};
use serde_json::json;

use crate::cli::{InstrumentsArgs, ShowArgs};
use crate::error::CliError;
use crate::output::Table;

use super::{view_failure, CommandResult, Session};

pub async fn list(session: &Session, args: &InstrumentsArgs) -> Result<CommandResult, CliError> {
    session.require(Route::Instruments)?;
    let view = InstrumentListView::with_scope(session.ctx(), session.scope());
    let term = args.search.as_deref().unwrap_or_default();

    if args.remote {
        return match view.search(term).await {
            Ok(items) => Ok(CommandResult::ok(serde_json::to_value(&items)?)
                .with_table(instrument_table(&items))),
            Err(error) => Ok(CommandResult::ok(json!([])).with_errors(vec![view_failure(error)?])),
        };
    }

    let mut errors = Vec::new();
    if let Err(error) = view.load().await {
        errors.push(view_failure(error)?);
    }
    let items = view.visible(term);
    let mut result = CommandResult::ok(serde_json::to_value(&items)?)
        .with_table(instrument_table(&items))
        .with_errors(errors);
    if !term.is_empty() {
        result = result.with_headline(format!("Filtro: \"{term}\" ({} resultados)", items.len()));
    }
    Ok(result)
}

pub async fn show(session: &Session, args: &ShowArgs) -> Result<CommandResult, CliError> {
    let id = InstrumentId::parse(&args.id)?;
    session.require(Route::InstrumentDetail(id))?;

    let mut view = DetailView::with_scope(session.ctx(), session.scope());
    let instrument = match view.load(id).await {
        Ok(instrument) => instrument.clone(),
        Err(error) => {
            let entry = view_failure(error)?;
            return Ok(CommandResult::ok(serde_json::Value::Null).with_errors(vec![entry]));
        }
    };

    Ok(CommandResult::ok(serde_json::to_value(&instrument)?)
        .with_headline(format!(
            "{} {}{}",
            instrument.symbol,
            instrument.name,
            if instrument.favorite { " ★" } else { "" }
        ))
        .with_table(detail_table(&instrument)))
}

pub(super) fn instrument_table(items: &[Instrument]) -> Table {
    let mut table = Table::new(vec![
        "ID", "SYMBOL", "NAME", "PRICE", "CHANGE", "VOLUME", "HIGH", "LOW", "UPDATED", "FAV",
    ]);
    for instrument in items {
        table.push(vec![
            instrument.id.to_string(),
            instrument.symbol.clone(),
            instrument.name.clone(),
            format_optional_price(instrument.current_price),
            change_cell(instrument.daily_change, instrument.daily_change_percent),
            format_volume(instrument.volume),
            format_optional_price(instrument.day_high),
            format_optional_price(instrument.day_low),
            format_time_of_day(instrument.last_updated.as_deref()),
            String::from(if instrument.favorite { "★" } else { "" }),
        ]);
    }
    table
}

fn detail_table(instrument: &Instrument) -> Table {
    let mut pairs = vec![
        ("Precio", format_optional_price(instrument.current_price)),
        (
            "Cambio diario",
            change_cell(instrument.daily_change, instrument.daily_change_percent),
        ),
        ("Máximo", format_optional_price(instrument.day_high)),
        ("Mínimo", format_optional_price(instrument.day_low)),
        ("Volumen", format_volume(instrument.volume)),
        ("Capitalización", format_market_cap(instrument.market_cap)),
    ];
    if instrument.weekly_change.is_some() {
        pairs.push((
            "Rendimiento semanal",
            change_cell(instrument.weekly_change, instrument.weekly_change_percent),
        ));
    }
    pairs.push((
        "Última actualización",
        format_long_date(instrument.last_updated.as_deref()),
    ));
    Table::fields(pairs)
}

fn change_cell(change: Option<f64>, percent: Option<f64>) -> String {
    match (change, percent) {
        (Some(change), Some(percent)) => {
            format!("{} {}", Trend::of(change).arrow(), format_change(change, percent))
        }
        _ => NOT_AVAILABLE.to_owned(),
    }
}
