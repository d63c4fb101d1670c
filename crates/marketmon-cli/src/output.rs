use std::io::{self, Write};

use marketmon_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Column layout used by `--format table`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Two-column key/value layout for single records.
    pub fn fields(pairs: Vec<(&'static str, String)>) -> Self {
        let mut table = Self::new(vec!["FIELD", "VALUE"]);
        for (key, value) in pairs {
            table.push(vec![key.to_owned(), value]);
        }
        table
    }

    pub fn render_lines(&self) -> Vec<String> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| {
                    let width = widths.get(index).copied().unwrap_or_default();
                    format!("{cell:<width$}")
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        let mut lines = vec![line(self.headers.clone())];
        lines.extend(
            self.rows
                .iter()
                .map(|row| line(row.iter().map(String::as_str).collect())),
        );
        lines
    }
}

/// What a command hands to the renderer.
#[derive(Debug)]
pub struct Rendered {
    pub envelope: Envelope<Value>,
    pub headline: Vec<String>,
    pub table: Option<Table>,
}

pub fn render(rendered: &Rendered, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&rendered.envelope)?
            } else {
                serde_json::to_string(&rendered.envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(&mut out, rendered)?,
    }
    Ok(())
}

fn render_table(out: &mut impl Write, rendered: &Rendered) -> Result<(), CliError> {
    for line in &rendered.headline {
        writeln!(out, "{line}")?;
    }

    match &rendered.table {
        Some(table) if table.rows.is_empty() => writeln!(out, "(no results)")?,
        Some(table) => {
            for line in table.render_lines() {
                writeln!(out, "{line}")?;
            }
        }
        None if rendered.headline.is_empty() => {
            let pretty_data = serde_json::to_string_pretty(&rendered.envelope.data)?;
            for line in pretty_data.lines() {
                writeln!(out, "{line}")?;
            }
        }
        None => {}
    }

    for warning in &rendered.envelope.meta.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    for error in &rendered.envelope.errors {
        writeln!(out, "error [{}]: {}", error.code, error.message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let mut table = Table::new(vec!["ID", "SYMBOL"]);
        table.push(vec![String::from("1"), String::from("AAPL")]);
        table.push(vec![String::from("12"), String::from("MSFT")]);

        assert_eq!(
            table.render_lines(),
            vec!["ID  SYMBOL", "1   AAPL", "12  MSFT"]
        );
    }

    #[test]
    fn field_tables_have_two_columns() {
        let table = Table::fields(vec![("Precio", String::from("$1.00"))]);
        assert_eq!(table.render_lines()[1], "Precio  $1.00");
    }
}
