use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Backend identifier of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(u64);

impl InstrumentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse a path segment such as the `:id` in `/instrument/:id`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        match trimmed.parse::<u64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(ValidationError::InvalidInstrumentId {
                value: input.to_owned(),
            }),
        }
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstrumentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for InstrumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Instrument snapshot as served by `/instruments`.
///
/// Every market-data column is nullable on the backend; a feed that has not
/// reported yet leaves it `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: InstrumentId,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub daily_change: Option<f64>,
    #[serde(default)]
    pub daily_change_percent: Option<f64>,
    #[serde(default)]
    pub weekly_change: Option<f64>,
    #[serde(default)]
    pub weekly_change_percent: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default, alias = "isFavorite")]
    pub favorite: bool,
}

impl Instrument {
    /// Instrument without market data, mostly useful for fixtures.
    pub fn new(id: u64, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: InstrumentId::new(id),
            symbol: symbol.into(),
            name: name.into(),
            current_price: None,
            daily_change: None,
            daily_change_percent: None,
            weekly_change: None,
            weekly_change_percent: None,
            day_high: None,
            day_low: None,
            volume: None,
            market_cap: None,
            last_updated: None,
            favorite: false,
        }
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Case-insensitive match on symbol or name; an empty term matches all.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.symbol.to_lowercase().contains(&needle)
            || self.name.to_lowercase().contains(&needle)
    }
}
