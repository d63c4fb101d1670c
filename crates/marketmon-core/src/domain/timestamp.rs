use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ValidationError;

/// Instant reported by the backend, held in UTC.
///
/// Instruments carry RFC3339 instants (`2026-10-17T14:05:09.123Z`). Account
/// records carry local date-times without an offset, either ISO style
/// (`2026-10-17T14:05:09`) or the backend's own `2026-10-17 14:05:09`; those
/// are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(instant) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(instant.into());
        }

        let iso = match trimmed.split_once(' ') {
            Some((date, clock)) => format!("{date}T{clock}"),
            None => trimmed.to_owned(),
        };
        PrimitiveDateTime::parse(&iso, &Iso8601::DEFAULT)
            .map(|local| Self(local.assume_utc()))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn to_rfc3339(self) -> String {
        match self.0.format(&Rfc3339) {
            Ok(text) => text,
            // Only years outside 0..=9999 fail to format.
            Err(_) => self.0.unix_timestamp().to_string(),
        }
    }
}

impl From<OffsetDateTime> for UtcDateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
