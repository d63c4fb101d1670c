//! # Domain Models
//!
//! Wire-level types exchanged with the market monitor backend.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Instrument`] | Tradable asset with pricing snapshot and favorite flag |
//! | [`InstrumentId`] | Validated backend identifier |
//! | [`User`] | Authenticated user profile |
//! | [`Role`] | `USER` or `ADMIN` |
//! | [`UserSummary`] | Row of the admin user listing |
//! | [`AuthResponse`] | Payload of `/auth/login` and `/auth/register` |
//! | [`UtcDateTime`] | RFC3339 timestamp normalized to UTC |
//!
//! JSON field names follow the backend (camelCase), so these types can be
//! decoded straight from response bodies.

mod instrument;
mod timestamp;
mod user;

pub use instrument::{Instrument, InstrumentId};
pub use timestamp::UtcDateTime;
pub use user::{AuthResponse, HealthReport, Role, User, UserSummary};
