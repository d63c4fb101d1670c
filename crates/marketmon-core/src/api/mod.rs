//! Backend API surface.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`ApiClient::login`] | `POST /auth/login` |
//! | [`ApiClient::register`] | `POST /auth/register` |
//! | [`ApiClient::list_instruments`] | `GET /instruments` |
//! | [`ApiClient::search_instruments`] | `GET /instruments/search?q=` |
//! | [`ApiClient::get_instrument`] | `GET /instruments/:id` |
//! | [`ApiClient::list_favorites`] | `GET /instruments/favorites` |
//! | [`ApiClient::add_favorite`] | `POST /instruments/:id/favorite` |
//! | [`ApiClient::remove_favorite`] | `DELETE /instruments/:id/favorite` |
//! | [`ApiClient::list_users`] | `GET /admin/users` |
//! | [`ApiClient::update_market_data`] | `POST /admin/update-market-data` |
//! | [`ApiClient::initialize_instruments`] | `POST /admin/initialize-instruments` |
//! | [`ApiClient::health`] | `GET /health` |

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind};
