//! HTTP front end: embedded login page plus the JSON API under `/api`.
//! Protected routes redirect to `/login` when no session is stored.
pub mod routes;
pub mod types;
pub mod web_server;

pub use types::AppState;
pub use web_server::WebServer;
