//! HTTP layer: Axum router, session gate, handlers, and pages.
//!
//! All seven routes live in `handlers`; protected pages call the session gate
//! in `session` before touching the stores.

mod error;
mod handlers;
mod pages;
mod session;
mod state;

#[cfg(test)]
mod tests;

pub use handlers::router;
pub use state::AppState;
