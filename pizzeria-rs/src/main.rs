//! # pizzeria-rs
//!
//! Minimal pizza-ordering web app: signup/login with Argon2-hashed passwords,
//! JWT session cookies, a pizza catalog, and an order record.
//!
//! ## Architecture
//!
//! - **Store**: JSON-file document collections (users, pizzas, orders) under a data dir
//! - **Auth**: Argon2 password hashing; stateless HS256 JWT session cookies
//! - **HTTP**: Axum router with rate limiting, request IDs, and graceful shutdown
//!
//! Startup is fail-fast: a missing session secret or an unopenable store exits
//! non-zero before the listener binds.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod auth;
mod config;
mod http;
mod store;

use std::net::SocketAddr;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auth::SessionKeys;
use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState};
use crate::store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        data_dir = %config.data_dir.display(),
        session_ttl = %humantime::format_duration(config.session_ttl),
        seed_catalog = config.seed_catalog,
        "configuration loaded"
    );

    // Health check: refuse to serve without a working store.
    let db = Database::open(&config.data_dir).await.with_context(|| {
        format!(
            "failed to open document store in {}",
            config.data_dir.display()
        )
    })?;
    info!(
        users = db.user_count().await,
        pizzas = db.pizza_count().await,
        orders = db.order_count().await,
        "document store opened"
    );

    let session_keys = SessionKeys::new(&config.session_secret, config.session_ttl);
    let state = AppState {
        db,
        session_keys,
        seed_catalog: config.seed_catalog,
    };

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    if config.seed_catalog {
        tracing::warn!("catalog seeding route /add-pizza is enabled and unauthenticated");
    }

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "pizzeria-rs listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = shutdown.await;
        info!("shutting down gracefully");
    })
    .await
    .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
