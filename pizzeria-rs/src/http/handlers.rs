use std::sync::{Arc, LazyLock};

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use serde::Deserialize;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::GlobalKeyExtractor,
    GovernorLayer,
};
use tracing::{debug, error, info, warn};

use crate::auth::{register_credentials, verify_credentials};
use crate::store::NewPizza;

use super::error::PageError;
use super::pages;
use super::session::{expired_session_cookie, require_session, session_cookie};
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(20)
            .burst_size(50)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .unwrap_or_else(|| panic!("default governor config must be valid")),
    );

    Router::new()
        .route("/", get(home))
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/add-pizza", get(add_pizza))
        .layer(GovernorLayer::new(governor_conf))
        .layer(tower_http::request_id::SetRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
            tower_http::request_id::MakeRequestUuid::default(),
        ))
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, PageError> {
    let user = require_session(&state, &jar)?;
    let pizzas = state.db.list_pizzas().await;
    debug!(user = %user.name, pizzas = pizzas.len(), "catalog page requested");
    Ok(Html(pages::catalog_page(&user, &pizzas)))
}

async fn signup_form() -> Html<String> {
    Html(pages::signup_page())
}

async fn login_form() -> Html<String> {
    Html(pages::login_page())
}

#[derive(Debug, Deserialize)]
struct SignupForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, PageError> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() {
        return Err(PageError::MissingField("name"));
    }
    if email.is_empty() {
        return Err(PageError::MissingField("email"));
    }
    if form.password.is_empty() {
        return Err(PageError::MissingField("password"));
    }
    if !is_plausible_email(email) {
        return Err(PageError::InvalidEmail);
    }

    let user = register_credentials(&state.db, name, email, &form.password)
        .await
        .map_err(|err| {
            warn!(error = %err, "signup rejected");
            PageError::from(err)
        })?;
    info!(user_id = %user.id, "user signed up");

    Ok(Redirect::to("/login"))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), PageError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(PageError::MissingField("email"));
    }
    if form.password.is_empty() {
        return Err(PageError::MissingField("password"));
    }

    let user = verify_credentials(&state.db, email, &form.password)
        .await
        .map_err(|err| {
            warn!(error = %err, "login rejected");
            PageError::from(err)
        })?;

    let token = state.session_keys.issue(&user.id, &user.name).map_err(|err| {
        error!(error = %err, "failed to mint session token");
        PageError::Internal
    })?;
    info!(user_id = %user.id, "user logged in");

    Ok((jar.add(session_cookie(token)), Redirect::to("/")))
}

async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    debug!("session cookie cleared");
    (jar.remove(expired_session_cookie()), Redirect::to("/login"))
}

/// Seeding affordance: inserts one hardcoded catalog entry. Responds 404
/// unless enabled in configuration.
async fn add_pizza(State(state): State<AppState>) -> Result<String, PageError> {
    if !state.seed_catalog {
        warn!("catalog seeding requested but disabled");
        return Err(PageError::NotFound);
    }

    let pizza = state
        .db
        .insert_pizza(NewPizza {
            name: String::from("Margherita"),
            price: 200,
            description: String::from("Classic Margherita Pizza"),
        })
        .await
        .map_err(|err| {
            error!(error = %err, "failed to seed pizza");
            PageError::Internal
        })?;
    info!(pizza_id = %pizza.id, "seed pizza added");

    Ok(String::from("Pizza added"))
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .unwrap_or_else(|e| panic!("email regex must be valid: {e}"))
});

fn is_plausible_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw)
}
