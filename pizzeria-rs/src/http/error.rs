use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Handler-level failures. The auth gate renders as a redirect to `/login`;
/// everything else is a fixed plain-text body. Raw store or hashing detail is
/// logged, never sent to the client.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("redirecting to login")]
    LoginRedirect,
    #[error("Error: that email is already registered")]
    DuplicateEmail,
    #[error("User not found!")]
    UnknownEmail,
    #[error("Invalid credentials!")]
    InvalidPassword,
    #[error("Error: {0} is required")]
    MissingField(&'static str),
    #[error("Error: that does not look like an email address")]
    InvalidEmail,
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::LoginRedirect => StatusCode::SEE_OTHER,
            PageError::DuplicateEmail => StatusCode::CONFLICT,
            PageError::UnknownEmail | PageError::InvalidPassword => StatusCode::UNAUTHORIZED,
            PageError::MissingField(_) | PageError::InvalidEmail => StatusCode::BAD_REQUEST,
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::LoginRedirect => Redirect::to("/login").into_response(),
            other => (other.status(), other.to_string()).into_response(),
        }
    }
}

impl From<AuthError> for PageError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => PageError::DuplicateEmail,
            AuthError::UnknownEmail => PageError::UnknownEmail,
            AuthError::InvalidPassword => PageError::InvalidPassword,
            AuthError::TokenInvalid => PageError::LoginRedirect,
            AuthError::Hashing => PageError::Internal,
            AuthError::Store(source) => {
                error!(error = %source, "store failure during auth operation");
                PageError::Internal
            }
        }
    }
}
