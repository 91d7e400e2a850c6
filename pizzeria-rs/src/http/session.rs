use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, warn};

use crate::auth::SessionUser;

use super::error::PageError;
use super::state::AppState;

pub const SESSION_COOKIE: &str = "token";

/// Binary gate for protected pages: a valid `token` cookie yields the decoded
/// identity, anything else redirects to `/login`. Missing and invalid tokens
/// are deliberately indistinguishable to the client.
pub fn require_session(state: &AppState, jar: &CookieJar) -> Result<SessionUser, PageError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        debug!("request without session cookie");
        return Err(PageError::LoginRedirect);
    };

    match state.session_keys.verify(cookie.value()) {
        Ok(user) => {
            debug!(user_id = %user.id, user = %user.name, "authorized request using session cookie");
            Ok(user)
        }
        Err(_) => {
            warn!("request with rejected session cookie");
            Err(PageError::LoginRedirect)
        }
    }
}

/// HTTP-only cookie carrying a freshly minted token. No client-side max-age;
/// the token's own expiry bounds the session.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// Cookie matching the session cookie's name and path, used for removal.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}
