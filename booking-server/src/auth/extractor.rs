//! CurrentUser extractor
//!
//! Token validation happens once, in the `require_auth` middleware, which
//! stores the authenticated [`CurrentUser`] in the request extensions.
//! This extractor only surfaces that value to handlers; a protected route
//! reached without the middleware rejects with 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                security_log!(
                    "WARN",
                    "current_user_missing",
                    uri = format!("{:?}", parts.uri)
                );
                Err(AppError::unauthorized())
            }
        }
    }
}
