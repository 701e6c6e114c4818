//! Authentication extractors.
//!
//! The signed-in user lives in the session (see [`CurrentUser`]). Pages that
//! need one take [`RequireUser`] or [`RequireAdmin`]; visitors are sent to the
//! login page with the original path in `from`.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::models::session::keys;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Orders for {}", user.email)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the signed-in user.
pub struct OptionalUser(pub Option<CurrentUser>);

/// Why a guarded page was refused.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not signed in: go to login, then come back to `from`.
    RedirectToLogin { from: String },
    /// Signed in without the admin role.
    NotAdmin,
    /// No session layer on this route.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { from } => Redirect::to(&login_url(&from)).into_response(),
            Self::NotAdmin => Redirect::to("/login").into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer missing on guarded route");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// `/login?from=<path>`, omitting `from` for the home page.
#[must_use]
pub fn login_url(from: &str) -> String {
    if from.is_empty() || from == "/" {
        "/login".to_string()
    } else {
        format!("/login?from={}", urlencoding::encode(from))
    }
}

async fn session_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)?;
    Ok(session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten())
}

/// The URI the client asked for. Nested routers see `parts.uri` with their
/// prefix stripped, so prefer the one recorded before routing.
pub(crate) fn original_uri(parts: &Parts) -> &Uri {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |OriginalUri(uri)| uri)
}

fn requested_path(parts: &Parts) -> String {
    let uri = original_uri(parts);
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await?
            .map(Self)
            .ok_or_else(|| AuthRejection::RedirectToLogin {
                from: requested_path(parts),
            })
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            tracing::warn!(email = %user.email, path = %original_uri(parts).path(), "Non-admin refused");
            Err(AuthRejection::NotAdmin)
        }
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await.ok().flatten()))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session id.
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}
