//! Per-page context shared by every full-page template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{CurrentUser, Flash};
use crate::models::session::keys;
use crate::services::cart::CartService;
use crate::state::AppState;

use super::auth::original_uri;
use super::csp::CspNonce;
use super::flash::take_flashes;

/// What the layout needs besides the page's own data: the signed-in user,
/// the cart badge, pending flash messages and the CSP nonce.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: usize,
    pub flashes: Vec<Flash>,
    pub nonce: String,
    /// Path of the current request, used to highlight navigation.
    pub path: String,
}

impl PageContext {
    /// Build the context by hand (handlers that already hold the session).
    pub async fn load(state: &AppState, session: &Session, nonce: &CspNonce, path: &str) -> Self {
        let user: Option<CurrentUser> = session.get(keys::CURRENT_USER).await.ok().flatten();
        let cart_count = CartService::new(state.api(), session, user.as_ref())
            .count()
            .await;
        Self {
            user,
            cart_count,
            flashes: take_flashes(session).await,
            nonce: nonce.value().to_string(),
            path: path.to_string(),
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Whether `href` is the current page (exact, or a section prefix).
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        self.path == href || (href.len() > 1 && self.path.starts_with(&format!("{href}/")))
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = CspNonce::from_request_parts(parts, state).await?;
        let path = original_uri(parts).path().to_string();
        match parts.extensions.get::<Session>().cloned() {
            Some(session) => Ok(Self::load(state, &session, &nonce, &path).await),
            None => Ok(Self {
                nonce: nonce.value().to_string(),
                path,
                ..Self::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let page = PageContext {
            path: "/dashboard/items/abc/edit".to_string(),
            ..PageContext::default()
        };
        assert!(page.is_active("/dashboard/items"));
        assert!(!page.is_active("/dashboard/items/new"));
        assert!(!page.is_active("/"));
        assert!(!page.is_signed_in());
    }
}
