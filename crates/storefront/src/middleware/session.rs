//! Session middleware configuration.
//!
//! Sessions live in process memory in a bounded `moka` cache
//! (`tower-sessions-moka-store`): each record is evicted when its expiry
//! passes, and the least recently used ones go first once the cache is full.
//! They hold only the signed-in user's token, the visitor cart and flash
//! messages, all of which are cheap to lose on restart. The session cookie
//! is signed with a key derived from `STOREFRONT_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "gg_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on sessions held in memory.
pub const MAX_SESSIONS: u64 = 100_000;

/// Create the in-memory session store.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(MAX_SESSIONS))
}

/// Create the session layer backed by the in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore, SignedCookie> {
    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config.session_secret.expose_secret()))
}

/// 64-byte cookie signing key (SHA-512 of the session secret).
fn signing_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::SessionStore;
    use tower_sessions::cookie::time::{Duration, OffsetDateTime};
    use tower_sessions::session::{Id, Record};

    use super::*;

    fn record(expires_in: Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::from([("cart".to_string(), serde_json::json!([{"qty": 1}]))]),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[test]
    fn test_signing_key_is_deterministic() {
        let a = signing_key("k3Jx9vQ2mP7wL4tN8rB6yH1cF5gD0sZa");
        let b = signing_key("k3Jx9vQ2mP7wL4tN8rB6yH1cF5gD0sZa");
        let c = signing_key("a different but equally long secret!");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[tokio::test]
    async fn test_store_keeps_live_sessions() {
        let store = create_session_store();
        let mut live = record(Duration::hours(1));
        store.create(&mut live).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, live.data);
    }

    #[tokio::test]
    async fn test_store_evicts_expired_sessions() {
        let store = create_session_store();
        let mut stale = record(Duration::milliseconds(50));
        store.create(&mut stale).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert!(store.load(&stale.id).await.unwrap().is_none());
    }
}
