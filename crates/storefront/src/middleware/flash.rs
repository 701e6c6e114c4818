//! One-shot flash messages carried across a redirect in the session.

use tower_sessions::Session;

use crate::models::Flash;
use crate::models::session::keys;

/// Queue a message for the next rendered page.
///
/// Session failures are logged; a lost flash never fails the request.
pub async fn push_flash(session: &Session, flash: Flash) {
    let mut pending: Vec<Flash> = session
        .get(keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(flash);
    if let Err(e) = session.insert(keys::FLASH, pending).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take (and clear) all pending messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push_flash(&session, Flash::success("Login successful!")).await;
        push_flash(&session, Flash::warning("Heads up")).await;

        let first = take_flashes(&session).await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].message, "Login successful!");
        assert!(take_flashes(&session).await.is_empty());
    }
}
