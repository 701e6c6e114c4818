//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP with nonce, frame/referrer policies)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Rate limiting on auth and cart routes (governor)
//!
//! Extractors: [`RequireUser`], [`RequireAdmin`], [`OptionalUser`] and
//! [`PageContext`].

pub mod auth;
pub mod csp;
pub mod flash;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalUser, RequireAdmin, RequireUser, clear_current_user, login_url, set_current_user,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use flash::{push_flash, take_flashes};
pub use page::PageContext;
pub use rate_limit::{auth_rate_limiter, cart_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
