//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (reuse upstream id or generate one)
//! 4. Security headers (CSP built from the nonce below)
//! 5. CSP nonce (per-request nonce for the script tag)
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Flash notices (cleared once a page renders)
//! 8. Rate limiting on the auth forms (governor)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, clear_auth_session, set_auth_session};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::auth_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{
    apply_remember_me, cart_prefs, create_session_layer, flash_middleware, peek_flash,
    save_cart_prefs, set_flash,
};
