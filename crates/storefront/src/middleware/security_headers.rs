//! Security headers middleware.
//!
//! Adds restrictive security headers to all responses. Product images are the
//! only cross-origin content: they load from the backend's storage origin.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::middleware::CspNonce;
use crate::state::AppState;

/// Build the CSP for one response.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…';
/// style-src 'self';
/// img-src 'self' data: <backend origin>;
/// font-src 'self';
/// connect-src 'self';
/// form-action 'self' <backend origin>;
/// frame-ancestors 'none';
/// base-uri 'self';
/// object-src 'none'
/// ```
///
/// `form-action` includes the backend origin because the OAuth redirect chain
/// starts with a form post that lands on the auth API.
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>, backend_origin: &str) -> String {
    let script_src = nonce.map_or_else(
        || "'self'".to_string(),
        |nonce| format!("'self' {}", nonce.source()),
    );
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         img-src 'self' data: {backend_origin}; \
         font-src 'self'; \
         connect-src 'self'; \
         form-action 'self' {backend_origin}; \
         frame-ancestors 'none'; \
         base-uri 'self'; \
         object-src 'none'"
    )
}

/// Add security headers to all responses.
///
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (the OAuth provider sees the origin only)
/// - `Content-Security-Policy` from [`content_security_policy`]
/// - `Permissions-Policy` denying device features
/// - `Cache-Control: no-store` unless the handler already set caching
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let csp = content_security_policy(
        response.extensions().get::<CspNonce>(),
        &state.config().backend.origin(),
    );
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&csp) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), geolocation=(), microphone=(), payment=(), usb=(), \
             interest-cohort=(), browsing-topics=()",
        ),
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_backend_images_and_nonce() {
        let nonce = CspNonce("abc123==".to_string());
        let csp = content_security_policy(Some(&nonce), "https://abcd.supabase.co");
        assert!(csp.contains("script-src 'self' 'nonce-abc123=='"));
        assert!(csp.contains("img-src 'self' data: https://abcd.supabase.co"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_csp_without_nonce() {
        let csp = content_security_policy(None, "http://localhost:54321");
        assert!(csp.contains("script-src 'self';"));
    }
}
