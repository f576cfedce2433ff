//! Error page route handler.
//!
//! Every failed flow redirects here with `?code=&message=`. Without
//! parameters the page reads as a plain 404.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::filters;
use crate::routes::page::PageContext;

const DEFAULT_CODE: u16 = 404;
const DEFAULT_MESSAGE: &str = "Page not found";

#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub page: PageContext,
    pub code: u16,
    pub message: String,
}

impl ErrorTemplate {
    fn new(page: PageContext, query: ErrorQuery) -> Self {
        let code = query
            .code
            .and_then(|code| code.trim().parse::<u16>().ok())
            .filter(|code| StatusCode::from_u16(*code).is_ok())
            .unwrap_or(DEFAULT_CODE);
        let message = query
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        Self {
            page,
            code,
            message,
        }
    }

    /// Error codes answer with themselves; anything else renders as 200.
    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::OK)
    }
}

/// Display the error page, answering with the status it describes.
pub async fn show(page: PageContext, Query(query): Query<ErrorQuery>) -> Response {
    let template = ErrorTemplate::new(page, query);
    (template.status(), template).into_response()
}

/// Fallback for unknown paths.
pub async fn not_found(page: PageContext) -> Response {
    show(page, Query(ErrorQuery::default())).await
}
