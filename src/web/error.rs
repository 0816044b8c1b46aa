use crate::web::state::AppState;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tera::Context;

pub enum AppError {
    /// A rendered 404 page.
    NotFound(String),
    Internal(anyhow::Error),
}

impl AppError {
    /// Renders `404.html` with `message`. A template failure becomes a 500.
    pub fn not_found(state: &AppState, message: &str) -> Self {
        let mut ctx = Context::new();
        ctx.insert("site", &state.config.site);
        ctx.insert("message", message);
        match state.templates.render("404.html", &ctx) {
            Ok(html) => Self::NotFound(html),
            Err(e) => Self::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Self::Internal(err) => {
                tracing::error!("Request failed: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
