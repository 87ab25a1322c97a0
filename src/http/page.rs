use crate::render::Renderer;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

/// Outcome of a page handler: either markup or a redirect elsewhere.
#[derive(Debug)]
pub enum Page {
    Html(String),
    Redirect(String),
    InternalServerError,
}

impl Page {
    pub fn render(renderer: &dyn Renderer, view: &str, params: serde_json::Value) -> Self {
        match renderer.render(view, &params) {
            Ok(markup) => Self::Html(markup),
            Err(err) => {
                tracing::error!("{:#}", anyhow::Error::new(err));
                Self::InternalServerError
            }
        }
    }

    pub fn redirect(uri: impl Into<String>) -> Self {
        Self::Redirect(uri.into())
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Self::Html(markup) => Html(markup).into_response(),
            Self::Redirect(uri) => Redirect::to(&uri).into_response(),
            Self::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
