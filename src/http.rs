mod authors;
mod books;
mod home;
mod page;
mod views;

use crate::covers::CoverStorage;
use crate::render::Renderer;
use crate::store::CatalogRepository;
use anyhow::Context;
use axum::Router;
use axum::extract::{Query, Request};
use axum::http::Method;
use axum::routing::get;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Layer;
use tower::util::MapRequestLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use page::Page;

pub struct AppState<R> {
    repo: Arc<R>,
    covers: Arc<dyn CoverStorage>,
    renderer: Arc<dyn Renderer>,
}

impl<R> AppState<R> {
    pub fn new(repo: Arc<R>, covers: Arc<dyn CoverStorage>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            repo,
            covers,
            renderer,
        }
    }
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            covers: Arc::clone(&self.covers),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
    upload_root: PathBuf,
}

impl HttpServerConfig {
    pub fn new(port: u16, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            port,
            upload_root: upload_root.into(),
        }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<R: CatalogRepository>(
        state: AppState<R>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = router(state, &config.upload_root);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("listening on {addr}");
        }

        // Method override has to run before routing, so it wraps the router
        // instead of being added with `Router::layer`.
        let app = MapRequestLayer::new(method_override).layer(self.router);
        axum::serve(self.listener, axum::ServiceExt::<Request>::into_make_service(app))
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

/// All catalog routes, with uploaded files served from `upload_root`.
pub fn router<R: CatalogRepository>(state: AppState<R>, upload_root: &Path) -> Router {
    Router::new()
        .route("/", get(home::index::<R>))
        .nest("/authors", author_routes::<R>())
        .nest("/books", book_routes::<R>())
        .nest_service("/uploads", ServeDir::new(upload_root.join("uploads")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn author_routes<R: CatalogRepository>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/",
            get(authors::list_authors::<R>).post(authors::create_author::<R>),
        )
        .route("/new", get(authors::new_author::<R>))
        .route(
            "/{id}",
            get(authors::show_author::<R>)
                .put(authors::update_author::<R>)
                .delete(authors::delete_author::<R>),
        )
        .route("/{id}/edit", get(authors::edit_author::<R>))
}

fn book_routes<R: CatalogRepository>() -> Router<AppState<R>> {
    Router::new()
        .route("/", get(books::list_books::<R>).post(books::create_book::<R>))
        .route("/new", get(books::new_book::<R>))
        .route(
            "/{id}",
            get(books::show_book::<R>)
                .put(books::update_book::<R>)
                .delete(books::delete_book::<R>),
        )
        .route("/{id}/edit", get(books::edit_book::<R>))
}

/// Record ids arrive as path text; anything that is not an id is treated as a
/// missing record.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

#[derive(Debug, Deserialize)]
struct MethodOverride {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Lets HTML forms issue `PUT` and `DELETE`: a `POST` carrying
/// `_method=PUT` or `_method=DELETE` in its query string is rewritten.
pub fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }

    let overridden = Query::<MethodOverride>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(query)| query.method)
        .and_then(|method| match method.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        });

    if let Some(method) = overridden {
        *req.method_mut() = method;
    }
    req
}
