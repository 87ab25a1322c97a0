#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use catalog::covers::{CoverStorage, DiskCoverStorage, InlineCoverStorage};
use catalog::http::{AppState, router};
use catalog::model::{
    Author, AuthorFilter, AuthorName, Book, BookDetails, BookFilter, BookTitle, BookWithAuthor,
    CreateAuthorError, CreateAuthorRequest, CreateBookError, CreateBookRequest, DeleteAuthorError,
    DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, FindAuthorError, FindAuthorRequest,
    FindAuthorsError, FindBookError, FindBookRequest, FindBooksError, UpdateAuthorError,
    UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use catalog::render::TemplateRenderer;
use catalog::sqlite::Sqlite;
use catalog::store::{AuthorRepository, BookRepository};
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use url::form_urlencoded;

/// A 1x1 transparent GIF.
pub const PIXEL_GIF: &str = "R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<Sqlite>,
    pub dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(
        |_| Arc::new(InlineCoverStorage) as Arc<dyn CoverStorage>,
        None,
    )
    .await
}

pub async fn spawn_app_with_disk_covers() -> TestApp {
    spawn_app_with(
        |dir| Arc::new(DiskCoverStorage::new(dir.path().to_path_buf())) as Arc<dyn CoverStorage>,
        None,
    )
    .await
}

/// An app whose router goes through a [`FailingRepository`]. `TestApp::repo`
/// still reaches the underlying database directly.
pub async fn spawn_app_with_failures(failures: Failures) -> TestApp {
    spawn_app_with(
        |_| Arc::new(InlineCoverStorage) as Arc<dyn CoverStorage>,
        Some(failures),
    )
    .await
}

async fn spawn_app_with(
    covers: impl FnOnce(&TempDir) -> Arc<dyn CoverStorage>,
    failures: Option<Failures>,
) -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
    let repo = Arc::new(Sqlite::new(&url).await.unwrap());
    let covers = covers(&dir);
    let renderer = Arc::new(TemplateRenderer::new().unwrap());

    let router = match failures {
        Some(failures) => {
            let failing = FailingRepository::new(Arc::clone(&repo), failures);
            router(AppState::new(Arc::new(failing), covers, renderer), dir.path())
        }
        None => router(AppState::new(Arc::clone(&repo), covers, renderer), dir.path()),
    };

    TestApp { router, repo, dir }
}

/// Repository operations a [`FailingRepository`] turns into store errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub find_authors: bool,
    pub find_books: bool,
    pub delete_book: bool,
    /// Reports zero dependent books, as if one was added after the count.
    pub stale_book_count: bool,
}

/// Delegates to a real [`Sqlite`] store except for the operations selected
/// in [`Failures`].
pub struct FailingRepository {
    inner: Arc<Sqlite>,
    failures: Failures,
}

impl FailingRepository {
    pub fn new(inner: Arc<Sqlite>, failures: Failures) -> Self {
        Self { inner, failures }
    }
}

fn store_unavailable() -> anyhow::Error {
    anyhow!("store unavailable")
}

#[async_trait]
impl AuthorRepository for FailingRepository {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        self.inner.create_author(req).await
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        self.inner.find_author(req).await
    }

    async fn find_authors(&self, filter: &AuthorFilter) -> Result<Vec<Author>, FindAuthorsError> {
        if self.failures.find_authors {
            return Err(FindAuthorsError(store_unavailable()));
        }
        self.inner.find_authors(filter).await
    }

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError> {
        self.inner.update_author(req).await
    }

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError> {
        self.inner.delete_author(req).await
    }
}

#[async_trait]
impl BookRepository for FailingRepository {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        self.inner.create_book(req).await
    }

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError> {
        self.inner.find_book(req).await
    }

    async fn find_book_with_author(
        &self,
        req: &FindBookRequest,
    ) -> Result<BookWithAuthor, FindBookError> {
        self.inner.find_book_with_author(req).await
    }

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<Book>, FindBooksError> {
        if self.failures.find_books {
            return Err(FindBooksError(store_unavailable()));
        }
        self.inner.find_books(filter).await
    }

    async fn find_books_by_author(
        &self,
        author_id: i64,
        limit: u32,
    ) -> Result<Vec<Book>, FindBooksError> {
        self.inner.find_books_by_author(author_id, limit).await
    }

    async fn count_books_by_author(&self, author_id: i64) -> Result<i64, FindBooksError> {
        if self.failures.stale_book_count {
            return Ok(0);
        }
        self.inner.count_books_by_author(author_id).await
    }

    async fn find_recent_books(&self, limit: u32) -> Result<Vec<Book>, FindBooksError> {
        self.inner.find_recent_books(limit).await
    }

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError> {
        self.inner.update_book(req).await
    }

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError> {
        if self.failures.delete_book {
            return Err(DeleteBookError::Other(store_unavailable()));
        }
        self.inner.delete_book(req).await
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_form(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish(),
            ))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn insert_author(&self, name: &str) -> Author {
        let req = CreateAuthorRequest::new(AuthorName::new(name).unwrap());
        self.repo.create_author(&req).await.unwrap()
    }

    pub async fn insert_book(&self, title: &str, author: &Author, published: &str) -> Book {
        let details = BookDetails {
            title: BookTitle::new(title).unwrap(),
            description: None,
            publish_date: NaiveDate::parse_from_str(published, "%Y-%m-%d").unwrap(),
            page_count: 100,
            author_id: author.id(),
        };
        self.repo
            .create_book(&CreateBookRequest::new(details, None))
            .await
            .unwrap()
    }
}

pub fn cover_payload(mime: &str, data: &str) -> String {
    format!(r#"{{"type":"{mime}","data":"{data}"}}"#)
}

/// The redirect target of a response, panicking if it is not a redirect.
pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
        .to_string()
}

/// The id at the end of a `/books/<id>` or `/authors/<id>` redirect.
pub fn redirected_id(response: &Response<Body>) -> i64 {
    location(response)
        .rsplit('/')
        .next()
        .and_then(|id| id.parse().ok())
        .expect("redirect does not end in an id")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
