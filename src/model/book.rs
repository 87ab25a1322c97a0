use super::{Author, SearchPattern, StoredCover};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(raw: &str) -> Result<Self, BookTitleEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(BookTitleEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
#[error("Book title cannot be empty")]
pub struct BookTitleEmptyError;

#[derive(Debug, Clone)]
pub struct BookDetails {
    pub title: BookTitle,
    pub description: Option<String>,
    pub publish_date: NaiveDate,
    pub page_count: u32,
    pub author_id: i64,
}

#[derive(Debug, Clone)]
pub struct Book {
    id: i64,
    details: BookDetails,
    created_at: DateTime<Utc>,
    cover: Option<StoredCover>,
}

impl Book {
    pub const fn new(
        id: i64,
        details: BookDetails,
        created_at: DateTime<Utc>,
        cover: Option<StoredCover>,
    ) -> Self {
        Self {
            id,
            details,
            created_at,
            cover,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.details.title
    }

    pub fn description(&self) -> Option<&str> {
        self.details.description.as_deref()
    }

    pub const fn publish_date(&self) -> NaiveDate {
        self.details.publish_date
    }

    pub const fn page_count(&self) -> u32 {
        self.details.page_count
    }

    pub const fn author_id(&self) -> i64 {
        self.details.author_id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn cover(&self) -> Option<&StoredCover> {
        self.cover.as_ref()
    }

    pub fn cover_image_path(&self) -> Option<String> {
        self.cover.as_ref().map(StoredCover::display_path)
    }
}

#[derive(Debug, Clone)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author: Author,
}

#[derive(Debug)]
pub struct CreateBookRequest {
    details: BookDetails,
    cover: Option<StoredCover>,
}

impl CreateBookRequest {
    pub const fn new(details: BookDetails, cover: Option<StoredCover>) -> Self {
        Self { details, cover }
    }

    pub const fn details(&self) -> &BookDetails {
        &self.details
    }

    pub const fn cover(&self) -> Option<&StoredCover> {
        self.cover.as_ref()
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateBookError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct FindBookRequest {
    id: i64,
}

impl FindBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

/// Conjunction of optional listing conditions; date bounds are inclusive.
#[derive(Debug, Default)]
pub struct BookFilter {
    title: Option<SearchPattern>,
    published_before: Option<NaiveDate>,
    published_after: Option<NaiveDate>,
}

impl BookFilter {
    pub const fn new(
        title: Option<SearchPattern>,
        published_before: Option<NaiveDate>,
        published_after: Option<NaiveDate>,
    ) -> Self {
        Self {
            title,
            published_before,
            published_after,
        }
    }

    pub const fn title(&self) -> Option<&SearchPattern> {
        self.title.as_ref()
    }

    pub const fn published_before(&self) -> Option<NaiveDate> {
        self.published_before
    }

    pub const fn published_after(&self) -> Option<NaiveDate> {
        self.published_after
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindBooksError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct UpdateBookRequest {
    id: i64,
    details: BookDetails,
    cover: Option<StoredCover>,
}

impl UpdateBookRequest {
    /// A `None` cover keeps whatever cover the book already has.
    pub const fn new(id: i64, details: BookDetails, cover: Option<StoredCover>) -> Self {
        Self { id, details, cover }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn details(&self) -> &BookDetails {
        &self.details
    }

    pub const fn cover(&self) -> Option<&StoredCover> {
        self.cover.as_ref()
    }
}

#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: i64,
}

impl DeleteBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
