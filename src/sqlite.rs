use crate::model::{
    Author, AuthorFilter, AuthorName, Book, BookDetails, BookFilter, BookTitle, BookWithAuthor,
    CreateAuthorError, CreateAuthorRequest, CreateBookError, CreateBookRequest, DeleteAuthorError,
    DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, FindAuthorError, FindAuthorRequest,
    FindAuthorsError, FindBookError, FindBookRequest, FindBooksError, StoredCover,
    UpdateAuthorError, UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use crate::store::{AuthorRepository, BookRepository};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

const BOOK_COLUMNS: &str = "book.id, book.title, book.description, book.publish_date, \
     book.page_count, book.created_at, book.cover_image, book.cover_image_type, \
     book.cover_image_name, book.author_id";

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(path)
            .with_context(|| format!("Invalid database path {path}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .with_regexp();
        let pool = SqlitePool::connect_with(opts)
            .await
            .with_context(|| format!("Failed to open database at {path}"))?;

        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let name: &str = row.try_get("name")?;

        let name = AuthorName::new_unchecked(name);
        Ok(Self::new(id, name))
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let title: &str = row.try_get("title")?;
        let details = BookDetails {
            title: BookTitle::new_unchecked(title),
            description: row.try_get("description")?,
            publish_date: row.try_get("publish_date")?,
            page_count: row.try_get("page_count")?,
            author_id: row.try_get("author_id")?,
        };
        let cover = StoredCover::from_columns(
            row.try_get("cover_image")?,
            row.try_get("cover_image_type")?,
            row.try_get("cover_image_name")?,
        );

        Ok(Self::new(
            row.try_get("id")?,
            details,
            row.try_get("created_at")?,
            cover,
        ))
    }
}

impl<'r> FromRow<'r, SqliteRow> for BookWithAuthor {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let book = Book::from_row(row)?;
        let name: &str = row.try_get("author_name")?;
        let author = Author::new(book.author_id(), AuthorName::new_unchecked(name));
        Ok(Self { book, author })
    }
}

/// Splits a cover into its `(cover_image, cover_image_type, cover_image_name)`
/// columns. Exactly one representation is ever written.
fn cover_columns(cover: &StoredCover) -> (Option<&[u8]>, Option<&'static str>, Option<&str>) {
    match cover {
        StoredCover::Inline { mime, bytes } => (Some(bytes.as_slice()), Some(mime.as_str()), None),
        StoredCover::File { filename } => (None, None, Some(filename.as_str())),
    }
}

#[async_trait]
impl AuthorRepository for Sqlite {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        let author = sqlx::query_as("INSERT INTO author (name) VALUES (?) RETURNING id, name")
            .bind(req.name().as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create author with name "{}""#,
                    req.name()
                ));
                CreateAuthorError(err)
            })?;

        Ok(author)
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        let author = sqlx::query_as("SELECT id, name FROM author WHERE id = ?")
            .bind(req.id())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindAuthorError::NotFound { id: req.id() }
                } else {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve author with id "{}""#,
                        req.id()
                    ));
                    FindAuthorError::Other(err)
                }
            })?;

        Ok(author)
    }

    async fn find_authors(&self, filter: &AuthorFilter) -> Result<Vec<Author>, FindAuthorsError> {
        let authors = match filter.name() {
            Some(pattern) => {
                sqlx::query_as::<_, Author>("SELECT id, name FROM author WHERE name REGEXP ? ORDER BY id")
                    .bind(pattern.case_insensitive())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, Author>("SELECT id, name FROM author ORDER BY id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|err| {
            let err = anyhow!(err).context("Failed to retrieve authors");
            FindAuthorsError(err)
        })?;

        Ok(authors)
    }

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError> {
        let author = sqlx::query_as("UPDATE author SET name = ? WHERE id = ? RETURNING id, name")
            .bind(req.name().as_str())
            .bind(req.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to update author with id "{}""#, req.id()));
                UpdateAuthorError::Other(err)
            })?;

        author.ok_or(UpdateAuthorError::NotFound { id: req.id() })
    }

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError> {
        let result = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(req.id())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    DeleteAuthorError::HasBooks {
                        id: req.id(),
                        count: 1,
                    }
                } else {
                    let err = anyhow!(err)
                        .context(format!(r#"Failed to delete author with id "{}""#, req.id()));
                    DeleteAuthorError::Other(err)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteAuthorError::NotFound { id: req.id() });
        }

        Ok(())
    }
}

#[async_trait]
impl BookRepository for Sqlite {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let details = req.details();
        let (cover_image, cover_image_type, cover_image_name) =
            req.cover().map(cover_columns).unwrap_or_default();

        let query = format!(
            "INSERT INTO book (title, description, publish_date, page_count, created_at, \
             cover_image, cover_image_type, cover_image_name, author_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            BOOK_COLUMNS.replace("book.", "")
        );
        let book = sqlx::query_as(&query)
            .bind(details.title.as_str())
            .bind(details.description.as_deref())
            .bind(details.publish_date)
            .bind(details.page_count)
            .bind(Utc::now())
            .bind(cover_image)
            .bind(cover_image_type)
            .bind(cover_image_name)
            .bind(details.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create book with title "{}""#,
                    details.title
                ));
                CreateBookError(err)
            })?;

        Ok(book)
    }

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM book WHERE book.id = ?");
        let book = sqlx::query_as(&query)
            .bind(req.id())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| find_book_error(err, req.id()))?;

        Ok(book)
    }

    async fn find_book_with_author(
        &self,
        req: &FindBookRequest,
    ) -> Result<BookWithAuthor, FindBookError> {
        let query = format!(
            "SELECT {BOOK_COLUMNS}, author.name AS author_name FROM book \
             JOIN author ON author.id = book.author_id WHERE book.id = ?"
        );
        let book = sqlx::query_as(&query)
            .bind(req.id())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| find_book_error(err, req.id()))?;

        Ok(book)
    }

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<Book>, FindBooksError> {
        let mut parts = Vec::new();
        let mut binds = Vec::new();

        if let Some(title) = filter.title() {
            parts.push("book.title REGEXP ?");
            binds.push(title.case_insensitive());
        }
        if let Some(before) = filter.published_before() {
            parts.push("book.publish_date <= ?");
            binds.push(before.format("%F").to_string());
        }
        if let Some(after) = filter.published_after() {
            parts.push("book.publish_date >= ?");
            binds.push(after.format("%F").to_string());
        }

        let mut query = format!("SELECT {BOOK_COLUMNS} FROM book");
        if !parts.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&parts.join(" AND "));
        }
        query.push_str(" ORDER BY book.id");

        let mut query = sqlx::query_as::<_, Book>(&query);
        for bind in binds {
            query = query.bind(bind);
        }

        let books = query.fetch_all(&self.pool).await.map_err(|err| {
            let err = anyhow!(err).context("Failed to retrieve books");
            FindBooksError(err)
        })?;

        Ok(books)
    }

    async fn find_books_by_author(
        &self,
        author_id: i64,
        limit: u32,
    ) -> Result<Vec<Book>, FindBooksError> {
        let query =
            format!("SELECT {BOOK_COLUMNS} FROM book WHERE book.author_id = ? ORDER BY book.id LIMIT ?");
        let books = sqlx::query_as(&query)
            .bind(author_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to retrieve books of author with id "{author_id}""#
                ));
                FindBooksError(err)
            })?;

        Ok(books)
    }

    async fn count_books_by_author(&self, author_id: i64) -> Result<i64, FindBooksError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM book WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to count books of author with id "{author_id}""#
                ));
                FindBooksError(err)
            })?;

        Ok(count)
    }

    async fn find_recent_books(&self, limit: u32) -> Result<Vec<Book>, FindBooksError> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM book ORDER BY book.created_at DESC, book.id DESC LIMIT ?"
        );
        let books = sqlx::query_as(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve recent books");
                FindBooksError(err)
            })?;

        Ok(books)
    }

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError> {
        let details = req.details();
        let mut assignments = String::from(
            "title = ?, description = ?, publish_date = ?, page_count = ?, author_id = ?",
        );
        if req.cover().is_some() {
            assignments.push_str(", cover_image = ?, cover_image_type = ?, cover_image_name = ?");
        }
        let query = format!(
            "UPDATE book SET {assignments} WHERE id = ? RETURNING {}",
            BOOK_COLUMNS.replace("book.", "")
        );

        let mut query = sqlx::query_as::<_, Book>(&query)
            .bind(details.title.as_str())
            .bind(details.description.as_deref())
            .bind(details.publish_date)
            .bind(details.page_count)
            .bind(details.author_id);
        if let Some(cover) = req.cover() {
            let (cover_image, cover_image_type, cover_image_name) = cover_columns(cover);
            query = query
                .bind(cover_image)
                .bind(cover_image_type)
                .bind(cover_image_name);
        }

        let book = query
            .bind(req.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to update book with id "{}""#, req.id()));
                UpdateBookError::Other(err)
            })?;

        book.ok_or(UpdateBookError::NotFound { id: req.id() })
    }

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError> {
        let result = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(req.id())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err)
                    .context(format!(r#"Failed to delete book with id "{}""#, req.id()));
                DeleteBookError::Other(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteBookError::NotFound { id: req.id() });
        }

        Ok(())
    }
}

fn find_book_error(err: sqlx::Error, id: i64) -> FindBookError {
    if matches!(err, sqlx::Error::RowNotFound) {
        FindBookError::NotFound { id }
    } else {
        let err = anyhow!(err).context(format!(r#"Failed to retrieve book with id "{id}""#));
        FindBookError::Other(err)
    }
}

// SQLITE_CONSTRAINT_FOREIGNKEY (787) is classified by sqlx; a RESTRICT action
// fails with SQLITE_CONSTRAINT_TRIGGER (1811) instead.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_foreign_key_violation() || db_err.code().as_deref() == Some("1811");
    }

    false
}
