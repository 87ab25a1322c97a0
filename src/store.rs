use crate::model::{
    Author, AuthorFilter, Book, BookFilter, BookWithAuthor, CreateAuthorError,
    CreateAuthorRequest, CreateBookError, CreateBookRequest, DeleteAuthorError,
    DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, FindAuthorError, FindAuthorRequest,
    FindAuthorsError, FindBookError, FindBookRequest, FindBooksError, UpdateAuthorError,
    UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError>;

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    async fn find_authors(&self, filter: &AuthorFilter) -> Result<Vec<Author>, FindAuthorsError>;

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError>;

    /// Removes the record only. Callers go through
    /// [`crate::service::delete_author`], which checks for dependent books.
    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError>;

    async fn find_book_with_author(
        &self,
        req: &FindBookRequest,
    ) -> Result<BookWithAuthor, FindBookError>;

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<Book>, FindBooksError>;

    async fn find_books_by_author(
        &self,
        author_id: i64,
        limit: u32,
    ) -> Result<Vec<Book>, FindBooksError>;

    async fn count_books_by_author(&self, author_id: i64) -> Result<i64, FindBooksError>;

    /// Most recently created books first.
    async fn find_recent_books(&self, limit: u32) -> Result<Vec<Book>, FindBooksError>;

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError>;

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError>;
}

/// Everything the HTTP layer needs from persistence.
pub trait CatalogRepository: AuthorRepository + BookRepository {}

impl<T> CatalogRepository for T where T: AuthorRepository + BookRepository {}
