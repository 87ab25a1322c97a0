use crate::model::{Author, Book};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthorView {
    id: i64,
    name: String,
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id(),
            name: author.name().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    id: i64,
    title: String,
    description: Option<String>,
    publish_date: String,
    page_count: u32,
    created_at: String,
    cover_image_path: Option<String>,
    author: i64,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_string(),
            description: book.description().map(str::to_string),
            publish_date: book.publish_date().format("%F").to_string(),
            page_count: book.page_count(),
            created_at: book.created_at().to_rfc3339(),
            cover_image_path: book.cover_image_path(),
            author: book.author_id(),
        }
    }
}

pub fn authors_view(authors: &[Author]) -> Vec<AuthorView> {
    authors.iter().map(AuthorView::from).collect()
}

pub fn books_view(books: &[Book]) -> Vec<BookView> {
    books.iter().map(BookView::from).collect()
}
