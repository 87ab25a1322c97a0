use crate::model::{Author, DeleteAuthorError, DeleteAuthorRequest};
use crate::store::{AuthorRepository, BookRepository};

/// Deletes `author` unless a book still references it.
///
/// The check and the delete are separate statements. A book inserted between
/// them is caught by the foreign key on `book.author_id`, which the repository
/// reports as [`DeleteAuthorError::HasBooks`] as well.
pub async fn delete_author<R>(repo: &R, author: &Author) -> Result<(), DeleteAuthorError>
where
    R: AuthorRepository + BookRepository + ?Sized,
{
    let count = repo
        .count_books_by_author(author.id())
        .await
        .map_err(|err| DeleteAuthorError::Other(err.0))?;
    if count > 0 {
        return Err(DeleteAuthorError::HasBooks {
            id: author.id(),
            count,
        });
    }

    repo.delete_author(&DeleteAuthorRequest::new(author.id()))
        .await
}
