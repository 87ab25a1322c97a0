use super::views::{AuthorView, BookView, authors_view, books_view};
use super::{AppState, Page, parse_id};
use crate::covers::CoverStorage;
use crate::model::{
    AuthorFilter, Book, BookDetails, BookFilter, BookTitle, BookTitleEmptyError, CoverImage,
    CreateBookRequest, DeleteBookRequest, FindBookRequest, SearchPattern, StoredCover,
    UpdateBookRequest,
};
use crate::store::CatalogRepository;
use axum::extract::{Form, Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

const CREATE_ERROR_MESSAGE: &str = "Error Creating Book!";
const UPDATE_ERROR_MESSAGE: &str = "Error Updating Book!";
const DELETE_ERROR_MESSAGE: &str = "Could not remove book";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookSearchQuery {
    title: Option<String>,
    published_before: Option<String>,
    published_after: Option<String>,
}

impl BookSearchQuery {
    fn filter(&self) -> Result<BookFilter, chrono::ParseError> {
        Ok(BookFilter::new(
            SearchPattern::new(self.title.as_deref()),
            parse_date_filter(self.published_before.as_deref())?,
            parse_date_filter(self.published_after.as_deref())?,
        ))
    }
}

fn parse_date_filter(raw: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match raw {
        Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, DATE_FORMAT).map(Some),
        _ => Ok(None),
    }
}

/// The book fields accepted from a request body, as submitted. Anything else
/// in the body is ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookForm {
    title: String,
    author: String,
    publish_date: String,
    page_count: String,
    description: String,
    #[serde(skip_serializing)]
    cover: Option<String>,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title().to_string(),
            author: book.author_id().to_string(),
            publish_date: book.publish_date().format(DATE_FORMAT).to_string(),
            page_count: book.page_count().to_string(),
            description: book.description().unwrap_or_default().to_string(),
            cover: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseBookFormError {
    #[error(transparent)]
    Title(#[from] BookTitleEmptyError),
    #[error("\"{0}\" is not an author id")]
    Author(String),
    #[error("\"{0}\" is not a publish date")]
    PublishDate(String),
    #[error("\"{0}\" is not a page count")]
    PageCount(String),
}

impl TryFrom<&BookForm> for BookDetails {
    type Error = ParseBookFormError;

    fn try_from(value: &BookForm) -> Result<Self, Self::Error> {
        let title = BookTitle::new(&value.title)?;
        let author_id = value
            .author
            .trim()
            .parse()
            .map_err(|_| ParseBookFormError::Author(value.author.clone()))?;
        let publish_date = NaiveDate::parse_from_str(value.publish_date.trim(), DATE_FORMAT)
            .map_err(|_| ParseBookFormError::PublishDate(value.publish_date.clone()))?;
        let page_count = value
            .page_count
            .trim()
            .parse()
            .map_err(|_| ParseBookFormError::PageCount(value.page_count.clone()))?;
        let description = Some(value.description.trim())
            .filter(|description| !description.is_empty())
            .map(str::to_string);

        Ok(Self {
            title,
            description,
            publish_date,
            page_count,
            author_id,
        })
    }
}

/// Decodes and stores a cover payload. Payloads that are not an accepted
/// image are dropped without an error; only a storage failure is reported.
async fn attach_cover(
    covers: &dyn CoverStorage,
    payload: Option<&str>,
) -> anyhow::Result<Option<StoredCover>> {
    let Some(payload) = payload.filter(|payload| !payload.is_empty()) else {
        return Ok(None);
    };

    match CoverImage::decode(payload) {
        Ok(cover) => covers.store(cover).await.map(Some),
        Err(err) => {
            tracing::debug!("dropping cover upload: {err}");
            Ok(None)
        }
    }
}

async fn discard_cover(covers: &dyn CoverStorage, cover: Option<&StoredCover>) {
    if let Some(cover) = cover {
        if let Err(err) = covers.discard(cover).await {
            tracing::warn!("{err:#}");
        }
    }
}

/// Renders `books/new` or `books/edit`, which both need every author for the
/// author selection.
async fn render_form_page<R: CatalogRepository>(
    state: &AppState<R>,
    view: &str,
    book_id: Option<i64>,
    book: &BookForm,
    error_message: Option<&str>,
) -> Page {
    let authors = match state.repo.find_authors(&AuthorFilter::default()).await {
        Ok(authors) => authors,
        Err(err) => {
            tracing::error!("{err:#}");
            return Page::redirect("/books");
        }
    };

    Page::render(
        state.renderer.as_ref(),
        view,
        json!({
            "book": book,
            "bookId": book_id,
            "authors": authors_view(&authors),
            "errorMessage": error_message,
        }),
    )
}

pub async fn list_books<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Query(query): Query<BookSearchQuery>,
) -> Page {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(err) => {
            tracing::warn!("invalid book filter: {err}");
            return Page::redirect("/");
        }
    };

    match state.repo.find_books(&filter).await {
        Ok(books) => Page::render(
            state.renderer.as_ref(),
            "books/index",
            json!({ "books": books_view(&books), "searchOptions": query }),
        ),
        Err(err) => {
            tracing::error!("{err:#}");
            Page::redirect("/")
        }
    }
}

pub async fn new_book<R: CatalogRepository>(State(state): State<AppState<R>>) -> Page {
    render_form_page(&state, "books/new", None, &BookForm::default(), None).await
}

pub async fn create_book<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Form(form): Form<BookForm>,
) -> Page {
    let details = match BookDetails::try_from(&form) {
        Ok(details) => details,
        Err(err) => {
            tracing::debug!("rejected book: {err}");
            return render_form_page(&state, "books/new", None, &form, Some(CREATE_ERROR_MESSAGE))
                .await;
        }
    };

    let cover = match attach_cover(state.covers.as_ref(), form.cover.as_deref()).await {
        Ok(cover) => cover,
        Err(err) => {
            tracing::error!("{err:#}");
            return render_form_page(&state, "books/new", None, &form, Some(CREATE_ERROR_MESSAGE))
                .await;
        }
    };

    let req = CreateBookRequest::new(details, cover);
    match state.repo.create_book(&req).await {
        Ok(book) => {
            tracing::info!(id = book.id(), "created book");
            Page::redirect(format!("/books/{}", book.id()))
        }
        Err(err) => {
            tracing::error!("{err:#}");
            discard_cover(state.covers.as_ref(), req.cover()).await;
            render_form_page(&state, "books/new", None, &form, Some(CREATE_ERROR_MESSAGE)).await
        }
    }
}

pub async fn show_book<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };

    match state
        .repo
        .find_book_with_author(&FindBookRequest::new(id))
        .await
    {
        Ok(found) => Page::render(
            state.renderer.as_ref(),
            "books/show",
            json!({
                "book": BookView::from(&found.book),
                "author": AuthorView::from(&found.author),
            }),
        ),
        Err(err) => {
            tracing::warn!("{err:#}");
            Page::redirect("/")
        }
    }
}

pub async fn edit_book<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };

    match state.repo.find_book(&FindBookRequest::new(id)).await {
        Ok(book) => {
            render_form_page(&state, "books/edit", Some(id), &BookForm::from(&book), None).await
        }
        Err(err) => {
            tracing::warn!("{err:#}");
            Page::redirect("/")
        }
    }
}

pub async fn update_book<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };
    let book = match state.repo.find_book(&FindBookRequest::new(id)).await {
        Ok(book) => book,
        Err(err) => {
            tracing::warn!("{err:#}");
            return Page::redirect("/");
        }
    };
    let id = book.id();

    let details = match BookDetails::try_from(&form) {
        Ok(details) => details,
        Err(err) => {
            tracing::debug!("rejected book update: {err}");
            return render_form_page(&state, "books/edit", Some(id), &form, Some(UPDATE_ERROR_MESSAGE))
                .await;
        }
    };

    // The previous cover is overwritten, never cleaned up.
    let cover = match attach_cover(state.covers.as_ref(), form.cover.as_deref()).await {
        Ok(cover) => cover,
        Err(err) => {
            tracing::error!("{err:#}");
            return render_form_page(&state, "books/edit", Some(id), &form, Some(UPDATE_ERROR_MESSAGE))
                .await;
        }
    };

    let req = UpdateBookRequest::new(id, details, cover);
    match state.repo.update_book(&req).await {
        Ok(book) => Page::redirect(format!("/books/{}", book.id())),
        Err(err) => {
            tracing::error!("{err:#}");
            discard_cover(state.covers.as_ref(), req.cover()).await;
            render_form_page(&state, "books/edit", Some(id), &form, Some(UPDATE_ERROR_MESSAGE)).await
        }
    }
}

pub async fn delete_book<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };
    let book = match state.repo.find_book(&FindBookRequest::new(id)).await {
        Ok(book) => book,
        Err(err) => {
            tracing::warn!("{err:#}");
            return Page::redirect("/");
        }
    };

    match state
        .repo
        .delete_book(&DeleteBookRequest::new(book.id()))
        .await
    {
        Ok(()) => {
            tracing::info!(id = book.id(), "deleted book");
            Page::redirect("/books")
        }
        Err(err) => {
            tracing::error!("{err:#}");
            Page::render(
                state.renderer.as_ref(),
                "books/show",
                json!({
                    "book": BookView::from(&book),
                    "author": null,
                    "errorMessage": DELETE_ERROR_MESSAGE,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covers::InlineCoverStorage;

    fn form() -> BookForm {
        BookForm {
            title: "Solaris".into(),
            author: "3".into(),
            publish_date: "1961-06-01".into(),
            page_count: "204".into(),
            description: "".into(),
            cover: None,
        }
    }

    #[test]
    fn form_parses_into_details() {
        let details = BookDetails::try_from(&form()).unwrap();
        assert_eq!(details.title.as_str(), "Solaris");
        assert_eq!(details.author_id, 3);
        assert_eq!(details.publish_date, NaiveDate::from_ymd_opt(1961, 6, 1).unwrap());
        assert_eq!(details.page_count, 204);
        assert_eq!(details.description, None);
    }

    #[test]
    fn form_with_bad_fields_is_rejected() {
        let mut bad = form();
        bad.page_count = "many".into();
        assert!(matches!(
            BookDetails::try_from(&bad),
            Err(ParseBookFormError::PageCount(_))
        ));

        let mut bad = form();
        bad.publish_date = "".into();
        assert!(matches!(
            BookDetails::try_from(&bad),
            Err(ParseBookFormError::PublishDate(_))
        ));

        let mut bad = form();
        bad.title = "  ".into();
        assert!(matches!(
            BookDetails::try_from(&bad),
            Err(ParseBookFormError::Title(_))
        ));
    }

    #[test]
    fn empty_date_filters_are_ignored() {
        let query = BookSearchQuery {
            title: Some(String::new()),
            published_before: Some(String::new()),
            published_after: None,
        };
        let filter = query.filter().unwrap();
        assert!(filter.title().is_none());
        assert!(filter.published_before().is_none());
        assert!(filter.published_after().is_none());
    }

    #[test]
    fn malformed_date_filter_is_an_error() {
        let query = BookSearchQuery {
            published_after: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(query.filter().is_err());
    }

    #[tokio::test]
    async fn unsupported_cover_is_dropped_silently() {
        let payload = r#"{"type":"application/pdf","data":"AQID"}"#;
        let cover = attach_cover(&InlineCoverStorage, Some(payload)).await.unwrap();
        assert_eq!(cover, None);

        let cover = attach_cover(&InlineCoverStorage, Some("")).await.unwrap();
        assert_eq!(cover, None);
    }
}
