use super::views::{AuthorView, authors_view, books_view};
use super::{AppState, Page, parse_id};
use crate::model::{
    AuthorFilter, AuthorName, AuthorNameEmptyError, CreateAuthorRequest, FindAuthorRequest,
    SearchPattern, UpdateAuthorRequest,
};
use crate::service;
use crate::store::CatalogRepository;
use axum::extract::{Form, Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::json;

const BOOKS_BY_AUTHOR_LIMIT: u32 = 5;

const CREATE_ERROR_MESSAGE: &str = "Error creating Author";
const UPDATE_ERROR_MESSAGE: &str = "Error updating Author";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorSearchQuery {
    name: Option<String>,
}

/// The only author field accepted from a request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
    name: String,
}

impl TryFrom<&AuthorForm> for CreateAuthorRequest {
    type Error = AuthorNameEmptyError;

    fn try_from(value: &AuthorForm) -> Result<Self, Self::Error> {
        let name = AuthorName::new(&value.name)?;
        Ok(Self::new(name))
    }
}

pub async fn list_authors<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Query(query): Query<AuthorSearchQuery>,
) -> Page {
    let filter = AuthorFilter::new(SearchPattern::new(query.name.as_deref()));
    match state.repo.find_authors(&filter).await {
        Ok(authors) => Page::render(
            state.renderer.as_ref(),
            "authors/index",
            json!({ "authors": authors_view(&authors), "searchOptions": query }),
        ),
        Err(err) => {
            tracing::error!("{err:#}");
            Page::redirect("/")
        }
    }
}

pub async fn new_author<R: CatalogRepository>(State(state): State<AppState<R>>) -> Page {
    Page::render(
        state.renderer.as_ref(),
        "authors/new",
        json!({ "author": { "name": "" } }),
    )
}

pub async fn create_author<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Form(form): Form<AuthorForm>,
) -> Page {
    let failed = || {
        Page::render(
            state.renderer.as_ref(),
            "authors/new",
            json!({ "author": { "name": form.name }, "errorMessage": CREATE_ERROR_MESSAGE }),
        )
    };

    let req = match CreateAuthorRequest::try_from(&form) {
        Ok(req) => req,
        Err(err) => {
            tracing::debug!("rejected author: {err}");
            return failed();
        }
    };

    match state.repo.create_author(&req).await {
        Ok(author) => {
            tracing::info!(id = author.id(), "created author");
            Page::redirect(format!("/authors/{}", author.id()))
        }
        Err(err) => {
            tracing::error!("{err:#}");
            failed()
        }
    }
}

pub async fn show_author<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };

    let author = match state.repo.find_author(&FindAuthorRequest::new(id)).await {
        Ok(author) => author,
        Err(err) => {
            tracing::warn!("{err:#}");
            return Page::redirect("/");
        }
    };
    let books = match state
        .repo
        .find_books_by_author(author.id(), BOOKS_BY_AUTHOR_LIMIT)
        .await
    {
        Ok(books) => books,
        Err(err) => {
            tracing::error!("{err:#}");
            return Page::redirect("/");
        }
    };

    Page::render(
        state.renderer.as_ref(),
        "authors/show",
        json!({
            "author": AuthorView::from(&author),
            "booksByAuthor": books_view(&books),
        }),
    )
}

pub async fn edit_author<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/authors");
    };

    match state.repo.find_author(&FindAuthorRequest::new(id)).await {
        Ok(author) => Page::render(
            state.renderer.as_ref(),
            "authors/edit",
            json!({ "author": AuthorView::from(&author) }),
        ),
        Err(err) => {
            tracing::warn!("{err:#}");
            Page::redirect("/authors")
        }
    }
}

pub async fn update_author<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };
    let author = match state.repo.find_author(&FindAuthorRequest::new(id)).await {
        Ok(author) => author,
        Err(err) => {
            tracing::warn!("{err:#}");
            return Page::redirect("/");
        }
    };

    let failed = || {
        Page::render(
            state.renderer.as_ref(),
            "authors/edit",
            json!({
                "author": { "id": author.id(), "name": form.name },
                "errorMessage": UPDATE_ERROR_MESSAGE,
            }),
        )
    };

    let name = match AuthorName::new(&form.name) {
        Ok(name) => name,
        Err(err) => {
            tracing::debug!("rejected author update: {err}");
            return failed();
        }
    };

    match state
        .repo
        .update_author(&UpdateAuthorRequest::new(author.id(), name))
        .await
    {
        Ok(author) => Page::redirect(format!("/authors/{}", author.id())),
        Err(err) => {
            tracing::error!("{err:#}");
            failed()
        }
    }
}

pub async fn delete_author<R: CatalogRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Page {
    let Some(id) = parse_id(&id) else {
        return Page::redirect("/");
    };
    let author = match state.repo.find_author(&FindAuthorRequest::new(id)).await {
        Ok(author) => author,
        Err(err) => {
            tracing::warn!("{err:#}");
            return Page::redirect("/");
        }
    };

    match service::delete_author(state.repo.as_ref(), &author).await {
        Ok(()) => {
            tracing::info!(id = author.id(), "deleted author");
            Page::redirect("/authors")
        }
        Err(err) => {
            tracing::warn!("{err:#}");
            Page::redirect(format!("/authors/{}", author.id()))
        }
    }
}
