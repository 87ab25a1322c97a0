use super::views::books_view;
use super::{AppState, Page};
use crate::store::CatalogRepository;
use axum::extract::State;
use serde_json::json;

const RECENT_BOOKS_LIMIT: u32 = 10;

pub async fn index<R: CatalogRepository>(State(state): State<AppState<R>>) -> Page {
    let books = match state.repo.find_recent_books(RECENT_BOOKS_LIMIT).await {
        Ok(books) => books,
        Err(err) => {
            tracing::error!("{err:#}");
            Vec::new()
        }
    };

    Page::render(
        state.renderer.as_ref(),
        "index",
        json!({ "books": books_view(&books) }),
    )
}
