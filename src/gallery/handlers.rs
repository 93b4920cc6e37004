//! Serves the single-page gallery client

use axum::response::Html;

const INDEX_HTML: &str = include_str!("index.html");

/// GET / - The gallery page: generation form, thumbnail grid and enlarged
/// view, all driven by the JSON API.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
