use axum::response::Html;

use crate::api::error::ApiError;

const INDEX: &str = include_str!("../../templates/index.html");

pub async fn home() -> Html<&'static str> {
    Html(INDEX)
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
