use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse};

use crate::core::error::Result;
use crate::features::articles::services::FeedService;

/// RSS 2.0 feed of the latest published articles
#[utoipa::path(
    get,
    path = "/rss.xml",
    responses(
        (status = 200, description = "RSS document", content_type = "application/rss+xml", body = String),
    ),
    tag = "articles"
)]
pub async fn rss_feed(State(feed): State<Arc<FeedService>>) -> Result<impl IntoResponse> {
    let xml = feed.rss().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=600"),
        ],
        xml,
    ))
}
