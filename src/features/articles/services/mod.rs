mod article_service;
mod feed_service;

pub use article_service::{next_available_slug, ArticleService};
pub use feed_service::{FeedChannel, FeedService};
