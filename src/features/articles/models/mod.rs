mod article;

pub use article::{Article, ArticleRow, ArticleStatus, FeaturedImage};
