mod article_handler;
mod feed_handler;

pub use article_handler::*;
pub use feed_handler::*;
