use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ArticleStatsDto {
    pub total: i64,
    pub draft: i64,
    pub published: i64,
    pub archived: i64,
    pub featured: i64,
    /// Sum of views over all articles
    pub total_views: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryStatsDto {
    pub total: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CommentStatsDto {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub spam: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubscriberStatsDto {
    pub active: i64,
    pub unsubscribed: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChatStatsDto {
    pub total_conversations: i64,
    pub open_conversations: i64,
    /// Visitor messages received in the last 24 hours
    pub messages_last_24h: i64,
}

/// Back-office dashboard counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsDto {
    pub articles: ArticleStatsDto,
    pub categories: CategoryStatsDto,
    pub comments: CommentStatsDto,
    pub subscribers: SubscriberStatsDto,
    pub chat: ChatStatsDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_shape() {
        let body = serde_json::to_value(AdminStatsDto::default()).unwrap();
        for section in ["articles", "categories", "comments", "subscribers", "chat"] {
            assert!(body[section].is_object(), "{}", section);
        }
        assert_eq!(body["comments"]["pending"], 0);
        assert_eq!(body["chat"]["open_conversations"], 0);
    }
}
