use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::articles::{
    dtos as articles_dtos, handlers as articles_handlers, models as articles_models,
};
use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::chat::{dtos as chat_dtos, handlers as chat_handlers, models as chat_models};
use crate::features::comments::{
    dtos as comments_dtos, handlers as comments_handlers, models as comments_models,
};
use crate::features::contact::{dtos as contact_dtos, handlers as contact_handlers};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::features::subscribers::{
    dtos as subscribers_dtos, handlers as subscribers_handlers, models as subscribers_models,
};
use crate::features::uploads::{dtos as uploads_dtos, handlers as uploads_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::get_me,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::admin_list_categories,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Articles
        articles_handlers::list_articles,
        articles_handlers::get_article,
        articles_handlers::rss_feed,
        articles_handlers::admin_list_articles,
        articles_handlers::admin_get_article,
        articles_handlers::create_article,
        articles_handlers::update_article,
        articles_handlers::delete_article,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::admin_list_comments,
        comments_handlers::update_comment_status,
        comments_handlers::delete_comment,
        // Newsletter
        subscribers_handlers::subscribe,
        subscribers_handlers::subscriber_count,
        subscribers_handlers::unsubscribe,
        subscribers_handlers::admin_list_subscribers,
        subscribers_handlers::update_subscriber_status,
        subscribers_handlers::delete_subscriber,
        // Contact
        contact_handlers::send_contact,
        // Uploads
        uploads_handlers::upload_image,
        uploads_handlers::delete_upload,
        uploads_handlers::serve_upload,
        // Chat
        chat_handlers::post_visitor_message,
        chat_handlers::get_session_messages,
        chat_handlers::list_conversations,
        chat_handlers::get_conversation_messages,
        chat_handlers::post_admin_message,
        chat_handlers::suggest_reply,
        chat_handlers::update_conversation_status,
        chat_handlers::get_chat_status,
        chat_handlers::get_auto_reply,
        chat_handlers::set_auto_reply,
        // Settings
        settings_handlers::list_settings,
        // Admin
        admin_handlers::get_stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedAdmin,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Articles
            articles_models::ArticleStatus,
            articles_models::FeaturedImage,
            articles_dtos::ArticleCategoryDto,
            articles_dtos::ArticleSummaryDto,
            articles_dtos::ArticleResponseDto,
            articles_dtos::CreateArticleDto,
            articles_dtos::UpdateArticleDto,
            articles_dtos::DeleteArticleResponseDto,
            ApiResponse<Vec<articles_dtos::ArticleSummaryDto>>,
            ApiResponse<articles_dtos::ArticleResponseDto>,
            ApiResponse<articles_dtos::DeleteArticleResponseDto>,
            // Comments
            comments_models::CommentStatus,
            comments_dtos::CommentResponseDto,
            comments_dtos::AdminCommentDto,
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentStatusDto,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::AdminCommentDto>>,
            ApiResponse<comments_dtos::AdminCommentDto>,
            // Newsletter
            subscribers_models::SubscriberStatus,
            subscribers_dtos::SubscriberResponseDto,
            subscribers_dtos::SubscribeDto,
            subscribers_dtos::UnsubscribeDto,
            subscribers_dtos::SubscriberCountDto,
            subscribers_dtos::UpdateSubscriberStatusDto,
            ApiResponse<subscribers_dtos::SubscriberResponseDto>,
            ApiResponse<Vec<subscribers_dtos::SubscriberResponseDto>>,
            ApiResponse<subscribers_dtos::SubscriberCountDto>,
            // Contact
            contact_dtos::ContactRequestDto,
            // Uploads
            uploads_dtos::UploadFileDto,
            uploads_dtos::UploadResponseDto,
            uploads_dtos::DeleteUploadResponseDto,
            ApiResponse<uploads_dtos::UploadResponseDto>,
            ApiResponse<uploads_dtos::DeleteUploadResponseDto>,
            // Chat
            chat_models::ConversationStatus,
            chat_models::SenderRole,
            chat_dtos::VisitorMessageDto,
            chat_dtos::AdminMessageDto,
            chat_dtos::ChatMessageDto,
            chat_dtos::ConversationDto,
            chat_dtos::ConversationSummaryDto,
            chat_dtos::VisitorMessageResponseDto,
            chat_dtos::UpdateConversationStatusDto,
            chat_dtos::SuggestionDto,
            chat_dtos::ChatStatusDto,
            chat_dtos::AutoReplyDto,
            ApiResponse<chat_dtos::VisitorMessageResponseDto>,
            ApiResponse<Vec<chat_dtos::ChatMessageDto>>,
            ApiResponse<chat_dtos::ChatMessageDto>,
            ApiResponse<Vec<chat_dtos::ConversationSummaryDto>>,
            ApiResponse<chat_dtos::ConversationDto>,
            ApiResponse<chat_dtos::SuggestionDto>,
            ApiResponse<chat_dtos::ChatStatusDto>,
            ApiResponse<chat_dtos::AutoReplyDto>,
            // Settings
            settings_dtos::SettingResponseDto,
            ApiResponse<Vec<settings_dtos::SettingResponseDto>>,
            // Admin
            admin_dtos::ArticleStatsDto,
            admin_dtos::CategoryStatsDto,
            admin_dtos::CommentStatsDto,
            admin_dtos::SubscriberStatsDto,
            admin_dtos::ChatStatsDto,
            admin_dtos::AdminStatsDto,
            ApiResponse<admin_dtos::AdminStatsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Back-office sign-in"),
        (name = "categories", description = "Article categories"),
        (name = "articles", description = "Blog articles and RSS feed"),
        (name = "comments", description = "Reader comments and moderation"),
        (name = "newsletter", description = "Newsletter subscriptions"),
        (name = "contact", description = "Contact form"),
        (name = "uploads", description = "Image uploads"),
        (name = "chat", description = "Support chat and assistant"),
        (name = "settings", description = "Runtime settings (admin only)"),
        (name = "admin", description = "Back-office dashboard (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "API documentation for the blog backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/articles",
            "/rss.xml",
            "/api/chat/messages",
            "/api/admin/chat/auto-reply",
            "/api/admin/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Mad2Moi".to_string(),
            version: "1.2.3".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Mad2Moi");
        assert_eq!(doc.info.version, "1.2.3");
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
