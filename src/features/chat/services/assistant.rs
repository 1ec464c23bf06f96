use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::chat::models::{ChatMessage, SenderRole};
use crate::features::chat::services::context::build_prompt;
use crate::features::chat::services::ChatService;
use crate::modules::llm::ChatCompletion;
use crate::shared::constants::{ASSISTANT_NAME, CHAT_CONTEXT_WINDOW, SETTING_CHAT_AUTO_REPLY};
use crate::shared::templates::render_chat_system_prompt;

impl ChatService {
    pub fn llm_available(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn auto_reply_enabled(&self) -> Result<bool> {
        self.settings.get_bool(SETTING_CHAT_AUTO_REPLY, true).await
    }

    pub async fn set_auto_reply(&self, enabled: bool, updated_by: &str) -> Result<bool> {
        self.settings
            .set_bool(SETTING_CHAT_AUTO_REPLY, enabled, updated_by)
            .await?;
        tracing::info!(enabled, by = updated_by, "Chat auto-reply toggled");
        Ok(enabled)
    }

    fn model(&self) -> Result<&Arc<dyn ChatCompletion>> {
        self.llm.as_ref().ok_or_else(|| {
            AppError::ExternalServiceError("No language model is configured".to_string())
        })
    }

    /// Ask the model for the next site-side message of a conversation
    async fn draft(&self, conversation_id: Uuid) -> Result<String> {
        let model = self.model()?;
        let conversation = self.get_conversation(conversation_id).await?;
        let history = self
            .recent_messages(conversation_id, CHAT_CONTEXT_WINDOW)
            .await?;

        let system_prompt =
            render_chat_system_prompt(&self.site_title, conversation.visitor_name.as_deref())
                .map_err(|e| AppError::Internal(format!("Failed to render chat prompt: {}", e)))?;

        let reply = model
            .complete(&build_prompt(system_prompt, &history))
            .await
            .map_err(|e| {
                tracing::warn!(conversation = %conversation_id, "Model call failed: {}", e);
                AppError::ExternalServiceError(e.to_string())
            })?;

        Ok(reply.trim().to_string())
    }

    /// Draft a reply for the back-office without storing it
    pub async fn suggest(&self, conversation_id: Uuid) -> Result<String> {
        self.draft(conversation_id).await
    }

    /// Answer the visitor as the assistant.
    ///
    /// Returns `None` when auto-reply is off (checked before the model call
    /// and again before storing) or when someone answered in the meantime.
    pub async fn auto_reply(&self, conversation_id: Uuid) -> Result<Option<ChatMessage>> {
        if !self.llm_available() || !self.auto_reply_enabled().await? {
            return Ok(None);
        }

        let reply = self.draft(conversation_id).await?;
        if reply.is_empty() {
            return Ok(None);
        }

        if !self.auto_reply_enabled().await? {
            tracing::debug!(conversation = %conversation_id, "Auto-reply disabled while drafting");
            return Ok(None);
        }

        let message = self
            .answer_visitor(conversation_id, SenderRole::Assistant, ASSISTANT_NAME, &reply)
            .await?;
        match &message {
            Some(_) => tracing::info!(conversation = %conversation_id, "Assistant replied"),
            None => tracing::debug!(conversation = %conversation_id, "Visitor already answered"),
        }
        Ok(message)
    }

    /// Run `auto_reply` in the background; failures are only logged
    pub fn spawn_auto_reply(self: &Arc<Self>, conversation_id: Uuid) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.auto_reply(conversation_id).await {
                tracing::warn!(conversation = %conversation_id, "Auto-reply failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chat::dtos::VisitorMessageDto;
    use crate::features::settings::services::SettingsService;
    use crate::modules::llm::testing::ScriptedModel;
    use sqlx::PgPool;

    fn service(pool: PgPool, model: Arc<ScriptedModel>) -> Arc<ChatService> {
        let settings = Arc::new(SettingsService::new(pool.clone()));
        Arc::new(ChatService::new(
            pool,
            settings,
            Some(model as Arc<dyn ChatCompletion>),
            "Mad2Moi".to_string(),
        ))
    }

    async fn visitor_says(service: &ChatService, session_id: &str, message: &str) -> Uuid {
        let (conversation, _) = service
            .post_visitor_message(VisitorMessageDto {
                session_id: session_id.to_string(),
                message: message.to_string(),
                visitor_name: Some("Awa".to_string()),
                visitor_email: None,
            })
            .await
            .unwrap();
        conversation.id
    }

    async fn assistant_replies(service: &ChatService, id: Uuid) -> usize {
        service
            .messages(id, None)
            .await
            .unwrap()
            .iter()
            .filter(|m| m.sender_role == SenderRole::Assistant)
            .count()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_auto_reply_answers_visitor_once(pool: PgPool) {
        let model = Arc::new(ScriptedModel::replying("  Bonjour, je suis Sarah.  "));
        let service = service(pool, model.clone());
        let id = visitor_says(&service, "s-1", "Bonjour").await;

        let reply = service.auto_reply(id).await.unwrap().unwrap();
        assert_eq!(reply.sender_role, SenderRole::Assistant);
        assert_eq!(reply.sender_name.as_deref(), Some(ASSISTANT_NAME));
        assert_eq!(reply.body, "Bonjour, je suis Sarah.");

        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert_eq!(prompt.last().unwrap().content, "Bonjour");

        assert!(service.auto_reply(id).await.unwrap().is_none());
        assert_eq!(assistant_replies(&service, id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_auto_reply_skipped_after_admin_answer(pool: PgPool) {
        let service = service(pool, Arc::new(ScriptedModel::replying("Bonjour")));
        let id = visitor_says(&service, "s-1", "Bonjour").await;
        service
            .add_message(id, SenderRole::Admin, "admin", "Je regarde")
            .await
            .unwrap();

        assert!(service.auto_reply(id).await.unwrap().is_none());
        assert_eq!(assistant_replies(&service, id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_auto_reply_disabled_skips_model(pool: PgPool) {
        let model = Arc::new(ScriptedModel::replying("Bonjour"));
        let service = service(pool, model.clone());
        service.set_auto_reply(false, "admin").await.unwrap();
        assert!(!service.auto_reply_enabled().await.unwrap());

        let id = visitor_says(&service, "s-1", "Bonjour").await;
        assert!(service.auto_reply(id).await.unwrap().is_none());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_burst_of_visitor_messages_gets_one_answer(pool: PgPool) {
        let service = service(pool, Arc::new(ScriptedModel::replying("Bonjour")));

        for round in 0..5 {
            let session = format!("burst-{}", round);
            let id = visitor_says(&service, &session, "Bonjour").await;
            visitor_says(&service, &session, "Vous etes la ?").await;

            let (first, second) = tokio::join!(service.auto_reply(id), service.auto_reply(id));
            let stored = [first.unwrap(), second.unwrap()]
                .iter()
                .filter(|r| r.is_some())
                .count();

            assert_eq!(stored, 1, "round {}", round);
            assert_eq!(assistant_replies(&service, id).await, 1, "round {}", round);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_model_failure_stores_nothing(pool: PgPool) {
        let service = service(pool, Arc::new(ScriptedModel::failing("quota exceeded")));
        let id = visitor_says(&service, "s-1", "Bonjour").await;

        assert!(matches!(
            service.auto_reply(id).await,
            Err(AppError::ExternalServiceError(_))
        ));
        assert!(matches!(
            service.suggest(id).await,
            Err(AppError::ExternalServiceError(_))
        ));
        assert_eq!(assistant_replies(&service, id).await, 0);
    }
}
