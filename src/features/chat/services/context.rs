use crate::features::chat::models::{ChatMessage, SenderRole};
use crate::modules::llm::PromptMessage;
use crate::shared::constants::CHAT_CONTEXT_WINDOW;

/// Prompt for the model: the system prompt, then the most recent messages
/// of the conversation in chronological order.
///
/// Visitor messages become `user` turns; admin and assistant messages both
/// speak for the site and become `assistant` turns.
pub fn build_prompt(system_prompt: String, history: &[ChatMessage]) -> Vec<PromptMessage> {
    let window = CHAT_CONTEXT_WINDOW as usize;
    let recent = &history[history.len().saturating_sub(window)..];

    let mut prompt = Vec::with_capacity(recent.len() + 1);
    prompt.push(PromptMessage::system(system_prompt));
    prompt.extend(recent.iter().map(|m| match m.sender_role {
        SenderRole::User => PromptMessage::user(m.body.clone()),
        SenderRole::Admin | SenderRole::Assistant => PromptMessage::assistant(m.body.clone()),
    }));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::llm::PromptRole;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn history(roles: &[SenderRole]) -> Vec<ChatMessage> {
        let start = Utc::now();
        let conversation_id = Uuid::new_v4();
        roles
            .iter()
            .enumerate()
            .map(|(i, role)| ChatMessage {
                id: Uuid::new_v4(),
                conversation_id,
                sender_role: *role,
                sender_name: None,
                body: format!("message {}", i),
                created_at: start + Duration::seconds(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_system_prompt_comes_first() {
        let prompt = build_prompt("be nice".to_string(), &[]);
        assert_eq!(prompt, vec![PromptMessage::system("be nice")]);
    }

    #[test]
    fn test_roles_are_mapped() {
        let prompt = build_prompt(
            "sys".to_string(),
            &history(&[SenderRole::User, SenderRole::Admin, SenderRole::Assistant]),
        );
        let roles: Vec<PromptRole> = prompt.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                PromptRole::System,
                PromptRole::User,
                PromptRole::Assistant,
                PromptRole::Assistant
            ]
        );
        assert_eq!(prompt[1].content, "message 0");
    }

    #[test]
    fn test_only_last_messages_are_kept() {
        let prompt = build_prompt("sys".to_string(), &history(&[SenderRole::User; 25]));
        assert_eq!(prompt.len(), CHAT_CONTEXT_WINDOW as usize + 1);
        assert_eq!(prompt[1].content, "message 15");
        assert_eq!(prompt.last().unwrap().content, "message 24");
    }
}
