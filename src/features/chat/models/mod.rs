mod conversation;

pub use conversation::{
    ChatMessage, Conversation, ConversationStatus, ConversationSummary, SenderRole,
};
