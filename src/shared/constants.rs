/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Back-office administrator, the only role that can sign in
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// CONTENT CONSTANTS
// =============================================================================

/// Reading speed used for article read-time estimates
pub const WORDS_PER_MINUTE: usize = 300;

/// Read-time estimates never exceed this many minutes
pub const MAX_READ_TIME_MINUTES: i32 = 5;

/// Length of derived article excerpts, in characters
pub const EXCERPT_LENGTH: usize = 200;

/// Number of items in the RSS feed
pub const FEED_ITEM_LIMIT: i64 = 20;

pub const DEFAULT_CATEGORY_ICON: &str = "📁";
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

// =============================================================================
// CHAT CONSTANTS
// =============================================================================

/// How many recent messages are sent to the model as conversation context
pub const CHAT_CONTEXT_WINDOW: i64 = 10;

/// Display name of the assistant persona
pub const ASSISTANT_NAME: &str = "Sarah";

// =============================================================================
// SETTING KEYS
// =============================================================================

pub const SETTING_CHAT_AUTO_REPLY: &str = "chat.auto_reply_enabled";
