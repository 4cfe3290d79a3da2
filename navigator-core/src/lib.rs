pub mod admin;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod feedback;
pub mod models;

pub use admin::{AdminClient, TREND_DAYS};
pub use auth::{
    provider_from_config, AuthGate, AuthStatus, AuthTokens, CognitoProvider, FileSessionStore,
    IdentityProvider, MemorySessionStore, NewPasswordChallenge, SessionStore, SignInOutcome,
    StoredSession, UnconfiguredProvider, GUEST_TOKEN,
};
pub use chat::{
    suggested_prompts, ChatClient, ChatObserver, ChatReply, FailureKind, InboundFrame,
    NoopObserver, OutboundEnvelope, SharedTranscript, SuggestedPrompt, Transcript,
    PARSE_ERROR_TEXT, SOCKET_ERROR_TEXT,
};
pub use config::{
    ensure_config_dir, get_config_dir, ApiConfig, AuthConfig, ChatConfig, LoggingConfig,
    NavigatorConfig,
};
pub use error::{CliErrorDisplay, NavigatorError, NavigatorResult, NO_TOKEN_MESSAGE};
pub use feedback::FeedbackClient;
pub use models::{
    ChatSession, Citation, ConversationLog, Document, EscalatedQuery, EscalatedQueryList,
    Feedback, FeedbackKind, Language, Message, MessageStatus, QueryStatus, Sender,
    SessionLogReport, Sentiment, SourceReference, Timeframe, UsageTrendPoint, UserProfile,
    UserRole,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
