mod analytics;
mod document;
mod escalation;
mod feedback;
mod message;
mod profile;
mod session;

pub use analytics::{
    parse_date, ConversationLog, Sentiment, SentimentCounts, SessionLogReport, Timeframe,
    UsageTrendPoint, DEFAULT_CATEGORIES,
};
pub use document::{
    content_type_for, format_size, Document, DocumentContent, DocumentList, DocumentUpload,
    PresignedUpload, PresignedUrlRequest,
};
pub use escalation::{
    EscalatedQuery, EscalatedQueryList, EscalationSummary, QueryStatus, StatusUpdate,
};
pub use feedback::{Feedback, FeedbackKind};
pub use message::{unique_sources, Citation, Message, MessageStatus, Sender, SourceReference};
pub use profile::{Language, ProfileUpdate, Recommendation, RecommendationList, UserProfile, UserRole};
pub use session::ChatSession;
