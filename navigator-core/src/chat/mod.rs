mod client;
mod prompts;
mod protocol;
mod transcript;

pub use client::{ChatClient, ChatObserver, ChatReply, NoopObserver};
pub use prompts::{
    prompt_by_index, sample_queries, suggested_prompts, SampleQueryCategory, SuggestedPrompt,
};
pub use protocol::{InboundFrame, OutboundEnvelope, SEND_MESSAGE_ACTION};
pub use transcript::{
    FailureKind, FrameOutcome, SharedTranscript, Transcript, PARSE_ERROR_TEXT, SOCKET_ERROR_TEXT,
};
