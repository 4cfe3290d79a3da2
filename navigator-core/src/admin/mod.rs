mod client;
mod documents;
mod escalations;
mod profile;
mod session_logs;

pub use client::AdminClient;
pub use session_logs::TREND_DAYS;
