mod gate;
mod provider;
mod store;
mod tokens;

pub use gate::{AuthGate, AuthStatus, GUEST_TOKEN};
pub use provider::{
    provider_from_config, CognitoProvider, IdentityProvider, UnconfiguredProvider,
    NEW_PASSWORD_REQUIRED,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
pub use tokens::{AuthTokens, NewPasswordChallenge, SignInOutcome};
