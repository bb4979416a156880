//! External collaborators of the AIVAR landing site.
//!
//! Each service sits behind a trait ([`IdentityProvider`], [`VoiceAgent`],
//! [`SceneSource`]) supplied by the host. Failures are caught here and turned
//! into state the page can render; none of them reach row navigation.

mod auth;
mod chat;
mod scene;

pub use auth::{
    AuthEvent, AuthService, AuthState, AuthStore, CallbackFlow, CallbackState, IdentityProvider,
    User, CALLBACK_FAILED, HOME_ROUTE,
};
pub use chat::{
    AgentMessage, ChatMessage, ChatSession, Role, VoiceAgent, VoiceStatus, MODAL_CLOSE_DELAY,
};
pub use scene::{FpsSample, FrameRateMonitor, SceneLoader, SceneSource, SceneState, SCENE_FALLBACK};
