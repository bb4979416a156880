//! Floating chat widget with an optional voice agent conversation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aivar_core::{SessionError, VoiceAgentConfig};

/// Delay before the modal closes after voice chat stops.
pub const MODAL_CLOSE_DELAY: Duration = Duration::from_secs(2);

// =============================================================================
// Voice Agent
// =============================================================================

/// Conversational voice agent SDK.
pub trait VoiceAgent: Send + Sync {
    /// Ask for microphone access.
    fn request_microphone(&self) -> BoxFuture<'static, Result<(), SessionError>>;

    /// Start a conversation. Returns the conversation id.
    fn start_session(
        &self,
        agent_id: String,
        dynamic_variables: BTreeMap<String, String>,
    ) -> BoxFuture<'static, Result<String, SessionError>>;

    fn end_session(&self) -> BoxFuture<'static, Result<(), SessionError>>;
}

/// Connection status reported by the agent SDK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
        }
    }
}

/// A message pushed by the agent SDK.
///
/// Two shapes are understood: `{source, message}` and
/// `{type: agent_response | transcription, text}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
}

impl AgentMessage {
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Convert into a chat entry, or `None` for messages that carry no
    /// transcript.
    pub fn to_chat(&self) -> Option<ChatMessage> {
        let source = self.source.as_deref().filter(|s| !s.is_empty());
        let message = self.message.as_deref().filter(|m| !m.is_empty());
        if let (Some(source), Some(message)) = (source, message) {
            let role = if source == "ai" { Role::Ai } else { Role::User };
            return Some(ChatMessage::new(role, message));
        }

        let role = match self.kind.as_deref() {
            Some("agent_response") => Role::Ai,
            Some("transcription") => Role::User,
            _ => return None,
        };
        Some(ChatMessage::new(role, self.text.clone().unwrap_or_default()))
    }
}

// =============================================================================
// Chat Session
// =============================================================================

pub struct ChatSession {
    agent: Arc<dyn VoiceAgent>,
    config: VoiceAgentConfig,
    voice_enabled: bool,
    history: Vec<ChatMessage>,
    modal_open: bool,
    input: String,
    voice_active: bool,
    status: VoiceStatus,
    speaking: bool,
    error: Option<String>,
    close_modal_at: Option<Duration>,
}

impl ChatSession {
    pub fn new(agent: Arc<dyn VoiceAgent>, config: VoiceAgentConfig, voice_enabled: bool) -> Self {
        Self {
            agent,
            config,
            voice_enabled,
            history: Vec::new(),
            modal_open: true,
            input: String::new(),
            voice_active: false,
            status: VoiceStatus::Disconnected,
            speaking: false,
            error: None,
            close_modal_at: None,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The history panel is shown only when open and non-empty.
    pub fn is_modal_visible(&self) -> bool {
        self.modal_open && !self.history.is_empty()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_voice_active(&self) -> bool {
        self.voice_active
    }

    pub fn status(&self) -> VoiceStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Enter in the text box.
    pub fn submit(&mut self) {
        if self.input.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.input);
        self.history.push(ChatMessage::new(Role::User, content));
        self.modal_open = true;
    }

    /// Clear everything and hang up.
    pub async fn erase(&mut self) {
        self.history.clear();
        self.modal_open = false;
        self.input.clear();
        if self.voice_active {
            self.end_voice().await;
        }
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    /// Microphone button. Start failures are shown as error text.
    pub async fn toggle_voice(&mut self, now: Duration) {
        if !self.voice_enabled || self.status == VoiceStatus::Connecting {
            return;
        }

        if self.voice_active {
            self.end_voice().await;
            self.close_modal_at = Some(now + MODAL_CLOSE_DELAY);
            return;
        }

        self.status = VoiceStatus::Connecting;
        match self.start_voice().await {
            Ok(conversation_id) => {
                tracing::info!("Voice conversation started: {}", conversation_id);
                self.voice_active = true;
                self.status = VoiceStatus::Connected;
                self.modal_open = true;
                self.error = None;
                self.close_modal_at = None;
            }
            Err(e) => {
                tracing::error!("Error starting voice chat: {}", e);
                self.error = Some(format!("Failed to start voice chat: {}", e));
                self.voice_active = false;
                self.status = VoiceStatus::Disconnected;
            }
        }
    }

    async fn start_voice(&self) -> Result<String, SessionError> {
        if self.config.agent_id.is_empty() {
            return Err(SessionError::MissingAgentId);
        }
        self.agent.request_microphone().await?;

        tracing::debug!("Starting session with {:?}", self.config.dynamic_variables);
        self.agent
            .start_session(
                self.config.agent_id.clone(),
                self.config.dynamic_variables.clone(),
            )
            .await
    }

    async fn end_voice(&mut self) {
        if let Err(e) = self.agent.end_session().await {
            tracing::warn!("Failed to end voice session: {}", e);
        }
        self.voice_active = false;
        self.status = VoiceStatus::Disconnected;
    }

    pub fn on_connect(&mut self) {
        tracing::info!("Connected to voice agent");
        self.status = VoiceStatus::Connected;
        self.error = None;
    }

    pub fn on_disconnect(&mut self) {
        tracing::info!("Disconnected from voice agent");
        self.status = VoiceStatus::Disconnected;
        self.voice_active = false;
        self.speaking = false;
    }

    pub fn on_message(&mut self, message: &AgentMessage) {
        if let Some(chat) = message.to_chat() {
            self.history.push(chat);
            self.modal_open = true;
        }
    }

    pub fn on_mode_change(&mut self, speaking: bool) {
        self.speaking = speaking;
    }

    pub fn on_error(&mut self, message: Option<&str>) {
        let message = message.filter(|m| !m.is_empty()).unwrap_or("Unknown error");
        tracing::error!("Error during conversation: {}", message);
        self.error = Some(format!("Voice chat error: {}", message));
        self.voice_active = false;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Run the delayed modal close once due.
    pub fn tick(&mut self, now: Duration) {
        let Some(at) = self.close_modal_at else {
            return;
        };
        if now < at {
            return;
        }
        self.close_modal_at = None;
        if !self.voice_active {
            self.modal_open = false;
        }
    }
}

// =============================================================================
// Mock Agent for Testing
// =============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;

    /// Records calls and answers with canned results.
    #[derive(Default)]
    pub struct MockVoiceAgent {
        pub microphone_error: Option<SessionError>,
        pub start_error: Option<SessionError>,
        pub started: Arc<Mutex<Vec<(String, BTreeMap<String, String>)>>>,
        pub ended: Arc<Mutex<usize>>,
    }

    impl MockVoiceAgent {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_microphone_error(mut self, error: SessionError) -> Self {
            self.microphone_error = Some(error);
            self
        }

        pub fn with_start_error(mut self, error: SessionError) -> Self {
            self.start_error = Some(error);
            self
        }
    }

    impl VoiceAgent for MockVoiceAgent {
        fn request_microphone(&self) -> BoxFuture<'static, Result<(), SessionError>> {
            let result = self.microphone_error.clone().map_or(Ok(()), Err);
            Box::pin(async move { result })
        }

        fn start_session(
            &self,
            agent_id: String,
            dynamic_variables: BTreeMap<String, String>,
        ) -> BoxFuture<'static, Result<String, SessionError>> {
            let started = self.started.clone();
            let error = self.start_error.clone();
            Box::pin(async move {
                if let Some(error) = error {
                    return Err(error);
                }
                started.lock().push((agent_id, dynamic_variables));
                Ok("conv-1".to_string())
            })
        }

        fn end_session(&self) -> BoxFuture<'static, Result<(), SessionError>> {
            let ended = self.ended.clone();
            Box::pin(async move {
                *ended.lock() += 1;
                Ok(())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn config() -> VoiceAgentConfig {
        VoiceAgentConfig {
            agent_id: "agent-123".to_string(),
            ..VoiceAgentConfig::default()
        }
    }

    fn session(agent: MockVoiceAgent) -> (ChatSession, Arc<MockVoiceAgent>) {
        let agent = Arc::new(agent);
        (ChatSession::new(agent.clone(), config(), true), agent)
    }

    #[test]
    fn test_submit() {
        let (mut chat, _) = session(MockVoiceAgent::new());
        chat.submit();
        assert!(chat.history().is_empty());

        chat.set_input("ciao");
        chat.submit();
        assert_eq!(chat.history().len(), 1);
        assert_eq!(chat.history()[0].role, Role::User);
        assert_eq!(chat.history()[0].content, "ciao");
        assert_eq!(chat.input(), "");
        assert!(chat.is_modal_visible());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::new(Role::User, "x");
        let b = ChatMessage::new(Role::User, "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_agent_message_shapes() {
        let source = AgentMessage::from_value(serde_json::json!({"source": "ai", "message": "Ciao!"}))
            .unwrap()
            .to_chat()
            .unwrap();
        assert_eq!((source.role, source.content.as_str()), (Role::Ai, "Ciao!"));

        let user = AgentMessage::from_value(serde_json::json!({"source": "user", "message": "hi"}))
            .unwrap()
            .to_chat()
            .unwrap();
        assert_eq!(user.role, Role::User);

        let transcript =
            AgentMessage::from_value(serde_json::json!({"type": "transcription", "text": "hello"}))
                .unwrap()
                .to_chat()
                .unwrap();
        assert_eq!((transcript.role, transcript.content.as_str()), (Role::User, "hello"));

        let empty = AgentMessage::from_value(serde_json::json!({"type": "agent_response"}))
            .unwrap()
            .to_chat()
            .unwrap();
        assert_eq!((empty.role, empty.content.as_str()), (Role::Ai, ""));

        let ping = AgentMessage::from_value(serde_json::json!({"type": "ping"})).unwrap();
        assert!(ping.to_chat().is_none());
    }

    #[tokio::test]
    async fn test_start_voice() {
        let (mut chat, agent) = session(MockVoiceAgent::new());
        chat.close_modal();

        chat.toggle_voice(ms(0)).await;
        assert!(chat.is_voice_active());
        assert!(chat.error().is_none());

        let started = agent.started.lock();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].0, "agent-123");
        assert_eq!(started[0].1["nome_utente"], "Utente");
    }

    #[tokio::test]
    async fn test_start_without_agent_id() {
        let agent = Arc::new(MockVoiceAgent::new());
        let mut chat = ChatSession::new(agent.clone(), VoiceAgentConfig::default(), true);
        chat.toggle_voice(ms(0)).await;

        assert!(!chat.is_voice_active());
        assert_eq!(chat.status(), VoiceStatus::Disconnected);
        assert!(chat
            .error()
            .unwrap()
            .starts_with("Failed to start voice chat: "));
        assert!(agent.started.lock().is_empty());
    }

    #[tokio::test]
    async fn test_start_without_microphone() {
        let (mut chat, agent) = session(
            MockVoiceAgent::new()
                .with_microphone_error(SessionError::Microphone("permission denied".into())),
        );
        chat.toggle_voice(ms(0)).await;

        assert_eq!(
            chat.error(),
            Some("Failed to start voice chat: Microphone unavailable: permission denied")
        );
        assert!(agent.started.lock().is_empty());
    }

    #[tokio::test]
    async fn test_start_session_error() {
        let (mut chat, _) =
            session(MockVoiceAgent::new().with_start_error(SessionError::Voice("quota".into())));
        chat.toggle_voice(ms(0)).await;
        assert_eq!(chat.error(), Some("Failed to start voice chat: quota"));
        assert!(!chat.is_voice_active());
    }

    #[tokio::test]
    async fn test_stop_closes_modal_later() {
        let (mut chat, agent) = session(MockVoiceAgent::new());
        chat.toggle_voice(ms(0)).await;
        chat.on_connect();
        chat.on_message(&AgentMessage {
            source: Some("ai".into()),
            message: Some("Ciao".into()),
            ..AgentMessage::default()
        });

        chat.toggle_voice(ms(5000)).await;
        assert!(!chat.is_voice_active());
        assert_eq!(*agent.ended.lock(), 1);

        chat.tick(ms(6999));
        assert!(chat.is_modal_visible());
        chat.tick(ms(7000));
        assert!(!chat.is_modal_visible());
    }

    #[tokio::test]
    async fn test_restart_cancels_pending_close() {
        let (mut chat, _) = session(MockVoiceAgent::new());
        chat.set_input("x");
        chat.submit();
        chat.toggle_voice(ms(0)).await;
        chat.toggle_voice(ms(100)).await;
        chat.toggle_voice(ms(500)).await;

        chat.tick(ms(3000));
        assert!(chat.is_voice_active());
        assert!(chat.is_modal_visible());
    }

    #[tokio::test]
    async fn test_voice_disabled_is_noop() {
        let agent = Arc::new(MockVoiceAgent::new());
        let mut chat = ChatSession::new(agent.clone(), config(), false);
        chat.toggle_voice(ms(0)).await;
        assert!(!chat.is_voice_active());
        assert!(chat.error().is_none());
        assert!(agent.started.lock().is_empty());
    }

    #[tokio::test]
    async fn test_erase_ends_voice() {
        let (mut chat, agent) = session(MockVoiceAgent::new());
        chat.set_input("ciao");
        chat.submit();
        chat.toggle_voice(ms(0)).await;
        chat.set_input("draft");

        chat.erase().await;
        assert!(chat.history().is_empty());
        assert_eq!(chat.input(), "");
        assert!(!chat.is_voice_active());
        assert!(!chat.is_modal_visible());
        assert_eq!(*agent.ended.lock(), 1);
    }

    #[test]
    fn test_agent_callbacks() {
        let (mut chat, _) = session(MockVoiceAgent::new());
        chat.on_connect();
        assert_eq!(chat.status(), VoiceStatus::Connected);

        chat.on_mode_change(true);
        assert!(chat.is_speaking());

        chat.on_error(Some("socket closed"));
        assert_eq!(chat.error(), Some("Voice chat error: socket closed"));
        chat.on_error(None);
        assert_eq!(chat.error(), Some("Voice chat error: Unknown error"));
        chat.dismiss_error();
        assert!(chat.error().is_none());

        chat.on_disconnect();
        assert_eq!(chat.status(), VoiceStatus::Disconnected);
        assert!(!chat.is_speaking());
    }
}
