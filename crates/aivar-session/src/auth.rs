//! SSO sign-in at the identity provider boundary.
//!
//! The OIDC protocol itself lives behind [`IdentityProvider`]. This module
//! keeps the signed-in [`User`], reacts to provider events, and exposes the
//! observable [`AuthState`] used by the login button and the callback page.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

use aivar_core::{SessionError, SsoSettings};

// =============================================================================
// User
// =============================================================================

/// A signed-in user as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub profile: Map<String, Value>,
    /// Access token expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl User {
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_secs)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Identity Provider
// =============================================================================

/// OIDC user manager.
///
/// Returns futures so callers can drive them on any executor.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// User persisted from a previous session, if any.
    fn stored_user(&self) -> BoxFuture<'static, Result<Option<User>, SessionError>>;

    /// Navigate to the provider's sign-in page.
    fn signin_redirect(&self) -> BoxFuture<'static, Result<(), SessionError>>;

    /// Complete sign-in from the redirect URL.
    fn signin_redirect_callback(&self, url: String)
        -> BoxFuture<'static, Result<User, SessionError>>;

    /// Navigate to the provider's sign-out page.
    fn signout_redirect(&self) -> BoxFuture<'static, Result<(), SessionError>>;

    /// Renew tokens without user interaction.
    fn signin_silent(&self) -> BoxFuture<'static, Result<User, SessionError>>;
}

/// Events emitted by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    UserLoaded(User),
    UserUnloaded,
    AccessTokenExpiring,
    AccessTokenExpired,
    SilentRenewError(String),
    UserSignedOut,
}

// =============================================================================
// Auth Service
// =============================================================================

/// Holds the current user on top of an [`IdentityProvider`].
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    settings: SsoSettings,
    user: RwLock<Option<User>>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, settings: SsoSettings) -> Self {
        Self {
            provider,
            settings,
            user: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &SsoSettings {
        &self.settings
    }

    /// Restore a stored, unexpired user. Failures are logged only.
    pub async fn initialize(&self) {
        match self.provider.stored_user().await {
            Ok(Some(user)) if !user.is_expired() => {
                tracing::info!("User restored from storage");
                *self.user.write() = Some(user);
            }
            Ok(Some(_)) => tracing::debug!("Stored user expired, ignoring"),
            Ok(None) => {}
            Err(e) => tracing::error!("Error initializing auth service: {}", e),
        }
    }

    pub async fn signin(&self) -> Result<(), SessionError> {
        self.provider.signin_redirect().await.inspect_err(|e| {
            tracing::error!("Signin error: {}", e);
        })
    }

    /// Complete the redirect flow and keep the returned user.
    pub async fn handle_callback(&self, url: &str) -> Result<User, SessionError> {
        let user = self
            .provider
            .signin_redirect_callback(url.to_string())
            .await
            .inspect_err(|e| tracing::error!("Signin redirect callback error: {}", e))?;
        *self.user.write() = Some(user.clone());
        Ok(user)
    }

    pub async fn signout(&self) -> Result<(), SessionError> {
        self.provider
            .signout_redirect()
            .await
            .inspect_err(|e| tracing::error!("Signout error: {}", e))?;
        *self.user.write() = None;
        Ok(())
    }

    /// Silent renew. Failure yields `None` and keeps the current user.
    pub async fn signin_silent(&self) -> Option<User> {
        match self.provider.signin_silent().await {
            Ok(user) => {
                *self.user.write() = Some(user.clone());
                Some(user)
            }
            Err(e) => {
                tracing::error!("Silent signin error: {}", e);
                None
            }
        }
    }

    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::UserLoaded(user) => {
                tracing::info!("User loaded");
                *self.user.write() = Some(user);
            }
            AuthEvent::UserUnloaded => {
                tracing::info!("User unloaded");
                *self.user.write() = None;
            }
            AuthEvent::AccessTokenExpiring => tracing::info!("Access token expiring"),
            AuthEvent::AccessTokenExpired => {
                tracing::info!("Access token expired");
                self.signin_silent().await;
            }
            AuthEvent::SilentRenewError(message) => {
                tracing::error!("Silent renew error: {}", message);
            }
            AuthEvent::UserSignedOut => {
                tracing::info!("User signed out");
                *self.user.write() = None;
            }
        }
    }

    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().as_ref().is_some_and(|u| !u.is_expired())
    }

    pub fn access_token(&self) -> Option<String> {
        self.user.read().as_ref().map(|u| u.access_token.clone())
    }

    pub fn id_token(&self) -> Option<String> {
        self.user.read().as_ref().and_then(|u| u.id_token.clone())
    }

    pub fn profile(&self) -> Option<Map<String, Value>> {
        self.user.read().as_ref().map(|u| u.profile.clone())
    }
}

// =============================================================================
// Auth Store
// =============================================================================

/// Observable sign-in state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

/// Wraps [`AuthService`] with a watch channel. Every mutation notifies
/// subscribers.
pub struct AuthStore {
    service: Arc<AuthService>,
    tx: watch::Sender<AuthState>,
}

impl AuthStore {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self {
            service,
            tx: watch::channel(AuthState::default()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.tx.send_modify(|state| {
            state.is_authenticated = user.as_ref().is_some_and(|u| !u.is_expired());
            state.user = user;
        });
    }

    pub async fn initialize(&self) {
        self.start_loading();
        self.service.initialize().await;
        let user = self.service.user();
        self.tx.send_modify(|state| {
            state.is_authenticated = user.as_ref().is_some_and(|u| !u.is_expired());
            state.user = user;
            state.is_loading = false;
        });
    }

    /// Start the sign-in redirect. Loading stays set on success since the
    /// page is about to navigate away.
    pub async fn login(&self) -> Result<(), SessionError> {
        self.start_loading();
        self.service
            .signin()
            .await
            .inspect_err(|e| self.fail(e))
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.start_loading();
        self.service.signout().await.inspect_err(|e| self.fail(e))?;
        self.tx.send_modify(|state| {
            state.user = None;
            state.is_authenticated = false;
        });
        Ok(())
    }

    fn start_loading(&self) {
        self.tx.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn fail(&self, error: &SessionError) {
        let message = error.to_string();
        self.tx.send_modify(|state| {
            state.error = Some(message);
            state.is_loading = false;
        });
    }
}

// =============================================================================
// Callback Flow
// =============================================================================

/// Where a successful sign-in lands.
pub const HOME_ROUTE: &str = "/#/";

pub const CALLBACK_FAILED: &str = "Authentication failed. Please try again.";

/// State of the sign-in callback page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum CallbackState {
    Processing,
    Redirect(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CallbackFlow {
    state: CallbackState,
}

impl Default for CallbackFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackFlow {
    pub fn new() -> Self {
        Self {
            state: CallbackState::Processing,
        }
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }

    /// Process the redirect URL. Provider errors are replaced with a fixed
    /// user-facing message.
    pub async fn run(&mut self, service: &AuthService, url: &str) -> &CallbackState {
        self.state = match service.handle_callback(url).await {
            Ok(_) => CallbackState::Redirect(HOME_ROUTE.to_string()),
            Err(e) => {
                tracing::error!("Authentication callback error: {}", e);
                CallbackState::Failed(CALLBACK_FAILED.to_string())
            }
        };
        &self.state
    }
}
