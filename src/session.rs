//! Bearer-token lifecycle for one client invocation.
//!
//! The [`SessionManager`] owns the [`Session`] of a single `AccessClient`. Before
//! every authenticated request it decides whether the current access token can be
//! reused, must be refreshed, or whether a fresh password login is required, and
//! injects the resulting `Authorization` header. Nothing is persisted: the session
//! starts empty and is dropped with the client.

use crate::credentials::{CredentialProvider, Credentials};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, trace, warn, Level};

/// Tokens expiring within this many seconds are renewed before use.
pub const REFRESH_LOOKAHEAD_SECONDS: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to connect to identity provider at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("identity provider rejected the request (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("no access_token found in identity provider response")]
    MissingAccessToken,
    #[error("malformed identity provider response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("access token cannot be used as a header value")]
    InvalidToken,
    #[error("failed to read credentials: {0}")]
    Prompt(String),
    #[error("authentication requested, but no identity provider is configured")]
    NotConfigured,
}

/// Source of the current time, replaceable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The two OAuth grants the client uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    Password(Credentials),
    RefreshToken(String),
}

/// Token endpoint response. Every field is optional on the wire; a missing
/// `access_token` is treated as a failed login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub refresh_expires_in: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub preferred_username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Token issuing side of the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError>;

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, AuthError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_expiry: Option<DateTime<Utc>>,
    refresh_token_expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
enum AuthStep {
    Reuse(String),
    Refresh(String),
    Login,
}

fn expiry_after(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Session {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.token_expiry
    }

    pub fn refresh_token_expiry(&self) -> Option<DateTime<Utc>> {
        self.refresh_token_expiry
    }

    fn next_step(&self, now: DateTime<Utc>) -> AuthStep {
        let window = expiry_after(now, REFRESH_LOOKAHEAD_SECONDS);

        match (&self.access_token, self.token_expiry) {
            (Some(token), Some(expiry)) if expiry >= window => AuthStep::Reuse(token.clone()),
            (Some(_), Some(_)) => match (&self.refresh_token, self.refresh_token_expiry) {
                (Some(refresh_token), Some(refresh_expiry)) if now < refresh_expiry => {
                    AuthStep::Refresh(refresh_token.clone())
                }
                _ => AuthStep::Login,
            },
            _ => AuthStep::Login,
        }
    }

    /// Builds the successor session from a token response. The current session is
    /// left untouched so a failure never leaves it half-updated.
    fn renewed(&self, response: TokenResponse, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let access_token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingAccessToken)?;

        Ok(Session {
            access_token: Some(access_token),
            token_expiry: Some(expiry_after(now, response.expires_in.unwrap_or(0))),
            refresh_token_expiry: Some(expiry_after(now, response.refresh_expires_in.unwrap_or(0))),
            refresh_token: response.refresh_token.or_else(|| self.refresh_token.clone()),
        })
    }
}

fn bearer(token: &str) -> Result<HeaderValue, AuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AuthError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

pub struct SessionManager {
    session: Session,
    identity: Option<Arc<dyn IdentityProvider>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            session: Session::default(),
            identity: Some(identity),
            credentials: Some(credentials),
            clock: Arc::new(SystemClock),
        }
    }

    /// A manager without identity provider. Unauthenticated calls work as usual,
    /// authenticated ones fail with [`AuthError::NotConfigured`].
    pub fn unauthenticated() -> Self {
        Self {
            session: Session::default(),
            identity: None,
            credentials: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Makes sure `headers` carries a valid bearer token when `require_auth` is set.
    ///
    /// Without `require_auth` this is a no-op, so callers can always invoke it first.
    /// On failure a diagnostic is logged and neither the headers nor the session are
    /// modified; the caller must not send its request.
    pub async fn ensure_authenticated(
        &mut self,
        require_auth: bool,
        headers: &mut HeaderMap,
    ) -> Result<(), AuthError> {
        if !require_auth {
            trace!("Skipping login, authentication not requested");
            return Ok(());
        }

        match self.authenticate().await {
            Ok(value) => {
                trace!("Adding access token to request header");
                headers.insert(AUTHORIZATION, value);
                Ok(())
            }
            Err(e) => {
                error!("Login failed: {}", e);
                Err(e)
            }
        }
    }

    async fn authenticate(&mut self) -> Result<HeaderValue, AuthError> {
        let identity = self.identity.clone().ok_or(AuthError::NotConfigured)?;

        let grant = match self.session.next_step(self.clock.now()) {
            AuthStep::Reuse(token) => {
                trace!("Access token is still valid, reusing it");
                return bearer(&token);
            }
            AuthStep::Refresh(refresh_token) => {
                debug!("Access token expires soon, refreshing it");
                TokenGrant::RefreshToken(refresh_token)
            }
            AuthStep::Login => {
                debug!("No usable refresh token, performing initial login");
                let credentials = self
                    .credentials
                    .as_ref()
                    .ok_or(AuthError::NotConfigured)?
                    .credentials()?;
                TokenGrant::Password(credentials)
            }
        };

        let response = identity.request_token(&grant).await?;
        let session = self.session.renewed(response, self.clock.now())?;
        let access_token = session.access_token.clone().unwrap_or_default();
        let value = bearer(&access_token)?;
        self.session = session;

        if tracing::enabled!(Level::DEBUG) {
            match identity.user_info(&access_token).await {
                Ok(info) => debug!(
                    "Successfully logged in as username: {}, email: {}, groups: {:?}",
                    info.preferred_username.unwrap_or_default(),
                    info.email.unwrap_or_default(),
                    info.groups
                ),
                Err(e) => warn!("Failed to obtain user information: {}", e),
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::FixedCredentials;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(
                Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            )))
        }

        fn advance(&self, seconds: i64) {
            let mut now = self.0.lock().unwrap();
            *now += Duration::seconds(seconds);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct ScriptedIdentity {
        responses: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
        grants: Mutex<Vec<TokenGrant>>,
    }

    impl ScriptedIdentity {
        fn push(&self, response: Result<TokenResponse, AuthError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn grants(&self) -> Vec<TokenGrant> {
            self.grants.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedIdentity {
        async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError> {
            self.grants.lock().unwrap().push(grant.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AuthError::MissingAccessToken))
        }

        async fn user_info(&self, _access_token: &str) -> Result<UserInfo, AuthError> {
            Ok(UserInfo::default())
        }
    }

    fn tokens(access: &str, expires_in: i64, refresh: Option<&str>, refresh_in: i64) -> TokenResponse {
        TokenResponse {
            access_token: Some(access.to_string()),
            expires_in: Some(expires_in),
            refresh_token: refresh.map(str::to_string),
            refresh_expires_in: Some(refresh_in),
        }
    }

    fn manager(identity: &Arc<ScriptedIdentity>, clock: &Arc<ManualClock>) -> SessionManager {
        SessionManager::new(identity.clone(), Arc::new(FixedCredentials::new("alice", "secret")))
            .with_clock(clock.clone())
    }

    fn authorization(headers: &HeaderMap) -> Option<String> {
        headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_no_auth_leaves_headers_alone() {
        let identity = Arc::new(ScriptedIdentity::default());
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);
        let mut headers = HeaderMap::new();

        manager.ensure_authenticated(false, &mut headers).await.unwrap();

        assert!(headers.is_empty());
        assert!(identity.grants().is_empty());
    }

    #[tokio::test]
    async fn test_first_call_performs_password_login() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 300, Some("refresh-1"), 1800)));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);
        let mut headers = HeaderMap::new();

        manager.ensure_authenticated(true, &mut headers).await.unwrap();

        assert_eq!(authorization(&headers).as_deref(), Some("Bearer access-1"));
        assert!(matches!(identity.grants()[0], TokenGrant::Password(ref c) if c.username == "alice"));
        assert_eq!(
            manager.session().token_expiry(),
            Some(clock.now() + Duration::seconds(300))
        );
        assert_eq!(
            manager.session().refresh_token_expiry(),
            Some(clock.now() + Duration::seconds(1800))
        );
    }

    #[tokio::test]
    async fn test_token_close_to_expiry_is_refreshed() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 20, Some("refresh-1"), 3600)));
        identity.push(Ok(tokens("access-2", 20, Some("refresh-2"), 3600)));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);

        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();
        clock.advance(25);
        let mut headers = HeaderMap::new();
        manager.ensure_authenticated(true, &mut headers).await.unwrap();

        let grants = identity.grants();
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[1], TokenGrant::RefreshToken("refresh-1".to_string()));
        assert_eq!(authorization(&headers).as_deref(), Some("Bearer access-2"));
        assert_eq!(manager.session().refresh_token(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_forces_login() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 20, Some("refresh-1"), 60)));
        identity.push(Ok(tokens("access-2", 300, Some("refresh-2"), 1800)));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);

        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();
        clock.advance(120);
        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();

        let grants = identity.grants();
        assert!(matches!(grants[1], TokenGrant::Password(_)));
    }

    #[tokio::test]
    async fn test_valid_token_is_reused_without_provider_call() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 300, Some("refresh-1"), 1800)));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);

        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();
        clock.advance(10);
        let mut headers = HeaderMap::new();
        manager.ensure_authenticated(true, &mut headers).await.unwrap();

        assert_eq!(identity.grants().len(), 1);
        assert_eq!(authorization(&headers).as_deref(), Some("Bearer access-1"));
    }

    #[tokio::test]
    async fn test_refresh_without_new_refresh_token_keeps_old_one() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 10, Some("refresh-1"), 3600)));
        identity.push(Ok(tokens("access-2", 10, None, 3000)));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);

        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();
        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();

        assert_eq!(manager.session().access_token(), Some("access-2"));
        assert_eq!(manager.session().refresh_token(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_missing_access_token_fails_without_side_effects() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(TokenResponse {
            expires_in: Some(300),
            ..TokenResponse::default()
        }));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);
        let mut headers = HeaderMap::new();

        let result = manager.ensure_authenticated(true, &mut headers).await;

        assert!(matches!(result, Err(AuthError::MissingAccessToken)));
        assert!(headers.is_empty());
        assert_eq!(manager.session(), &Session::default());
    }

    #[tokio::test]
    async fn test_rejected_refresh_does_not_fall_back_to_login() {
        let identity = Arc::new(ScriptedIdentity::default());
        identity.push(Ok(tokens("access-1", 5, Some("refresh-1"), 3600)));
        identity.push(Err(AuthError::Rejected {
            status: 400,
            detail: "invalid_grant".to_string(),
        }));
        let clock = ManualClock::new();
        let mut manager = manager(&identity, &clock);

        manager.ensure_authenticated(true, &mut HeaderMap::new()).await.unwrap();
        let before = manager.session().clone();
        let mut headers = HeaderMap::new();
        let result = manager.ensure_authenticated(true, &mut headers).await;

        assert!(matches!(result, Err(AuthError::Rejected { status: 400, .. })));
        assert_eq!(identity.grants().len(), 2);
        assert!(headers.is_empty());
        assert_eq!(manager.session(), &before);
    }

    #[tokio::test]
    async fn test_unconfigured_manager_rejects_authenticated_calls() {
        let mut manager = SessionManager::unauthenticated();
        let mut headers = HeaderMap::new();

        manager.ensure_authenticated(false, &mut headers).await.unwrap();
        let result = manager.ensure_authenticated(true, &mut headers).await;

        assert!(matches!(result, Err(AuthError::NotConfigured)));
    }
}
