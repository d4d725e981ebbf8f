//! Username/password sources for the password grant.

use crate::session::AuthError;
use tracing::trace;

/// Resource-owner credentials used for a fresh login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Supplies credentials at login time.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// Uses the configured values and prompts on the terminal for whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct PromptingCredentials {
    username: Option<String>,
    password: Option<String>,
}

impl PromptingCredentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        // empty strings in the properties file count as "not configured"
        Self {
            username: username.filter(|u| !u.is_empty()),
            password: password.filter(|p| !p.is_empty()),
        }
    }
}

impl CredentialProvider for PromptingCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        let username = match &self.username {
            Some(username) => username.clone(),
            None => {
                trace!("No username configured, prompting");
                inquire::Text::new("Username:")
                    .prompt()
                    .map_err(|e| AuthError::Prompt(e.to_string()))?
            }
        };

        let password = match &self.password {
            Some(password) => password.clone(),
            None => {
                trace!("No password configured, prompting");
                inquire::Password::new("Password:")
                    .without_confirmation()
                    .prompt()
                    .map_err(|e| AuthError::Prompt(e.to_string()))?
            }
        };

        Ok(Credentials { username, password })
    }
}

/// Always returns the same credentials. Useful for non-interactive use and tests.
#[derive(Debug, Clone)]
pub struct FixedCredentials(pub Credentials);

impl FixedCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl CredentialProvider for FixedCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self.0.clone())
    }
}
