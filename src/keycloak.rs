use crate::session::{AuthError, IdentityProvider, TokenGrant, TokenResponse, UserInfo};
use async_trait::async_trait;
use reqwest::Client;

/// OpenID Connect endpoints of one Keycloak realm.
pub struct KeycloakClient {
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client: Client,
}

impl KeycloakClient {
    pub fn new(server_url: &str, realm: &str, client_id: &str) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(format!("kitdm/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| AuthError::Connection {
                url: server_url.to_string(),
                source,
            })?;

        let realm_url = format!(
            "{}/realms/{}/protocol/openid-connect",
            server_url.trim_end_matches('/'),
            realm
        );

        Ok(Self {
            token_url: format!("{}/token", realm_url),
            userinfo_url: format!("{}/userinfo", realm_url),
            client_id: client_id.to_string(),
            client,
        })
    }

    fn form_for<'a>(&'a self, grant: &'a TokenGrant) -> Vec<(&'static str, &'a str)> {
        match grant {
            TokenGrant::Password(credentials) => vec![
                ("grant_type", "password"),
                ("client_id", self.client_id.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ],
            TokenGrant::RefreshToken(refresh_token) => vec![
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ],
        }
    }
}

/// Turns an OAuth error body into a readable message. Falls back to the raw body.
pub(crate) fn describe_error_body(body: &str) -> String {
    let json = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json,
        Err(e) => {
            tracing::trace!("Error response is not JSON: {}", e);
            return body.to_string();
        }
    };

    let Some(error) = json.get("error").and_then(|e| e.as_str()) else {
        return body.to_string();
    };

    let description = json
        .get("error_description")
        .and_then(|d| d.as_str())
        .map(|d| format!(" - {}", d))
        .unwrap_or_default();

    match error {
        "invalid_grant" => format!(
            "Invalid grant{}. Check your username and password, or log in again.",
            description
        ),
        "invalid_client" => format!(
            "Invalid client{}. Please check the configured client ID.",
            description
        ),
        "unauthorized_client" => format!(
            "Unauthorized client{}. The client may not use this grant type.",
            description
        ),
        _ => format!("{}{}", error, description),
    }
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError> {
        tracing::debug!("Requesting token from {}", &self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&self.form_for(grant))
            .send()
            .await
            .map_err(|source| AuthError::Connection {
                url: self.token_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| AuthError::Connection {
                url: self.token_url.clone(),
                source,
            })?;

        tracing::debug!("Token response status: {}", status);

        if !status.is_success() {
            tracing::error!("Token request failed with status {}: {}", status, &body);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail: describe_error_body(&body),
            });
        }

        Ok(serde_json::from_str::<TokenResponse>(&body)?)
    }

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| AuthError::Connection {
                url: self.userinfo_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| AuthError::Connection {
                url: self.userinfo_url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail: describe_error_body(&body),
            });
        }

        Ok(serde_json::from_str::<UserInfo>(&body)?)
    }
}
