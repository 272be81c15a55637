// NexusHealth - platform/api.rs
//
// Client side of the external auth API.
//
// The API owns credential verification and token issuance; this module
// only carries requests and maps every failure onto `AuthError`.
//
//   POST {base}/auth/login     {email, password}              -> {access_token, user}
//   POST {base}/auth/register  {name, email, password, role}  -> {access_token, user}
//   GET  {base}/auth/me        Authorization: Bearer <token>  -> user
//
// `DemoAuthApi` answers the same calls offline for demo mode.

use crate::core::model::{Identity, Role};
use crate::util::error::AuthError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Email + password pair submitted by the login form.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload of the registration form.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful login/registration: a bearer token plus the identity it
/// was issued for.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    #[serde(rename = "access_token")]
    pub token: String,
    #[serde(rename = "user")]
    pub identity: Identity,
}

/// Remote calls the session store depends on.
///
/// Implementations must be shareable with the background restore thread.
pub trait AuthApi: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError>;
    fn register(&self, registration: &Registration) -> Result<AuthGrant, AuthError>;
    fn me(&self, token: &str) -> Result<Identity, AuthError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// `AuthApi` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AuthError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: String,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T, AuthError> {
        tracing::debug!(endpoint = %endpoint, "Auth API request");
        let response = request.send().map_err(|source| AuthError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .ok()
                .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            tracing::info!(
                endpoint = %endpoint,
                status = status.as_u16(),
                "Auth API rejected request"
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<T>()
            .map_err(|source| AuthError::Transport { endpoint, source })
    }
}

impl AuthApi for HttpAuthApi {
    fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        let endpoint = self.endpoint("/auth/login");
        let request = self.client.post(&endpoint).json(credentials);
        self.send(endpoint, request)
    }

    fn register(&self, registration: &Registration) -> Result<AuthGrant, AuthError> {
        let endpoint = self.endpoint("/auth/register");
        let request = self.client.post(&endpoint).json(registration);
        self.send(endpoint, request)
    }

    fn me(&self, token: &str) -> Result<Identity, AuthError> {
        let endpoint = self.endpoint("/auth/me");
        let request = self.client.get(&endpoint).bearer_auth(token);
        self.send(endpoint, request)
    }
}

// =============================================================================
// Demo implementation
// =============================================================================

const DEMO_TOKEN_PREFIX: &str = "demo:";

/// Offline stand-in for the auth API.
///
/// Logins succeed only for the built-in demo accounts (any non-empty
/// password). Registration always succeeds. Demo tokens embed the identity
/// they were issued for, so `me` works across restarts without a server.
#[derive(Debug, Clone)]
pub struct DemoAuthApi {
    accounts: Vec<Identity>,
}

impl Default for DemoAuthApi {
    fn default() -> Self {
        Self {
            accounts: vec![
                demo_identity("admin-001", "Admin User", "admin@nexushealth.com", Role::Admin),
                demo_identity(
                    "doc-001",
                    "Dr. Sarah Chen",
                    "sarah.chen@nexushealth.com",
                    Role::Doctor,
                ),
            ],
        }
    }
}

impl DemoAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn grant(identity: Identity) -> Result<AuthGrant, AuthError> {
        let encoded = serde_json::to_string(&identity).map_err(|e| {
            AuthError::InvalidCredentials {
                reason: format!("cannot issue demo token: {e}"),
            }
        })?;
        Ok(AuthGrant {
            token: format!("{DEMO_TOKEN_PREFIX}{encoded}"),
            identity,
        })
    }
}

impl AuthApi for DemoAuthApi {
    fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        if credentials.password.is_empty() {
            return Err(AuthError::InvalidCredentials {
                reason: "password is empty".to_string(),
            });
        }
        let email = credentials.email.trim().to_lowercase();
        let identity = self
            .accounts
            .iter()
            .find(|a| a.email.as_deref() == Some(email.as_str()))
            .cloned()
            .ok_or_else(|| AuthError::Rejected {
                status: 401,
                detail: "Invalid credentials".to_string(),
            })?;
        Self::grant(identity)
    }

    fn register(&self, registration: &Registration) -> Result<AuthGrant, AuthError> {
        if registration.name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(AuthError::InvalidCredentials {
                reason: "name, email and password are required".to_string(),
            });
        }
        let email = registration.email.trim().to_lowercase();
        if self.accounts.iter().any(|a| a.email.as_deref() == Some(email.as_str())) {
            return Err(AuthError::Rejected {
                status: 400,
                detail: "Email already registered".to_string(),
            });
        }
        let id = format!("demo-{}", uuid::Uuid::new_v4());
        Self::grant(demo_identity(&id, registration.name.trim(), &email, registration.role.clone()))
    }

    fn me(&self, token: &str) -> Result<Identity, AuthError> {
        token
            .strip_prefix(DEMO_TOKEN_PREFIX)
            .and_then(|json| serde_json::from_str::<Identity>(json).ok())
            .ok_or_else(|| AuthError::Rejected {
                status: 401,
                detail: "Invalid token".to_string(),
            })
    }
}

fn demo_identity(id: &str, name: &str, email: &str, role: Role) -> Identity {
    Identity {
        id: id.to_string(),
        name: name.to_string(),
        role,
        avatar_ref: Some(avatar_url(name)),
        email: Some(email.to_string()),
    }
}

/// Generated initials avatar, matching what the auth API assigns.
pub fn avatar_url(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=0D9488&color=fff",
        name.split_whitespace().collect::<Vec<_>>().join("+")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_demo_login_known_account() {
        let api = DemoAuthApi::new();
        let grant = api.login(&creds("Admin@NexusHealth.com", "pw")).unwrap();
        assert_eq!(grant.identity.role, Role::Admin);
        assert!(grant.token.starts_with(DEMO_TOKEN_PREFIX));
    }

    #[test]
    fn test_demo_login_unknown_account_rejected() {
        let api = DemoAuthApi::new();
        let err = api.login(&creds("nobody@example.com", "pw")).unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    }

    #[test]
    fn test_demo_login_empty_password_rejected() {
        let api = DemoAuthApi::new();
        let err = api.login(&creds("admin@nexushealth.com", "")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
    }

    #[test]
    fn test_demo_token_round_trips_through_me() {
        let api = DemoAuthApi::new();
        let grant = api
            .register(&Registration {
                name: "Nia Okafor".to_string(),
                email: "nia@ward.org".to_string(),
                password: "secret".to_string(),
                role: Role::Nurse,
            })
            .unwrap();
        let me = api.me(&grant.token).unwrap();
        assert_eq!(me, grant.identity);
        assert_eq!(me.role, Role::Nurse);
        assert!(api.me("garbage").is_err());
    }

    #[test]
    fn test_demo_register_duplicate_email() {
        let api = DemoAuthApi::new();
        let err = api
            .register(&Registration {
                name: "Copy".to_string(),
                email: "sarah.chen@nexushealth.com".to_string(),
                password: "x".to_string(),
                role: Role::Doctor,
            })
            .unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 400, .. }));
    }

    #[test]
    fn test_avatar_url_joins_name_parts() {
        assert!(avatar_url("Sarah  Chen").contains("name=Sarah+Chen&"));
    }

    #[test]
    fn test_grant_parses_api_shape() {
        let body = r#"{"access_token":"t","token_type":"bearer",
            "user":{"id":"1","name":"A","email":"a@b.c","role":"Lab Technician","avatar":null}}"#;
        let grant: AuthGrant = serde_json::from_str(body).unwrap();
        assert_eq!(grant.token, "t");
        assert_eq!(grant.identity.role, Role::LabTechnician);
    }

    #[test]
    fn test_grant_keeps_unrecognised_role() {
        let body = r#"{"access_token":"t",
            "user":{"id":"2","name":"B","email":"b@c.d","role":"Staff","avatar":null}}"#;
        let grant: AuthGrant = serde_json::from_str(body).unwrap();
        assert_eq!(grant.identity.role, Role::Other("Staff".to_string()));
    }
}
