use serde::{Deserialize, Serialize};

/// User object as returned by the platform's auth endpoints.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PlatformUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: PlatformUser,
}

/// An authenticated caller together with the token its platform calls are
/// made with. Resolved once per request and passed explicitly to actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user: PlatformUser,
    pub access_token: String,
}

impl Principal {
    pub fn new(user: PlatformUser, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    /// Identity recorded on audit rows: email, else user id.
    pub fn actor(&self) -> String {
        self.user
            .email
            .clone()
            .unwrap_or_else(|| self.user.id.clone())
    }

    pub fn display_name(&self) -> String {
        if let Some(email) = &self.user.email {
            return email.clone();
        }
        self.user
            .user_metadata
            .as_ref()
            .and_then(|meta| meta.get("full_name"))
            .and_then(|name| name.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| "Admin".to_string())
    }
}
