//! The hosted backend: authentication, table access and remote procedures.
//!
//! Every call that acts on behalf of a user takes the [`Principal`] it was
//! resolved for, so row-level policies apply to that user's token.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    audit::AuditEvent,
    group::{Group, GroupPayload},
    nfr_code::NfrCode,
    user::{AuthSession, Principal},
};

#[cfg(test)]
pub mod memory;
pub mod supabase;

pub type PlatformResult<T> = core::result::Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PlatformError {
    /// Error reported by the platform. `message` is shown to users as is.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid platform url: {0}")]
    InvalidUrl(String),
}

impl PlatformError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        PlatformError::Api {
            status,
            message: message.into(),
        }
    }

    /// The platform understood the request and refused the credentials in it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PlatformError::Api { status: 400 | 401 | 403, .. })
    }
}

#[async_trait]
pub trait Platform: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> PlatformResult<()>;

    /// Trades a refresh token for a new session. The old refresh token is
    /// spent by the exchange.
    async fn refresh_session(&self, refresh_token: &str) -> PlatformResult<AuthSession>;

    /// `Ok(None)` when the token does not identify a live session.
    async fn current_user(&self, access_token: &str) -> PlatformResult<Option<Principal>>;

    /// Most recently updated first.
    async fn list_groups(&self, principal: &Principal) -> PlatformResult<Vec<Group>>;

    async fn list_nfr_codes(&self, principal: &Principal) -> PlatformResult<Vec<NfrCode>>;

    /// Newest first, at most `limit` rows.
    async fn list_audit_events(
        &self,
        principal: &Principal,
        limit: usize,
    ) -> PlatformResult<Vec<AuditEvent>>;

    async fn insert_group(
        &self,
        principal: &Principal,
        payload: &GroupPayload,
    ) -> PlatformResult<Group>;

    async fn update_group(
        &self,
        principal: &Principal,
        id: i64,
        payload: &GroupPayload,
    ) -> PlatformResult<()>;

    async fn delete_group(&self, principal: &Principal, id: i64) -> PlatformResult<()>;

    async fn call_rpc(&self, principal: &Principal, name: &str) -> PlatformResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_refused_credentials_count_as_rejection() {
        assert!(PlatformError::api(400, "Invalid Refresh Token").is_rejection());
        assert!(PlatformError::api(401, "invalid JWT").is_rejection());
        assert!(!PlatformError::api(500, "upstream timeout").is_rejection());
        assert!(!PlatformError::InvalidUrl("nope".into()).is_rejection());
    }
}
