//! In-process platform used by tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    audit::AuditSink,
    models::{
        audit::{AuditEvent, NewAuditEvent},
        group::{Group, GroupPayload},
        nfr_code::NfrCode,
        user::{AuthSession, PlatformUser, Principal},
    },
    platform::{Platform, PlatformError, PlatformResult},
};

#[derive(Default)]
struct MemoryState {
    groups: Vec<Group>,
    codes: Vec<NfrCode>,
    audit: Vec<AuditEvent>,
    sessions: HashMap<String, PlatformUser>,
    credentials: HashMap<String, (String, String)>,
    refresh_tokens: HashMap<String, (String, String)>,
    signed_out: Vec<String>,
    rpc_calls: Vec<String>,
    writes: usize,
    next_id: i64,
    fail_writes: Option<String>,
}

#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
}

pub fn test_user(email: &str) -> PlatformUser {
    PlatformUser {
        id: format!("id-{email}"),
        email: Some(email.to_string()),
        user_metadata: None,
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a live session and returns its principal.
    pub fn with_session(&self, token: &str, email: &str) -> Principal {
        let user = test_user(email);
        self.lock()
            .sessions
            .insert(token.to_string(), user.clone());
        Principal::new(user, token)
    }

    pub fn with_credentials(&self, email: &str, password: &str, token: &str) {
        self.lock().credentials.insert(
            email.to_string(),
            (password.to_string(), token.to_string()),
        );
    }

    /// Registers a refresh token that renews into `access_token` for `email`.
    pub fn with_refresh_token(&self, refresh_token: &str, email: &str, access_token: &str) {
        self.lock().refresh_tokens.insert(
            refresh_token.to_string(),
            (email.to_string(), access_token.to_string()),
        );
    }

    pub fn with_group(&self, title: &str, updated_at: &str) -> i64 {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.groups.push(Group {
            id,
            group_title: title.to_string(),
            source_name: None,
            activity_name: None,
            nfr_code: None,
            updated_at: Some(updated_at.to_string()),
        });
        id
    }

    pub fn with_code(&self, code: &str, description: Option<&str>) {
        let mut state = self.lock();
        let id = state.codes.len() as i64 + 1;
        state.codes.push(NfrCode {
            id,
            nfr_code: code.to_string(),
            description: description.map(str::to_string),
        });
    }

    pub fn fail_writes_with(&self, message: &str) {
        self.lock().fail_writes = Some(message.to_string());
    }

    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn groups(&self) -> Vec<Group> {
        self.lock().groups.clone()
    }

    pub fn rpc_calls(&self) -> Vec<String> {
        self.lock().rpc_calls.clone()
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.lock().audit.clone()
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.lock().signed_out.clone()
    }

    fn begin_write(&self) -> PlatformResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        if let Some(message) = &state.fail_writes {
            return Err(PlatformError::api(400, message.clone()));
        }
        state.writes += 1;
        Ok(state)
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<AuthSession> {
        let mut state = self.lock();
        let token = match state.credentials.get(email) {
            Some((expected, token)) if expected == password => token.clone(),
            _ => return Err(PlatformError::api(400, "Invalid login credentials")),
        };
        let user = test_user(email);
        state.sessions.insert(token.clone(), user.clone());
        Ok(AuthSession {
            refresh_token: Some(format!("{token}-refresh")),
            access_token: token,
            expires_in: Some(3600),
            user,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> PlatformResult<AuthSession> {
        let mut state = self.lock();
        let Some((email, access_token)) = state.refresh_tokens.remove(refresh_token) else {
            return Err(PlatformError::api(
                400,
                "Invalid Refresh Token: Refresh Token Not Found",
            ));
        };
        let user = test_user(&email);
        state.sessions.insert(access_token.clone(), user.clone());
        Ok(AuthSession {
            access_token,
            expires_in: Some(3600),
            refresh_token: Some(format!("{refresh_token}-rotated")),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> PlatformResult<()> {
        let mut state = self.lock();
        state.sessions.remove(access_token);
        state.signed_out.push(access_token.to_string());
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> PlatformResult<Option<Principal>> {
        Ok(self
            .lock()
            .sessions
            .get(access_token)
            .cloned()
            .map(|user| Principal::new(user, access_token)))
    }

    async fn list_groups(&self, _principal: &Principal) -> PlatformResult<Vec<Group>> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(groups)
    }

    async fn list_nfr_codes(&self, _principal: &Principal) -> PlatformResult<Vec<NfrCode>> {
        let mut codes = self.lock().codes.clone();
        codes.sort_by(|a, b| a.nfr_code.cmp(&b.nfr_code));
        Ok(codes)
    }

    async fn list_audit_events(
        &self,
        _principal: &Principal,
        limit: usize,
    ) -> PlatformResult<Vec<AuditEvent>> {
        Ok(self
            .lock()
            .audit
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_group(
        &self,
        _principal: &Principal,
        payload: &GroupPayload,
    ) -> PlatformResult<Group> {
        let mut state = self.begin_write()?;
        state.next_id += 1;
        let group = payload.clone().into_group(state.next_id);
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(
        &self,
        _principal: &Principal,
        id: i64,
        payload: &GroupPayload,
    ) -> PlatformResult<()> {
        let mut state = self.begin_write()?;
        if let Some(group) = state.groups.iter_mut().find(|g| g.id == id) {
            *group = payload.clone().into_group(id);
        }
        Ok(())
    }

    async fn delete_group(&self, _principal: &Principal, id: i64) -> PlatformResult<()> {
        let mut state = self.begin_write()?;
        state.groups.retain(|g| g.id != id);
        Ok(())
    }

    async fn call_rpc(&self, _principal: &Principal, name: &str) -> PlatformResult<()> {
        let mut state = self.begin_write()?;
        state.rpc_calls.push(name.to_string());
        Ok(())
    }
}

// Lets the dashboard show what the actions appended.
#[async_trait]
impl AuditSink for MemoryPlatform {
    async fn record(&self, event: NewAuditEvent) {
        let mut state = self.lock();
        let id = state.audit.len() as i64 + 1;
        state.audit.push(AuditEvent {
            id,
            event_type: event.event_type.as_str().to_string(),
            created_at: format!("2024-01-01T00:00:{:02}Z", id % 60),
            actor: event.actor,
            details: Some(event.details),
        });
    }
}
