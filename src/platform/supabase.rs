use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    consts::naei_const::{AUDIT_EVENT_TABLE, GROUP_TABLE, NFR_CODE_TABLE},
    models::{
        audit::{AuditEvent, NewAuditEvent},
        group::{Group, GroupPayload},
        nfr_code::NfrCode,
        user::{AuthSession, PlatformUser, Principal},
    },
    platform::{Platform, PlatformError, PlatformResult},
};

/// REST client for a Supabase project (PostgREST under `/rest/v1`, GoTrue
/// under `/auth/v1`). `api_key` is sent as the `apikey` header; user calls
/// authenticate with the caller's access token.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> PlatformResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| PlatformError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PlatformError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        bearer: &str,
        table: &str,
        order: &str,
        limit: Option<usize>,
    ) -> PlatformResult<Vec<T>> {
        let mut query = vec![("select", "*".to_string()), ("order", order.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let url = self.endpoint(&["rest", "v1", table])?;
        let response = self
            .request(Method::GET, url, bearer)
            .query(&query)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Appends one audit row. Authenticates with the client's own key, so
    /// build this client with the service-role key.
    pub async fn insert_audit_event(&self, event: &NewAuditEvent) -> PlatformResult<()> {
        let url = self.endpoint(&["rest", "v1", AUDIT_EVENT_TABLE])?;
        let response = self
            .request(Method::POST, url, &self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[event])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<AuthSession> {
        let url = self.endpoint(&["auth", "v1", "token"])?;
        let response = self
            .request(Method::POST, url, &self.api_key)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn refresh_session(&self, refresh_token: &str) -> PlatformResult<AuthSession> {
        let url = self.endpoint(&["auth", "v1", "token"])?;
        let response = self
            .request(Method::POST, url, &self.api_key)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> PlatformResult<()> {
        let url = self.endpoint(&["auth", "v1", "logout"])?;
        let response = self
            .request(Method::POST, url, access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> PlatformResult<Option<Principal>> {
        let url = self.endpoint(&["auth", "v1", "user"])?;
        let response = self
            .request(Method::GET, url, access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: PlatformUser = check(response).await?.json().await?;
        Ok(Some(Principal::new(user, access_token)))
    }

    async fn list_groups(&self, principal: &Principal) -> PlatformResult<Vec<Group>> {
        self.select(&principal.access_token, GROUP_TABLE, "updated_at.desc", None)
            .await
    }

    async fn list_nfr_codes(&self, principal: &Principal) -> PlatformResult<Vec<NfrCode>> {
        self.select(&principal.access_token, NFR_CODE_TABLE, "NFRCode.asc", None)
            .await
    }

    async fn list_audit_events(
        &self,
        principal: &Principal,
        limit: usize,
    ) -> PlatformResult<Vec<AuditEvent>> {
        self.select(
            &principal.access_token,
            AUDIT_EVENT_TABLE,
            "created_at.desc",
            Some(limit),
        )
        .await
    }

    async fn insert_group(
        &self,
        principal: &Principal,
        payload: &GroupPayload,
    ) -> PlatformResult<Group> {
        let url = self.endpoint(&["rest", "v1", GROUP_TABLE])?;
        let response = self
            .request(Method::POST, url, &principal.access_token)
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;

        let rows: Vec<Group> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| {
            PlatformError::api(
                StatusCode::NOT_ACCEPTABLE.as_u16(),
                "Insert returned no rows",
            )
        })
    }

    async fn update_group(
        &self,
        principal: &Principal,
        id: i64,
        payload: &GroupPayload,
    ) -> PlatformResult<()> {
        let url = self.endpoint(&["rest", "v1", GROUP_TABLE])?;
        let response = self
            .request(Method::PATCH, url, &principal.access_token)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(payload)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_group(&self, principal: &Principal, id: i64) -> PlatformResult<()> {
        let url = self.endpoint(&["rest", "v1", GROUP_TABLE])?;
        let response = self
            .request(Method::DELETE, url, &principal.access_token)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn call_rpc(&self, principal: &Principal, name: &str) -> PlatformResult<()> {
        let url = self.endpoint(&["rest", "v1", "rpc", name])?;
        let response = self
            .request(Method::POST, url, &principal.access_token)
            .json(&json!({}))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::api(status.as_u16(), error_message(status, &body)))
}

/// PostgREST reports `message`, GoTrue uses `msg` or `error_description`.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            match value.get(key).and_then(|v| v.as_str()) {
                Some(message) if !message.trim().is_empty() => return message.to_string(),
                _ => {}
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::AuditEventType;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param},
    };

    fn principal() -> Principal {
        Principal::new(
            PlatformUser {
                id: "user-1".into(),
                email: Some("admin@example.com".into()),
                user_metadata: None,
            },
            "user-token",
        )
    }

    fn payload() -> GroupPayload {
        GroupPayload {
            group_title: "Road transport".into(),
            source_name: None,
            activity_name: Some("Combustion".into()),
            nfr_code: Some("1A1".into()),
            updated_at: "2024-05-01T10:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn insert_group_sends_user_token_and_returns_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/NAEI_global_t_Group"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("prefer", "return=representation"))
            .and(body_json(serde_json::to_value(payload()).unwrap()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 12,
                "Group_Title": "Road transport",
                "SourceName": null,
                "ActivityName": "Combustion",
                "NFRCode": "1A1",
                "updated_at": "2024-05-01T10:00:00.000Z",
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        let group = client.insert_group(&principal(), &payload()).await.unwrap();

        assert_eq!(group.id, 12);
        assert_eq!(group.source_name, None);
    }

    #[tokio::test]
    async fn update_and_delete_filter_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/NAEI_global_t_Group"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/NAEI_global_t_Group"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        client
            .update_group(&principal(), 7, &payload())
            .await
            .unwrap();
        client.delete_group(&principal(), 7).await.unwrap();
    }

    #[tokio::test]
    async fn platform_error_message_is_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/NAEI_global_t_Group"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table NAEI_global_t_Group",
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        let err = client.delete_group(&principal(), 3).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "permission denied for table NAEI_global_t_Group"
        );
    }

    #[tokio::test]
    async fn list_audit_events_orders_and_limits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/audit_events"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "event_type": "group.created",
                "created_at": "2024-05-01T10:00:00+00:00",
                "actor": null,
                "details": null,
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        let events = client.list_audit_events(&principal(), 25).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "group.created");
    }

    #[tokio::test]
    async fn rpc_posts_empty_body_to_named_function() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/sync_naei_groups"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        client
            .call_rpc(&principal(), "sync_naei_groups")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn current_user_is_none_for_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "msg": "invalid JWT"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "email": "admin@example.com",
                "user_metadata": {},
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        assert!(client.current_user("stale").await.unwrap().is_none());

        let principal = client.current_user("fresh").await.unwrap().unwrap();
        assert_eq!(principal.actor(), "admin@example.com");
        assert_eq!(principal.access_token, "fresh");
    }

    #[tokio::test]
    async fn sign_in_reports_auth_error_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        let err = client.sign_in("a@b.c", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn refresh_session_exchanges_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({ "refresh_token": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-2",
                "user": { "id": "user-1", "email": "admin@example.com" },
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({ "refresh_token": "spent" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid Refresh Token: Already Used",
            })))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key");
        let session = client.refresh_session("refresh-1").await.unwrap();
        assert_eq!(session.access_token, "access-2");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(session.user.email.as_deref(), Some("admin@example.com"));

        let err = client.refresh_session("spent").await.unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "Invalid Refresh Token: Already Used");
    }

    #[tokio::test]
    async fn audit_insert_authenticates_with_client_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/audit_events"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .and(body_json(json!([{
                "event_type": "group.deleted",
                "actor": "admin@example.com",
                "details": { "groupId": 5 },
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "service-key");
        client
            .insert_audit_event(&NewAuditEvent::new(
                AuditEventType::GroupDeleted,
                Some("admin@example.com".into()),
                json!({ "groupId": 5 }),
            ))
            .await
            .unwrap();
    }

    #[test]
    fn error_message_falls_back_to_body_then_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }
}
