//! Best-effort audit trail.
//!
//! [`AuditSink::record`] has no error channel: a sink that cannot persist an
//! event logs the failure and returns. Callers never branch on the outcome.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::{models::audit::NewAuditEvent, platform::supabase::SupabaseClient};

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: NewAuditEvent);
}

/// Appends to the platform's audit table with the service-role key, so rows
/// land regardless of the acting user's own table permissions.
pub struct SupabaseAuditSink {
    client: SupabaseClient,
}

impl SupabaseAuditSink {
    pub fn new(service_client: SupabaseClient) -> Self {
        Self {
            client: service_client,
        }
    }
}

#[async_trait]
impl AuditSink for SupabaseAuditSink {
    async fn record(&self, event: NewAuditEvent) {
        match self.client.insert_audit_event(&event).await {
            Ok(()) => debug!(event_type = %event.event_type, "audit event appended"),
            Err(err) => error!(
                event_type = %event.event_type,
                actor = ?event.actor,
                "Failed to append audit event: {err}"
            ),
        }
    }
}
