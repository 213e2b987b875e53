use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    #[serde(rename = "group.created")]
    GroupCreated,
    #[serde(rename = "group.updated")]
    GroupUpdated,
    #[serde(rename = "group.deleted")]
    GroupDeleted,
    #[serde(rename = "group.sync_triggered")]
    GroupSyncTriggered,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::GroupCreated => "group.created",
            AuditEventType::GroupUpdated => "group.updated",
            AuditEventType::GroupDeleted => "group.deleted",
            AuditEventType::GroupSyncTriggered => "group.sync_triggered",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row as read back for display. `event_type` stays free text since rows
/// may have been written by other tools.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub id: i64,
    pub event_type: String,
    pub created_at: String,
    pub actor: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    pub event_type: AuditEventType,
    pub actor: Option<String>,
    pub details: serde_json::Value,
}

impl NewAuditEvent {
    pub fn new(
        event_type: AuditEventType,
        actor: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            actor,
            details,
        }
    }
}
