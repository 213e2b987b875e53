use serde_json::json;
use tracing::info;

use crate::{
    actions::{ActionState, finish},
    errors::{Error, Result},
    models::{
        audit::{AuditEventType, NewAuditEvent},
        group::GroupPayload,
        user::Principal,
    },
    state::AppState,
    utils::{
        form::{FormFields, optional_string, parse_id, required_string},
        time::time_now,
    },
};

fn group_payload(fields: &FormFields) -> Result<GroupPayload> {
    Ok(GroupPayload {
        group_title: required_string(fields, "Group_Title")?,
        source_name: optional_string(fields, "SourceName"),
        activity_name: optional_string(fields, "ActivityName"),
        nfr_code: optional_string(fields, "NFRCode"),
        updated_at: time_now(),
    })
}

fn signed_in<'a>(principal: Option<&'a Principal>, message: &'static str) -> Result<&'a Principal> {
    principal.ok_or(Error::Unauthenticated(message))
}

async fn audit(
    state: &AppState,
    event_type: AuditEventType,
    principal: &Principal,
    details: serde_json::Value,
) {
    state
        .audit
        .record(NewAuditEvent::new(event_type, Some(principal.actor()), details))
        .await;
}

pub async fn create_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> ActionState {
    finish("create_group", try_create_group(state, principal, fields).await)
}

async fn try_create_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> Result<&'static str> {
    let principal = signed_in(principal, "You must be signed in to create groups.")?;
    let payload = group_payload(fields)?;

    let group = state.platform.insert_group(principal, &payload).await?;
    info!(actor = %principal.actor(), group_id = group.id, "group created");

    audit(
        state,
        AuditEventType::GroupCreated,
        principal,
        json!({ "groupId": group.id, "payload": payload }),
    )
    .await;

    Ok("Group created successfully.")
}

pub async fn update_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> ActionState {
    finish("update_group", try_update_group(state, principal, fields).await)
}

async fn try_update_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> Result<&'static str> {
    let principal = signed_in(principal, "You must be signed in to update groups.")?;
    let id = parse_id(fields)?;
    let payload = group_payload(fields)?;

    // Last write wins; the platform serializes concurrent updates.
    state.platform.update_group(principal, id, &payload).await?;
    info!(actor = %principal.actor(), group_id = id, "group updated");

    audit(
        state,
        AuditEventType::GroupUpdated,
        principal,
        json!({ "groupId": id, "payload": payload }),
    )
    .await;

    Ok("Group updated successfully.")
}

pub async fn delete_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> ActionState {
    finish("delete_group", try_delete_group(state, principal, fields).await)
}

async fn try_delete_group(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> Result<&'static str> {
    let principal = signed_in(principal, "You must be signed in to delete groups.")?;
    let id = parse_id(fields)?;

    state.platform.delete_group(principal, id).await?;
    info!(actor = %principal.actor(), group_id = id, "group deleted");

    audit(
        state,
        AuditEventType::GroupDeleted,
        principal,
        json!({ "groupId": id }),
    )
    .await;

    Ok("Group deleted successfully.")
}

pub async fn sync_groups(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> ActionState {
    finish("sync_groups", try_sync_groups(state, principal, fields).await)
}

async fn try_sync_groups(
    state: &AppState,
    principal: Option<&Principal>,
    fields: &FormFields,
) -> Result<&'static str> {
    let principal = signed_in(principal, "You must be signed in to run the sync.")?;
    let rpc_name = optional_string(fields, "rpc_name")
        .unwrap_or_else(|| state.config.group_sync_function.clone());

    state.platform.call_rpc(principal, &rpc_name).await?;
    info!(actor = %principal.actor(), rpc_name = %rpc_name, "group sync triggered");

    audit(
        state,
        AuditEventType::GroupSyncTriggered,
        principal,
        json!({ "rpcName": rpc_name }),
    )
    .await;

    Ok("Sync triggered successfully.")
}
