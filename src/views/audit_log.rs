use crate::{
    models::audit::AuditEvent,
    utils::{html::escape, time::format_timestamp},
};

pub fn render(events: &[AuditEvent]) -> String {
    if events.is_empty() {
        return r#"<p class="card muted">No audit events yet. Actions taken through this console will appear here.</p>"#
            .to_string();
    }
    events.iter().map(entry).collect::<Vec<_>>().join("\n")
}

fn entry(event: &AuditEvent) -> String {
    format!(
        r#"<article class="card">
<div class="actions"><strong>{event_type}</strong><time class="muted" datetime="{raw_time}">{time}</time></div>
<div class="fields">
<div><label>Actor</label>{actor}</div>
<div><label>Event ID</label>{id}</div>
</div>
<details><summary class="muted">View payload</summary><pre>{details}</pre></details>
</article>"#,
        event_type = escape(&event.event_type),
        raw_time = escape(&event.created_at),
        time = escape(&format_timestamp(&event.created_at)),
        actor = escape(event.actor.as_deref().unwrap_or("Unknown")),
        id = event.id,
        details = escape(&details_text(event.details.as_ref())),
    )
}

fn details_text(details: Option<&serde_json::Value>) -> String {
    match details {
        None | Some(serde_json::Value::Null) => "No details".to_string(),
        Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}
