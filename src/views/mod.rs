//! Server-rendered HTML.

use crate::{
    actions::{ActionState, ActionStatus},
    consts::route_const::{GROUPS_PATH, LOGOUT_PATH},
    utils::html::escape,
};

pub mod audit_log;
pub mod groups;
pub mod login;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #020617; color: #e2e8f0; }
a { color: inherit; }
header { border-bottom: 1px solid #1e293b; background: #0f172a; }
.bar { max-width: 72rem; margin: 0 auto; display: flex; justify-content: space-between; align-items: center; padding: 1rem 1.5rem; }
.bar nav a { margin-left: 0.75rem; color: #cbd5e1; text-decoration: none; }
main { max-width: 72rem; margin: 0 auto; padding: 2rem 1.5rem; }
.auth { max-width: 28rem; margin: 4rem auto; padding: 2rem; border: 1px solid #1e293b; border-radius: 1rem; background: #0f172a; }
.card { border: 1px solid #1e293b; border-radius: 0.75rem; background: #0f172a; padding: 1rem; margin-bottom: 1rem; }
.fields { display: grid; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); gap: 0.75rem; }
label { display: block; font-size: 0.8rem; color: #94a3b8; margin-bottom: 0.25rem; }
input, select { width: 100%; box-sizing: border-box; padding: 0.5rem; border-radius: 0.5rem; border: 1px solid #334155; background: #020617; color: #f1f5f9; }
button { padding: 0.5rem 0.75rem; border-radius: 0.5rem; border: 0; font-weight: 600; background: #f1f5f9; color: #0f172a; cursor: pointer; }
button:disabled { opacity: 0.7; cursor: not-allowed; }
button.danger { background: rgba(239, 68, 68, 0.1); color: #fecaca; border: 1px solid rgba(239, 68, 68, 0.6); }
.actions { display: flex; gap: 0.75rem; align-items: center; margin-top: 0.75rem; }
.muted { color: #64748b; font-size: 0.8rem; }
.feedback { font-size: 0.85rem; margin: 0; }
.feedback.success { color: #34d399; }
.feedback.error { color: #f87171; }
.banner { padding: 0.75rem 1rem; border-radius: 0.5rem; border: 1px solid #334155; margin-bottom: 1rem; }
pre { white-space: pre-wrap; font-size: 0.75rem; background: #020617; padding: 0.5rem; border-radius: 0.5rem; }
"#;

// Disables the submit button while a form is in flight and asks for
// confirmation on forms carrying `data-confirm`.
const PENDING_SCRIPT: &str = r#"
document.addEventListener('submit', function (event) {
  var form = event.target;
  var question = form.getAttribute('data-confirm');
  if (question && !window.confirm(question)) {
    event.preventDefault();
    return;
  }
  var button = form.querySelector('button[type=submit]');
  if (button) {
    button.disabled = true;
    if (button.dataset.pending) { button.textContent = button.dataset.pending; }
  }
});
"#;

pub fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
<script>{PENDING_SCRIPT}</script>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Page shell for signed-in views.
pub fn dashboard_shell(display_name: &str, content: &str) -> String {
    let body = format!(
        r##"<header><div class="bar">
<div><a href="{GROUPS_PATH}"><strong>NAEI Admin</strong></a>
<nav style="display:inline"><a href="{GROUPS_PATH}">Groups</a><a href="{GROUPS_PATH}#audit-log">Audit Log</a></nav></div>
<div><span class="muted">{name}</span>
<form method="post" action="{LOGOUT_PATH}" style="display:inline; margin-left: 1rem"><button type="submit">Sign out</button></form></div>
</div></header>
<main>{content}</main>"##,
        name = escape(display_name),
    );
    document("NAEI Admin | Groups", &body)
}

pub fn submit_button(label: &str, pending: &str, class: Option<&str>) -> String {
    let class = class
        .map(|c| format!(r#" class="{c}""#))
        .unwrap_or_default();
    format!(
        r#"<button type="submit"{class} data-pending="{pending}">{label}</button>"#,
        pending = escape(pending),
        label = escape(label),
    )
}

/// Inline result of a form submission. Idle states render nothing.
pub fn feedback(state: &ActionState) -> String {
    let Some(message) = state.message.as_deref() else {
        return String::new();
    };
    let tone = match state.status {
        ActionStatus::Idle => return String::new(),
        ActionStatus::Success => "success",
        ActionStatus::Error => "error",
    };
    format!(
        r#"<p class="feedback {tone}" role="status">{}</p>"#,
        escape(message)
    )
}
