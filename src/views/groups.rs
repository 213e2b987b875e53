use crate::{
    actions::ActionState,
    models::{audit::AuditEvent, group::Group, nfr_code::NfrCode},
    utils::{html::escape, time::format_timestamp},
    views::{audit_log, dashboard_shell, feedback, submit_button},
};

/// Which form a feedback message belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackTarget {
    Create,
    Update(Option<i64>),
    Delete(Option<i64>),
    Sync,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub target: FeedbackTarget,
    pub state: ActionState,
}

pub struct Dashboard<'a> {
    pub display_name: &'a str,
    pub groups: &'a [Group],
    pub nfr_codes: &'a [NfrCode],
    pub audit_events: &'a [AuditEvent],
    pub default_rpc_name: &'a str,
    pub feedback: Option<&'a Feedback>,
}

impl Dashboard<'_> {
    fn feedback_for(&self, target: &FeedbackTarget) -> String {
        match self.feedback {
            Some(fb) if &fb.target == target => feedback(&fb.state),
            _ => String::new(),
        }
    }

    /// Feedback aimed at a card that is not on the page.
    fn banner(&self) -> String {
        let Some(fb) = self.feedback else {
            return String::new();
        };
        let placed = match fb.target {
            FeedbackTarget::Create | FeedbackTarget::Sync => true,
            FeedbackTarget::Update(id) | FeedbackTarget::Delete(id) => {
                id.is_some_and(|id| self.groups.iter().any(|g| g.id == id))
            }
        };
        if placed {
            return String::new();
        }
        format!(r#"<div class="banner">{}</div>"#, feedback(&fb.state))
    }
}

pub fn render(page: &Dashboard<'_>) -> String {
    let content = format!(
        r#"{banner}
<section>
<h1>Groups</h1>
<p class="muted">Create, edit, or remove NAEI groups and trigger Supabase sync jobs.</p>
{create}
</section>
<section>
<h2>Existing groups <span class="muted">{total} total</span></h2>
{list}
</section>
<section id="audit-log">
<h2>Trigger group sync</h2>
{sync}
<h3>Recent activity</h3>
{audit}
</section>"#,
        banner = page.banner(),
        create = create_form(page),
        total = page.groups.len(),
        list = groups_list(page),
        sync = sync_form(page),
        audit = audit_log::render(page.audit_events),
    );
    dashboard_shell(page.display_name, &content)
}

fn code_options(codes: &[NfrCode], selected: Option<&str>, empty_label: &str) -> String {
    let mut options = format!(
        r#"<option value=""{}>{}</option>"#,
        if selected.is_none() { " selected" } else { "" },
        escape(empty_label)
    );
    for code in codes {
        let is_selected = selected == Some(code.nfr_code.as_str());
        options.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape(&code.nfr_code),
            if is_selected { " selected" } else { "" },
            escape(&code.label()),
        ));
    }
    // Keep a stored value that is no longer in the lookup table.
    if let Some(value) = selected {
        if !codes.iter().any(|c| c.nfr_code == value) {
            options.push_str(&format!(
                r#"<option value="{v}" selected>{v}</option>"#,
                v = escape(value)
            ));
        }
    }
    options
}

fn text_field(id: &str, name: &str, label: &str, value: &str, extra: &str) -> String {
    format!(
        r#"<div><label for="{id}">{label}</label><input id="{id}" name="{name}" value="{value}"{extra}></div>"#,
        value = escape(value),
    )
}

fn create_form(page: &Dashboard<'_>) -> String {
    format!(
        r#"<form class="card" method="post" action="/groups/create">
<div class="fields">
{title}
{source}
{activity}
<div><label for="NFRCode">NFR code</label><select id="NFRCode" name="NFRCode">{options}</select></div>
</div>
<div class="actions">{button}{feedback}</div>
</form>"#,
        title = text_field(
            "Group_Title",
            "Group_Title",
            "Group title",
            "",
            r#" required placeholder="Road transport""#
        ),
        source = text_field(
            "SourceName",
            "SourceName",
            "Source name",
            "",
            r#" placeholder="NAEI""#
        ),
        activity = text_field(
            "ActivityName",
            "ActivityName",
            "Activity name",
            "",
            r#" placeholder="Fuel combustion""#
        ),
        options = code_options(page.nfr_codes, None, "Select code (optional)"),
        button = submit_button("Create group", "Creating...", None),
        feedback = page.feedback_for(&FeedbackTarget::Create),
    )
}

fn groups_list(page: &Dashboard<'_>) -> String {
    if page.groups.is_empty() {
        return r#"<p class="card muted">No groups available yet. Create your first group to get started.</p>"#
            .to_string();
    }
    page.groups
        .iter()
        .map(|group| group_card(page, group))
        .collect::<Vec<_>>()
        .join("\n")
}

fn group_card(page: &Dashboard<'_>, group: &Group) -> String {
    let id = group.id;
    let last_updated = group
        .updated_at
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "Never".to_string());
    let confirm = format!("Delete group \"{}\"?", group.group_title);

    format!(
        r#"<article class="card" id="group-{id}">
<form method="post" action="/groups/update">
<input type="hidden" name="id" value="{id}">
<div class="fields">
{title}
{source}
{activity}
<div><label for="NFRCode_{id}">NFR code</label><select id="NFRCode_{id}" name="NFRCode">{options}</select></div>
</div>
<div class="actions">{save}<span class="muted">Last updated: {last_updated}</span>{update_feedback}</div>
</form>
<form method="post" action="/groups/delete" data-confirm="{confirm}">
<input type="hidden" name="id" value="{id}">
<div class="actions">{delete}{delete_feedback}</div>
</form>
</article>"#,
        title = text_field(
            &format!("Group_Title_{id}"),
            "Group_Title",
            "Group title",
            &group.group_title,
            " required"
        ),
        source = text_field(
            &format!("SourceName_{id}"),
            "SourceName",
            "Source name",
            group.source_name.as_deref().unwrap_or_default(),
            ""
        ),
        activity = text_field(
            &format!("ActivityName_{id}"),
            "ActivityName",
            "Activity name",
            group.activity_name.as_deref().unwrap_or_default(),
            ""
        ),
        options = code_options(page.nfr_codes, group.nfr_code.as_deref(), "Not assigned"),
        save = submit_button("Save changes", "Saving...", None),
        last_updated = escape(&last_updated),
        update_feedback = page.feedback_for(&FeedbackTarget::Update(Some(id))),
        confirm = escape(&confirm),
        delete = submit_button("Delete", "Deleting...", Some("danger")),
        delete_feedback = page.feedback_for(&FeedbackTarget::Delete(Some(id))),
    )
}

fn sync_form(page: &Dashboard<'_>) -> String {
    format!(
        r#"<form class="card" method="post" action="/groups/sync">
<label for="rpc_name">RPC function name</label>
<input id="rpc_name" name="rpc_name" value="{rpc}">
<p class="muted">Update only if your Supabase function uses a different identifier.</p>
<div class="actions">{button}{feedback}</div>
</form>"#,
        rpc = escape(page.default_rpc_name),
        button = submit_button("Run sync", "Triggering...", None),
        feedback = page.feedback_for(&FeedbackTarget::Sync),
    )
}
