use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, header::ACCEPT},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::{
    actions::{ActionState, groups},
    consts::{
        naei_const::AUDIT_LOG_LIMIT,
        route_const::{GROUPS_PATH, LOGIN_PATH},
    },
    errors::{Error, Result},
    middleware::CurrentSession,
    models::user::Principal,
    platform::PlatformResult,
    state::AppState,
    utils::form::{FormFields, parse_id},
    views::groups::{Dashboard, Feedback, FeedbackTarget, render},
};

pub fn groups_router() -> Router<AppState> {
    Router::new()
        .route(GROUPS_PATH, get(groups_page))
        .route("/groups/create", post(create_group))
        .route("/groups/update", post(update_group))
        .route("/groups/delete", post(delete_group))
        .route("/groups/sync", post(sync_groups))
}

pub async fn groups_page(State(state): State<AppState>, session: CurrentSession) -> Response {
    let Some(principal) = &session.principal else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    session.attach(render_dashboard(&state, principal, None).await)
}

async fn render_dashboard(
    state: &AppState,
    principal: &Principal,
    feedback: Option<Feedback>,
) -> Html<String> {
    let platform = state.platform.as_ref();
    let (groups, nfr_codes, audit_events) = tokio::join!(
        platform.list_groups(principal),
        platform.list_nfr_codes(principal),
        platform.list_audit_events(principal, AUDIT_LOG_LIMIT),
    );

    let groups = rows_or_empty("groups", groups);
    let nfr_codes = rows_or_empty("nfr codes", nfr_codes);
    let audit_events = rows_or_empty("audit events", audit_events);
    let display_name = principal.display_name();

    Html(render(&Dashboard {
        display_name: &display_name,
        groups: &groups,
        nfr_codes: &nfr_codes,
        audit_events: &audit_events,
        default_rpc_name: &state.config.group_sync_function,
        feedback: feedback.as_ref(),
    }))
}

fn rows_or_empty<T>(what: &str, rows: PlatformResult<Vec<T>>) -> Vec<T> {
    rows.unwrap_or_else(|err| {
        warn!("failed to load {what}: {err}");
        Vec::new()
    })
}

#[derive(Debug, Clone, Copy)]
enum GroupAction {
    Create,
    Update,
    Delete,
    Sync,
}

impl GroupAction {
    fn target(self, fields: Option<&FormFields>) -> FeedbackTarget {
        let id = fields.and_then(|fields| parse_id(fields).ok());
        match self {
            GroupAction::Create => FeedbackTarget::Create,
            GroupAction::Update => FeedbackTarget::Update(id),
            GroupAction::Delete => FeedbackTarget::Delete(id),
            GroupAction::Sync => FeedbackTarget::Sync,
        }
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

/// Runs one action and answers with its state: JSON for API callers,
/// otherwise the refetched dashboard with the feedback inline.
async fn handle(
    state: AppState,
    session: Result<CurrentSession>,
    headers: HeaderMap,
    form: core::result::Result<Form<FormFields>, FormRejection>,
    action: GroupAction,
) -> Response {
    let fields = form.map(|Form(fields)| fields).map_err(Error::from);
    let session = match session {
        Ok(session) => session,
        Err(err) => {
            warn!("session lookup failed: {err}");
            return respond_without_page(&headers, ActionState::from(&err));
        }
    };
    let principal = session.principal.as_ref();

    // The session is checked before the body, so a signed-out caller always
    // gets the action's sign-in message.
    let result = match (principal, &fields) {
        (Some(_), Err(err)) => ActionState::from(err),
        (_, fields) => {
            let empty = FormFields::new();
            let fields = fields.as_ref().unwrap_or(&empty);
            match action {
                GroupAction::Create => groups::create_group(&state, principal, fields).await,
                GroupAction::Update => groups::update_group(&state, principal, fields).await,
                GroupAction::Delete => groups::delete_group(&state, principal, fields).await,
                GroupAction::Sync => groups::sync_groups(&state, principal, fields).await,
            }
        }
    };

    if wants_json(&headers) {
        return session.attach(Json(result));
    }
    let Some(principal) = principal else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let feedback = Feedback {
        target: action.target(fields.as_ref().ok()),
        state: result,
    };
    session.attach(render_dashboard(&state, principal, Some(feedback)).await)
}

fn respond_without_page(headers: &HeaderMap, result: ActionState) -> Response {
    if wants_json(headers) {
        Json(result).into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

pub async fn create_group(
    State(state): State<AppState>,
    session: Result<CurrentSession>,
    headers: HeaderMap,
    form: core::result::Result<Form<FormFields>, FormRejection>,
) -> Response {
    handle(state, session, headers, form, GroupAction::Create).await
}

pub async fn update_group(
    State(state): State<AppState>,
    session: Result<CurrentSession>,
    headers: HeaderMap,
    form: core::result::Result<Form<FormFields>, FormRejection>,
) -> Response {
    handle(state, session, headers, form, GroupAction::Update).await
}

pub async fn delete_group(
    State(state): State<AppState>,
    session: Result<CurrentSession>,
    headers: HeaderMap,
    form: core::result::Result<Form<FormFields>, FormRejection>,
) -> Response {
    handle(state, session, headers, form, GroupAction::Delete).await
}

pub async fn sync_groups(
    State(state): State<AppState>,
    session: Result<CurrentSession>,
    headers: HeaderMap,
    form: core::result::Result<Form<FormFields>, FormRejection>,
) -> Response {
    handle(state, session, headers, form, GroupAction::Sync).await
}
