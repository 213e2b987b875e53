use axum::{
    Router,
    response::Redirect,
    routing::get,
};

use crate::{
    consts::route_const::GROUPS_PATH,
    errors::Result,
    routes::{auth_route::auth_router, groups_route::groups_router},
    state::AppState,
};

pub mod auth_route;
pub mod groups_route;

pub fn app_router(state: AppState) -> Result<Router> {
    Ok(Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_route))
        .merge(auth_router(&state.config)?)
        .merge(groups_router())
        .with_state(state))
}

pub async fn root_route() -> Redirect {
    Redirect::to(GROUPS_PATH)
}

pub async fn health_route() -> &'static str {
    "ok"
}
