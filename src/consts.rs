pub mod naei_const {
    pub const GROUP_TABLE: &str = "NAEI_global_t_Group";
    pub const NFR_CODE_TABLE: &str = "NAEI_global_t_NFRCode";
    pub const AUDIT_EVENT_TABLE: &str = "audit_events";

    pub const DEFAULT_SYNC_FUNCTION: &str = "sync_naei_groups";
    pub const AUDIT_LOG_LIMIT: usize = 25;
}

pub mod route_const {
    pub const LOGIN_PATH: &str = "/login";
    pub const LOGOUT_PATH: &str = "/logout";
    pub const GROUPS_PATH: &str = "/groups";
    pub const SESSION_COOKIE: &str = "naei_session";
    pub const REFRESH_COOKIE: &str = "naei_refresh";
    pub const REFRESH_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;
}
