use std::sync::Arc;

use crate::{
    audit::{AuditSink, SupabaseAuditSink},
    config::AppConfig,
    platform::{Platform, supabase::SupabaseClient},
};

#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn Platform>,
    pub audit: Arc<dyn AuditSink>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// User calls go out with the anon key; the audit sink gets its own
    /// client holding the service-role key.
    pub fn init(config: AppConfig) -> Self {
        let platform = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key);
        let service = SupabaseClient::new(
            &config.supabase_url,
            &config.supabase_service_role_key,
        );

        Self::new(
            Arc::new(platform),
            Arc::new(SupabaseAuditSink::new(service)),
            config,
        )
    }

    pub fn new(platform: Arc<dyn Platform>, audit: Arc<dyn AuditSink>, config: AppConfig) -> Self {
        Self {
            platform,
            audit,
            config: Arc::new(config),
        }
    }
}
