//! Environment-driven configuration.
//!
//! Sources, highest priority first:
//! 1. `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_SERVICE_ROLE_KEY`
//! 2. `NAEI_*` variables (`NAEI_GROUP_SYNC_FUNCTION`, `NAEI_BIND_ADDR`, `NAEI_LOGIN_BURST`)
//! 3. Built-in defaults
//!
//! [`AppConfig::load_with_dotenv`] reads a `.env` file first, if one exists.

use std::fmt;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::naei_const::DEFAULT_SYNC_FUNCTION;

const SECRET_VARS: [&str; 3] = [
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "SUPABASE_SERVICE_ROLE_KEY",
];
const NAEI_VARS: [&str; 3] = ["GROUP_SYNC_FUNCTION", "BIND_ADDR", "LOGIN_BURST"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Missing environment variable {0}. Please set SUPABASE_URL, SUPABASE_ANON_KEY and SUPABASE_SERVICE_ROLE_KEY."
    )]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub group_sync_function: String,
    pub bind_addr: String,
    pub login_burst: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            group_sync_function: DEFAULT_SYNC_FUNCTION.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            login_burst: 5,
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[redacted]")
            .field("supabase_service_role_key", &"[redacted]")
            .field("group_sync_function", &self.group_sync_function)
            .field("bind_addr", &self.bind_addr)
            .field("login_burst", &self.login_burst)
            .finish()
    }
}

impl AppConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("NAEI_").only(&NAEI_VARS))
            .merge(Env::raw().only(&SECRET_VARS))
    }

    /// Loads from the process environment and checks the required secrets.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract().map_err(Box::new)?;
        config.validated()
    }

    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env is fine, the variables may come from the environment.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.supabase_url = required(self.supabase_url, "SUPABASE_URL")?;
        self.supabase_anon_key = required(self.supabase_anon_key, "SUPABASE_ANON_KEY")?;
        self.supabase_service_role_key =
            required(self.supabase_service_role_key, "SUPABASE_SERVICE_ROLE_KEY")?;

        self.supabase_url = self.supabase_url.trim_end_matches('/').to_string();
        let sync_function = self.group_sync_function.trim();
        self.group_sync_function = if sync_function.is_empty() {
            DEFAULT_SYNC_FUNCTION.to_string()
        } else {
            sync_function.to_string()
        };

        Ok(self)
    }
}

fn required(value: String, var: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(var));
    }
    Ok(value.to_string())
}
