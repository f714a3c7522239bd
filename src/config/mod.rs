use rust_decimal::Decimal;
use std::env;

use crate::models::SettingsDefaults;
use crate::tracker::PersistPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Storage (unset → in-memory store)
    pub database_url: Option<String>,
    pub run_migrations: bool,

    // Hosted auth backend
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_service_role_key: Option<String>,

    // New-user defaults
    pub default_capital: Decimal,
    pub default_entry: Decimal,
    pub default_target: Decimal,

    pub persist_policy: PersistPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            database_url: non_empty("DATABASE_URL"),
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),

            supabase_url: non_empty("SUPABASE_URL"),
            supabase_anon_key: non_empty("SUPABASE_ANON_KEY"),
            supabase_service_role_key: non_empty("SUPABASE_SERVICE_ROLE_KEY"),

            default_capital: decimal_or("DEFAULT_CAPITAL", 100),
            default_entry: decimal_or("DEFAULT_ENTRY", 5),
            default_target: decimal_or("DEFAULT_TARGET", 6),

            persist_policy: PersistPolicy::from_str(
                &env::var("PERSIST_POLICY").unwrap_or_else(|_| "best_effort".into()),
            ),
        })
    }

    /// Returns true if the elevated credential for user provisioning is configured.
    pub fn has_service_role_key(&self) -> bool {
        self.supabase_service_role_key.is_some()
    }

    /// Without a hosted auth backend the service runs against in-process
    /// identities.
    pub fn is_preview_mode(&self) -> bool {
        self.supabase_url.is_none() || self.supabase_anon_key.is_none()
    }

    pub fn settings_defaults(&self) -> SettingsDefaults {
        SettingsDefaults {
            capital: self.default_capital,
            entry: self.default_entry,
            target: self.default_target,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn decimal_or(key: &str, default: i64) -> Decimal {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Decimal::from(default))
}
