use std::env;

/// Hosts whose traffic is redirected to the gateway
pub const DEFAULT_LEGACY_HOSTS: &[&str] = &["app.base44.com", "base44.app", "app--preview.base44.app"];
/// Functions emulator base used when the page is served from a loopback host
pub const DEFAULT_EMULATOR_BASE: &str = "http://localhost:5001";
/// Deployed functions host
pub const DEFAULT_PRODUCTION_BASE: &str = "https://us-central1-life-app-db4fd.cloudfunctions.net";
pub const DEFAULT_IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub database_url: String,
    /// Enables the universal emulator credential. Never set in production.
    pub dev_mode: bool,
    pub identity_api_key: Option<String>,
    pub identity_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/compat.db".to_string()),
            dev_mode: env_flag("FUNCTIONS_EMULATOR") || env_flag("DEV_MODE"),
            identity_api_key: env::var("IDENTITY_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            identity_base_url: env::var("IDENTITY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_BASE.to_string()),
        }
    }
}

/// Settings for the client-side URL interceptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptorConfig {
    pub legacy_hosts: Vec<String>,
    pub emulator_base: String,
    pub production_base: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            legacy_hosts: DEFAULT_LEGACY_HOSTS.iter().map(|h| h.to_string()).collect(),
            emulator_base: DEFAULT_EMULATOR_BASE.to_string(),
            production_base: DEFAULT_PRODUCTION_BASE.to_string(),
        }
    }
}

impl InterceptorConfig {
    /// Defaults, overridden by `LEGACY_HOSTS` (comma separated),
    /// `EMULATOR_BASE_URL` and `PRODUCTION_BASE_URL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(hosts) = env::var("LEGACY_HOSTS") {
            let hosts = parse_host_list(&hosts);
            if !hosts.is_empty() {
                config.legacy_hosts = hosts;
            }
        }
        if let Ok(base) = env::var("EMULATOR_BASE_URL") {
            config.emulator_base = base;
        }
        if let Ok(base) = env::var("PRODUCTION_BASE_URL") {
            config.production_base = base;
        }
        config
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}
