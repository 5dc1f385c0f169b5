use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub static_dir: PathBuf,
    pub index_file: String,
    pub admin: AdminCredentials,
    pub seed_sample_data: bool,
}

/// Placeholder login pair checked by `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = normalize_database_url(
            &lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://otaku_valley.db".to_string()),
        );
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("APP_PORT").or_else(|| lookup("PORT")) {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid port {p:?}: {e}"))?,
            None => 3000,
        };
        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);
        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "public".to_string()));
        let index_file = lookup("INDEX_FILE").unwrap_or_else(|| "OTAKU.html".to_string());

        let defaults = AdminCredentials::default();
        let admin = AdminCredentials {
            username: lookup("ADMIN_USERNAME").unwrap_or(defaults.username),
            password: lookup("ADMIN_PASSWORD").unwrap_or(defaults.password),
        };

        let seed_sample_data = lookup("SEED_SAMPLE_DATA")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            static_dir,
            index_file,
            admin,
            seed_sample_data,
        })
    }
}

/// Accepts plain file paths as well as `sqlite:` URLs.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite://{raw}")
    }
}
