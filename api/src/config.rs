use serde::Deserialize;
use snafu::ensure;
use std::collections::HashSet;
use std::env;

use crate::Result;
use crate::error::ConfigSnafu;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub jwt_secret: String,
    pub server: ServerConfig,
    pub db: DbConfig,
    pub users: UsersConfig,
    pub access_control: AccessControlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// Logins suppressed from listings for non-admin viewers
    pub hidden_users: HashSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessControlConfig {
    /// Allows per-row metadata enrichment when a caller requests it
    pub enabled: bool,

    /// Mounts the extended role registry endpoints
    pub extended_roles: bool,
}

impl Config {
    pub fn build() -> Result<Self> {
        // Build the config from ENV vars
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET is required");
        let port = env::var("PORT")
            .expect("PORT is required")
            .parse::<u16>()
            .expect("PORT must be a valid u16");
        let db_url = env::var("DATABASE_URL").expect("DATABASE_URL is required");

        let hidden_users: HashSet<String> = env::var("HIDDEN_USERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Validate config values
        ensure!(
            !jwt_secret.is_empty(),
            ConfigSnafu {
                msg: "Jwt secret is required.".to_string()
            }
        );

        ensure!(
            !db_url.is_empty(),
            ConfigSnafu {
                msg: "Database URL is required.".to_string()
            }
        );

        ensure!(
            port > 0,
            ConfigSnafu {
                msg: "Server port is required.".to_string()
            }
        );

        Ok(Config {
            jwt_secret,
            server: ServerConfig { port },
            db: DbConfig { url: db_url },
            users: UsersConfig { hidden_users },
            access_control: AccessControlConfig {
                enabled: env_flag("ACCESS_CONTROL_ENABLED"),
                extended_roles: env_flag("EXTENDED_ROLES_ENABLED"),
            },
        })
    }
}

fn env_flag(name: &str) -> bool {
    match env::var(name) {
        Ok(val) => val == "1",
        Err(_) => false,
    }
}
