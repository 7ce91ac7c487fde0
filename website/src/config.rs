use serde::Deserialize;
use std::env;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub api_url: String,

    /// Whether the extended role registry is active, drives the richer
    /// role picker in the members table
    pub extended_roles: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Config {
    pub fn build() -> Self {
        // Build the config from ENV vars
        let port = env::var("PORT")
            .expect("PORT is required")
            .parse::<u16>()
            .expect("PORT must be a valid u16");

        let api_url = env::var("API_URL").expect("API_URL is required");

        let mut extended_roles = false;
        if let Ok(flag) = env::var("EXTENDED_ROLES_ENABLED") {
            extended_roles = &flag == "1";
        }

        // Validate config values
        if api_url.is_empty() {
            panic!("API_URL is required");
        }

        if port == 0 {
            panic!("PORT is required");
        }

        Config {
            server: ServerConfig { port },
            api_url,
            extended_roles,
        }
    }
}
