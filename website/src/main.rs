use std::process;
use tracing::{error, info};

use crate::config::Config;

mod config;
mod ctx;
mod error;
mod models;
mod run;
mod services;
mod web;

// Re-export error types for convenience
pub use error::{Error, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    if let Err(_) = dotenvy::dotenv() {
        info!("No .env file found, using existing environment variables instead.");
    }

    let config = Config::build();

    if let Err(e) = run::run(config).await {
        error!("{}", e);
        process::exit(1);
    }
}
