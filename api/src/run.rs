use std::sync::Arc;

use db::create_db_mapper;

use crate::{Result, config::Config, state::AppState, web::server::run_web_server};

pub async fn run_server(config: Config) -> Result<()> {
    let db = Arc::new(create_db_mapper(&config.db.url));

    let state = AppState { config, db };

    run_web_server(state).await?;

    Ok(())
}
