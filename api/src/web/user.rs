use axum::Extension;
use snafu::OptionExt;

use crate::{Result, error::RequiresAuthSnafu, web::response::JsonResponse};
use roster::actor::Actor;

/// The actor behind the current token, as seen by the API.
pub async fn current_user_handler(actor: Extension<Actor>) -> Result<JsonResponse> {
    let dto = actor.actor.clone().context(RequiresAuthSnafu)?;

    Ok(JsonResponse::json(&dto))
}
