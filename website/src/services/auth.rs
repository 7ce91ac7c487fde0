use snafu::ResultExt;

use crate::error::{HttpClientSnafu, HttpResponseParseSnafu};
use crate::run::AppState;
use crate::{Error, Result};
use roster::actor::{Actor, ActorDto};

/// Resolves a token to an actor via the API, memoized per token.
pub async fn authenticate_token(state: &AppState, token: &str) -> Result<Actor> {
    if let Some(actor) = state.auth_cache.get(token) {
        return Ok(actor);
    }

    let url = format!("{}/api/user", &state.config.api_url);
    let response = state
        .client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .context(HttpClientSnafu {
            msg: "Unable to verify session. Try again later.".to_string(),
        })?;

    if !response.status().is_success() {
        return Err(Error::LoginRequired);
    }

    let dto = response
        .json::<ActorDto>()
        .await
        .context(HttpResponseParseSnafu {
            msg: "Unable to parse session information.",
        })?;

    let actor = Actor { actor: Some(dto) };
    state.auth_cache.insert(token.to_string(), actor.clone());

    Ok(actor)
}
