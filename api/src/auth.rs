use snafu::{ResultExt, ensure};

use crate::error::{DbSnafu, InvalidAuthTokenSnafu};
use crate::token::verify_auth_token;
use crate::{Result, state::AppState};
use roster::actor::Actor;

/// Turns a bearer token into an actor, rejecting tokens whose org or user
/// no longer exists.
pub async fn authenticate_token(state: &AppState, token: &str) -> Result<Actor> {
    let payload = verify_auth_token(token, &state.config.jwt_secret)?;

    let org = state.db.orgs.get(payload.org_id).await.context(DbSnafu)?;
    ensure!(org.is_some(), InvalidAuthTokenSnafu);

    let user = state.db.users.get(payload.id).await.context(DbSnafu)?;
    ensure!(user.is_some(), InvalidAuthTokenSnafu);

    Ok(Actor::new(payload))
}
