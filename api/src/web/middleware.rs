use axum::{
    Extension,
    body::Body,
    extract::{Path, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use snafu::{OptionExt, ResultExt, ensure};

use crate::{
    Result,
    auth::authenticate_token,
    error::{DbSnafu, InvalidAuthTokenSnafu, NotFoundSnafu, RequiresAuthSnafu},
    state::AppState,
    web::params::OrgParams,
};
use roster::actor::Actor;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>> {
    // Middleware to extract actor information from the request
    // Do not enforce authentication here, just extract the actor information
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    // Start with an empty actor
    let mut actor: Actor = Actor::default();

    if let Some(auth_header) = auth_header {
        // At this point, authentication must be verified
        ensure!(auth_header.starts_with("Bearer "), InvalidAuthTokenSnafu);
        let token = auth_header.replace("Bearer ", "");

        actor = authenticate_token(&state, &token).await?;
    }

    // Forward to the next middleware/handler passing the actor information
    request.extensions_mut().insert(actor);

    let response = next.run(request).await;
    Ok(response)
}

pub async fn require_auth_middleware(
    actor: Extension<Actor>,
    request: Request,
    next: Next,
) -> Result<Response<Body>> {
    ensure!(actor.is_authenticated(), RequiresAuthSnafu);

    Ok(next.run(request).await)
}

pub async fn org_middleware(
    State(state): State<AppState>,
    Path(params): Path<OrgParams>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>> {
    let doc = state.db.orgs.get(params.org_id).await.context(DbSnafu)?;
    let doc = doc.context(NotFoundSnafu {
        msg: "Organization not found",
    })?;

    // Forward to the next middleware/handler passing the org information
    request.extensions_mut().insert(doc);
    let response = next.run(request).await;
    Ok(response)
}
