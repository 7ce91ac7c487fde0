use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    Error, Result,
    ctx::Ctx,
    run::AppState,
    services::auth::authenticate_token,
};
use roster::actor::Actor;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Validates the auth token cookie but does not require its presence
pub async fn auth_middleware(
    state: State<AppState>,
    cookies: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = cookies
        .get(AUTH_TOKEN_COOKIE)
        .map(|c| c.value().to_string());

    // Allow ctx to be always present
    let mut ctx: Ctx = Ctx::new(Actor::default(), None);

    if let Some(token) = token {
        let result = authenticate_token(&state, &token).await;

        match result {
            Ok(actor) => {
                ctx = Ctx::new(actor, Some(token));
            }
            Err(err) => match err {
                Error::LoginRequired => {
                    // Allow passing through as unauthenticated
                }
                other => {
                    return other.into_response();
                }
            },
        };
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

pub async fn require_auth_middleware(
    ctx: Extension<Ctx>,
    req: Request,
    next: Next,
) -> Result<Response> {
    if !ctx.actor.is_authenticated() {
        return Err(Error::LoginRequired);
    }

    Ok(next.run(req).await)
}
