pub mod access_control;
pub mod auth;
pub mod org_users;

pub use access_control::*;
pub use org_users::*;

use reqwest::StatusCode;
use snafu::ResultExt;

use crate::{
    Error, Result,
    error::{ErrorResponse, HttpResponseParseSnafu},
};

pub async fn handle_response_error(
    response: reqwest::Response,
    resource: &str,
    not_found: Error,
) -> Error {
    // Assumes that ok responses are already handled
    match response.status() {
        StatusCode::BAD_REQUEST => {
            let message_res = parse_response_error(response).await;
            match message_res {
                Ok(msg) => Error::BadRequest { msg },
                Err(_) => Error::BadRequest {
                    msg: "Bad Request.".to_string(),
                },
            }
        }
        StatusCode::UNAUTHORIZED => Error::LoginRequired,
        StatusCode::FORBIDDEN => Error::Forbidden {
            msg: format!("You have no permissions to manage {}", resource),
        },
        StatusCode::NOT_FOUND => not_found,
        _ => Error::Service {
            msg: "Service error. Try again later.".to_string(),
        },
    }
}

pub async fn parse_response_error(response: reqwest::Response) -> Result<String> {
    let json = response
        .json::<ErrorResponse>()
        .await
        .context(HttpResponseParseSnafu {
            msg: "Unable to parse error response.",
        })?;

    Ok(json.message)
}
