use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{body::Body, response::Response};
use serde::Deserialize;
use snafu::{Backtrace, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Login required."))]
    LoginRequired,

    #[snafu(display("{}", msg))]
    Forbidden { msg: String },

    #[snafu(display("{}", msg))]
    BadRequest { msg: String },

    #[snafu(display("{}", msg))]
    Validation { msg: String },

    #[snafu(display("Organization member not found."))]
    OrgUserNotFound,

    #[snafu(display("{}", msg))]
    HttpClient {
        msg: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}", msg))]
    HttpResponseParse {
        msg: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}", msg))]
    Service { msg: String },

    #[snafu(display("Unable to render page"))]
    Template {
        source: askama::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to build response"))]
    ResponseBuilder {
        source: axum::http::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}", msg))]
    Whatever { msg: String },
}

// Allow string slices to be converted to Error
impl From<&str> for Error {
    fn from(val: &str) -> Self {
        Self::Whatever {
            msg: val.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(val: String) -> Self {
        Self::Whatever { msg: val }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub status_code: StatusCode,
    pub message: String,
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        let status_code = match err {
            Error::LoginRequired => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::OrgUserNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ErrorInfo {
            status_code,
            message: format!("{}", err),
        }
    }
}

/// Error body returned by the API service.
#[derive(Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response<Body> {
        let info = ErrorInfo::from(&self);

        Response::builder()
            .status(info.status_code)
            .header("Content-Type", "text/html")
            .body(Body::from(format!(
                "<div class=\"error-message\">{}</div>",
                info.message
            )))
            .unwrap()
    }
}
