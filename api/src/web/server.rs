use axum::{Router, body::Body, middleware, response::Response};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::Result;
use crate::error::ErrorInfo;
use crate::state::AppState;
use crate::web::routes::all_routes;
use roster::dto::MessageDto;

/// The full router with the error mapper applied, also used by tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(all_routes(state))
        .layer(middleware::map_response(response_mapper))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_web_server(state: AppState) -> Result<()> {
    let port = state.config.server.port;

    let routes_all = app(state);

    // Setup the server
    // We will run behind a reverse proxy so we only bind to localhost
    let ip = "127.0.0.1";
    let addr = format!("{}:{}", ip, port);
    info!("HTTP server running on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("HTTP server stopped");

    Ok(())
}

async fn response_mapper(res: Response) -> Response {
    let error = res.extensions().get::<ErrorInfo>();
    if let Some(e) = error {
        let mut message = e.message.clone();
        if e.status_code.is_server_error() {
            // Log the detail, callers get a generic message
            error!("{}", e.message);
            if let Some(bt) = &e.backtrace {
                error!("{}", bt);
            }
            message = "Internal server error".to_string();
        }

        let body = MessageDto { message };

        return Response::builder()
            .status(e.status_code)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap();
    }
    res
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
