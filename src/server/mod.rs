//! HTTP front end
//!
//! | Route | Discipline |
//! |-------|------------|
//! | `POST /spellcheck` | blocking: JSON in, ordered grammar errors out |
//! | `GET /links`, `POST /links` | decoupled: form submit, 303 to results |
//! | `GET /links/results` | single poll, HTML table or pending view |
//! | `GET /health` | liveness |

mod error;
mod routes;

pub use error::ApiError;

use crate::job::JobService;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub type AppState = Arc<JobService>;

/// Builds the application router
pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/spellcheck", post(routes::spellcheck))
        .route("/links", get(routes::link_form).post(routes::submit_links))
        .route("/links/results", get(routes::link_results))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serves the router until the process is stopped
pub async fn serve(addr: SocketAddr, service: AppState) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
