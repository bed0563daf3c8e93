use crate::handlers::{self, AppState};
use axum::routing::get;
use axum::Router;
use livematch_state::{LiveStateProjector, MatchHistoryStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP façade over the tracker state.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub fn new(projector: Arc<LiveStateProjector>, store: Arc<MatchHistoryStore>) -> Self {
        Self {
            state: AppState { projector, store },
        }
    }

    /// Builds the router with all routes.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/state", get(handlers::get_state))
            .route("/internalstate", get(handlers::get_internal_state))
            .route("/matchhistory/:id", get(handlers::get_match_history))
            .with_state(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
