use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::chef::ChefService;
use crate::config::AppConfig;
use crate::models::{RecommendRequest, RecommendResponse};

#[derive(Clone)]
struct AppState {
    chef: ChefService,
}

pub fn router(chef: ChefService) -> Router {
    Router::new()
        .route("/recommend", post(recommend_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { chef })
}

pub async fn run_server(config: AppConfig, chef: ChefService) -> Result<()> {
    let app = router(chef);

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let response = state.chef.recommend(request).await.map_err(|err| {
        tracing::error!("recommendation failed: {:#}", err);
        ApiError::from(err)
    })?;
    Ok(Json(response))
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{value:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "detail": self.message });
        (self.status, Json(body)).into_response()
    }
}
