//! HTTP triggers for the pipeline jobs.

mod cors;
mod error;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app::{App, FetchNewsReport};
use crate::error::Result;
use crate::pipeline::digest::parse_digest_date;
use crate::pipeline::DigestReport;

pub use cors::create_cors_layer;
pub use error::ApiError;

type SharedApp = Arc<App>;

pub fn create_router(app: SharedApp) -> Router {
    let cors = create_cors_layer(&app.config.cors_origins);

    Router::new()
        .route("/functions/v1/fetch-news", post(fetch_news))
        .route("/functions/v1/generate-digest", post(generate_digest))
        .route("/api/cron/fetch-news", get(cron_fetch_news))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

pub async fn serve(app: App, bind: &str) -> Result<()> {
    let router = create_router(Arc::new(app));
    let listener = TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn fetch_news(
    State(app): State<SharedApp>,
) -> std::result::Result<Json<FetchNewsReport>, ApiError> {
    Ok(Json(app.fetch_news().await?))
}

#[derive(Debug, Default, Deserialize)]
struct DigestRequest {
    date: Option<String>,
}

/// A missing or non-JSON body means "latest day".
async fn generate_digest(
    State(app): State<SharedApp>,
    body: Bytes,
) -> std::result::Result<Json<DigestReport>, ApiError> {
    let request: DigestRequest = serde_json::from_slice(&body).unwrap_or_default();
    let date = request.date.as_deref().map(parse_digest_date).transpose()?;
    Ok(Json(app.build_digest(date).await?))
}

#[derive(Debug, Serialize)]
struct CronResponse {
    success: bool,
    data: FetchNewsReport,
}

async fn cron_fetch_news(
    State(app): State<SharedApp>,
    headers: HeaderMap,
) -> std::result::Result<Json<CronResponse>, ApiError> {
    if !is_authorized(&headers, app.config.cron_secret.as_deref()) {
        tracing::warn!("Rejected cron request without a valid bearer token");
        return Err(ApiError::unauthorized());
    }

    let data = app.fetch_news().await?;
    Ok(Json(CronResponse {
        success: true,
        data,
    }))
}

/// Without a configured secret nothing is authorized.
fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == secret)
}
