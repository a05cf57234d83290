//! HTTP router assembly: every service mounted under `/api/v1`, hosted media
//! under `/media`, plus the shared middleware stack.

use std::sync::Arc;

use auth_service::{TokenStore, authenticate};
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use datastore::Repository;
use envelope::{ApiError, ApiResponse};
use media_host::{MediaHost, UploadStaging};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use video_service::VideoState;

use crate::config::ServerConfig;

/// Long-lived collaborators shared by the request handlers
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub tokens: Arc<TokenStore>,
    pub media: Arc<dyn MediaHost>,
    pub staging: UploadStaging,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn healthcheck() -> ApiResponse<Health> {
    ApiResponse::ok(
        Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        "Service is healthy",
    )
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let repo = state.repo;

    // Bearer token required. Unknown paths still fall through to the 404 fallback.
    let protected = Router::new()
        .merge(comment_service::create_router(Arc::clone(&repo)))
        .merge(like_service::create_router(Arc::clone(&repo)))
        .merge(playlist_service::create_router(Arc::clone(&repo)))
        .merge(subscription_service::create_router(Arc::clone(&repo)))
        .merge(tweet_service::create_router(Arc::clone(&repo)))
        .merge(dashboard_service::create_router(Arc::clone(&repo)))
        .merge(
            video_service::create_router(VideoState {
                repo: Arc::clone(&repo),
                media: state.media,
                staging: state.staging,
            })
            // uploads only; JSON routes keep axum's default limit
            .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            authenticate,
        ));

    let api = Router::new()
        .route("/healthcheck", get(healthcheck))
        .merge(auth_service::create_router(state.tokens))
        .nest("/control", control_service::create_router(repo))
        .merge(protected);

    let router = Router::new()
        .nest("/api/v1", api)
        .nest_service("/media", ServeDir::new(&config.media_root))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http());

    if config.cors_allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
