use auth_service::Actor;
use axum::{Router, extract::State, routing::get};
use datastore::{Page, PageRequest, Repository, VideoQuery, VideoSort};
use domain::{ChannelStats, Video};
use envelope::{ApiQuery, ApiResponse, ApiResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideosParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_type: Option<String>,
}

/// Handler aggregating the actor's channel statistics
async fn get_channel_stats(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
) -> ApiResult<ApiResponse<ChannelStats>> {
    let stats = repo.channel_stats(actor.id())?;
    debug!(channel = %actor.0, ?stats, "Channel stats computed");
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

/// Handler listing every video of the actor's channel, unpublished ones included
async fn get_channel_videos(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    ApiQuery(params): ApiQuery<ChannelVideosParams>,
) -> ApiResult<ApiResponse<Page<Video>>> {
    let mut query = VideoQuery::new(actor.0);
    query.owner = Some(actor.0);
    query.sort = VideoSort::from_params(params.sort_by.as_deref(), params.sort_type.as_deref())?;
    query.page = PageRequest::from_params(params.page, params.limit)?;

    let videos = repo.list_videos(&query)?;
    Ok(ApiResponse::ok(videos, "Channel videos fetched successfully"))
}

/// Create the router for the channel dashboard
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route("/dashboard/stats", get(get_channel_stats))
        .route("/dashboard/videos", get(get_channel_videos))
        .with_state(repo)
}
