use auth_service::Actor;
use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use datastore::Repository;
use domain::{CommentId, LikeTarget, ToggleState, TweetId, Video, VideoId};
use envelope::{ApiResponse, ApiResult, parse_id};
use std::sync::Arc;
use tracing::info;

/// Toggle the actor's like on `target` and describe the result
fn toggle(repo: &dyn Repository, actor: &Actor, target: LikeTarget) -> ApiResult<ApiResponse<ToggleState>> {
    let state = repo.toggle_like(actor.id(), target)?;
    info!(actor = %actor.0, ?target, ?state, "Like toggled");

    let verb = if state.is_added() { "liked" } else { "unliked" };
    Ok(ApiResponse::ok(
        ToggleState::from(state),
        format!("{} {verb} successfully", target.kind()),
    ))
}

async fn toggle_video_like(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleState>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;
    toggle(repo.as_ref(), &actor, LikeTarget::Video(video_id))
}

async fn toggle_comment_like(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleState>> {
    let comment_id: CommentId = parse_id(&comment_id, "comment id")?;
    toggle(repo.as_ref(), &actor, LikeTarget::Comment(comment_id))
}

async fn toggle_tweet_like(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleState>> {
    let tweet_id: TweetId = parse_id(&tweet_id, "tweet id")?;
    toggle(repo.as_ref(), &actor, LikeTarget::Tweet(tweet_id))
}

/// Handler listing the videos the actor has liked
async fn get_liked_videos(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let videos = repo.liked_videos(actor.id())?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}

/// Create the router for the like API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route("/likes/toggle/v/{video_id}", post(toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(toggle_tweet_like))
        .route("/likes/videos", get(get_liked_videos))
        .with_state(repo)
}
