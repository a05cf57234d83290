use auth_service::Actor;
use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch},
};
use datastore::{Page, PageRequest, Repository};
use domain::{Comment, CommentId, VideoId};
use envelope::{ApiJson, ApiQuery, ApiResponse, ApiResult, non_blank, parse_id};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct CommentListParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Request body for adding or editing a comment
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Handler listing the comments of a video, newest first
async fn get_video_comments(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(video_id): Path<String>,
    ApiQuery(params): ApiQuery<CommentListParams>,
) -> ApiResult<ApiResponse<Page<Comment>>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;
    let page = PageRequest::from_params(params.page, params.limit)?;

    let comments = repo.list_video_comments(actor.id(), &video_id, page)?;
    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

/// Handler adding a comment to a video
async fn add_comment(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(video_id): Path<String>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;
    let content = non_blank(request.content, "Comment content is required")?;

    let comment = repo.insert_comment(Comment::new(video_id, actor.0, content))?;
    info!(comment_id = %comment.id, video_id = %video_id, "Comment added");

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

async fn update_comment(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(comment_id): Path<String>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment_id: CommentId = parse_id(&comment_id, "comment id")?;
    let content = non_blank(request.content, "Comment content is required")?;

    let comment = repo.update_comment(actor.id(), &comment_id, content)?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

async fn delete_comment(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let comment_id: CommentId = parse_id(&comment_id, "comment id")?;

    repo.delete_comment(actor.id(), &comment_id)?;
    info!(comment_id = %comment_id, "Comment deleted");

    Ok(ApiResponse::ok((), "Comment deleted successfully"))
}

/// Create the router for the comment API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route(
            "/comments/{video_id}",
            get(get_video_comments).post(add_comment),
        )
        .route(
            "/comments/c/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
        .with_state(repo)
}
