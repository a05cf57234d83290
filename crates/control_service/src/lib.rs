use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use datastore::Repository;
use domain::{UserId, Video, VideoDraft, VideoId};
use envelope::{ApiError, ApiJson, ApiResponse, ApiResult, non_blank, parse_id, provided};
use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Request body for seeding a video whose media is already hosted.
/// Missing title and description are filled with generated text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedVideoRequest {
    /// Owning channel; a fresh id is generated when absent
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub video_file: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// Handler inserting a video record directly
async fn seed_video(
    State(repo): State<Arc<dyn Repository>>,
    ApiJson(request): ApiJson<SeedVideoRequest>,
) -> ApiResult<ApiResponse<Video>> {
    let owner = match provided(request.owner) {
        Some(raw) => parse_id::<UserId>(&raw, "owner id")?,
        None => UserId::new(),
    };
    let duration = request.duration.unwrap_or(0.0);
    if !duration.is_finite() || duration < 0.0 {
        return Err(ApiError::Validation(
            "duration must be a non-negative number of seconds".to_string(),
        ));
    }

    let mut video = Video::publish(
        owner,
        VideoDraft {
            video_file: non_blank(request.video_file, "videoFile is required")?,
            thumbnail: non_blank(request.thumbnail, "thumbnail is required")?,
            title: provided(request.title).unwrap_or_else(|| Sentence(3..7).fake()),
            description: provided(request.description).unwrap_or_else(|| Paragraph(1..3).fake()),
            duration,
        },
    );
    video.views = request.views.unwrap_or(0);
    video.is_published = request.is_published.unwrap_or(true);

    let video = repo.insert_video(video)?;
    info!(video_id = %video.id, owner = %video.owner, "Video seeded");

    Ok(ApiResponse::created(video, "Video seeded successfully"))
}

/// Handler counting one view of a video
async fn record_view(
    State(repo): State<Arc<dyn Repository>>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;
    let video = repo.record_view(&video_id)?;
    Ok(ApiResponse::ok(video, "View recorded"))
}

/// Create the router for the control API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route("/videos", post(seed_video))
        .route("/videos/{video_id}/views", post(record_view))
        .with_state(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use datastore::InMemoryRepository;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn post_json(repo: Arc<InMemoryRepository>, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |json| Body::from(json.to_string())))
            .unwrap();

        let response = create_router(repo).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_seed_video() {
        let repo = Arc::new(InMemoryRepository::new());
        let owner = UserId::new();

        let (status, body) = post_json(
            Arc::clone(&repo),
            "/videos",
            Some(json!({
                "owner": owner.to_string(),
                "videoFile": "https://cdn.test/videos/a.mp4",
                "thumbnail": "https://cdn.test/thumbnails/a.png",
                "title": "Seeded",
                "duration": 12.0,
                "views": 7,
                "isPublished": false,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["title"], "Seeded");
        assert_eq!(body["data"]["views"], 7);
        assert_eq!(body["data"]["isPublished"], false);
        assert!(!body["data"]["description"].as_str().unwrap().is_empty());

        let stats = repo.channel_stats(&owner).unwrap();
        assert_eq!(stats.total_videos, 1);
        assert_eq!(stats.total_views, 7);
    }

    #[tokio::test]
    async fn test_seed_requires_locators() {
        let repo = Arc::new(InMemoryRepository::new());
        let (status, body) = post_json(repo, "/videos", Some(json!({ "thumbnail": "t.png" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "videoFile is required");
    }

    #[tokio::test]
    async fn test_seed_rejects_negative_duration() {
        let repo = Arc::new(InMemoryRepository::new());
        let (status, _) = post_json(
            repo,
            "/videos",
            Some(json!({ "videoFile": "v.mp4", "thumbnail": "t.png", "duration": -1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_record_view_increments() {
        let repo = Arc::new(InMemoryRepository::new());
        let (_, body) = post_json(
            Arc::clone(&repo),
            "/videos",
            Some(json!({ "videoFile": "v.mp4", "thumbnail": "t.png" })),
        )
        .await;
        let video_id = body["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/videos/{video_id}/views");

        post_json(Arc::clone(&repo), &uri, None).await;
        let (status, body) = post_json(Arc::clone(&repo), &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["views"], 2);

        let (status, _) = post_json(repo, &format!("/videos/{}/views", VideoId::new()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
