use auth_service::Actor;
use axum::{
    Router,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    routing::{get, patch},
};
use datastore::{Page, PageRequest, Repository, StoreError, VideoPatch, VideoQuery, VideoSort};
use domain::{UserId, Video, VideoDraft, VideoId};
use envelope::{ApiError, ApiQuery, ApiResponse, ApiResult, non_blank, parse_id, provided};
use media_host::{HostedMedia, MediaError, MediaHost, MediaKind, StagedUpload, UploadStaging};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state of the video routes
#[derive(Clone)]
pub struct VideoState {
    pub repo: Arc<dyn Repository>,
    pub media: Arc<dyn MediaHost>,
    pub staging: UploadStaging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Free-text search over title and description
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl VideoListParams {
    fn into_query(self, viewer: UserId) -> ApiResult<VideoQuery> {
        let mut query = VideoQuery::new(viewer);
        query.text = provided(self.query);
        query.owner = provided(self.user_id)
            .map(|raw| parse_id::<UserId>(&raw, "user id"))
            .transpose()?;
        query.sort = VideoSort::from_params(self.sort_by.as_deref(), self.sort_type.as_deref())?;
        query.page = PageRequest::from_params(self.page, self.limit)?;
        Ok(query)
    }
}

/// Fields of a video upload form; files are already staged on disk
#[derive(Debug, Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    video_file: Option<StagedUpload>,
    thumbnail: Option<StagedUpload>,
}

fn malformed(err: MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed multipart body: {}", err.body_text()))
}

fn staging_failure(err: MediaError) -> ApiError {
    ApiError::Unexpected(format!("Failed to stage upload: {err}"))
}

/// Spool a file field to the staging directory. An empty part counts as no file.
async fn stage_field(staging: &UploadStaging, mut field: Field<'_>) -> ApiResult<Option<StagedUpload>> {
    let mut file = staging.begin(field.file_name()).map_err(staging_failure)?;
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        file.write(&chunk).await.map_err(staging_failure)?;
    }

    match file.finish().await {
        Ok(staged) => Ok(Some(staged)),
        Err(MediaError::Rejected(_)) => Ok(None),
        Err(err) => Err(staging_failure(err)),
    }
}

async fn read_form(
    staging: &UploadStaging,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<VideoForm> {
    let mut multipart = multipart.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let mut form = VideoForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(malformed)?),
            "description" => form.description = Some(field.text().await.map_err(malformed)?),
            "videoFile" => form.video_file = stage_field(staging, field).await?,
            "thumbnail" => form.thumbnail = stage_field(staging, field).await?,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(form)
}

async fn upload(media: &dyn MediaHost, staged: &StagedUpload, kind: MediaKind) -> ApiResult<HostedMedia> {
    let hosted = media
        .upload(staged.path(), kind)
        .await
        .map_err(|err| ApiError::Upstream(format!("Failed to upload {}: {err}", kind.dir_name())))?;
    debug!(url = %hosted.url, size = staged.size(), "Media uploaded");
    Ok(hosted)
}

/// Handler listing videos with search, owner filter, sorting and pagination
async fn get_all_videos(
    State(state): State<VideoState>,
    actor: Actor,
    ApiQuery(params): ApiQuery<VideoListParams>,
) -> ApiResult<ApiResponse<Page<Video>>> {
    let query = params.into_query(actor.0)?;
    let videos = state.repo.list_videos(&query)?;
    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}

/// Handler publishing a new video from a multipart form
async fn publish_video(
    State(state): State<VideoState>,
    actor: Actor,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let form = read_form(&state.staging, multipart).await?;

    let title = non_blank(form.title, "Title is required")?;
    let description = non_blank(form.description, "Description is required")?;
    let video_file = form
        .video_file
        .ok_or_else(|| ApiError::Validation("No video file provided".to_string()))?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| ApiError::Validation("No thumbnail provided".to_string()))?;

    let hosted_video = upload(state.media.as_ref(), &video_file, MediaKind::Video).await?;
    let hosted_thumbnail = upload(state.media.as_ref(), &thumbnail, MediaKind::Thumbnail).await?;

    let video = state.repo.insert_video(Video::publish(
        actor.0,
        VideoDraft {
            video_file: hosted_video.url,
            thumbnail: hosted_thumbnail.url,
            title,
            description,
            duration: hosted_video.duration.unwrap_or(0.0),
        },
    ))?;
    info!(video_id = %video.id, owner = %video.owner, "Video published");

    Ok(ApiResponse::created(video, "Video published successfully"))
}

async fn get_video_by_id(
    State(state): State<VideoState>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;

    let video = state.repo.get_video(&video_id)?;
    if !video.is_visible_to(actor.id()) {
        return Err(StoreError::not_found("Video").into());
    }
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Handler editing title, description or thumbnail; absent fields are kept
async fn update_video(
    State(state): State<VideoState>,
    actor: Actor,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;

    // nothing gets uploaded on behalf of someone who cannot edit the video
    let existing = state.repo.get_video(&video_id)?;
    if existing.owner != actor.0 {
        return Err(StoreError::not_owner("video").into());
    }

    let form = read_form(&state.staging, multipart).await?;
    let thumbnail = match form.thumbnail {
        Some(staged) => Some(upload(state.media.as_ref(), &staged, MediaKind::Thumbnail).await?.url),
        None => None,
    };
    let patch = VideoPatch {
        title: provided(form.title),
        description: provided(form.description),
        thumbnail,
    };

    let video = state.repo.update_video(actor.id(), &video_id, patch)?;
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

async fn delete_video(
    State(state): State<VideoState>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;

    state.repo.delete_video(actor.id(), &video_id)?;
    info!(video_id = %video_id, "Video deleted");

    Ok(ApiResponse::ok((), "Video deleted successfully"))
}

async fn toggle_publish_status(
    State(state): State<VideoState>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id: VideoId = parse_id(&video_id, "video id")?;

    let video = state.repo.toggle_video_published(actor.id(), &video_id)?;
    info!(video_id = %video_id, published = video.is_published, "Publish status toggled");

    Ok(ApiResponse::ok(video, "Video publish status updated successfully"))
}

/// Create the router for the video API
pub fn create_router(state: VideoState) -> Router {
    Router::new()
        .route("/videos", get(get_all_videos).post(publish_video))
        .route(
            "/videos/{video_id}",
            get(get_video_by_id).patch(update_video).delete(delete_video),
        )
        .route("/videos/toggle/publish/{video_id}", patch(toggle_publish_status))
        .with_state(state)
}
