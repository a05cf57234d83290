use auth_service::Actor;
use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use datastore::{PlaylistPatch, Repository};
use domain::{Playlist, PlaylistId, UserId, VideoId};
use envelope::{ApiJson, ApiResponse, ApiResult, non_blank, parse_id, provided};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Request body for creating a playlist
#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for editing a playlist; blank fields are ignored
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdatePlaylistRequest> for PlaylistPatch {
    fn from(request: UpdatePlaylistRequest) -> Self {
        PlaylistPatch {
            name: provided(request.name),
            description: provided(request.description),
        }
    }
}

async fn create_playlist(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    ApiJson(request): ApiJson<CreatePlaylistRequest>,
) -> ApiResult<ApiResponse<Playlist>> {
    let name = non_blank(request.name, "Playlist name is required")?;
    let description = provided(request.description).unwrap_or_default();

    let playlist = repo.insert_playlist(Playlist::new(actor.0, name, description))?;
    info!(playlist_id = %playlist.id, owner = %playlist.owner, "Playlist created");

    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

async fn get_user_playlists(
    State(repo): State<Arc<dyn Repository>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Playlist>>> {
    let user_id: UserId = parse_id(&user_id, "user id")?;
    let playlists = repo.user_playlists(&user_id)?;
    Ok(ApiResponse::ok(playlists, "User playlists fetched successfully"))
}

async fn get_playlist_by_id(
    State(repo): State<Arc<dyn Repository>>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist_id: PlaylistId = parse_id(&playlist_id, "playlist id")?;
    let playlist = repo.get_playlist(&playlist_id)?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

async fn update_playlist(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(playlist_id): Path<String>,
    ApiJson(request): ApiJson<UpdatePlaylistRequest>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist_id: PlaylistId = parse_id(&playlist_id, "playlist id")?;
    let playlist = repo.update_playlist(actor.id(), &playlist_id, request.into())?;
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

async fn delete_playlist(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let playlist_id: PlaylistId = parse_id(&playlist_id, "playlist id")?;

    repo.delete_playlist(actor.id(), &playlist_id)?;
    info!(playlist_id = %playlist_id, "Playlist deleted");

    Ok(ApiResponse::ok((), "Playlist deleted successfully"))
}

/// Parse the `{video_id}/{playlist_id}` pair shared by the membership routes
fn membership_ids(video_id: &str, playlist_id: &str) -> ApiResult<(VideoId, PlaylistId)> {
    Ok((
        parse_id(video_id, "video id")?,
        parse_id(playlist_id, "playlist id")?,
    ))
}

async fn add_video_to_playlist(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Playlist>> {
    let (video_id, playlist_id) = membership_ids(&video_id, &playlist_id)?;

    let playlist = repo.add_video_to_playlist(actor.id(), &playlist_id, &video_id)?;
    info!(playlist_id = %playlist_id, video_id = %video_id, "Video added to playlist");

    Ok(ApiResponse::ok(playlist, "Video added to the playlist"))
}

async fn remove_video_from_playlist(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Playlist>> {
    let (video_id, playlist_id) = membership_ids(&video_id, &playlist_id)?;

    let playlist = repo.remove_video_from_playlist(actor.id(), &playlist_id, &video_id)?;
    info!(playlist_id = %playlist_id, video_id = %video_id, "Video removed from playlist");

    Ok(ApiResponse::ok(playlist, "Video removed from the playlist"))
}

/// Create the router for the playlist API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route("/playlist", post(create_playlist))
        .route("/playlist/user/{user_id}", get(get_user_playlists))
        .route(
            "/playlist/{playlist_id}",
            get(get_playlist_by_id)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route(
            "/playlist/add/{video_id}/{playlist_id}",
            patch(add_video_to_playlist),
        )
        .route(
            "/playlist/remove/{video_id}/{playlist_id}",
            patch(remove_video_from_playlist),
        )
        .with_state(repo)
}
