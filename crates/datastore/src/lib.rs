mod demo;
mod error;
mod memory;
mod query;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRepository;
pub use query::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, SortDirection, SortKey, VideoQuery,
    VideoSort,
};

use domain::{
    ChannelStats, Comment, CommentId, LikeTarget, Playlist, PlaylistId, Subscription,
    ToggleOutcome, Tweet, TweetId, UserId, Video, VideoId,
};

/// Partial update of a video; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// Partial update of a playlist; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Repository trait for data access abstraction
/// This allows switching between different storage backends (in-memory, document database)
///
/// Every method is a single store operation: mutations that read before they
/// write (toggles, membership edits, ownership checks, cascades) complete
/// atomically with respect to other calls.
pub trait Repository: Send + Sync {
    // -- videos --

    /// Store a new video
    fn insert_video(&self, video: Video) -> StoreResult<Video>;

    /// Get a video by ID
    fn get_video(&self, id: &VideoId) -> StoreResult<Video>;

    /// Filter, sort and paginate videos
    fn list_videos(&self, query: &VideoQuery) -> StoreResult<Page<Video>>;

    /// Apply a partial update to a video owned by `actor`
    fn update_video(&self, actor: &UserId, id: &VideoId, patch: VideoPatch) -> StoreResult<Video>;

    /// Flip the published flag of a video owned by `actor`
    fn toggle_video_published(&self, actor: &UserId, id: &VideoId) -> StoreResult<Video>;

    /// Delete a video owned by `actor` together with its comments, the likes
    /// on both, and every playlist reference to it
    fn delete_video(&self, actor: &UserId, id: &VideoId) -> StoreResult<()>;

    /// Count one view
    fn record_view(&self, id: &VideoId) -> StoreResult<Video>;

    /// Aggregate statistics over the videos and subscribers of `owner`
    fn channel_stats(&self, owner: &UserId) -> StoreResult<ChannelStats>;

    // -- comments --

    /// Store a new comment; the commented video must be visible to its author
    fn insert_comment(&self, comment: Comment) -> StoreResult<Comment>;

    fn get_comment(&self, id: &CommentId) -> StoreResult<Comment>;

    /// Comments on a video visible to `viewer`, newest first
    fn list_video_comments(&self, viewer: &UserId, video: &VideoId, page: PageRequest) -> StoreResult<Page<Comment>>;

    fn update_comment(&self, actor: &UserId, id: &CommentId, content: String) -> StoreResult<Comment>;

    /// Delete a comment owned by `actor` and the likes on it
    fn delete_comment(&self, actor: &UserId, id: &CommentId) -> StoreResult<()>;

    // -- likes --

    /// Like `target` if `actor` has not liked it yet, otherwise remove the like.
    /// Targets on videos hidden from `actor` are not found.
    fn toggle_like(&self, actor: &UserId, target: LikeTarget) -> StoreResult<ToggleOutcome>;

    /// Videos liked by `actor`, most recent like first
    fn liked_videos(&self, actor: &UserId) -> StoreResult<Vec<Video>>;

    // -- subscriptions --

    /// Subscribe `subscriber` to `channel`, or unsubscribe if already subscribed
    fn toggle_subscription(&self, subscriber: &UserId, channel: &UserId) -> StoreResult<ToggleOutcome>;

    fn channel_subscribers(&self, channel: &UserId) -> StoreResult<Vec<Subscription>>;

    fn subscribed_channels(&self, subscriber: &UserId) -> StoreResult<Vec<Subscription>>;

    // -- playlists --

    fn insert_playlist(&self, playlist: Playlist) -> StoreResult<Playlist>;

    fn get_playlist(&self, id: &PlaylistId) -> StoreResult<Playlist>;

    fn user_playlists(&self, owner: &UserId) -> StoreResult<Vec<Playlist>>;

    fn update_playlist(&self, actor: &UserId, id: &PlaylistId, patch: PlaylistPatch) -> StoreResult<Playlist>;

    fn delete_playlist(&self, actor: &UserId, id: &PlaylistId) -> StoreResult<()>;

    /// Append a video visible to `actor`; rejected with a conflict if it is already a member
    fn add_video_to_playlist(&self, actor: &UserId, id: &PlaylistId, video: &VideoId) -> StoreResult<Playlist>;

    /// Remove a video; not found if it is not a member
    fn remove_video_from_playlist(&self, actor: &UserId, id: &PlaylistId, video: &VideoId) -> StoreResult<Playlist>;

    // -- tweets --

    fn insert_tweet(&self, tweet: Tweet) -> StoreResult<Tweet>;

    /// Tweets of a user, newest first
    fn user_tweets(&self, owner: &UserId) -> StoreResult<Vec<Tweet>>;

    fn update_tweet(&self, actor: &UserId, id: &TweetId, content: String) -> StoreResult<Tweet>;

    /// Delete a tweet owned by `actor` and the likes on it
    fn delete_tweet(&self, actor: &UserId, id: &TweetId) -> StoreResult<()>;
}
