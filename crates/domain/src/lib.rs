mod ids;

pub use ids::{CommentId, LikeId, PlaylistId, SubscriptionId, TweetId, UserId, VideoId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a published video resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: VideoId,
    /// Locator of the hosted media file
    pub video_file: String,
    /// Locator of the hosted thumbnail image
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Duration in seconds
    pub duration: f64,
    pub views: u64,
    pub is_published: bool,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a video is first published
#[derive(Debug, Clone)]
pub struct VideoDraft {
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
}

impl Video {
    /// Build a new published video with zero views
    pub fn publish(owner: UserId, draft: VideoDraft) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            video_file: draft.video_file,
            thumbnail: draft.thumbnail,
            title: draft.title,
            description: draft.description,
            duration: draft.duration,
            views: 0,
            is_published: true,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `viewer` may see this video
    pub fn is_visible_to(&self, viewer: &UserId) -> bool {
        self.is_published || self.owner == *viewer
    }
}

/// Represents a comment left on a video
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub video: VideoId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(video: VideoId, owner: UserId, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CommentId::new(),
            content: content.into(),
            video,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Represents a short text post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: TweetId,
    pub content: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(owner: UserId, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TweetId::new(),
            content: content.into(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Represents an ordered, duplicate-free list of videos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: String,
    pub videos: Vec<VideoId>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(owner: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PlaylistId::new(),
            name: name.into(),
            description: description.into(),
            videos: Vec::new(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, video: &VideoId) -> bool {
        self.videos.contains(video)
    }
}

/// The entity a like points at. Exactly one kind is set per like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LikeTarget {
    Video(VideoId),
    Comment(CommentId),
    Tweet(TweetId),
}

impl LikeTarget {
    /// Human-readable kind, used in response messages
    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "Video",
            LikeTarget::Comment(_) => "Comment",
            LikeTarget::Tweet(_) => "Tweet",
        }
    }
}

/// Linking record between an actor and a liked entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: LikeId,
    #[serde(flatten)]
    pub target: LikeTarget,
    pub liked_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Like {
    pub fn new(liked_by: UserId, target: LikeTarget) -> Self {
        let now = Utc::now();
        Self {
            id: LikeId::new(),
            target,
            liked_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Linking record between a subscriber and a channel owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub subscriber: UserId,
    pub channel: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(subscriber: UserId, channel: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriptionId::new(),
            subscriber,
            channel,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of a toggle on a linking record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn is_added(self) -> bool {
        matches!(self, ToggleOutcome::Added)
    }
}

/// Response payload of a toggle: `{"state": "added" | "removed"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleState {
    pub state: ToggleOutcome,
}

impl From<ToggleOutcome> for ToggleState {
    fn from(state: ToggleOutcome) -> Self {
        Self { state }
    }
}

/// Aggregated statistics for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_subscribers: u64,
}
