use crate::error::{StoreError, StoreResult};
use crate::query::{PageRequest, Page, VideoQuery, matches_terms, search_terms};
use crate::{PlaylistPatch, Repository, VideoPatch};
use chrono::Utc;
use domain::{
    ChannelStats, Comment, CommentId, Like, LikeId, LikeTarget, Playlist, PlaylistId,
    Subscription, SubscriptionId, ToggleOutcome, Tweet, TweetId, UserId, Video, VideoId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Every collection, guarded together so cross-collection operations
/// (cascades, statistics) see one consistent state.
#[derive(Default)]
struct Collections {
    videos: HashMap<VideoId, Video>,
    comments: HashMap<CommentId, Comment>,
    tweets: HashMap<TweetId, Tweet>,
    playlists: HashMap<PlaylistId, Playlist>,
    likes: HashMap<LikeId, Like>,
    /// Unique index: at most one like per (actor, target)
    like_index: HashMap<(UserId, LikeTarget), LikeId>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    /// Unique index: at most one subscription per (subscriber, channel)
    subscription_index: HashMap<(UserId, UserId), SubscriptionId>,
}

impl Collections {
    /// A video `viewer` may see; unpublished videos of other channels read as absent
    fn visible_video(&self, id: &VideoId, viewer: &UserId) -> StoreResult<&Video> {
        self.videos
            .get(id)
            .filter(|video| video.is_visible_to(viewer))
            .ok_or_else(|| StoreError::not_found("Video"))
    }

    /// Likes need a target `actor` can see, comments included through their video
    fn ensure_target_visible(&self, target: &LikeTarget, actor: &UserId) -> StoreResult<()> {
        let visible = match target {
            LikeTarget::Video(id) => self.visible_video(id, actor).is_ok(),
            LikeTarget::Comment(id) => self
                .comments
                .get(id)
                .is_some_and(|comment| self.visible_video(&comment.video, actor).is_ok()),
            LikeTarget::Tweet(id) => self.tweets.contains_key(id),
        };
        if visible {
            Ok(())
        } else {
            Err(StoreError::not_found(target.kind()))
        }
    }

    /// Drop every like whose target matches, keeping the unique index in step
    fn remove_likes_where(&mut self, mut doomed: impl FnMut(&LikeTarget) -> bool) -> usize {
        let before = self.likes.len();
        self.likes.retain(|_, like| !doomed(&like.target));
        self.like_index.retain(|(_, target), _| !doomed(target));
        before - self.likes.len()
    }

    fn owned_video_mut(&mut self, actor: &UserId, id: &VideoId) -> StoreResult<&mut Video> {
        let video = self
            .videos
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Video"))?;
        ensure_owner(&video.owner, actor, "video")?;
        Ok(video)
    }

    fn owned_comment_mut(&mut self, actor: &UserId, id: &CommentId) -> StoreResult<&mut Comment> {
        let comment = self
            .comments
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Comment"))?;
        ensure_owner(&comment.owner, actor, "comment")?;
        Ok(comment)
    }

    fn owned_tweet_mut(&mut self, actor: &UserId, id: &TweetId) -> StoreResult<&mut Tweet> {
        let tweet = self
            .tweets
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Tweet"))?;
        ensure_owner(&tweet.owner, actor, "tweet")?;
        Ok(tweet)
    }

    fn owned_playlist_mut(&mut self, actor: &UserId, id: &PlaylistId) -> StoreResult<&mut Playlist> {
        let playlist = self
            .playlists
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Playlist"))?;
        ensure_owner(&playlist.owner, actor, "playlist")?;
        Ok(playlist)
    }
}

fn ensure_owner(owner: &UserId, actor: &UserId, kind: &str) -> StoreResult<()> {
    if owner == actor {
        Ok(())
    } else {
        Err(StoreError::not_owner(kind))
    }
}

/// In-memory implementation of the Repository trait
pub struct InMemoryRepository {
    collections: RwLock<Collections>,
}

impl InMemoryRepository {
    /// Create an empty in-memory repository
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections::default()),
        }
    }

    /// Create a repository pre-populated with generated demo records
    pub fn with_demo_data() -> StoreResult<Self> {
        let repo = Self::new();
        crate::demo::populate(&repo)?;
        Ok(repo)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("collections lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("collections lock poisoned".to_string()))
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for InMemoryRepository {
    fn insert_video(&self, video: Video) -> StoreResult<Video> {
        self.write()?.videos.insert(video.id, video.clone());
        Ok(video)
    }

    fn get_video(&self, id: &VideoId) -> StoreResult<Video> {
        self.read()?
            .videos
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Video"))
    }

    fn list_videos(&self, query: &VideoQuery) -> StoreResult<Page<Video>> {
        let terms = query.text.as_deref().map(search_terms).unwrap_or_default();
        let db = self.read()?;

        let mut videos: Vec<Video> = db
            .videos
            .values()
            .filter(|video| video.is_visible_to(&query.viewer))
            .filter(|video| query.owner.is_none_or(|owner| video.owner == owner))
            .filter(|video| terms.is_empty() || matches_terms(video, &terms))
            .cloned()
            .collect();
        drop(db);

        videos.sort_by(|a, b| query.sort.compare(a, b));
        Ok(query.page.paginate(videos))
    }

    fn update_video(&self, actor: &UserId, id: &VideoId, patch: VideoPatch) -> StoreResult<Video> {
        let mut db = self.write()?;
        let video = db.owned_video_mut(actor, id)?;
        if let Some(title) = patch.title {
            video.title = title;
        }
        if let Some(description) = patch.description {
            video.description = description;
        }
        if let Some(thumbnail) = patch.thumbnail {
            video.thumbnail = thumbnail;
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    fn toggle_video_published(&self, actor: &UserId, id: &VideoId) -> StoreResult<Video> {
        let mut db = self.write()?;
        let video = db.owned_video_mut(actor, id)?;
        video.is_published = !video.is_published;
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    fn delete_video(&self, actor: &UserId, id: &VideoId) -> StoreResult<()> {
        let mut guard = self.write()?;
        let db = &mut *guard;
        db.owned_video_mut(actor, id)?;
        db.videos.remove(id);

        let orphaned: HashSet<CommentId> = db
            .comments
            .values()
            .filter(|comment| comment.video == *id)
            .map(|comment| comment.id)
            .collect();
        db.comments.retain(|comment_id, _| !orphaned.contains(comment_id));

        let likes = db.remove_likes_where(|target| match target {
            LikeTarget::Video(video) => video == id,
            LikeTarget::Comment(comment) => orphaned.contains(comment),
            LikeTarget::Tweet(_) => false,
        });

        let now = Utc::now();
        for playlist in db.playlists.values_mut() {
            if playlist.contains(id) {
                playlist.videos.retain(|video| video != id);
                playlist.updated_at = now;
            }
        }

        debug!(video_id = %id, comments = orphaned.len(), likes, "Deleted video with dependents");
        Ok(())
    }

    fn record_view(&self, id: &VideoId) -> StoreResult<Video> {
        let mut db = self.write()?;
        let video = db
            .videos
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("Video"))?;
        video.views = video.views.saturating_add(1);
        Ok(video.clone())
    }

    fn channel_stats(&self, owner: &UserId) -> StoreResult<ChannelStats> {
        let db = self.read()?;

        let owned: Vec<&Video> = db.videos.values().filter(|video| video.owner == *owner).collect();
        let owned_ids: HashSet<VideoId> = owned.iter().map(|video| video.id).collect();

        let total_views = owned
            .iter()
            .fold(0u64, |sum, video| sum.saturating_add(video.views));
        let total_likes = db
            .likes
            .values()
            .filter(|like| matches!(like.target, LikeTarget::Video(video) if owned_ids.contains(&video)))
            .count();
        let total_subscribers = db
            .subscriptions
            .values()
            .filter(|subscription| subscription.channel == *owner)
            .count();

        Ok(ChannelStats {
            total_videos: owned.len() as u64,
            total_views,
            total_likes: total_likes as u64,
            total_subscribers: total_subscribers as u64,
        })
    }

    fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut db = self.write()?;
        db.visible_video(&comment.video, &comment.owner)?;
        db.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn get_comment(&self, id: &CommentId) -> StoreResult<Comment> {
        self.read()?
            .comments
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Comment"))
    }

    fn list_video_comments(&self, viewer: &UserId, video: &VideoId, page: PageRequest) -> StoreResult<Page<Comment>> {
        let db = self.read()?;
        db.visible_video(video, viewer)?;
        let mut comments: Vec<Comment> = db
            .comments
            .values()
            .filter(|comment| comment.video == *video)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(page.paginate(comments))
    }

    fn update_comment(&self, actor: &UserId, id: &CommentId, content: String) -> StoreResult<Comment> {
        let mut db = self.write()?;
        let comment = db.owned_comment_mut(actor, id)?;
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    fn delete_comment(&self, actor: &UserId, id: &CommentId) -> StoreResult<()> {
        let mut db = self.write()?;
        db.owned_comment_mut(actor, id)?;
        db.comments.remove(id);
        db.remove_likes_where(|target| *target == LikeTarget::Comment(*id));
        Ok(())
    }

    fn toggle_like(&self, actor: &UserId, target: LikeTarget) -> StoreResult<ToggleOutcome> {
        let mut db = self.write()?;
        db.ensure_target_visible(&target, actor)?;

        let key = (*actor, target);
        if let Some(like_id) = db.like_index.remove(&key) {
            db.likes.remove(&like_id);
            debug!(actor = %actor, ?target, "Like removed");
            return Ok(ToggleOutcome::Removed);
        }

        let like = Like::new(*actor, target);
        db.like_index.insert(key, like.id);
        db.likes.insert(like.id, like);
        debug!(actor = %actor, ?target, "Like added");
        Ok(ToggleOutcome::Added)
    }

    fn liked_videos(&self, actor: &UserId) -> StoreResult<Vec<Video>> {
        let db = self.read()?;
        let mut likes: Vec<&Like> = db
            .likes
            .values()
            .filter(|like| like.liked_by == *actor)
            .collect();
        likes.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(likes
            .into_iter()
            .filter_map(|like| match like.target {
                LikeTarget::Video(id) => db.videos.get(&id),
                _ => None,
            })
            .filter(|video| video.is_visible_to(actor))
            .cloned()
            .collect())
    }

    fn toggle_subscription(&self, subscriber: &UserId, channel: &UserId) -> StoreResult<ToggleOutcome> {
        if subscriber == channel {
            return Err(StoreError::Invalid(
                "You cannot subscribe to your own channel".to_string(),
            ));
        }

        let mut db = self.write()?;
        let key = (*subscriber, *channel);
        if let Some(subscription_id) = db.subscription_index.remove(&key) {
            db.subscriptions.remove(&subscription_id);
            debug!(subscriber = %subscriber, channel = %channel, "Subscription removed");
            return Ok(ToggleOutcome::Removed);
        }

        let subscription = Subscription::new(*subscriber, *channel);
        db.subscription_index.insert(key, subscription.id);
        db.subscriptions.insert(subscription.id, subscription);
        debug!(subscriber = %subscriber, channel = %channel, "Subscription added");
        Ok(ToggleOutcome::Added)
    }

    fn channel_subscribers(&self, channel: &UserId) -> StoreResult<Vec<Subscription>> {
        let mut subscribers: Vec<Subscription> = self
            .read()?
            .subscriptions
            .values()
            .filter(|subscription| subscription.channel == *channel)
            .cloned()
            .collect();
        subscribers.sort_by_key(|subscription| subscription.id);
        Ok(subscribers)
    }

    fn subscribed_channels(&self, subscriber: &UserId) -> StoreResult<Vec<Subscription>> {
        let mut channels: Vec<Subscription> = self
            .read()?
            .subscriptions
            .values()
            .filter(|subscription| subscription.subscriber == *subscriber)
            .cloned()
            .collect();
        channels.sort_by_key(|subscription| subscription.id);
        Ok(channels)
    }

    fn insert_playlist(&self, playlist: Playlist) -> StoreResult<Playlist> {
        self.write()?.playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    fn get_playlist(&self, id: &PlaylistId) -> StoreResult<Playlist> {
        self.read()?
            .playlists
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Playlist"))
    }

    fn user_playlists(&self, owner: &UserId) -> StoreResult<Vec<Playlist>> {
        let mut playlists: Vec<Playlist> = self
            .read()?
            .playlists
            .values()
            .filter(|playlist| playlist.owner == *owner)
            .cloned()
            .collect();
        playlists.sort_by_key(|playlist| playlist.id);
        Ok(playlists)
    }

    fn update_playlist(&self, actor: &UserId, id: &PlaylistId, patch: PlaylistPatch) -> StoreResult<Playlist> {
        let mut db = self.write()?;
        let playlist = db.owned_playlist_mut(actor, id)?;
        if let Some(name) = patch.name {
            playlist.name = name;
        }
        if let Some(description) = patch.description {
            playlist.description = description;
        }
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    fn delete_playlist(&self, actor: &UserId, id: &PlaylistId) -> StoreResult<()> {
        let mut db = self.write()?;
        db.owned_playlist_mut(actor, id)?;
        db.playlists.remove(id);
        Ok(())
    }

    fn add_video_to_playlist(&self, actor: &UserId, id: &PlaylistId, video: &VideoId) -> StoreResult<Playlist> {
        let mut db = self.write()?;
        db.visible_video(video, actor)?;
        let playlist = db.owned_playlist_mut(actor, id)?;
        if playlist.contains(video) {
            return Err(StoreError::Conflict(
                "Video already in the playlist".to_string(),
            ));
        }
        playlist.videos.push(*video);
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    fn remove_video_from_playlist(&self, actor: &UserId, id: &PlaylistId, video: &VideoId) -> StoreResult<Playlist> {
        let mut db = self.write()?;
        let playlist = db.owned_playlist_mut(actor, id)?;
        let position = playlist
            .videos
            .iter()
            .position(|member| member == video)
            .ok_or_else(|| StoreError::NotFound("Video not found in the playlist".to_string()))?;
        playlist.videos.remove(position);
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    fn insert_tweet(&self, tweet: Tweet) -> StoreResult<Tweet> {
        self.write()?.tweets.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    fn user_tweets(&self, owner: &UserId) -> StoreResult<Vec<Tweet>> {
        let mut tweets: Vec<Tweet> = self
            .read()?
            .tweets
            .values()
            .filter(|tweet| tweet.owner == *owner)
            .cloned()
            .collect();
        tweets.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tweets)
    }

    fn update_tweet(&self, actor: &UserId, id: &TweetId, content: String) -> StoreResult<Tweet> {
        let mut db = self.write()?;
        let tweet = db.owned_tweet_mut(actor, id)?;
        tweet.content = content;
        tweet.updated_at = Utc::now();
        Ok(tweet.clone())
    }

    fn delete_tweet(&self, actor: &UserId, id: &TweetId) -> StoreResult<()> {
        let mut db = self.write()?;
        db.owned_tweet_mut(actor, id)?;
        db.tweets.remove(id);
        db.remove_likes_where(|target| *target == LikeTarget::Tweet(*id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SortDirection, SortKey, VideoSort};
    use domain::VideoDraft;
    use fake::Fake;
    use fake::faker::lorem::en::Sentence;
    use std::sync::Arc;

    fn draft(title: &str) -> VideoDraft {
        VideoDraft {
            video_file: "http://localhost/media/videos/v.mp4".to_string(),
            thumbnail: "http://localhost/media/thumbnails/t.png".to_string(),
            title: title.to_string(),
            description: Sentence(3..8).fake(),
            duration: 30.0,
        }
    }

    fn seed_video(repo: &InMemoryRepository, owner: UserId, title: &str) -> Video {
        repo.insert_video(Video::publish(owner, draft(title))).unwrap()
    }

    #[test]
    fn test_toggle_like_twice_restores_state() {
        let repo = InMemoryRepository::new();
        let actor = UserId::new();
        let video = seed_video(&repo, UserId::new(), "clip");
        let target = LikeTarget::Video(video.id);

        assert_eq!(repo.toggle_like(&actor, target).unwrap(), ToggleOutcome::Added);
        assert_eq!(repo.liked_videos(&actor).unwrap().len(), 1);

        assert_eq!(repo.toggle_like(&actor, target).unwrap(), ToggleOutcome::Removed);
        assert!(repo.liked_videos(&actor).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_like_on_missing_target_is_not_found() {
        let repo = InMemoryRepository::new();
        let result = repo.toggle_like(&UserId::new(), LikeTarget::Tweet(TweetId::new()));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_toggles_keep_at_most_one_like() {
        let repo = Arc::new(InMemoryRepository::new());
        let actor = UserId::new();
        let video = seed_video(&repo, UserId::new(), "race");
        let target = LikeTarget::Video(video.id);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let repo = Arc::clone(&repo);
                scope.spawn(move || {
                    for _ in 0..25 {
                        repo.toggle_like(&actor, target).unwrap();
                    }
                });
            }
        });

        // 200 toggles in total: an even count returns to "not liked"
        let db = repo.read().unwrap();
        assert!(db.likes.is_empty());
        assert!(db.like_index.is_empty());
    }

    #[test]
    fn test_concurrent_subscribes_never_duplicate() {
        let repo = Arc::new(InMemoryRepository::new());
        let subscriber = UserId::new();
        let channel = UserId::new();

        std::thread::scope(|scope| {
            for _ in 0..5 {
                let repo = Arc::clone(&repo);
                scope.spawn(move || {
                    repo.toggle_subscription(&subscriber, &channel).unwrap();
                });
            }
        });

        // five toggles: odd count, exactly one record remains
        assert_eq!(repo.channel_subscribers(&channel).unwrap().len(), 1);
    }

    #[test]
    fn test_self_subscription_rejected() {
        let repo = InMemoryRepository::new();
        let actor = UserId::new();
        assert!(matches!(
            repo.toggle_subscription(&actor, &actor),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_stats_for_owner_without_videos() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        repo.toggle_subscription(&UserId::new(), &owner).unwrap();
        repo.toggle_subscription(&UserId::new(), &owner).unwrap();

        let stats = repo.channel_stats(&owner).unwrap();
        assert_eq!(
            stats,
            ChannelStats {
                total_videos: 0,
                total_views: 0,
                total_likes: 0,
                total_subscribers: 2,
            }
        );
    }

    #[test]
    fn test_stats_aggregate_views_and_likes() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let first = seed_video(&repo, owner, "first");
        let second = seed_video(&repo, owner, "second");
        let foreign = seed_video(&repo, UserId::new(), "foreign");

        for _ in 0..3 {
            repo.record_view(&first.id).unwrap();
        }
        repo.record_view(&second.id).unwrap();
        repo.record_view(&foreign.id).unwrap();

        repo.toggle_like(&UserId::new(), LikeTarget::Video(first.id)).unwrap();
        repo.toggle_like(&UserId::new(), LikeTarget::Video(second.id)).unwrap();
        repo.toggle_like(&UserId::new(), LikeTarget::Video(foreign.id)).unwrap();

        let stats = repo.channel_stats(&owner).unwrap();
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.total_likes, 2);
        assert_eq!(stats.total_subscribers, 0);
    }

    #[test]
    fn test_comment_pages_newest_first() {
        let repo = InMemoryRepository::new();
        let video = seed_video(&repo, UserId::new(), "talk");
        let ids: Vec<CommentId> = (0..25)
            .map(|i| {
                repo.insert_comment(Comment::new(video.id, UserId::new(), format!("comment {i}")))
                    .unwrap()
                    .id
            })
            .collect();

        let first = repo
            .list_video_comments(&video.owner, &video.id, PageRequest::new(1, 10).unwrap())
            .unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_count, 25);
        assert_eq!(first.items[0].id, ids[24]);

        let last = repo
            .list_video_comments(&video.owner, &video.id, PageRequest::new(3, 10).unwrap())
            .unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[4].id, ids[0]);

        let beyond = repo
            .list_video_comments(&video.owner, &video.id, PageRequest::new(9, 10).unwrap())
            .unwrap();
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_comment_on_missing_video_rejected() {
        let repo = InMemoryRepository::new();
        let result = repo.insert_comment(Comment::new(VideoId::new(), UserId::new(), "hello"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_unpublished_video_hidden_from_interactions() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let video = seed_video(&repo, owner, "draft");
        let comment = repo
            .insert_comment(Comment::new(video.id, stranger, "early bird"))
            .unwrap();
        repo.toggle_video_published(&owner, &video.id).unwrap();
        let playlist = repo.insert_playlist(Playlist::new(stranger, "later", "")).unwrap();

        assert!(matches!(
            repo.insert_comment(Comment::new(video.id, stranger, "hello")),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.list_video_comments(&stranger, &video.id, PageRequest::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.toggle_like(&stranger, LikeTarget::Video(video.id)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.toggle_like(&stranger, LikeTarget::Comment(comment.id)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.add_video_to_playlist(&stranger, &playlist.id, &video.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(repo.get_playlist(&playlist.id).unwrap().videos.is_empty());

        // the owner still reaches everything
        repo.insert_comment(Comment::new(video.id, owner, "notes")).unwrap();
        let page = repo
            .list_video_comments(&owner, &video.id, PageRequest::default())
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(
            repo.toggle_like(&owner, LikeTarget::Video(video.id)).unwrap(),
            ToggleOutcome::Added
        );
    }

    #[test]
    fn test_video_search_sort_and_visibility() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let viewer = UserId::new();
        seed_video(&repo, owner, "Learning Rust ownership");
        seed_video(&repo, owner, "Cooking pasta");
        let hidden = seed_video(&repo, owner, "Rust internals");
        repo.toggle_video_published(&owner, &hidden.id).unwrap();

        let mut query = VideoQuery::new(viewer);
        query.text = Some("rust".to_string());
        let page = repo.list_videos(&query).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].title, "Learning Rust ownership");

        let mut query = VideoQuery::new(owner);
        query.text = Some("RUST".to_string());
        assert_eq!(repo.list_videos(&query).unwrap().total_count, 2);

        let mut query = VideoQuery::new(owner);
        query.sort = VideoSort {
            key: SortKey::Title,
            direction: SortDirection::Asc,
        };
        let titles: Vec<String> = repo
            .list_videos(&query)
            .unwrap()
            .items
            .into_iter()
            .map(|video| video.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Cooking pasta", "Learning Rust ownership", "Rust internals"]
        );
    }

    #[test]
    fn test_playlist_membership_sequence() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let v1 = seed_video(&repo, UserId::new(), "one").id;
        let v2 = seed_video(&repo, UserId::new(), "two").id;
        let playlist = repo.insert_playlist(Playlist::new(owner, "mix", "")).unwrap();

        repo.add_video_to_playlist(&owner, &playlist.id, &v1).unwrap();
        repo.add_video_to_playlist(&owner, &playlist.id, &v2).unwrap();
        assert!(matches!(
            repo.add_video_to_playlist(&owner, &playlist.id, &v1),
            Err(StoreError::Conflict(_))
        ));

        let updated = repo.remove_video_from_playlist(&owner, &playlist.id, &v1).unwrap();
        assert_eq!(updated.videos, vec![v2]);
        assert!(matches!(
            repo.remove_video_from_playlist(&owner, &playlist.id, &v1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_playlist_membership_is_owner_scoped() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let video = seed_video(&repo, owner, "mine").id;
        let playlist = repo.insert_playlist(Playlist::new(owner, "mine", "")).unwrap();

        assert!(matches!(
            repo.add_video_to_playlist(&UserId::new(), &playlist.id, &video),
            Err(StoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_delete_video_cascades() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let fan = UserId::new();
        let video = seed_video(&repo, owner, "doomed");
        let keeper = seed_video(&repo, owner, "keeper");
        let comment = repo
            .insert_comment(Comment::new(video.id, fan, "first!"))
            .unwrap();
        repo.toggle_like(&fan, LikeTarget::Video(video.id)).unwrap();
        repo.toggle_like(&fan, LikeTarget::Comment(comment.id)).unwrap();
        repo.toggle_like(&fan, LikeTarget::Video(keeper.id)).unwrap();
        let playlist = repo.insert_playlist(Playlist::new(fan, "saved", "")).unwrap();
        repo.add_video_to_playlist(&fan, &playlist.id, &video.id).unwrap();
        repo.add_video_to_playlist(&fan, &playlist.id, &keeper.id).unwrap();

        assert!(matches!(
            repo.delete_video(&fan, &video.id),
            Err(StoreError::Forbidden(_))
        ));
        repo.delete_video(&owner, &video.id).unwrap();

        assert!(repo.get_video(&video.id).is_err());
        assert!(repo.get_comment(&comment.id).is_err());
        assert_eq!(repo.read().unwrap().likes.len(), 1);
        assert_eq!(repo.get_playlist(&playlist.id).unwrap().videos, vec![keeper.id]);
        // the like index was cleaned too, so liking again starts fresh
        assert_eq!(
            repo.toggle_like(&fan, LikeTarget::Video(keeper.id)).unwrap(),
            ToggleOutcome::Removed
        );
    }

    #[test]
    fn test_delete_tweet_removes_its_likes() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let tweet = repo.insert_tweet(Tweet::new(owner, "hello")).unwrap();
        repo.toggle_like(&UserId::new(), LikeTarget::Tweet(tweet.id)).unwrap();

        repo.delete_tweet(&owner, &tweet.id).unwrap();
        assert!(repo.read().unwrap().likes.is_empty());
        assert!(repo.user_tweets(&owner).unwrap().is_empty());
    }

    #[test]
    fn test_update_requires_ownership() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let tweet = repo.insert_tweet(Tweet::new(owner, "draft")).unwrap();

        assert!(matches!(
            repo.update_tweet(&UserId::new(), &tweet.id, "hijack".to_string()),
            Err(StoreError::Forbidden(_))
        ));
        let updated = repo.update_tweet(&owner, &tweet.id, "final".to_string()).unwrap();
        assert_eq!(updated.content, "final");
    }

    #[test]
    fn test_demo_data_is_populated() {
        let repo = InMemoryRepository::with_demo_data().unwrap();
        let db = repo.read().unwrap();
        assert!(!db.videos.is_empty());
        assert!(!db.comments.is_empty());
        assert!(!db.subscriptions.is_empty());
    }
}
