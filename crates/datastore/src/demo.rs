use crate::{Repository, StoreResult};
use domain::{Comment, LikeTarget, Playlist, Tweet, UserId, Video, VideoDraft};
use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence, Words};
use rand::Rng;
use tracing::info;

const DEMO_CHANNELS: usize = 3;
const VIDEOS_PER_CHANNEL: usize = 4;

/// Populate the repository with generated demo records
pub(crate) fn populate(repo: &dyn Repository) -> StoreResult<()> {
    let mut rng = rand::thread_rng();
    let channels: Vec<UserId> = (0..DEMO_CHANNELS).map(|_| UserId::new()).collect();

    for (index, owner) in channels.iter().enumerate() {
        let mut videos = Vec::with_capacity(VIDEOS_PER_CHANNEL);
        for n in 0..VIDEOS_PER_CHANNEL {
            let mut video = Video::publish(
                *owner,
                VideoDraft {
                    video_file: format!("http://localhost:8000/media/videos/demo-{index}-{n}.mp4"),
                    thumbnail: format!("http://localhost:8000/media/thumbnails/demo-{index}-{n}.png"),
                    title: Sentence(3..7).fake(),
                    description: Paragraph(1..3).fake(),
                    duration: rng.gen_range(30.0..1800.0),
                },
            );
            video.views = rng.gen_range(0..10_000);
            videos.push(repo.insert_video(video)?);
        }

        let words: Vec<String> = Words(2..4).fake();
        let playlist = repo.insert_playlist(Playlist::new(*owner, words.join(" "), Sentence(4..8).fake::<String>()))?;
        for video in videos.iter().take(2) {
            repo.add_video_to_playlist(owner, &playlist.id, &video.id)?;
        }

        repo.insert_tweet(Tweet::new(*owner, Sentence(5..12).fake::<String>()))?;

        for (other_index, other) in channels.iter().enumerate() {
            if other_index == index {
                continue;
            }
            repo.toggle_subscription(other, owner)?;
            for video in &videos {
                repo.insert_comment(Comment::new(video.id, *other, Sentence(4..10).fake::<String>()))?;
                if rng.gen_bool(0.5) {
                    repo.toggle_like(other, LikeTarget::Video(video.id))?;
                }
            }
        }
    }

    info!(
        channels = DEMO_CHANNELS,
        videos = DEMO_CHANNELS * VIDEOS_PER_CHANNEL,
        "Populated demo data"
    );
    Ok(())
}
