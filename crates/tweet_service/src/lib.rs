use auth_service::Actor;
use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use datastore::Repository;
use domain::{Tweet, TweetId, UserId};
use envelope::{ApiJson, ApiResponse, ApiResult, non_blank, parse_id};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    #[serde(default)]
    pub content: Option<String>,
}

async fn create_tweet(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    ApiJson(request): ApiJson<TweetRequest>,
) -> ApiResult<ApiResponse<Tweet>> {
    let content = non_blank(request.content, "Tweet content is required")?;

    let tweet = repo.insert_tweet(Tweet::new(actor.0, content))?;
    info!(tweet_id = %tweet.id, owner = %tweet.owner, "Tweet added");

    Ok(ApiResponse::created(tweet, "Tweet added successfully"))
}

/// Handler listing a user's tweets, newest first
async fn get_user_tweets(
    State(repo): State<Arc<dyn Repository>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Tweet>>> {
    let user_id: UserId = parse_id(&user_id, "user id")?;
    let tweets = repo.user_tweets(&user_id)?;
    Ok(ApiResponse::ok(tweets, "Tweet fetched successfully"))
}

async fn update_tweet(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(tweet_id): Path<String>,
    ApiJson(request): ApiJson<TweetRequest>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet_id: TweetId = parse_id(&tweet_id, "tweet id")?;
    let content = non_blank(request.content, "Tweet content is required")?;

    let tweet = repo.update_tweet(actor.id(), &tweet_id, content)?;
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

async fn delete_tweet(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let tweet_id: TweetId = parse_id(&tweet_id, "tweet id")?;

    repo.delete_tweet(actor.id(), &tweet_id)?;
    info!(tweet_id = %tweet_id, "Tweet deleted");

    Ok(ApiResponse::ok((), "Tweet deleted successfully"))
}

/// Create the router for the tweet API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route("/tweets", post(create_tweet))
        .route("/tweets/user/{user_id}", get(get_user_tweets))
        .route("/tweets/{tweet_id}", patch(update_tweet).delete(delete_tweet))
        .with_state(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use datastore::InMemoryRepository;
    use domain::LikeTarget;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(
        repo: Arc<InMemoryRepository>,
        method: &str,
        uri: &str,
        actor: UserId,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |json| Body::from(json.to_string())))
            .unwrap();
        request.extensions_mut().insert(Actor(actor));

        let response = create_router(repo).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_list_tweets() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = UserId::new();

        for content in ["first", "second"] {
            let (status, body) = send(
                Arc::clone(&repo),
                "POST",
                "/tweets",
                author,
                Some(json!({ "content": content })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "Tweet added successfully");
            assert_eq!(body["data"]["owner"], author.to_string());
        }

        let (status, body) = send(repo, "GET", &format!("/tweets/user/{author}"), UserId::new(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Tweet fetched successfully");
        let tweets = body["data"].as_array().unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0]["content"], "second");
    }

    #[tokio::test]
    async fn test_blank_tweet_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = UserId::new();

        let (status, body) = send(
            Arc::clone(&repo),
            "POST",
            "/tweets",
            author,
            Some(json!({ "content": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Tweet content is required");
        assert!(repo.user_tweets(&author).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = UserId::new();
        let tweet = repo.insert_tweet(Tweet::new(author, "draft")).unwrap();
        let uri = format!("/tweets/{}", tweet.id);

        let (status, body) = send(
            Arc::clone(&repo),
            "PATCH",
            &uri,
            UserId::new(),
            Some(json!({ "content": "not mine" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, body) = send(repo, "PATCH", &uri, author, Some(json!({ "content": "final" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "final");
    }

    #[tokio::test]
    async fn test_delete_removes_tweet_and_likes() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = UserId::new();
        let fan = UserId::new();
        let tweet = repo.insert_tweet(Tweet::new(author, "hello")).unwrap();
        repo.toggle_like(&fan, LikeTarget::Tweet(tweet.id)).unwrap();

        let (status, body) = send(
            Arc::clone(&repo),
            "DELETE",
            &format!("/tweets/{}", tweet.id),
            author,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Tweet deleted successfully");
        assert!(repo.user_tweets(&author).unwrap().is_empty());

        // the like went with the tweet, so liking again targets a missing tweet
        assert!(repo.toggle_like(&fan, LikeTarget::Tweet(tweet.id)).is_err());
    }
}
