use auth_service::Actor;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use datastore::Repository;
use domain::{Subscription, ToggleOutcome, ToggleState, UserId};
use envelope::{ApiResponse, ApiResult, parse_id};
use std::sync::Arc;
use tracing::info;

/// Handler subscribing the actor to a channel, or unsubscribing
async fn toggle_subscription(
    State(repo): State<Arc<dyn Repository>>,
    actor: Actor,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleState>> {
    let channel: UserId = parse_id(&channel_id, "channel id")?;

    let state = repo.toggle_subscription(actor.id(), &channel)?;
    info!(subscriber = %actor.0, channel = %channel, ?state, "Subscription toggled");

    let message = match state {
        ToggleOutcome::Added => "Subscribed successfully",
        ToggleOutcome::Removed => "Unsubscribed successfully",
    };
    Ok(ApiResponse::ok(ToggleState::from(state), message))
}

async fn get_user_channel_subscribers(
    State(repo): State<Arc<dyn Repository>>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Subscription>>> {
    let channel: UserId = parse_id(&channel_id, "channel id")?;
    let subscribers = repo.channel_subscribers(&channel)?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

async fn get_subscribed_channels(
    State(repo): State<Arc<dyn Repository>>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Subscription>>> {
    let subscriber: UserId = parse_id(&subscriber_id, "subscriber id")?;
    let channels = repo.subscribed_channels(&subscriber)?;
    Ok(ApiResponse::ok(channels, "Subscribed channels fetched successfully"))
}

/// Create the router for the subscription API
pub fn create_router(repo: Arc<dyn Repository>) -> Router {
    Router::new()
        .route(
            "/subscriptions/c/{channel_id}",
            get(get_user_channel_subscribers).post(toggle_subscription),
        )
        .route(
            "/subscriptions/u/{subscriber_id}",
            get(get_subscribed_channels),
        )
        .with_state(repo)
}
