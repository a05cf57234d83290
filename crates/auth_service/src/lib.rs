use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, TimeDelta, Utc};
use domain::UserId;
use envelope::{ApiError, ApiJson, ApiResponse, ApiResult, parse_id};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Request body for token issuance
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// Actor to bind the token to; a fresh actor id is generated when absent
    #[serde(default)]
    pub actor_id: Option<String>,

    /// Custom expiry in seconds from now (for testing)
    /// Can be negative to create expired tokens
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Issued bearer token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Expiry time in seconds from now
    pub expires_in: i64,
    pub actor_id: UserId,
}

/// Token metadata for tracking expiry and the bound actor
#[derive(Debug, Clone)]
struct TokenMetadata {
    actor: UserId,
    /// Instant the token stops authenticating (in the past for pre-expired tokens)
    expires_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Check if the token is expired
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Issued bearer tokens and the actors they authenticate
pub struct TokenStore {
    tokens: RwLock<HashMap<String, TokenMetadata>>,
    default_ttl: i64,
}

impl TokenStore {
    pub fn new(default_ttl: i64) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Issue a token for `actor`, valid for `expires_in` seconds (store default when `None`)
    pub fn issue(&self, actor: UserId, expires_in: Option<i64>) -> ApiResult<TokenResponse> {
        let access_token = format!("vs_{}", uuid::Uuid::new_v4().simple());
        let expires_in = expires_in.unwrap_or(self.default_ttl);
        let expires_at = TimeDelta::try_seconds(expires_in)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| ApiError::Validation("expiresIn is out of range".to_string()))?;

        let metadata = TokenMetadata { actor, expires_at };
        self.tokens
            .write()
            .map_err(|_| ApiError::Unexpected("token store lock poisoned".to_string()))?
            .insert(access_token.clone(), metadata);

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            actor_id: actor,
        })
    }

    /// Resolve a bearer token to its actor
    pub fn resolve(&self, token: &str) -> ApiResult<Actor> {
        let store = self
            .tokens
            .read()
            .map_err(|_| ApiError::Unexpected("token store lock poisoned".to_string()))?;

        match store.get(token) {
            Some(metadata) if metadata.is_expired() => {
                Err(ApiError::Unauthorized("Token has expired".to_string()))
            }
            Some(metadata) => Ok(Actor(metadata.actor)),
            None => Err(ApiError::Unauthorized("Invalid access token".to_string())),
        }
    }

    /// Forget expired tokens
    pub fn purge_expired(&self) -> usize {
        match self.tokens.write() {
            Ok(mut store) => {
                let before = store.len();
                store.retain(|_, metadata| !metadata.is_expired());
                before - store.len()
            }
            Err(_) => 0,
        }
    }
}

/// The authenticated actor of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl Actor {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware resolving the bearer token into an [`Actor`] request extension
pub async fn authenticate(
    State(tokens): State<Arc<TokenStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match bearer_token(request.headers()) {
        Some(token) => tokens.resolve(token),
        None => Err(ApiError::Unauthorized("Authentication required".to_string())),
    };

    match actor {
        Ok(actor) => {
            debug!(actor = %actor.0, "Authenticated request");
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}

/// Handler for token issuance
async fn token_handler(
    State(tokens): State<Arc<TokenStore>>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let actor = match request.actor_id.as_deref() {
        Some(raw) => parse_id::<UserId>(raw, "actor id")?,
        None => UserId::new(),
    };

    let response = tokens.issue(actor, request.expires_in)?;
    info!(actor = %actor, expires_in = response.expires_in, "Issued access token");

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        response,
        "Access token issued",
    ))
}

/// Create the router for the token endpoint
pub fn create_router(tokens: Arc<TokenStore>) -> Router {
    Router::new()
        .route("/auth/token", post(token_handler))
        .with_state(tokens)
}
