/// Account handlers
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use super::authorization;
use super::AppState;
use crate::api::types::ok;
use crate::api::types::ApiResult;
use crate::api::types::AuthResponse;
use crate::api::types::LoginRequest;
use crate::api::types::LogoutQuery;
use crate::api::types::MessageResponse;
use crate::api::types::SignUpRequest;
use crate::auth::PublicAccount;

/// Create an account and sign it in (POST /api/auth/signup)
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<AuthResponse> {
    info!("POST /api/auth/signup");
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let grant = state.auth.signup(&req.email, &req.password, name).await?;
    ok(AuthResponse {
        message: "Account created successfully".to_string(),
        token: grant.token,
        user: grant.user,
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    info!("POST /api/auth/login");
    let grant = state.auth.login(&req.email, &req.password).await?;
    ok(AuthResponse {
        message: "Login successful".to_string(),
        token: grant.token,
        user: grant.user,
    })
}

/// Always succeeds; the token may come as a query parameter or header
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LogoutQuery>,
) -> ApiResult<MessageResponse> {
    if let Some(token) = params.token.as_deref().or_else(|| authorization(&headers)) {
        state.auth.logout(token);
    }
    ok(MessageResponse::new("Logged out successfully"))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<PublicAccount> {
    ok(state.auth.current_user(authorization(&headers)).await?)
}

/// Merge preference keys into the account (PUT /api/auth/preferences)
pub async fn update_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(preferences): Json<Map<String, Value>>,
) -> ApiResult<PublicAccount> {
    ok(state
        .auth
        .update_preferences(authorization(&headers), preferences)
        .await?)
}
