/// Community handlers; every route requires a signed-in seeker
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use super::authorization;
use super::require_text;
use super::AppState;
use crate::api::types::ok;
use crate::api::types::ApiResult;
use crate::api::types::CommunityProfileRequest;
use crate::api::types::ConnectRequest;
use crate::api::types::ConnectionsResponse;
use crate::api::types::MatchesQuery;
use crate::api::types::MatchesResponse;
use crate::api::types::MessageResponse;
use crate::api::types::PendingRequest;
use crate::api::types::PendingRequestsResponse;
use crate::api::types::ProfileEnvelope;
use crate::api::types::ProfileView;
use crate::api::types::RespondRequest;
use crate::community::extract_traits_from_themes;
use crate::community::ProfileUpdate;
use crate::errors::WisdomError;
use crate::memory::user_id_from_email;

/// Create or update the caller's profile (POST /api/community/profile)
///
/// Traits are inferred from the caller's memory themes.
pub async fn save_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CommunityProfileRequest>,
) -> ApiResult<ProfileView> {
    let email = state.auth.email_for(authorization(&headers))?;
    require_text(&req.display_name, "Display name is required")?;

    let memory = state.memory.load(&user_id_from_email(&email)).await;
    let mut traits = extract_traits_from_themes(&memory.themes, memory.conversations.len());
    if let Some(traditions) = req.preferred_traditions.as_ref().filter(|t| !t.is_empty()) {
        traits.preferred_traditions = traditions.clone();
    }

    let profile = state
        .community
        .create_or_update(
            &email,
            ProfileUpdate {
                display_name: req.display_name.trim().to_string(),
                bio: req.bio,
                traits: Some(traits),
                preferred_traditions: req.preferred_traditions,
                opt_in: req.opt_in,
            },
        )
        .await?;
    info!("Saved community profile for {}", email);
    ok(profile.into())
}

/// GET /api/community/profile
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ProfileEnvelope> {
    let email = state.auth.email_for(authorization(&headers))?;
    let profile = state.community.get(&email).await?;
    ok(ProfileEnvelope {
        profile: profile.map(ProfileView::from),
    })
}

/// GET /api/community/matches?limit=
pub async fn matches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<MatchesQuery>,
) -> ApiResult<MatchesResponse> {
    let email = state.auth.email_for(authorization(&headers))?;
    let Some(profile) = state.community.get(&email).await? else {
        return Err(WisdomError::InvalidInput(
            "Please create a community profile first".to_string(),
        )
        .into());
    };
    if !profile.opt_in {
        return Err(WisdomError::InvalidInput(
            "Please opt-in to community matching in your profile".to_string(),
        )
        .into());
    }

    let matches = state.community.find_matches(&email, params.limit).await?;
    ok(MatchesResponse {
        total: matches.len(),
        matches,
    })
}

/// POST /api/community/connect
pub async fn connect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<MessageResponse> {
    let email = state.auth.email_for(authorization(&headers))?;
    let message = state
        .community
        .send_connection_request(&email, &req.to_email, req.message.as_deref().unwrap_or(""))
        .await?;
    ok(MessageResponse::new(message))
}

/// POST /api/community/respond
pub async fn respond(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RespondRequest>,
) -> ApiResult<MessageResponse> {
    let email = state.auth.email_for(authorization(&headers))?;
    let message = state
        .community
        .respond_to_request(&email, &req.from_email, req.accept)
        .await?;
    ok(MessageResponse::new(message))
}

/// GET /api/community/connections
pub async fn connections(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ConnectionsResponse> {
    let email = state.auth.email_for(authorization(&headers))?;
    let connections = state.community.connections(&email).await?;
    ok(ConnectionsResponse {
        total: connections.len(),
        connections,
    })
}

/// GET /api/community/requests
pub async fn pending_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<PendingRequestsResponse> {
    let email = state.auth.email_for(authorization(&headers))?;
    let requests: Vec<PendingRequest> = state
        .community
        .pending_requests(&email)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    ok(PendingRequestsResponse {
        total: requests.len(),
        requests,
    })
}
