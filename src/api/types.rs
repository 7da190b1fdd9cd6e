//! API request and response types

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::error;

use crate::auth::PublicAccount;
use crate::community::CommunityProfile;
use crate::community::SpiritualTraits;
use crate::errors::WisdomError;
use crate::memory::ChatRole;
use crate::models::HistoryExchange;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error returned by handlers, rendered as an [`ApiResponse`] with a status
#[derive(Debug)]
pub struct ApiError(pub WisdomError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WisdomError::AuthError(_) => StatusCode::UNAUTHORIZED,
            WisdomError::NotFound(_) => StatusCode::NOT_FOUND,
            WisdomError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WisdomError> for ApiError {
    fn from(err: WisdomError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a value in a successful response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Service banner served at `/`
#[derive(Debug, Serialize)]
pub struct RootInfo {
    pub message: String,
    pub status: String,
    pub multi_agent_available: bool,
    pub features: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub indexed_passages: usize,
}

#[derive(Debug, Serialize)]
pub struct TraditionInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TraditionsResponse {
    pub traditions: Vec<TraditionInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Frontend religion id such as "buddhism"
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryExchange>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub use_multi_agent: bool,
    /// Bearer token for clients that cannot set headers
    #[serde(default)]
    pub authorization: Option<String>,
}

fn default_mode() -> String {
    "standard".to_string()
}

/// A cited passage as shown under an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub tradition: String,
    pub scripture: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub is_crisis: bool,
    pub sources: Option<Vec<SourceRef>>,
    pub agent_outputs: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DailyWisdomQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub topic: String,
    pub traditions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PassageRef {
    pub scripture: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TraditionSources {
    pub icon: String,
    pub passages: Vec<PassageRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    pub topic: String,
    pub traditions_compared: Vec<String>,
    pub comparison: String,
    pub sources: BTreeMap<String, TraditionSources>,
}

#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    pub entry: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub authorization: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalResponse {
    pub reflection: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub visit_count: u64,
    pub themes: Vec<String>,
    pub has_history: bool,
}

/// Query carrying an optional anonymous session id
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Query for the current thread, with the religion a new one starts with
#[derive(Debug, Default, Deserialize)]
pub struct CurrentChatQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutQuery {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicAccount,
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AddChatMessageRequest {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<crate::memory::ChatSummary>,
    pub current_chat_id: Option<String>,
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_limit() -> usize {
    crate::search::DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub query: String,
    pub results: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CommunityProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferred_traditions: Option<Vec<String>>,
    #[serde(default = "default_opt_in")]
    pub opt_in: bool,
}

fn default_opt_in() -> bool {
    true
}

/// A seeker's own community profile
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub display_name: String,
    pub bio: String,
    pub traits: SpiritualTraits,
    pub preferred_traditions: Vec<String>,
    pub opt_in: bool,
    pub connections_count: usize,
    pub pending_requests: usize,
}

impl From<CommunityProfile> for ProfileView {
    fn from(profile: CommunityProfile) -> Self {
        Self {
            connections_count: profile.connections.len(),
            pending_requests: profile.connection_requests.len(),
            display_name: profile.display_name,
            bio: profile.bio,
            traits: profile.traits,
            preferred_traditions: profile.preferred_traditions,
            opt_in: profile.opt_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub profile: Option<ProfileView>,
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    #[serde(default = "default_match_limit")]
    pub limit: usize,
}

fn default_match_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<crate::community::CommunityMatch>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub to_email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub from_email: String,
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<crate::community::Connection>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<PendingRequest>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PendingRequest {
    pub from_email: String,
    pub from_name: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

impl From<crate::community::ConnectionRequest> for PendingRequest {
    fn from(request: crate::community::ConnectionRequest) -> Self {
        Self {
            from_email: request.from_email,
            from_name: request.from_name,
            message: request.message,
            sent_at: request.sent_at,
        }
    }
}
