//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use tracing::debug;
use tracing::warn;

use crate::api::types::ok;
use crate::api::types::ApiResponse;
use crate::api::types::ApiResult;
use crate::api::types::HealthResponse;
use crate::api::types::RootInfo;
use crate::api::types::TraditionInfo;
use crate::api::types::TraditionsResponse;
use crate::auth::AuthService;
use crate::community::CommunityStore;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::memory::user_id_from_email;
use crate::memory::user_id_from_session;
use crate::memory::MemoryStore;
use crate::rag::Advisor;
use crate::traditions;

pub mod auth;
pub mod chats;
pub mod community;
pub mod guidance;
pub mod search;

pub use auth::*;
pub use chats::*;
pub use community::*;
pub use guidance::*;
pub use search::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub advisor: Arc<Advisor>,
    pub memory: Arc<MemoryStore>,
    pub auth: Arc<AuthService>,
    pub community: Arc<CommunityStore>,
}

/// Whose memory a request reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeker {
    pub user_id: String,
    pub email: Option<String>,
}

impl AppState {
    /// Services and file stores named in the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config.clone()),
            advisor: Arc::new(Advisor::from_config(config).await?),
            memory: Arc::new(MemoryStore::new(config.memory_dir())),
            auth: Arc::new(AuthService::from_config(config)),
            community: Arc::new(CommunityStore::new(config.community_dir())),
        })
    }

    /// Signed-in seekers use their account memory; everyone else a session
    ///
    /// An invalid token falls back to the session, and a missing session id
    /// gets a fresh one.
    pub fn seeker(&self, authorization: Option<&str>, session_id: Option<&str>) -> Seeker {
        if let Some(email) = authorization.and_then(|a| self.auth.sessions().validate(a)) {
            return Seeker {
                user_id: user_id_from_email(&email),
                email: Some(email),
            };
        }
        if authorization.is_some() {
            debug!("Ignoring invalid session token, using anonymous session");
        }

        let session_id = session_id
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        Seeker {
            user_id: user_id_from_session(&session_id),
            email: None,
        }
    }

    /// Like [`AppState::seeker`] but refuses requests with no identity at all
    pub fn require_seeker(
        &self,
        authorization: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Seeker> {
        let has_session = session_id.is_some_and(|s| !s.trim().is_empty());
        if !has_session {
            let email = self.auth.email_for(authorization)?;
            return Ok(Seeker {
                user_id: user_id_from_email(&email),
                email: Some(email),
            });
        }
        Ok(self.seeker(authorization, session_id))
    }
}

/// Raw `Authorization` header value
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

/// Header first, then a token sent in the body
pub fn authorization_or<'a>(headers: &'a HeaderMap, body: Option<&'a str>) -> Option<&'a str> {
    authorization(headers).or_else(|| body.filter(|v| !v.trim().is_empty()))
}

pub fn require_text(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WisdomError::InvalidInput(message.to_string()));
    }
    Ok(())
}

/// Service banner
pub async fn root() -> Json<ApiResponse<RootInfo>> {
    Json(ApiResponse::success(RootInfo {
        message: "Divine Wisdom Guide API".to_string(),
        status: "running".to_string(),
        multi_agent_available: true,
        features: [
            "chat",
            "multi-agent-chat",
            "compare-religions",
            "daily-wisdom",
            "journal",
            "chat-threads",
            "search",
            "community",
        ]
        .iter()
        .map(|f| (*f).to_string())
        .collect(),
    }))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let indexed_passages = match state.advisor.retriever().store().count().await {
        Ok(count) => count,
        Err(e) => {
            warn!("Vector store count failed: {}", e);
            0
        }
    };
    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        indexed_passages,
    })
}

pub async fn list_traditions() -> ApiResult<TraditionsResponse> {
    let traditions = traditions::all()
        .iter()
        .map(|t| TraditionInfo {
            id: t.id(),
            name: t.name.to_string(),
            icon: t.icon.to_string(),
            description: t.description.to_string(),
        })
        .collect();
    ok(TraditionsResponse { traditions })
}
