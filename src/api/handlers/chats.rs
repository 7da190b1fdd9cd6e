/// Chat thread handlers
///
/// Threads live in the seeker's memory file. Signed-in seekers are identified
/// by their bearer token, anonymous ones by `session_id`.
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use tracing::info;

use super::authorization;
use super::require_text;
use super::AppState;
use super::Seeker;
use crate::api::types::ok;
use crate::api::types::AddChatMessageRequest;
use crate::api::types::ApiResult;
use crate::api::types::ChatListResponse;
use crate::api::types::CreateChatRequest;
use crate::api::types::CurrentChatQuery;
use crate::api::types::MessageResponse;
use crate::api::types::RenameChatRequest;
use crate::api::types::SessionQuery;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::memory::Chat;

fn chat_not_found() -> WisdomError {
    WisdomError::NotFound("Chat not found".to_string())
}

fn chat_seeker(state: &AppState, headers: &HeaderMap, params: &SessionQuery) -> Result<Seeker> {
    state.require_seeker(authorization(headers), params.session_id.as_deref())
}

/// GET /api/chats
pub async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SessionQuery>,
) -> ApiResult<ChatListResponse> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    let memory = state.memory.load(&seeker.user_id).await;
    ok(ChatListResponse {
        chats: memory.chat_summaries(),
        current_chat_id: memory.current_chat_id,
    })
}

/// POST /api/chats
pub async fn create_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SessionQuery>,
    Json(req): Json<CreateChatRequest>,
) -> ApiResult<Chat> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    let chat = state
        .memory
        .update(&seeker.user_id, |memory| {
            memory.create_chat(req.religion, req.title, Utc::now())
        })
        .await?;
    info!("Created chat {} for {}", chat.id, seeker.user_id);
    ok(chat)
}

/// GET /api/chats/current
///
/// Falls back to the most recent thread, and starts one for a seeker without any.
pub async fn current_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CurrentChatQuery>,
) -> ApiResult<Chat> {
    let seeker = state.require_seeker(authorization(&headers), params.session_id.as_deref())?;
    let chat = state
        .memory
        .update(&seeker.user_id, |memory| {
            memory.current_chat_or_create(params.religion, Utc::now())
        })
        .await?;
    ok(chat)
}

/// GET /api/chats/:id
pub async fn get_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<SessionQuery>,
) -> ApiResult<Chat> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    let memory = state.memory.load(&seeker.user_id).await;
    let chat = memory.chat(&chat_id).cloned().ok_or_else(chat_not_found)?;
    ok(chat)
}

/// DELETE /api/chats/:id
pub async fn delete_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<SessionQuery>,
) -> ApiResult<MessageResponse> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    let deleted = state
        .memory
        .update(&seeker.user_id, |memory| memory.delete_chat(&chat_id))
        .await?;
    if !deleted {
        return Err(chat_not_found().into());
    }
    ok(MessageResponse::new("Chat deleted"))
}

/// PUT /api/chats/:id/title
pub async fn rename_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<SessionQuery>,
    Json(req): Json<RenameChatRequest>,
) -> ApiResult<MessageResponse> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    require_text(&req.title, "Title is required")?;
    let renamed = state
        .memory
        .update(&seeker.user_id, |memory| {
            memory.rename_chat(&chat_id, req.title.trim())
        })
        .await?;
    if !renamed {
        return Err(chat_not_found().into());
    }
    ok(MessageResponse::new("Chat renamed"))
}

/// POST /api/chats/:id/messages
pub async fn add_chat_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<SessionQuery>,
    Json(req): Json<AddChatMessageRequest>,
) -> ApiResult<Chat> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    require_text(&req.content, "Message content is required")?;
    let chat = state
        .memory
        .update(&seeker.user_id, |memory| {
            memory.add_chat_message(&chat_id, req.role, &req.content, Utc::now())
        })
        .await?
        .ok_or_else(chat_not_found)?;
    ok(chat)
}

/// PUT /api/chats/current/:id
pub async fn set_current_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<SessionQuery>,
) -> ApiResult<MessageResponse> {
    let seeker = chat_seeker(&state, &headers, &params)?;
    let switched = state
        .memory
        .update(&seeker.user_id, |memory| memory.set_current_chat(&chat_id))
        .await?;
    if !switched {
        return Err(chat_not_found().into());
    }
    ok(MessageResponse::new("Current chat updated"))
}
