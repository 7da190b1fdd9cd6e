/// Search handlers
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::info;

use super::authorization;
use super::AppState;
use crate::api::types::ok;
use crate::api::types::ApiResult;
use crate::api::types::SearchQuery;
use crate::api::types::SearchResponse;
use crate::search::search_chat_messages;
use crate::search::search_community_profiles;
use crate::search::search_journal_entries;
use crate::search::ChatMessageHit;
use crate::search::JournalHit;
use crate::search::ProfileHit;

fn respond<T>(query: String, results: Vec<T>) -> ApiResult<SearchResponse<T>> {
    ok(SearchResponse {
        query,
        total: results.len(),
        results,
    })
}

/// GET /api/search/chats?q=
pub async fn search_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse<ChatMessageHit>> {
    info!("GET /api/search/chats?q={}", params.q);
    let seeker = state.require_seeker(authorization(&headers), params.session_id.as_deref())?;
    let memory = state.memory.load(&seeker.user_id).await;
    let results = search_chat_messages(&memory, &params.q, params.limit);
    respond(params.q, results)
}

/// GET /api/search/journal?q=
pub async fn search_journal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse<JournalHit>> {
    info!("GET /api/search/journal?q={}", params.q);
    let seeker = state.require_seeker(authorization(&headers), params.session_id.as_deref())?;
    let memory = state.memory.load(&seeker.user_id).await;
    let results = search_journal_entries(&memory, &params.q, params.limit);
    respond(params.q, results)
}

/// Signed-in only (GET /api/search/profiles?q=)
pub async fn search_profiles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse<ProfileHit>> {
    info!("GET /api/search/profiles?q={}", params.q);
    state.auth.email_for(authorization(&headers))?;
    let profiles = state.community.all_profiles().await?;
    let results = search_community_profiles(&profiles, &params.q, params.limit);
    respond(params.q, results)
}
