/// Guidance handlers: chat, comparison, daily wisdom and journaling
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::authorization;
use super::authorization_or;
use super::require_text;
use super::AppState;
use crate::api::types::ok;
use crate::api::types::ApiResult;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::types::CompareRequest;
use crate::api::types::CompareResponse;
use crate::api::types::DailyWisdomQuery;
use crate::api::types::GreetingResponse;
use crate::api::types::JournalRequest;
use crate::api::types::JournalResponse;
use crate::api::types::MessageResponse;
use crate::api::types::PassageRef;
use crate::api::types::SessionQuery;
use crate::api::types::SourceRef;
use crate::api::types::TraditionSources;
use crate::api::types::UserSummary;
use crate::errors::WisdomError;
use crate::memory::is_valid_user_id;
use crate::memory::user_id_from_session;
use crate::models::Mode;
use crate::models::ScoredPassage;
use crate::rag::detect_comparison_request;
use crate::rag::AskRequest;
use crate::rag::DailyWisdom;
use crate::text::take_chars;
use crate::text::truncate_str;
use crate::traditions;

const SOURCE_CHARS: usize = 300;
const COMPARE_SOURCE_CHARS: usize = 400;

fn religion_filter(religion: Option<&str>) -> Vec<String> {
    religion
        .and_then(traditions::from_religion_id)
        .map(|t| vec![t.to_string()])
        .unwrap_or_default()
}

fn source_ref(tradition: &str, scored: &ScoredPassage) -> SourceRef {
    SourceRef {
        tradition: tradition.to_string(),
        scripture: scored.passage.scripture().to_string(),
        content: truncate_str(&scored.passage.content, SOURCE_CHARS),
    }
}

/// Comparison excerpts are always marked as excerpts
fn excerpt_ref(tradition: &str, scored: &ScoredPassage) -> SourceRef {
    SourceRef {
        content: format!("{}...", take_chars(&scored.passage.content, SOURCE_CHARS)),
        ..source_ref(tradition, scored)
    }
}

/// Answer a chat message (POST /api/chat)
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    info!("POST /api/chat");
    require_text(&req.message, "Message is required")?;

    if let Some(comparison) = detect_comparison_request(&req.message) {
        info!(
            "Routing chat to comparison of {:?} on '{}'",
            comparison.traditions, comparison.topic
        );
        let (response, found) = state
            .advisor
            .compare(&comparison.topic, &comparison.traditions)
            .await?;
        let sources = found
            .iter()
            .flat_map(|group| {
                group
                    .passages
                    .iter()
                    .map(|scored| excerpt_ref(&group.tradition, scored))
            })
            .collect();
        return ok(ChatResponse {
            response,
            is_crisis: false,
            sources: Some(sources),
            agent_outputs: Some(json!({
                "mode": "cross-religious-comparison",
                "traditions": comparison.traditions,
            })),
        });
    }

    let auth = authorization_or(&headers, req.authorization.as_deref());
    let seeker = state.seeker(auth, req.session_id.as_deref());
    let _guard = state.memory.lock(&seeker.user_id).await;
    let mut memory = state.memory.load(&seeker.user_id).await;
    if let Some(email) = &seeker.email {
        memory.link_email(email);
    }
    memory.visit_count += 1;

    let traditions = religion_filter(req.religion.as_deref());
    let answer = state
        .advisor
        .ask(AskRequest {
            question: req.message.clone(),
            traditions: traditions.clone(),
            history: req.conversation_history,
            memory: Some(&memory),
            mode: Mode::parse_lenient(&req.mode),
            message_count: memory.message_count(),
            multi_agent: req.use_multi_agent,
        })
        .await?;

    let sources = (!answer.is_crisis && !answer.passages.is_empty()).then(|| {
        answer
            .passages
            .iter()
            .map(|scored| source_ref(scored.passage.tradition(), scored))
            .collect()
    });

    if !answer.is_crisis {
        memory.add_exchange(&req.message, &answer.response, &traditions);
        state.memory.save(&seeker.user_id, &mut memory).await?;
    }

    let agent_outputs = match answer.agent_outputs {
        Some(outputs) => Some(serde_json::to_value(outputs).map_err(WisdomError::from)?),
        None => None,
    };
    ok(ChatResponse {
        response: answer.response,
        is_crisis: answer.is_crisis,
        sources,
        agent_outputs,
    })
}

/// Today's passage and reflection (GET /api/daily-wisdom)
pub async fn daily_wisdom(
    State(state): State<AppState>,
    Query(params): Query<DailyWisdomQuery>,
) -> ApiResult<DailyWisdom> {
    info!("GET /api/daily-wisdom");
    let themes = match params.session_id.as_deref().filter(|s| !s.is_empty()) {
        Some(session_id) => {
            state
                .memory
                .load(&user_id_from_session(session_id))
                .await
                .themes
        }
        None => Vec::new(),
    };
    let traditions = religion_filter(params.religion.as_deref());
    ok(state.advisor.daily_wisdom(&themes, &traditions).await?)
}

/// Compare traditions on a topic (POST /api/compare)
pub async fn compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<CompareResponse> {
    info!("POST /api/compare - {}", req.topic);
    require_text(&req.topic, "Topic is required")?;

    let valid = traditions::normalize_list(&req.traditions);
    if valid.len() < 2 {
        return Err(WisdomError::InvalidInput(format!(
            "Please provide at least 2 valid traditions. Available: {}",
            traditions::names().join(", ")
        ))
        .into());
    }

    let (comparison, found) = state.advisor.compare(&req.topic, &valid).await?;
    let sources = found
        .into_iter()
        .map(|group| {
            let passages = group
                .passages
                .iter()
                .map(|scored| PassageRef {
                    scripture: scored.passage.scripture().to_string(),
                    content: truncate_str(&scored.passage.content, COMPARE_SOURCE_CHARS),
                })
                .collect();
            let icon = traditions::icon_for(&group.tradition).to_string();
            (group.tradition, TraditionSources { icon, passages })
        })
        .collect();

    ok(CompareResponse {
        topic: req.topic,
        traditions_compared: valid,
        comparison,
        sources,
    })
}

/// Reflect on a journal entry and remember it (POST /api/journal)
pub async fn journal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<JournalRequest>,
) -> ApiResult<JournalResponse> {
    info!("POST /api/journal");
    require_text(&req.entry, "Journal entry is required")?;

    let auth = authorization_or(&headers, req.authorization.as_deref());
    let seeker = state.seeker(auth, req.session_id.as_deref());
    let _guard = state.memory.lock(&seeker.user_id).await;
    let mut memory = state.memory.load(&seeker.user_id).await;
    if let Some(email) = &seeker.email {
        memory.link_email(email);
    }

    let reflection = state
        .advisor
        .journal_reflection(&req.entry, Some(&memory))
        .await?;
    memory.add_journal_entry(&req.entry, &reflection);
    state.memory.save(&seeker.user_id, &mut memory).await?;

    ok(JournalResponse { reflection })
}

/// Memory summary for a user id (GET /api/user/:user_id)
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<UserSummary> {
    info!("GET /api/user/{}", user_id);
    if !is_valid_user_id(&user_id) {
        return Err(WisdomError::InvalidInput("Invalid user id".to_string()).into());
    }
    let memory = state.memory.load(&user_id).await;
    ok(UserSummary {
        has_history: memory.has_history(),
        user_id,
        visit_count: memory.visit_count,
        themes: memory.themes,
    })
}

/// Personalized greeting for returning seekers (GET /api/greeting)
pub async fn greeting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SessionQuery>,
) -> ApiResult<GreetingResponse> {
    let auth = authorization(&headers);
    let signed_in = auth.and_then(|a| state.auth.sessions().validate(a)).is_some();
    let has_session = params.session_id.as_deref().is_some_and(|s| !s.is_empty());

    let greeting = if signed_in || has_session {
        let seeker = state.seeker(auth, params.session_id.as_deref());
        state
            .memory
            .load(&seeker.user_id)
            .await
            .returning_greeting(Utc::now())
    } else {
        None
    };

    ok(GreetingResponse {
        greeting: greeting.unwrap_or_else(|| state.advisor.greeting().to_string()),
    })
}

/// Fold an anonymous session into the signed-in account (POST /api/migrate-memory)
pub async fn migrate_memory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SessionQuery>,
) -> ApiResult<MessageResponse> {
    let Some(auth) = authorization(&headers) else {
        return Err(WisdomError::AuthError(
            "Authentication required for migration".to_string(),
        )
        .into());
    };
    let email = state.auth.email_for(Some(auth))?;
    let Some(session_id) = params.session_id.filter(|s| !s.is_empty()) else {
        return Err(
            WisdomError::InvalidInput("session_id required for migration".to_string()).into(),
        );
    };

    info!("Migrating session memory into account {}", email);
    state
        .memory
        .migrate_session_to_account(&session_id, &email)
        .await?;
    ok(MessageResponse::new("Memory migrated successfully"))
}
