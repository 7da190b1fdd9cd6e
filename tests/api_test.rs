use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wisdomrag::api::build_router;
use wisdomrag::api::AppState;
use wisdomrag::auth::AccountStore;
use wisdomrag::auth::AuthService;
use wisdomrag::auth::SessionManager;
use wisdomrag::community::CommunityStore;
use wisdomrag::config::AdvisorConfig;
use wisdomrag::embeddings::Embedder;
use wisdomrag::llm::GenerationRequest;
use wisdomrag::llm::Generator;
use wisdomrag::memory::user_id_from_session;
use wisdomrag::memory::MemoryStore;
use wisdomrag::models::EmbeddedChunk;
use wisdomrag::models::Passage;
use wisdomrag::models::PassageMetadata;
use wisdomrag::rag::Advisor;
use wisdomrag::rag::Retriever;
use wisdomrag::vectorstore::FlatStore;
use wisdomrag::vectorstore::VectorStore;
use wisdomrag::AppConfig;
use wisdomrag::Result;

const ANSWER: &str = "Be still, and let the teaching settle in your heart.";

struct FixedEmbedder;

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

struct FixedGenerator;

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Ok(ANSWER.to_string())
    }
}

fn chunk(id: &str, tradition: &str, scripture: &str, content: &str) -> EmbeddedChunk {
    EmbeddedChunk {
        id: id.to_string(),
        passage: Passage {
            content: content.to_string(),
            metadata: PassageMetadata {
                tradition: tradition.to_string(),
                scripture_name: scripture.to_string(),
                book_title: id.to_string(),
                source_file: format!("{id}.txt"),
                chunk_index: 0,
            },
        },
        embedding: vec![1.0, 0.0],
    }
}

struct TestApp {
    router: Router,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let store = FlatStore::in_memory();
    store
        .add(vec![
            chunk("dhammapada", "Buddhism", "Dhammapada", "Hatred does not cease by hatred."),
            chunk("gita", "Hinduism", "Bhagavad Gita", "Perform your duty with a steady mind."),
            chunk("tao", "Taoism", "Tao Te Ching", "The soft overcomes the hard."),
        ])
        .await
        .unwrap();

    let advisor = Advisor::new(
        Retriever::new(Arc::new(FixedEmbedder), Arc::new(store)),
        Arc::new(FixedGenerator),
        AdvisorConfig::default(),
    );
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        advisor: Arc::new(advisor),
        memory: Arc::new(MemoryStore::new(dir.path().join("memory"))),
        auth: Arc::new(AuthService::new(
            AccountStore::new(dir.path().join("accounts"), 6),
            Arc::new(SessionManager::new(chrono::Duration::days(7))),
        )),
        community: Arc::new(CommunityStore::new(dir.path().join("community"))),
    };

    TestApp {
        router: build_router(state, false),
        _dir: dir,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    async fn signup(&self, email: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({"email": email, "password": "secret123", "name": name}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_root_and_health() {
    let app = setup().await;

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "running");

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["indexed_passages"], 3);
}

#[tokio::test]
async fn test_list_traditions() {
    let app = setup().await;
    let (status, body) = app.get("/api/traditions", None).await;
    assert_eq!(status, StatusCode::OK);

    let traditions = body["data"]["traditions"].as_array().unwrap();
    assert!(traditions.len() >= 5);
    assert!(traditions.iter().any(|t| t["name"] == "Buddhism"));
}

#[tokio::test]
async fn test_chat_answers_and_remembers() {
    let app = setup().await;
    let (status, body) = app
        .post(
            "/api/chat",
            None,
            json!({"message": "How do I let go of anger?", "session_id": "seeker-1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["is_crisis"], false);
    assert!(body["data"]["response"].as_str().unwrap().contains(ANSWER));
    assert!(!body["data"]["sources"].as_array().unwrap().is_empty());

    let user_id = user_id_from_session("seeker-1");
    let (_, body) = app.get(&format!("/api/user/{user_id}"), None).await;
    assert_eq!(body["data"]["has_history"], true);
    assert_eq!(body["data"]["visit_count"], 1);
}

#[tokio::test]
async fn test_chat_crisis_is_not_remembered() {
    let app = setup().await;
    let (status, body) = app
        .post(
            "/api/chat",
            None,
            json!({"message": "I want to end it all", "session_id": "seeker-2"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_crisis"], true);
    assert!(body["data"]["sources"].is_null());

    let user_id = user_id_from_session("seeker-2");
    let (_, body) = app.get(&format!("/api/user/{user_id}"), None).await;
    assert_eq!(body["data"]["has_history"], false);
}

#[tokio::test]
async fn test_chat_requires_message() {
    let app = setup().await;
    let (status, body) = app.post("/api/chat", None, json!({"message": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_compare_needs_two_traditions() {
    let app = setup().await;
    let (status, body) = app
        .post(
            "/api/compare",
            None,
            json!({"topic": "forgiveness", "traditions": ["Buddhism", "Atlantis"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Please provide at least 2 valid traditions"));

    let (status, body) = app
        .post(
            "/api/compare",
            None,
            json!({"topic": "forgiveness", "traditions": ["Buddhism", "Taoism"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["comparison"], ANSWER);
    assert!(body["data"]["sources"]["Buddhism"]["passages"].is_array());
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let app = setup().await;
    let token = app.signup("Seeker@Example.com", "Seeker").await;

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "seeker@example.com");

    let (status, _) = app
        .post(
            "/api/auth/signup",
            None,
            json!({"email": "seeker@example.com", "password": "another1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "seeker@example.com", "password": "wrong-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "seeker@example.com", "password": "secret123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Login successful");

    let (status, _) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_threads_lifecycle() {
    let app = setup().await;
    let query = "?session_id=thread-seeker";

    let (status, body) = app
        .post(
            &format!("/api/chats{query}"),
            None,
            json!({"religion": "buddhism", "title": "New Conversation"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let chat_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/api/chats/current{query}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["id"], chat_id.as_str());

    let (status, body) = app
        .post(
            &format!("/api/chats/{chat_id}/messages{query}"),
            None,
            json!({"role": "user", "content": "How do I find peace in grief?"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "How do I find peace in grief?");

    let (_, body) = app.get(&format!("/api/chats{query}"), None).await;
    assert_eq!(body["data"]["chats"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .get("/api/search/chats?q=grief&session_id=thread-seeker", None)
        .await;
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/chats/{chat_id}/title{query}"),
            None,
            Some(json!({"title": "Grief"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::PUT, &format!("/api/chats/current/{chat_id}{query}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/chats/{chat_id}{query}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/chats/{chat_id}{query}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Chat not found");
}

#[tokio::test]
async fn test_numbered_chat_keeps_its_title() {
    let app = setup().await;
    let query = "?session_id=numbered-seeker";

    let (_, body) = app.post(&format!("/api/chats{query}"), None, json!({})).await;
    assert_eq!(body["data"]["title"], "New Chat 1");
    let chat_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/chats/{chat_id}/messages{query}"),
            None,
            json!({"role": "user", "content": "What is grace?"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "New Chat 1");
}

#[tokio::test]
async fn test_current_chat_is_created_on_demand() {
    let app = setup().await;
    let query = "?session_id=fresh-seeker&religion=taoism";

    let (status, body) = app.get(&format!("/api/chats/current{query}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "New Chat 1");
    assert_eq!(body["data"]["religion"], "taoism");
    let chat_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.get(&format!("/api/chats/current{query}"), None).await;
    assert_eq!(body["data"]["id"], chat_id.as_str());

    let (_, body) = app.get(&format!("/api/chats{query}"), None).await;
    assert_eq!(body["data"]["chats"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["current_chat_id"], chat_id.as_str());

    let (status, _) = app.get("/api/chats/current", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chats_need_an_identity() {
    let app = setup().await;
    let (status, _) = app.get("/api/chats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_community_flow() {
    let app = setup().await;
    let alice = app.signup("alice@example.com", "Alice").await;
    let bob = app.signup("bob@example.com", "Bob").await;

    let (status, _) = app.get("/api/community/matches", Some(&alice)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (token, name) in [(&alice, "Alice"), (&bob, "Bob")] {
        let (status, body) = app
            .post(
                "/api/community/profile",
                Some(token),
                json!({"display_name": name, "preferred_traditions": ["Buddhism"]}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, body) = app.get("/api/community/matches", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["matches"][0]["email"], "bob@example.com");

    let (status, body) = app
        .post(
            "/api/community/connect",
            Some(&alice),
            json!({"to_email": "bob@example.com", "message": "Hello"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Connection request sent!");

    let (_, body) = app.get("/api/community/requests", Some(&bob)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["requests"][0]["from_email"], "alice@example.com");

    let (status, _) = app
        .post(
            "/api/community/respond",
            Some(&bob),
            json!({"from_email": "alice@example.com", "accept": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/community/connections", Some(&alice)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["connections"][0]["display_name"], "Bob");

    let (_, body) = app.get("/api/search/profiles?q=bob", Some(&alice)).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_migrate_memory_moves_session_into_account() {
    let app = setup().await;

    let (status, _) = app
        .post("/api/migrate-memory?session_id=wanderer", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.signup("wanderer@example.com", "Wanderer").await;
    let (status, body) = app.post("/api/migrate-memory", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "session_id required for migration");

    let (status, _) = app
        .post(
            "/api/chat",
            None,
            json!({"message": "How do I let go of anger?", "session_id": "wanderer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/api/migrate-memory?session_id=wanderer", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["message"], "Memory migrated successfully");

    let (_, body) = app.get("/api/chats", Some(&token)).await;
    let chats = body["data"]["chats"].as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["title"], "How do I let go of anger?");

    let (_, body) = app.get("/api/chats/current", Some(&token)).await;
    assert_eq!(body["data"]["id"], chats[0]["id"]);
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_journal_reflects_and_remembers() {
    let app = setup().await;

    let (status, body) = app
        .post("/api/journal", None, json!({"entry": " ", "session_id": "writer"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Journal entry is required");

    let (status, body) = app
        .post(
            "/api/journal",
            None,
            json!({"entry": "Today I forgave my brother.", "session_id": "writer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["reflection"].as_str().unwrap().contains(ANSWER));

    let (_, body) = app
        .get("/api/search/journal?q=forgave&session_id=writer", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_daily_wisdom_for_a_religion() {
    let app = setup().await;
    let (status, body) = app
        .get("/api/daily-wisdom?religion=buddhism", None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["wisdom"].as_str().unwrap().contains(ANSWER));
    assert_eq!(body["data"]["tradition"], "Buddhism");
    assert_eq!(body["data"]["scripture"], "Dhammapada");
}

#[tokio::test]
async fn test_user_summary_rejects_malformed_ids() {
    let app = setup().await;
    for uri in ["/api/user/..%2F..%2Fsecret", "/api/user/NOT-A-DIGEST", "/api/user/abc"] {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Invalid user id");
    }
}

#[tokio::test]
async fn test_chat_comparison_sources_are_marked_as_excerpts() {
    let app = setup().await;
    let (status, body) = app
        .post(
            "/api/chat",
            None,
            json!({"message": "Compare Buddhism and Taoism on letting go", "session_id": "c"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["agent_outputs"]["mode"], "cross-religious-comparison");

    let sources = body["data"]["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert!(sources
        .iter()
        .all(|s| s["content"].as_str().unwrap().ends_with("...")));
}

#[tokio::test]
async fn test_compare_counts_distinct_traditions() {
    let app = setup().await;
    let (status, _) = app
        .post(
            "/api/compare",
            None,
            json!({"topic": "charity", "traditions": ["Islam", "islam"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
