//! The spiritual advisor: screening, retrieval, prompting and generation

use std::sync::Arc;

use chrono::Datelike;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::agents::AgentOutputs;
use super::agents::AgentPipeline;
use super::context::context_to_text;
use super::context::traditions_in;
use super::context::MAX_CHARS_PER_PASSAGE;
use super::prompts;
use super::retriever::Retriever;
use super::retriever::TraditionPassages;
use super::retriever::DEFAULT_K_PER_TRADITION;
use crate::config::AdvisorConfig;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::llm::GenerationRequest;
use crate::llm::Generator;
use crate::llm::LlmService;
use crate::llm::EMPTY_REPLY_FALLBACK;
use crate::llm::FALLBACK_REPLY;
use crate::memory::UserMemory;
use crate::models::HistoryExchange;
use crate::models::Mode;
use crate::models::ScoredPassage;
use crate::safety;
use crate::text::take_chars;
use crate::text::truncate_str;
use crate::traditions;
use crate::vectorstore;

const ANSWER_MAX_TOKENS: u32 = 2048;
const COMPARISON_MAX_TOKENS: u32 = 1500;
const DAILY_WISDOM_MAX_TOKENS: u32 = 256;
const JOURNAL_MAX_TOKENS: u32 = 1500;

const HISTORY_EXCHANGES: usize = 2;
const HISTORY_QUESTION_CHARS: usize = 150;
const HISTORY_ANSWER_CHARS: usize = 200;

const SMALL_K: usize = 3;
const DAILY_PASSAGE_CHARS: usize = 500;

/// Compared when the caller names fewer than two traditions
pub const DEFAULT_COMPARISON_TRADITIONS: [&str; 5] =
    ["Christianity", "Buddhism", "Hinduism", "Islam", "Taoism"];

const DEFAULT_WISDOM_THEMES: [&str; 8] = [
    "hope",
    "peace",
    "strength",
    "wisdom",
    "love",
    "patience",
    "gratitude",
    "courage",
];

pub const NO_COMPARISON_PASSAGES: &str =
    "I couldn't find relevant passages on this topic across traditions.";

const FALLBACK_WISDOM: &str =
    "May this day bring you moments of peace and clarity on your journey.";
const FALLBACK_WISDOM_TRADITION: &str = "Universal Wisdom";

/// A question for the advisor
#[derive(Debug, Clone, Default)]
pub struct AskRequest<'a> {
    pub question: String,
    pub traditions: Vec<String>,
    pub history: Vec<HistoryExchange>,
    pub memory: Option<&'a UserMemory>,
    pub mode: Mode,
    /// Exchanges the seeker has had so far
    pub message_count: usize,
    pub multi_agent: bool,
}

impl AskRequest<'_> {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub passages: Vec<ScoredPassage>,
    pub is_crisis: bool,
    pub agent_outputs: Option<AgentOutputs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyWisdom {
    pub wisdom: String,
    pub tradition: String,
    pub scripture: String,
}

pub struct Advisor {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    agents: AgentPipeline,
    settings: AdvisorConfig,
}

impl Advisor {
    pub fn new(retriever: Retriever, generator: Arc<dyn Generator>, settings: AdvisorConfig) -> Self {
        Self {
            agents: AgentPipeline::new(generator.clone()),
            retriever,
            generator,
            settings,
        }
    }

    /// Advisor backed by the configured embedder, vector store and LLM
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder = Arc::new(EmbeddingService::new(config)?);
        let store = vectorstore::open(config).await?;
        let generator = Arc::new(LlmService::new(config)?);
        Ok(Self::new(
            Retriever::new(embedder, store),
            generator,
            config.advisor.clone(),
        ))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn greeting(&self) -> &str {
        &self.settings.greeting
    }

    /// Generate and fall back to fixed text instead of failing
    async fn generate_or_fallback(&self, request: GenerationRequest) -> String {
        match self.generator.generate(&request).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("LLM returned an empty reply");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            Ok(text) => text,
            Err(e) => {
                warn!("Generation failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Answer a seeker's question
    ///
    /// Crisis messages are answered with support resources before anything
    /// is retrieved, and `is_crisis` is set so callers skip memory writes.
    pub async fn ask(&self, request: AskRequest<'_>) -> Result<AskResponse> {
        let question = request.question.as_str();

        if self.settings.enable_crisis_detection {
            if let Some(kind) = safety::detect_crisis(question) {
                info!("Crisis language detected ({:?}), returning resources", kind);
                return Ok(AskResponse {
                    response: safety::crisis_response(kind).to_string(),
                    passages: Vec::new(),
                    is_crisis: true,
                    agent_outputs: None,
                });
            }
        }

        let clarification = safety::detect_deity_treatment(question)
            .then(safety::deity_clarification);

        let passages = self
            .retriever
            .retrieve(question, &request.traditions, self.settings.retrieval_k)
            .await?;
        let context = context_to_text(&passages, MAX_CHARS_PER_PASSAGE);
        debug!(
            "Retrieved {} passages, context {} chars",
            passages.len(),
            context.len()
        );

        let memory_context = request
            .memory
            .map(UserMemory::context_for_llm)
            .unwrap_or_default();

        let (mut response, agent_outputs) = if request.multi_agent {
            let (answer, outputs) = self
                .agents
                .run(question, &context, &request.traditions, &memory_context)
                .await;
            (answer, Some(outputs))
        } else {
            let found = traditions_in(&passages);
            let system_prompt =
                prompts::build_advisor_system_prompt(&self.settings.name, &found, request.mode);
            let history = format_history(&request.history);
            let user_prompt = prompts::build_advisor_user_prompt(
                request.mode,
                &context,
                &memory_context,
                &history,
                question,
            );
            let generation = GenerationRequest::new(user_prompt)
                .with_system(system_prompt)
                .with_max_tokens(ANSWER_MAX_TOKENS);
            (self.generate_or_fallback(generation).await, None)
        };

        if let Some(clarification) = clarification {
            response = format!("{clarification}\n\n---\n\n{response}");
        }
        if safety::should_add_humility_reminder(request.message_count) {
            response.push_str("\n\n---\n");
            response.push_str(safety::humility_reminder());
        }

        Ok(AskResponse {
            response,
            passages,
            is_crisis: false,
            agent_outputs,
        })
    }

    /// How several traditions approach one topic
    pub async fn compare(
        &self,
        topic: &str,
        traditions: &[String],
    ) -> Result<(String, Vec<TraditionPassages>)> {
        let traditions: Vec<String> = if traditions.len() < 2 {
            DEFAULT_COMPARISON_TRADITIONS
                .iter()
                .map(|t| (*t).to_string())
                .collect()
        } else {
            traditions.to_vec()
        };

        let found = self
            .retriever
            .retrieve_comparative(topic, &traditions, DEFAULT_K_PER_TRADITION)
            .await?;
        if found.is_empty() {
            return Ok((NO_COMPARISON_PASSAGES.to_string(), found));
        }

        let mut lines = Vec::new();
        for group in &found {
            lines.push(format!(
                "\n{} **{}**:",
                traditions::icon_for(&group.tradition),
                group.tradition
            ));
            for scored in &group.passages {
                lines.push(format!(
                    "[{}]: {}...",
                    scored.passage.scripture(),
                    take_chars(scored.passage.content.trim(), MAX_CHARS_PER_PASSAGE)
                ));
            }
        }
        let context = lines.join("\n");

        let request = GenerationRequest::new(prompts::build_comparison_prompt(topic, &context))
            .with_system(prompts::build_comparison_system_prompt(&self.settings.name))
            .with_max_tokens(COMPARISON_MAX_TOKENS);
        Ok((self.generate_or_fallback(request).await, found))
    }

    /// A short reflection on one passage, chosen by today's date
    pub async fn daily_wisdom(&self, themes: &[String], traditions: &[String]) -> Result<DailyWisdom> {
        self.daily_wisdom_on(themes, traditions, Utc::now().ordinal() as usize)
            .await
    }

    /// Same as [`Advisor::daily_wisdom`] for an explicit day number
    pub async fn daily_wisdom_on(
        &self,
        themes: &[String],
        traditions: &[String],
        day: usize,
    ) -> Result<DailyWisdom> {
        let query = if themes.is_empty() {
            let theme = DEFAULT_WISDOM_THEMES[day % DEFAULT_WISDOM_THEMES.len()];
            format!("wisdom guidance {theme}")
        } else {
            format!("wisdom guidance inspiration {}", themes[day % themes.len()])
        };

        let passages = self.retriever.retrieve(&query, traditions, SMALL_K).await?;
        let Some(chosen) = passages.get(day % passages.len().max(1)) else {
            return Ok(DailyWisdom {
                wisdom: FALLBACK_WISDOM.to_string(),
                tradition: FALLBACK_WISDOM_TRADITION.to_string(),
                scripture: String::new(),
            });
        };

        let passage = &chosen.passage;
        let tradition = passage.tradition().to_string();
        let text = take_chars(passage.content.trim(), DAILY_PASSAGE_CHARS);
        let request = GenerationRequest::new(prompts::build_daily_wisdom_prompt(&tradition, &text))
            .with_system(prompts::build_daily_wisdom_system_prompt(&self.settings.name))
            .with_max_tokens(DAILY_WISDOM_MAX_TOKENS);

        Ok(DailyWisdom {
            wisdom: self.generate_or_fallback(request).await,
            tradition,
            scripture: passage.metadata.scripture_name.clone(),
        })
    }

    /// Gentle reflection on a journal entry
    pub async fn journal_reflection(&self, entry: &str, memory: Option<&UserMemory>) -> Result<String> {
        let none: [&str; 0] = [];
        let passages = self.retriever.retrieve(entry, &none, SMALL_K).await?;
        let context = context_to_text(&passages, MAX_CHARS_PER_PASSAGE);
        let memory_context = memory.map(UserMemory::context_for_llm).unwrap_or_default();

        let request = GenerationRequest::new(prompts::build_journal_prompt(
            &context,
            &memory_context,
            entry,
        ))
        .with_system(prompts::build_journal_system_prompt(&self.settings.name))
        .with_max_tokens(JOURNAL_MAX_TOKENS);
        Ok(self.generate_or_fallback(request).await)
    }
}

/// The last two exchanges as "Seeker/Advisor" blocks
fn format_history(history: &[HistoryExchange]) -> String {
    let start = history.len().saturating_sub(HISTORY_EXCHANGES);
    history[start..]
        .iter()
        .map(|exchange| {
            format!(
                "Seeker: {}\nAdvisor: {}",
                truncate_str(&exchange.question, HISTORY_QUESTION_CHARS),
                truncate_str(&exchange.answer, HISTORY_ANSWER_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
