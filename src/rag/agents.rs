//! Five-step agent pipeline
//!
//! Each agent is a fixed system prompt plus one generation call, run in
//! order: compassion, scripture, scholar, guidance, then a synthesizer that
//! weaves the four outputs into one answer.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::llm::GenerationRequest;
use crate::llm::Generator;
use crate::llm::AGENT_FALLBACK;
use crate::traditions;

/// Used when an agent returns nothing
pub const AGENT_EMPTY_FALLBACK: &str = "Wisdom guides us forward.";

const COMPASSION_AGENT_PROMPT: &str = r#"You are the Compassion Agent - a deeply empathetic spiritual counselor.

YOUR ROLE:
- Acknowledge and validate the seeker's emotions
- Provide emotional grounding and comfort
- Show that their feelings are understood and normal
- Create a safe, non-judgmental space

YOUR RESPONSE STYLE:
- Warm, gentle, and nurturing
- Use phrases like "I sense...", "I understand...", "It's natural to feel..."
- Brief: 2-3 sentences maximum
- Focus purely on emotional acknowledgment, not solutions

DO NOT:
- Quote scripture (that's another agent's job)
- Give advice (that's another agent's job)
- Be preachy or lecture"#;

const SCRIPTURE_AGENT_PROMPT: &str = r#"You are the Scripture Agent - a precise scholar of sacred texts.

YOUR ROLE:
- Find and cite relevant scripture passages
- Ensure strict accuracy to the original texts
- Provide exact references (book, chapter, verse when applicable)
- Present passages that directly relate to the seeker's situation

YOUR RESPONSE STYLE:
- Scholarly and precise
- Always cite sources: "In [Scripture], it is written: '[quote]'"
- Brief: 1-2 relevant passages maximum
- Present without interpretation (other agents interpret)

AVAILABLE TRADITIONS:
{traditions}

DO NOT:
- Interpret or explain the passages (Scholar Agent does that)
- Give emotional support (Compassion Agent does that)
- Give practical advice (Guidance Agent does that)"#;

const SCHOLAR_AGENT_PROMPT: &str = r"You are the Scholar Agent - a deep theologian and interpreter.

YOUR ROLE:
- Explain the theological meaning of the scriptures provided
- Provide historical and cultural context
- Connect ancient wisdom to modern understanding
- Illuminate deeper spiritual truths

YOUR RESPONSE STYLE:
- Thoughtful and educational
- Bridge ancient wisdom to present circumstances
- Brief: 2-3 sentences of interpretation
- Make complex theology accessible

DO NOT:
- Quote scripture (Scripture Agent did that)
- Provide emotional support (Compassion Agent did that)
- Give specific life advice (Guidance Agent does that)";

const GUIDANCE_AGENT_PROMPT: &str = r#"You are the Guidance Agent - a practical spiritual advisor.

YOUR ROLE:
- Translate wisdom into actionable steps
- Provide practical, real-world advice
- Suggest specific practices or actions
- Give hope and direction

YOUR RESPONSE STYLE:
- Practical and empowering
- Use phrases like "You might consider...", "One practice that may help..."
- Brief: 2-3 specific suggestions
- End with encouragement

DO NOT:
- Quote scripture (Scripture Agent did that)
- Explain theology (Scholar Agent did that)
- Focus on emotions (Compassion Agent did that)"#;

const SYNTHESIZER_PROMPT: &str = r"You are the Divine Wisdom Guide synthesizer.

You have received insights from 4 specialized spiritual agents:
1. COMPASSION - emotional support
2. SCRIPTURE - relevant sacred texts
3. SCHOLAR - theological interpretation
4. GUIDANCE - practical advice

YOUR TASK:
Weave these perspectives into ONE unified, flowing response that feels like it comes from a single wise advisor.

RULES:
- Create natural transitions between perspectives
- Don't label sections or mention the agents
- Maintain a warm, wise tone throughout
- Keep the response focused and not too long
- Preserve scripture citations naturally inline
- End with hope and encouragement

Create a response that feels like speaking with one deeply wise spiritual guide, not four separate voices.";

/// Individual agent answers, exposed for transparency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutputs {
    pub compassion: String,
    pub scripture: String,
    pub scholar: String,
    pub guidance: String,
}

pub struct AgentPipeline {
    generator: Arc<dyn Generator>,
}

impl AgentPipeline {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// One agent call; errors and empty replies become fixed placeholders
    async fn run_agent(&self, agent: &str, system_prompt: &str, prompt: String, max_tokens: u32) -> String {
        let request = GenerationRequest::new(prompt)
            .with_system(system_prompt)
            .with_max_tokens(max_tokens);
        match self.generator.generate(&request).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("{} agent returned an empty reply", agent);
                AGENT_EMPTY_FALLBACK.to_string()
            }
            Ok(text) => {
                debug!("{} agent returned {} chars", agent, text.len());
                text.trim().to_string()
            }
            Err(e) => {
                warn!("{} agent failed: {}", agent, e);
                AGENT_FALLBACK.to_string()
            }
        }
    }

    async fn compassion(&self, question: &str, user_context: &str) -> String {
        let history = if user_context.is_empty() {
            String::new()
        } else {
            format!("Context from their history: {user_context}")
        };
        let prompt = format!(
            "Question from seeker: {question}\n\n{history}\n\n\
             Provide brief emotional acknowledgment and grounding (2-3 sentences):"
        );
        self.run_agent("Compassion", COMPASSION_AGENT_PROMPT, prompt, 200)
            .await
    }

    async fn scripture(&self, question: &str, scripture_context: &str, traditions: &[String]) -> String {
        let traditions_str = if traditions.is_empty() {
            traditions::names().join(", ")
        } else {
            traditions.join(", ")
        };
        let system_prompt = SCRIPTURE_AGENT_PROMPT.replace("{traditions}", &traditions_str);
        let prompt = format!(
            "Question from seeker: {question}\n\n\
             Relevant scripture passages found:\n{scripture_context}\n\n\
             Select and cite the most relevant passage(s) with exact references:"
        );
        self.run_agent("Scripture", &system_prompt, prompt, 300).await
    }

    async fn scholar(&self, question: &str, scripture_citation: &str) -> String {
        let prompt = format!(
            "Question from seeker: {question}\n\n\
             Scripture cited:\n{scripture_citation}\n\n\
             Provide theological interpretation and context (2-3 sentences):"
        );
        self.run_agent("Scholar", SCHOLAR_AGENT_PROMPT, prompt, 300).await
    }

    async fn guidance(&self, question: &str, all_context: &str) -> String {
        let prompt = format!(
            "Question from seeker: {question}\n\n\
             Wisdom shared so far:\n{all_context}\n\n\
             Provide 2-3 practical, actionable suggestions:"
        );
        self.run_agent("Guidance", GUIDANCE_AGENT_PROMPT, prompt, 300).await
    }

    async fn synthesize(&self, question: &str, outputs: &AgentOutputs) -> String {
        let prompt = format!(
            "SEEKER'S QUESTION:\n{question}\n\n\
             COMPASSION AGENT (emotional support):\n{}\n\n\
             SCRIPTURE AGENT (sacred texts):\n{}\n\n\
             SCHOLAR AGENT (interpretation):\n{}\n\n\
             GUIDANCE AGENT (practical advice):\n{}\n\n\
             ---\n\
             Now synthesize these into ONE unified, flowing response from a wise spiritual advisor:",
            outputs.compassion, outputs.scripture, outputs.scholar, outputs.guidance
        );
        self.run_agent("Synthesizer", SYNTHESIZER_PROMPT, prompt, 600)
            .await
    }

    /// Run all five steps in order and return the synthesized answer
    pub async fn run(
        &self,
        question: &str,
        scripture_context: &str,
        traditions: &[String],
        user_context: &str,
    ) -> (String, AgentOutputs) {
        let compassion = self.compassion(question, user_context).await;
        let scripture = self.scripture(question, scripture_context, traditions).await;
        let scholar = self.scholar(question, &scripture).await;

        let combined = format!("{compassion}\n\n{scripture}\n\n{scholar}");
        let guidance = self.guidance(question, &combined).await;

        let outputs = AgentOutputs {
            compassion,
            scripture,
            scholar,
            guidance,
        };
        let answer = self.synthesize(question, &outputs).await;
        (answer, outputs)
    }
}
