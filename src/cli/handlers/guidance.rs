//! Handlers that talk to the advisor

use crate::cli::output::*;
use crate::errors::WisdomError;
use crate::memory::user_id_from_session;
use crate::memory::MemoryStore;
use crate::models::Mode;
use crate::rag::Advisor;
use crate::rag::AskRequest;
use crate::traditions;
use crate::AppConfig;
use crate::Result;

async fn advisor_with_passages(config: &AppConfig) -> Result<Option<Advisor>> {
    let advisor = Advisor::from_config(config).await?;
    if advisor.retriever().store().count().await? == 0 {
        print_warning("No passages indexed yet. Run: wisdomrag download --all && wisdomrag index");
        return Ok(None);
    }
    Ok(Some(advisor))
}

pub async fn handle_ask(
    config: &AppConfig,
    question: String,
    traditions: Vec<String>,
    mode: String,
    multi_agent: bool,
    verbose: bool,
) -> Result<()> {
    let Some(advisor) = advisor_with_passages(config).await? else {
        return Ok(());
    };
    let mode: Mode = mode.parse()?;
    let traditions = traditions::normalize_list(&traditions);

    print_info(&format!("🙏 {question}"));
    let answer = advisor
        .ask(AskRequest {
            traditions,
            mode,
            multi_agent,
            ..AskRequest::new(question)
        })
        .await?;

    println!();
    println!("{}", answer.response);

    if verbose && !answer.is_crisis {
        println!();
        println!("📖 Sources:");
        print_passages(&answer.passages);
    }
    if let (true, Some(outputs)) = (verbose, &answer.agent_outputs) {
        println!();
        println!("🤝 Agents:");
        println!("  Compassion: {}", outputs.compassion);
        println!("  Scripture: {}", outputs.scripture);
        println!("  Scholar: {}", outputs.scholar);
        println!("  Guidance: {}", outputs.guidance);
    }
    Ok(())
}

pub async fn handle_compare(config: &AppConfig, topic: String, traditions: Vec<String>) -> Result<()> {
    let valid = traditions::normalize_list(&traditions);
    if valid.len() < 2 {
        return Err(WisdomError::InvalidInput(format!(
            "Please provide at least 2 valid traditions. Available: {}",
            traditions::names().join(", ")
        )));
    }
    let Some(advisor) = advisor_with_passages(config).await? else {
        return Ok(());
    };

    print_info(&format!("⚖️  Comparing {} on \"{topic}\"", valid.join(", ")));
    let (comparison, sources) = advisor.compare(&topic, &valid).await?;
    println!();
    println!("{comparison}");
    print_comparison_sources(&sources);
    Ok(())
}

pub async fn handle_wisdom(config: &AppConfig, tradition: Option<String>) -> Result<()> {
    let Some(advisor) = advisor_with_passages(config).await? else {
        return Ok(());
    };
    let traditions = tradition
        .map(|t| traditions::normalize_list(&[t]))
        .unwrap_or_default();
    let wisdom = advisor.daily_wisdom(&[], &traditions).await?;
    print_daily_wisdom(&wisdom);
    Ok(())
}

pub async fn handle_journal(config: &AppConfig, entry: String, session: Option<String>) -> Result<()> {
    let Some(advisor) = advisor_with_passages(config).await? else {
        return Ok(());
    };

    let Some(session_id) = session else {
        let reflection = advisor.journal_reflection(&entry, None).await?;
        println!("{reflection}");
        return Ok(());
    };

    let store = MemoryStore::new(config.memory_dir());
    let user_id = user_id_from_session(&session_id);
    let _guard = store.lock(&user_id).await;
    let mut memory = store.load(&user_id).await;
    let reflection = advisor.journal_reflection(&entry, Some(&memory)).await?;
    memory.add_journal_entry(&entry, &reflection);
    store.save(&user_id, &mut memory).await?;

    println!("{reflection}");
    println!();
    print_success(&format!(
        "Saved to journal ({} entries)",
        memory.journal_entries.len()
    ));
    Ok(())
}
