//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `wisdomrag` CLI

use crate::ingest::IndexStats;
use crate::models::ScoredPassage;
use crate::rag::DailyWisdom;
use crate::rag::TraditionPassages;
use crate::text::truncate_str;
use crate::traditions;
use crate::AppConfig;

const PASSAGE_PREVIEW_CHARS: usize = 200;

/// Hide everything but the scheme and host of a connection string
fn mask_database_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://***@{}/***",
            parsed.scheme(),
            parsed.host_str().unwrap_or("localhost")
        ),
        Err(_) => "***".to_string(),
    }
}

fn mask_key(key: Option<&str>) -> &'static str {
    match key {
        Some(k) if !k.is_empty() => "set",
        _ => "not set",
    }
}

/// Print the tradition catalog
pub fn print_traditions(downloaded: impl Fn(&str) -> bool) {
    println!("📚 Traditions and scriptures:");
    for tradition in traditions::all() {
        println!();
        println!("{} {} - {}", tradition.icon, tradition.name, tradition.description);
        for source in tradition.sources {
            let status = if source.url.is_none() {
                "no download"
            } else if downloaded(source.file_name) {
                "downloaded"
            } else {
                "missing"
            };
            println!("  - {} ({}) [{}]", source.scripture_name, source.file_name, status);
        }
    }
}

/// Print the passages behind an answer
pub fn print_passages(passages: &[ScoredPassage]) {
    if passages.is_empty() {
        println!("  (no passages retrieved)");
        return;
    }
    for (i, scored) in passages.iter().enumerate() {
        let passage = &scored.passage;
        println!(
            "  {}. {} {} [{}] (similarity {:.3})",
            i + 1,
            traditions::icon_for(passage.tradition()),
            passage.tradition(),
            passage.scripture(),
            scored.score
        );
        println!(
            "     {}",
            truncate_str(passage.content.trim(), PASSAGE_PREVIEW_CHARS).replace('\n', " ")
        );
    }
}

pub fn print_comparison_sources(groups: &[TraditionPassages]) {
    for group in groups {
        println!();
        println!(
            "{} {} ({} passages)",
            traditions::icon_for(&group.tradition),
            group.tradition,
            group.passages.len()
        );
        for scored in &group.passages {
            println!(
                "  - [{}] {}",
                scored.passage.scripture(),
                truncate_str(scored.passage.content.trim(), PASSAGE_PREVIEW_CHARS)
                    .replace('\n', " ")
            );
        }
    }
}

pub fn print_daily_wisdom(wisdom: &DailyWisdom) {
    println!("🌅 Today's Wisdom");
    println!();
    println!("{}", wisdom.wisdom);
    println!();
    if wisdom.scripture.is_empty() {
        println!("  - {}", wisdom.tradition);
    } else {
        println!("  - {}, {}", wisdom.tradition, wisdom.scripture);
    }
}

pub fn print_index_stats(stats: &IndexStats) {
    println!("📊 Indexed {} documents into {} passages", stats.documents, stats.chunks);
    for (tradition, count) in &stats.traditions {
        println!("  {} {}: {}", traditions::icon_for(tradition), tradition, count);
    }
}

pub fn print_config(config: &AppConfig) {
    println!("📋 wisdomrag Configuration:");
    println!();

    println!("📁 Data:");
    println!("  Raw texts: {}", config.raw_dir().display());
    println!("  User data: {}", config.user_data_dir().display());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Directory: {}", config.logging.dir.display());
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {:?}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!("  Key: {}", mask_key(config.embeddings.api_key.as_deref()));
    println!();

    println!("🗄️  Vector store:");
    println!("  Backend: {:?}", config.vector_store.backend);
    println!("  Path: {}", config.vector_store.path.display());
    if let Some(url) = &config.vector_store.database_url {
        println!("  URL: {}", mask_database_url(url));
        println!("  Table: {}", config.vector_store.table);
    }
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {:?}", config.llm.provider);
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Key: {}", mask_key(config.llm.api_key.as_deref()));
    println!();

    println!("🕊️  Advisor:");
    println!("  Name: {}", config.advisor_name());
    println!("  Crisis detection: {}", config.advisor.enable_crisis_detection);
    println!("  Passages per answer: {}", config.advisor.retrieval_k);
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.cors);
    println!("  Session TTL: {} days", config.auth.session_ttl_days);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_database_url() {
        assert_eq!(
            mask_database_url("postgresql://user:pw@db.example.com:5432/wisdom"),
            "postgresql://***@db.example.com/***"
        );
        assert_eq!(mask_database_url("not a url"), "***");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(Some("sk-123")), "set");
        assert_eq!(mask_key(Some("")), "not set");
        assert_eq!(mask_key(None), "not set");
    }
}
