//! Scripture download and indexing handlers

use std::sync::Arc;

use crate::cli::output::*;
use crate::embeddings::EmbeddingService;
use crate::ingest::DownloadOutcome;
use crate::ingest::Downloader;
use crate::ingest::Indexer;
use crate::traditions;
use crate::vectorstore;
use crate::AppConfig;
use crate::Result;

pub async fn handle_download(
    config: &AppConfig,
    all: bool,
    tradition: Option<String>,
    list: bool,
    force: bool,
) -> Result<()> {
    let downloader = Downloader::new(config.raw_dir())?.force(force);

    if list {
        print_traditions(|file_name| config.raw_dir().join(file_name).exists());
        return Ok(());
    }

    if let Some(name) = tradition {
        print_info(&format!("Downloading {name} scriptures..."));
        let results = downloader.download_tradition_named(&name).await?;
        for (file_name, outcome) in results {
            match outcome {
                Ok(DownloadOutcome::Downloaded(bytes)) => {
                    print_success(&format!("{file_name} ({:.1} KB)", bytes as f64 / 1024.0));
                }
                Ok(DownloadOutcome::Skipped) => print_info(&format!("{file_name} already present")),
                Ok(DownloadOutcome::NoUrl) => {
                    print_warning(&format!("{file_name} has no direct download"));
                }
                Err(e) => print_error(&format!("{file_name}: {e}")),
            }
        }
        return Ok(());
    }

    if !all {
        print_warning("Nothing to do. Use --all, --tradition NAME or --list");
        return Ok(());
    }

    print_info(&format!(
        "Downloading {} traditions into {}",
        traditions::all().len(),
        config.raw_dir().display()
    ));
    let downloaded = downloader.download_all().await;
    print_success(&format!("Downloaded {downloaded} new files"));
    println!("Next: wisdomrag index");
    Ok(())
}

pub async fn handle_index(config: &AppConfig, clear: bool) -> Result<()> {
    let embedder = Arc::new(EmbeddingService::new(config)?);
    let store = vectorstore::open(config).await?;

    if clear {
        print_info("Clearing existing passages...");
        store.clear().await?;
    }

    print_info(&format!(
        "Indexing scriptures from {} with {}",
        config.raw_dir().display(),
        config.embedding_model()
    ));
    let stats = Indexer::new(embedder, store.clone())
        .with_batch_size(config.embeddings.batch_size)
        .build(config.raw_dir())
        .await?;

    if stats.chunks == 0 {
        print_warning("No passages indexed. Run: wisdomrag download --all");
        return Ok(());
    }
    print_index_stats(&stats);
    print_success(&format!("{} passages in the store", store.count().await?));
    Ok(())
}
