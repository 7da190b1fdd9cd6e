//! Scripture ingestion: download, clean, load, chunk and index

pub mod download;
pub mod gutenberg;
pub mod indexer;
pub mod loader;
pub mod splitter;

pub use download::DownloadOutcome;
pub use download::Downloader;
pub use gutenberg::clean_gutenberg_text;
pub use indexer::IndexStats;
pub use indexer::Indexer;
pub use loader::load_books;
pub use loader::SourceDocument;
pub use splitter::TextSplitter;
