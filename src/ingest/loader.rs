//! Loading raw scripture files from disk

use std::path::Path;

use tracing::debug;
use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use crate::errors::Result;
use crate::errors::WisdomError;
use crate::models::PassageMetadata;
use crate::traditions::tradition_for_file;

/// One whole scripture file with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: PassageMetadata,
}

impl SourceDocument {
    /// Build a document for `file_name`, tagging tradition and scripture name
    pub fn from_file_name(file_name: &str, content: String) -> Self {
        let (tradition, scripture_name) = tradition_for_file(file_name);
        let book_title = file_name
            .strip_suffix(".txt")
            .or_else(|| file_name.strip_suffix(".TXT"))
            .unwrap_or(file_name)
            .to_string();
        Self {
            content,
            metadata: PassageMetadata {
                tradition,
                scripture_name,
                book_title,
                source_file: file_name.to_string(),
                chunk_index: 0,
            },
        }
    }
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Every `.txt` file directly inside `dir`, sorted by file name
pub fn load_books(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(WisdomError::NotFound(format!(
            "Raw scripture directory {} does not exist",
            dir.display()
        )));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut docs = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_text_file(path) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        debug!("Loaded {} ({} bytes)", file_name, bytes.len());
        docs.push(SourceDocument::from_file_name(file_name, content));
    }

    info!("Loaded {} documents from {}", docs.len(), dir.display());
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_only_top_level_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quran.txt"), "In the name of God").unwrap();
        std::fs::write(dir.path().join("analects.txt"), "The Master said").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("deep.txt"), "ignored").unwrap();

        let docs = load_books(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata.source_file, "analects.txt");
        assert_eq!(docs[0].metadata.book_title, "analects");
        assert_eq!(docs[0].metadata.tradition, "Confucianism");
        assert_eq!(docs[1].metadata.tradition, "Islam");
        assert_eq!(docs[1].content, "In the name of God");
    }

    #[test]
    fn test_unknown_file_is_tagged_unknown() {
        let doc = SourceDocument::from_file_name("gospel_of_thomas.txt", String::new());
        assert_eq!(doc.metadata.tradition, "Unknown");
        assert_eq!(doc.metadata.scripture_name, "Gospel Of Thomas");
        assert_eq!(doc.metadata.book_title, "gospel_of_thomas");
    }

    #[test]
    fn test_missing_directory() {
        let result = load_books(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(WisdomError::NotFound(_))));
    }
}
