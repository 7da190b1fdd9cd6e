//! PostgreSQL + pgvector backend

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;
use tracing::info;

use super::SearchFilter;
use super::VectorStore;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::models::EmbeddedChunk;
use crate::models::Passage;
use crate::models::PassageMetadata;
use crate::models::ScoredPassage;

pub struct PgVectorStore {
    pool: PgPool,
    table: String,
}

#[derive(sqlx::FromRow)]
struct PassageRow {
    content: String,
    tradition: String,
    scripture_name: String,
    book_title: String,
    source_file: String,
    chunk_index: i32,
    similarity: f64, // distance operator returns FLOAT8
}

impl PgVectorStore {
    /// Connect and make sure the table and indexes exist
    pub async fn connect(
        database_url: &str,
        table: &str,
        dimension: usize,
        max_connections: u32,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await?;
        let store = Self::new(pool, table)?;
        store.init_schema(dimension).await?;
        Ok(store)
    }

    pub fn new(pool: PgPool, table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    async fn init_schema(&self, dimension: usize) -> Result<()> {
        let table = &self.table;
        let statements = [
            "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    content TEXT NOT NULL,
                    tradition TEXT NOT NULL,
                    scripture_name TEXT NOT NULL,
                    book_title TEXT NOT NULL,
                    source_file TEXT NOT NULL,
                    chunk_index INTEGER NOT NULL,
                    embedding vector({dimension}) NOT NULL
                )"
            ),
            format!("CREATE INDEX IF NOT EXISTS {table}_tradition_idx ON {table} (tradition)"),
            format!(
                "CREATE INDEX IF NOT EXISTS {table}_embedding_idx ON {table} \
                 USING hnsw (embedding vector_cosine_ops)"
            ),
        ];

        for statement in &statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("pgvector table {} ready (dimension {})", table, dimension);
        Ok(())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are allowed
fn validate_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(WisdomError::ConfigError(format!(
            "Invalid vector store table name: {name}"
        )))
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize> {
        let query = format!(
            "INSERT INTO {} (id, content, tradition, scripture_name, book_title, source_file, chunk_index, embedding)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                tradition = EXCLUDED.tradition,
                scripture_name = EXCLUDED.scripture_name,
                book_title = EXCLUDED.book_title,
                source_file = EXCLUDED.source_file,
                chunk_index = EXCLUDED.chunk_index,
                embedding = EXCLUDED.embedding",
            self.table
        );

        let count = chunks.len();
        let mut tx = self.pool.begin().await?;
        for chunk in chunks {
            let meta = chunk.passage.metadata;
            sqlx::query(&query)
                .bind(chunk.id)
                .bind(chunk.passage.content)
                .bind(meta.tradition)
                .bind(meta.scripture_name)
                .bind(meta.book_title)
                .bind(meta.source_file)
                .bind(meta.chunk_index as i32)
                .bind(Vector::from(chunk.embedding))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!("Upserted {} chunks into {}", count, self.table);
        Ok(count)
    }

    async fn search(
        &self,
        embedding: &[f32],
        filter: &SearchFilter,
        k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        let query = format!(
            "SELECT content, tradition, scripture_name, book_title, source_file, chunk_index,
                    1 - (embedding <=> $1) AS similarity
             FROM {}
             WHERE ($2::text[] IS NULL OR tradition = ANY($2))
               AND ($3::text IS NULL OR book_title = $3)
             ORDER BY embedding <=> $1
             LIMIT $4",
            self.table
        );

        let traditions: Option<Vec<String>> = filter.tradition_set().map(<[String]>::to_vec);
        let rows = sqlx::query_as::<_, PassageRow>(&query)
            .bind(Vector::from(embedding.to_vec()))
            .bind(traditions)
            .bind(filter.book.clone())
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ScoredPassage {
                passage: Passage {
                    content: r.content,
                    metadata: PassageMetadata {
                        tradition: r.tradition,
                        scripture_name: r.scripture_name,
                        book_title: r.book_title,
                        source_file: r.source_file,
                        chunk_index: r.chunk_index.max(0) as usize,
                    },
                },
                score: r.similarity as f32,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let query = format!("SELECT COUNT(*) FROM {}", self.table);
        let (count,): (i64,) = sqlx::query_as(&query).fetch_one(&self.pool).await?;
        Ok(count.max(0) as usize)
    }

    async fn traditions(&self) -> Result<Vec<String>> {
        let query = format!(
            "SELECT DISTINCT tradition FROM {} ORDER BY tradition",
            self.table
        );
        let rows: Vec<(String,)> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    async fn clear(&self) -> Result<()> {
        let query = format!("TRUNCATE {}", self.table);
        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }
}
