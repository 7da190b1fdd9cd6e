//! JSON-file persistence for seeker memory

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::user_id_from_email;
use super::user_id_from_session;
use super::UserMemory;
use crate::errors::Result;

/// One `{user_id}.json` file per seeker
///
/// Handlers that read, change and write a memory document go through
/// [`MemoryStore::update`], which holds a per-user lock for the whole cycle.
pub struct MemoryStore {
    dir: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive access to one user's document, released on drop
pub struct UserLock<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    user_id: String,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map still holds the mutex once nobody waits on it
        self.locks
            .remove_if(self.user_id.as_str(), |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl MemoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: DashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    pub async fn exists(&self, user_id: &str) -> bool {
        tokio::fs::try_exists(self.path_for(user_id))
            .await
            .unwrap_or(false)
    }

    /// Load a memory document, or a fresh one when missing or unreadable
    pub async fn load(&self, user_id: &str) -> UserMemory {
        match self.read(user_id).await {
            Ok(Some(memory)) => memory,
            Ok(None) => UserMemory::new(user_id),
            Err(e) => {
                warn!("Ignoring unreadable memory for {}: {}", user_id, e);
                UserMemory::new(user_id)
            }
        }
    }

    async fn read(&self, user_id: &str) -> Result<Option<UserMemory>> {
        let path = self.path_for(user_id);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = tokio::fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Write the document, stamping `last_visit`
    pub async fn save(&self, user_id: &str, memory: &mut UserMemory) -> Result<()> {
        memory.last_visit = Utc::now();
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(user_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(memory)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Saved memory for {}", user_id);
        Ok(())
    }

    /// Exclusive access to one user's document
    pub async fn lock(&self, user_id: &str) -> UserLock<'_> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserLock {
            guard: Some(lock.lock_owned().await),
            locks: &self.locks,
            user_id: user_id.to_string(),
        }
    }

    /// Load, modify and save one document under its lock
    pub async fn update<T, F>(&self, user_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserMemory) -> T,
    {
        let _guard = self.lock(user_id).await;
        let mut memory = self.load(user_id).await;
        let out = f(&mut memory);
        self.save(user_id, &mut memory).await?;
        Ok(out)
    }

    /// Fold an anonymous session's memory into the account of `email`
    ///
    /// Nothing happens when both resolve to the same id or the session never
    /// saved anything. The session file is left in place. An account without
    /// chat threads gets its dated conversations turned into threads.
    pub async fn migrate_session_to_account(&self, session_id: &str, email: &str) -> Result<()> {
        let session_user = user_id_from_session(session_id);
        let account_user = user_id_from_email(email);
        if session_user == account_user {
            return Ok(());
        }

        let Some(session_memory) = self.read(&session_user).await.ok().flatten() else {
            debug!("No session memory to migrate for {}", session_user);
            return Ok(());
        };

        let threads = self
            .update(&account_user, |account| {
                account.merge_session(session_memory, email);
                if account.chats.is_empty() {
                    account.migrate_conversations_to_chats()
                } else {
                    0
                }
            })
            .await?;
        info!(
            "Migrated session memory {} into account {} ({} new chat threads)",
            session_user, account_user, threads
        );
        Ok(())
    }
}
