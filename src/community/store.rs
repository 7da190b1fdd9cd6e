//! Community profiles on disk and the connection workflow

use std::path::PathBuf;

use chrono::Utc;
use sha2::Digest;
use sha2::Sha256;
use tokio::sync::Mutex;
use tracing::info;
use tracing::warn;

use super::matching::compatibility;
use super::CommunityMatch;
use super::CommunityProfile;
use super::Connection;
use super::ConnectionRequest;
use super::ProfileUpdate;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::memory::normalize_email;
use crate::text::take_chars;

const PROFILE_FILE_HASH_LEN: usize = 32;
const MATCH_THRESHOLD: f64 = 20.0;
const MATCH_TRAITS_SHOWN: usize = 5;
const BIO_PREVIEW_CHARS: usize = 100;
const REQUEST_MESSAGE_CHARS: usize = 200;

/// One `profiles/{digest}.json` file per seeker
pub struct CommunityStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CommunityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into().join("profiles"),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, email: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(normalize_email(email).as_bytes()));
        self.dir
            .join(format!("{}.json", &digest[..PROFILE_FILE_HASH_LEN]))
    }

    async fn write(&self, profile: &CommunityProfile) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(self.path_for(&profile.email), body).await?;
        Ok(())
    }

    pub async fn get(&self, email: &str) -> Result<Option<CommunityProfile>> {
        let path = self.path_for(email);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = tokio::fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Every readable profile; unreadable files are skipped
    pub async fn all_profiles(&self) -> Result<Vec<CommunityProfile>> {
        let mut profiles = Vec::new();
        if !tokio::fs::try_exists(&self.dir).await? {
            return Ok(profiles);
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed: Result<CommunityProfile> = tokio::fs::read(&path)
                .await
                .map_err(WisdomError::from)
                .and_then(|raw| serde_json::from_slice(&raw).map_err(WisdomError::from));
            match parsed {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("Skipping unreadable profile {}: {}", path.display(), e),
            }
        }
        profiles.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(profiles)
    }

    /// Create a profile or update an existing one
    ///
    /// Missing or empty bio, traits and traditions keep their stored values;
    /// connections, requests and `created_at` are always kept.
    pub async fn create_or_update(&self, email: &str, update: ProfileUpdate) -> Result<CommunityProfile> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut profile = self
            .get(email)
            .await?
            .unwrap_or_else(|| CommunityProfile::new(email, &update.display_name, now));

        profile.display_name = update.display_name;
        if let Some(bio) = update.bio.filter(|b| !b.is_empty()) {
            profile.bio = bio;
        }
        if let Some(traits) = update.traits.filter(|t| !t.is_empty()) {
            profile.traits = traits;
        }
        if let Some(traditions) = update.preferred_traditions.filter(|t| !t.is_empty()) {
            profile.preferred_traditions = traditions;
        }
        profile.opt_in = update.opt_in;
        profile.updated_at = now;
        profile.last_active = now;

        self.write(&profile).await?;
        Ok(profile)
    }

    /// Opted-in seekers scoring at least 20, best first
    pub async fn find_matches(&self, email: &str, limit: usize) -> Result<Vec<CommunityMatch>> {
        let Some(me) = self.get(email).await?.filter(|p| p.opt_in) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<CommunityMatch> = self
            .all_profiles()
            .await?
            .into_iter()
            .filter(|other| other.email != me.email && other.opt_in)
            .filter_map(|other| {
                let (score, mut traits) = compatibility(&me, &other);
                if score < MATCH_THRESHOLD {
                    return None;
                }
                traits.truncate(MATCH_TRAITS_SHOWN);
                Some(CommunityMatch {
                    bio: take_chars(&other.bio, BIO_PREVIEW_CHARS),
                    email: other.email,
                    display_name: other.display_name,
                    compatibility_score: score.round() as u32,
                    matching_traits: traits,
                    preferred_traditions: other.preferred_traditions,
                    last_active: other.last_active,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
        matches.truncate(limit);
        Ok(matches)
    }

    /// Queue a request on the recipient's profile
    ///
    /// # Errors
    /// - `InvalidInput` with a seeker-facing reason when the request is refused
    pub async fn send_connection_request(
        &self,
        from_email: &str,
        to_email: &str,
        message: &str,
    ) -> Result<&'static str> {
        let _guard = self.write_lock.lock().await;
        let refuse =
            |reason: &str| -> Result<&'static str> { Err(WisdomError::InvalidInput(reason.to_string())) };

        let Some(from) = self.get(from_email).await? else {
            return refuse("Your profile not found. Please create a profile first.");
        };
        let Some(mut to) = self.get(to_email).await? else {
            return refuse("User not found.");
        };
        if !to.opt_in {
            return refuse("User is not accepting connections.");
        }
        if from.connections.contains(&to.email) {
            return refuse("You are already connected with this user.");
        }
        if to
            .connection_requests
            .iter()
            .any(|r| r.from_email == from.email)
        {
            return refuse("Connection request already sent.");
        }

        to.connection_requests.push(ConnectionRequest {
            from_email: from.email.clone(),
            from_name: from.display_name.clone(),
            message: take_chars(message, REQUEST_MESSAGE_CHARS),
            sent_at: Utc::now(),
        });
        self.write(&to).await?;
        info!("Connection request {} -> {}", from.email, to.email);
        Ok("Connection request sent!")
    }

    /// Accept or decline a pending request from `from_email`
    pub async fn respond_to_request(
        &self,
        email: &str,
        from_email: &str,
        accept: bool,
    ) -> Result<&'static str> {
        let _guard = self.write_lock.lock().await;
        let (Some(mut me), Some(mut from)) = (self.get(email).await?, self.get(from_email).await?)
        else {
            return Err(WisdomError::InvalidInput("Profile not found.".to_string()));
        };

        let before = me.connection_requests.len();
        me.connection_requests.retain(|r| r.from_email != from.email);
        if me.connection_requests.len() == before {
            return Err(WisdomError::InvalidInput(
                "Connection request not found.".to_string(),
            ));
        }

        let reply = if accept {
            if !me.connections.contains(&from.email) {
                me.connections.push(from.email.clone());
            }
            if !from.connections.contains(&me.email) {
                from.connections.push(me.email.clone());
            }
            self.write(&from).await?;
            "Connection accepted!"
        } else {
            "Connection declined."
        };

        self.write(&me).await?;
        Ok(reply)
    }

    pub async fn connections(&self, email: &str) -> Result<Vec<Connection>> {
        let Some(profile) = self.get(email).await? else {
            return Ok(Vec::new());
        };

        let mut connections = Vec::new();
        for other in &profile.connections {
            if let Some(other) = self.get(other).await? {
                connections.push(Connection {
                    bio: take_chars(&other.bio, BIO_PREVIEW_CHARS),
                    email: other.email,
                    display_name: other.display_name,
                    preferred_traditions: other.preferred_traditions,
                    last_active: other.last_active,
                });
            }
        }
        Ok(connections)
    }

    pub async fn pending_requests(&self, email: &str) -> Result<Vec<ConnectionRequest>> {
        Ok(self
            .get(email)
            .await?
            .map(|p| p.connection_requests)
            .unwrap_or_default())
    }
}
