//! Account records stored as one JSON file per email

use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::Result;
use crate::errors::WisdomError;
use crate::memory::normalize_email;

const ACCOUNT_FILE_HASH_LEN: usize = 32;

/// Stored account, including the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

/// Account without credentials, safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicAccount {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: Map<String, Value>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            email: account.email,
            name: account.name,
            created_at: account.created_at,
            last_login: account.last_login,
            preferences: account.preferences,
        }
    }
}

fn default_preferences() -> Map<String, Value> {
    let mut preferences = Map::new();
    preferences.insert("default_religion".to_string(), Value::from("christianity"));
    preferences.insert("theme".to_string(), Value::from("dark"));
    preferences
}

fn digest_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// `salt:hash` with a random salt
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let hashed = digest_hex(&format!("{password}{salt}"));
    format!("{salt}:{hashed}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once(':') {
        Some((salt, hashed)) => digest_hex(&format!("{password}{salt}")) == hashed,
        None => false,
    }
}

pub struct AccountStore {
    dir: PathBuf,
    min_password_len: usize,
    write_lock: Mutex<()>,
}

impl AccountStore {
    pub fn new(dir: impl Into<PathBuf>, min_password_len: usize) -> Self {
        Self {
            dir: dir.into(),
            min_password_len,
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, email: &str) -> PathBuf {
        let digest = digest_hex(&normalize_email(email));
        self.dir
            .join(format!("{}.json", &digest[..ACCOUNT_FILE_HASH_LEN]))
    }

    async fn read(&self, email: &str) -> Result<Option<Account>> {
        let path = self.path_for(email);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = tokio::fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    async fn write(&self, account: &Account) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(account)?;
        tokio::fs::write(self.path_for(&account.email), body).await?;
        Ok(())
    }

    /// Register a new account
    ///
    /// # Errors
    /// - `InvalidInput` for a duplicate email or a short password
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<PublicAccount> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(WisdomError::InvalidInput("Email is required".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        if self.read(&email).await?.is_some() {
            return Err(WisdomError::InvalidInput(
                "An account with this email already exists".to_string(),
            ));
        }
        if password.chars().count() < self.min_password_len {
            return Err(WisdomError::InvalidInput(format!(
                "Password must be at least {} characters",
                self.min_password_len
            )));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let account = Account {
            email: email.clone(),
            password_hash: hash_password(password),
            name,
            created_at: Utc::now(),
            last_login: None,
            preferences: default_preferences(),
        };
        self.write(&account).await?;
        info!("Created account for {}", email);
        Ok(account.into())
    }

    /// Check credentials and stamp `last_login`
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<PublicAccount> {
        let _guard = self.write_lock.lock().await;
        let Some(mut account) = self.read(email).await? else {
            return Err(WisdomError::AuthError(
                "No account found with this email".to_string(),
            ));
        };
        if !verify_password(password, &account.password_hash) {
            return Err(WisdomError::AuthError("Incorrect password".to_string()));
        }

        account.last_login = Some(Utc::now());
        self.write(&account).await?;
        Ok(account.into())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<PublicAccount>> {
        Ok(self.read(email).await?.map(PublicAccount::from))
    }

    /// Merge `preferences` into the stored ones
    pub async fn update_preferences(
        &self,
        email: &str,
        preferences: Map<String, Value>,
    ) -> Result<PublicAccount> {
        let _guard = self.write_lock.lock().await;
        let Some(mut account) = self.read(email).await? else {
            return Err(WisdomError::NotFound("User not found".to_string()));
        };
        account.preferences.extend(preferences);
        self.write(&account).await?;
        Ok(account.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> AccountStore {
        AccountStore::new(dir.path().join("accounts"), 6)
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let stored = hash_password("secret1");
        let (salt, hashed) = stored.split_once(':').unwrap();
        assert_eq!(salt.len(), 32);
        assert_eq!(hashed.len(), 64);
        assert!(verify_password("secret1", &stored));
        assert!(!verify_password("secret2", &stored));
        assert!(!verify_password("secret1", "no-colon"));
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = store(&dir);
        let user = accounts
            .create_user(" Seeker@Example.com ", "secret1", None)
            .await
            .unwrap();
        assert_eq!(user.email, "seeker@example.com");
        assert_eq!(user.name, "seeker");
        assert_eq!(user.preferences["default_religion"], "christianity");
        assert_eq!(user.preferences["theme"], "dark");
        assert!(user.last_login.is_none());
    }

    #[tokio::test]
    async fn test_create_user_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = store(&dir);
        let short = accounts.create_user("a@b.c", "123", None).await.unwrap_err();
        assert_eq!(short.to_string(), "Password must be at least 6 characters");

        accounts.create_user("a@b.c", "123456", Some("Ann")).await.unwrap();
        let duplicate = accounts
            .create_user("A@B.C", "123456", None)
            .await
            .unwrap_err();
        assert_eq!(
            duplicate.to_string(),
            "An account with this email already exists"
        );
    }

    #[tokio::test]
    async fn test_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = store(&dir);
        accounts.create_user("a@b.c", "123456", None).await.unwrap();

        let user = accounts.authenticate("a@b.c", "123456").await.unwrap();
        assert!(user.last_login.is_some());

        let wrong = accounts.authenticate("a@b.c", "654321").await.unwrap_err();
        assert_eq!(wrong.to_string(), "Incorrect password");
        let missing = accounts.authenticate("x@y.z", "123456").await.unwrap_err();
        assert_eq!(missing.to_string(), "No account found with this email");
    }

    #[tokio::test]
    async fn test_update_preferences_merges() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = store(&dir);
        accounts.create_user("a@b.c", "123456", None).await.unwrap();

        let mut update = Map::new();
        update.insert("theme".to_string(), Value::from("light"));
        update.insert("ambient".to_string(), Value::from("rain"));
        let user = accounts.update_preferences("a@b.c", update).await.unwrap();
        assert_eq!(user.preferences["theme"], "light");
        assert_eq!(user.preferences["ambient"], "rain");
        assert_eq!(user.preferences["default_religion"], "christianity");

        let stored = accounts.get_by_email("a@b.c").await.unwrap().unwrap();
        assert_eq!(stored.preferences["theme"], "light");
        assert!(accounts.get_by_email("x@y.z").await.unwrap().is_none());
    }
}
