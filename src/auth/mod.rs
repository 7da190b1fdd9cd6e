//! Email/password accounts and bearer-token sessions

pub mod accounts;
pub mod session;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

pub use accounts::AccountStore;
pub use accounts::PublicAccount;
pub use session::AuthSession;
pub use session::SessionManager;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::WisdomError;

/// Token and account returned after signup or login
#[derive(Debug, Clone, Serialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: PublicAccount,
}

pub struct AuthService {
    accounts: AccountStore,
    sessions: Arc<SessionManager>,
}

impl AuthService {
    pub fn new(accounts: AccountStore, sessions: Arc<SessionManager>) -> Self {
        Self { accounts, sessions }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            AccountStore::new(config.accounts_dir(), config.auth.min_password_len),
            Arc::new(SessionManager::new(chrono::Duration::days(
                config.auth.session_ttl_days,
            ))),
        )
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Create an account and sign it in
    pub async fn signup(&self, email: &str, password: &str, name: Option<&str>) -> Result<AuthGrant> {
        require_credentials(email, password)?;
        let user = self.accounts.create_user(email, password, name).await?;
        let token = self.sessions.create(&user.email);
        Ok(AuthGrant { token, user })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthGrant> {
        require_credentials(email, password)?;
        let user = self.accounts.authenticate(email, password).await?;
        let token = self.sessions.create(&user.email);
        Ok(AuthGrant { token, user })
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.delete(token)
    }

    /// Email behind an `Authorization` value
    ///
    /// # Errors
    /// - `AuthError` when the header is missing, unknown or expired
    pub fn email_for(&self, authorization: Option<&str>) -> Result<String> {
        let header = authorization
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| WisdomError::AuthError("Not authenticated".to_string()))?;
        self.sessions
            .validate(header)
            .ok_or_else(|| WisdomError::AuthError("Invalid or expired session".to_string()))
    }

    pub async fn current_user(&self, authorization: Option<&str>) -> Result<PublicAccount> {
        let email = self.email_for(authorization)?;
        self.accounts
            .get_by_email(&email)
            .await?
            .ok_or_else(|| WisdomError::NotFound("User not found".to_string()))
    }

    pub async fn update_preferences(
        &self,
        authorization: Option<&str>,
        preferences: Map<String, Value>,
    ) -> Result<PublicAccount> {
        let email = self.email_for(authorization)?;
        self.accounts.update_preferences(&email, preferences).await
    }
}

fn require_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(WisdomError::InvalidInput("Email is required".to_string()));
    }
    if password.is_empty() {
        return Err(WisdomError::InvalidInput("Password is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &tempfile::TempDir) -> AuthService {
        AuthService::new(
            AccountStore::new(dir.path(), 6),
            Arc::new(SessionManager::default()),
        )
    }

    #[tokio::test]
    async fn test_signup_login_logout() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir);

        let grant = auth.signup("a@b.c", "123456", Some("Ann")).await.unwrap();
        assert_eq!(grant.user.name, "Ann");
        let header = format!("Bearer {}", grant.token);
        assert_eq!(auth.email_for(Some(&header)).unwrap(), "a@b.c");

        let again = auth.login("A@B.C", "123456").await.unwrap();
        assert_ne!(again.token, grant.token);
        assert_eq!(auth.current_user(Some(&again.token)).await.unwrap().email, "a@b.c");

        assert!(auth.logout(&grant.token));
        let err = auth.email_for(Some(&header)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired session");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir);
        assert_eq!(
            auth.signup(" ", "123456", None).await.unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            auth.login("a@b.c", "").await.unwrap_err().to_string(),
            "Password is required"
        );
        assert_eq!(
            auth.email_for(None).unwrap_err().to_string(),
            "Not authenticated"
        );
    }
}
