use std::sync::Arc;

use anyhow::Context as _;

use crate::storage::{ADMIN_SESSION_KEY, KeyValueStore};

pub const DEFAULT_ADMIN_PASSWORD: &str = "1234";

const SESSION_ACTIVE: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResult {
    Accepted,
    Rejected,
}

impl LoginResult {
    pub fn message(self) -> &'static str {
        match self {
            Self::Accepted => "Login successful.",
            Self::Rejected => "Incorrect password. Please try again.",
        }
    }
}

pub const LOGOUT_MESSAGE: &str = "Logged out successfully.";

/// Persisted admin login flag. The password check is a plain string
/// comparison; there is no hashing, expiry, or rate limiting.
#[derive(Clone)]
pub struct AdminSession {
    storage: Arc<dyn KeyValueStore>,
    password: String,
}

impl AdminSession {
    pub fn new(storage: Arc<dyn KeyValueStore>, password: impl Into<String>) -> Self {
        Self {
            storage,
            password: password.into(),
        }
    }

    pub async fn is_active(&self) -> anyhow::Result<bool> {
        let flag = self
            .storage
            .get(ADMIN_SESSION_KEY)
            .await
            .context("read admin session flag")?;
        Ok(flag.as_deref() == Some(SESSION_ACTIVE))
    }

    pub async fn login(&self, password: &str) -> anyhow::Result<LoginResult> {
        if password.trim() != self.password {
            tracing::warn!("admin login rejected");
            return Ok(LoginResult::Rejected);
        }
        self.storage
            .set(ADMIN_SESSION_KEY, SESSION_ACTIVE)
            .await
            .context("write admin session flag")?;
        tracing::info!("admin logged in");
        Ok(LoginResult::Accepted)
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        self.storage
            .remove(ADMIN_SESSION_KEY)
            .await
            .context("clear admin session flag")?;
        tracing::info!("admin logged out");
        Ok(())
    }
}
