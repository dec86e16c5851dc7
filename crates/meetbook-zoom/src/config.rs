//! Zoom provider configuration.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{ZoomError, ZoomResult};

/// Default REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.zoom.us/v2";

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.zoom.us/oauth/token";

/// Server-to-server OAuth credentials for one hosting account.
///
/// Accounts are static: the list is loaded once at startup and walked in
/// declaration order for every booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoomAccount {
    /// Email identifying the account; also the token cache key.
    pub email: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Zoom account id sent with the client-credentials grant.
    pub account_id: String,
}

impl ZoomAccount {
    /// Creates a new account entry.
    pub fn new(
        email: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            account_id: account_id.into(),
        }
    }

    /// Checks that every credential field is non-empty.
    pub fn validate(&self) -> ZoomResult<()> {
        if self.email.is_empty() {
            return Err(ZoomError::Configuration("account email is required".into()));
        }
        if self.client_id.is_empty() || self.client_secret.is_empty() || self.account_id.is_empty()
        {
            return Err(ZoomError::Configuration(format!(
                "incomplete credentials for {}",
                self.email
            )));
        }
        Ok(())
    }
}

/// Configuration for the Zoom scheduler.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// REST API base URL.
    pub api_base: String,
    /// OAuth token endpoint.
    pub token_url: String,
    /// Timezone meetings are entered in; also localizes the slot grid.
    pub timezone: Tz,
    /// Ordered account pool. Order is the failover order.
    pub accounts: Vec<ZoomAccount>,
    /// Directory downloaded recordings and summaries are written to.
    pub work_dir: PathBuf,
}

impl ZoomConfig {
    /// Creates a configuration with default endpoints and UTC timezone.
    pub fn new(accounts: Vec<ZoomAccount>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timezone: chrono_tz::UTC,
            accounts,
            work_dir: PathBuf::from("."),
        }
    }

    /// Builder: override the API base (used by tests against a mock server).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Builder: override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Builder: set the local timezone.
    #[must_use]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Builder: set the download directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Validates the account pool.
    ///
    /// # Errors
    ///
    /// Fails when no account is configured or any account has empty
    /// credential fields.
    pub fn validate(&self) -> ZoomResult<()> {
        if self.accounts.is_empty() {
            return Err(ZoomError::Configuration(
                "at least one account is required".into(),
            ));
        }
        for account in &self.accounts {
            account.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> ZoomAccount {
        ZoomAccount::new("host@example.com", "id", "secret", "acc")
    }

    #[test]
    fn defaults() {
        let config = ZoomConfig::new(vec![account()]);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders() {
        let config = ZoomConfig::new(vec![account()])
            .with_api_base("http://127.0.0.1:9000/v2")
            .with_token_url("http://127.0.0.1:9000/oauth/token")
            .with_timezone(chrono_tz::Asia::Almaty)
            .with_work_dir("/tmp/recordings");
        assert!(config.api_base.starts_with("http://127.0.0.1"));
        assert_eq!(config.timezone, chrono_tz::Asia::Almaty);
        assert_eq!(config.work_dir, PathBuf::from("/tmp/recordings"));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let config = ZoomConfig::new(vec![]);
        assert!(matches!(
            config.validate(),
            Err(ZoomError::Configuration(_))
        ));
    }

    #[test]
    fn incomplete_credentials_are_rejected() {
        let mut bad = account();
        bad.client_secret.clear();
        let config = ZoomConfig::new(vec![bad]);
        assert!(config.validate().is_err());
    }
}
