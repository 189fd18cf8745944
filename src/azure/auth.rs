//! ARM Credentials
//!
//! Token acquisition belongs to the host. This module only carries an
//! already-issued bearer token, either passed in explicitly or read from the
//! environment.

use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;

/// Environment variable holding a pre-issued ARM bearer token
pub const TOKEN_ENV_VAR: &str = "ARM_ACCESS_TOKEN";

/// Bearer token holder
#[derive(Clone)]
pub struct ArmCredentials {
    token: Arc<str>,
}

impl ArmCredentials {
    /// Wrap an explicit token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("ARM access token is empty");
        }

        Ok(Self {
            token: Arc::from(token),
        })
    }

    /// Read the token from `ARM_ACCESS_TOKEN`
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .with_context(|| format!("{TOKEN_ENV_VAR} is not set"))?;
        Self::new(token)
    }

    /// Get the access token for API calls
    pub fn token(&self) -> &str {
        &self.token
    }
}

// Keep the token out of debug output and logs
impl fmt::Debug for ArmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}
