//! Checker configuration.

use log::debug;

use crate::env::{API_URL_VAR, DISABLED_VAR, Env, RealEnv, is_present};

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Identifies what to check and how.
///
/// The opt-out switch is a plain field so embedders and tests can turn network
/// access off without touching process-wide state. [`CheckerConfig::from_env`]
/// fills it from `RELCHECK_DISABLED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    pub account: String,
    pub repository: String,
    pub current_version: String,
    pub api_url: String,
    pub disabled: bool,
}

impl CheckerConfig {
    pub fn new(
        account: impl Into<String>,
        repository: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            repository: repository.into(),
            current_version: current_version.into(),
            api_url: DEFAULT_API_URL.to_string(),
            disabled: false,
        }
    }

    /// Builds a config, honoring `RELCHECK_DISABLED` and `RELCHECK_API_URL`.
    pub fn from_env(
        account: impl Into<String>,
        repository: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self::from_env_with(&RealEnv, account, repository, current_version)
    }

    pub fn from_env_with<E: Env + ?Sized>(
        env: &E,
        account: impl Into<String>,
        repository: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        let mut config = Self::new(account, repository, current_version);

        if is_present(env, DISABLED_VAR) {
            debug!("{} is set, release checks are disabled", DISABLED_VAR);
            config.disabled = true;
        }

        if let Some(api_url) = env.var(API_URL_VAR).ok().filter(|url| !url.is_empty()) {
            debug!("Using API URL from {}: {}", API_URL_VAR, api_url);
            config.api_url = api_url;
        }

        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}
