//! Process environment access.

use std::env;

/// Environment variables that let an embedder or operator tune checks without
/// touching call sites.
pub const DISABLED_VAR: &str = "RELCHECK_DISABLED";
pub const API_URL_VAR: &str = "RELCHECK_API_URL";

#[cfg_attr(test, mockall::automock)]
pub trait Env: Send + Sync {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Reads from the real process environment.
pub struct RealEnv;

impl Env for RealEnv {
    #[tracing::instrument(skip(self))]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// Whether the variable is set at all, regardless of its value.
pub fn is_present<E: Env + ?Sized>(env: &E, key: &str) -> bool {
    !matches!(env.var(key), Err(env::VarError::NotPresent))
}
