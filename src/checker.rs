//! The release checker and its memoized single-flight fetch.
//!
//! The checker keeps one slot holding a shared future. The slot moves through
//! `empty -> pending -> resolved` or `pending -> failed`, and a failed slot is
//! replaced by a fresh attempt on the next check. A resolved slot is kept for
//! the lifetime of the checker.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use reqwest::Url;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

use crate::config::CheckerConfig;
use crate::error::{CheckError, CheckResult};
use crate::http::HttpClient;
use crate::release::ReleaseInfo;
use crate::source::{GitHubSource, ReleaseSource};

type SharedFetch = Shared<BoxFuture<'static, CheckResult>>;

/// Worker pool for checkers used outside any runtime and without an injected handle.
static FALLBACK_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Handle to an in-flight or completed check.
///
/// Clones observe the same fetch and resolve to the same value.
#[derive(Clone)]
pub struct ReleaseFuture {
    inner: SharedFetch,
}

impl ReleaseFuture {
    /// Whether the underlying fetch has finished, successfully or not.
    pub fn is_resolved(&self) -> bool {
        self.inner.peek().is_some()
    }
}

impl Future for ReleaseFuture {
    type Output = CheckResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for ReleaseFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseFuture")
            .field("resolved", &self.inner.peek())
            .finish()
    }
}

/// Checks whether a newer release than `current_version` is published.
///
/// ```no_run
/// # async fn run() -> Result<(), relcheck::CheckError> {
/// let checker = relcheck::ReleaseChecker::new("owner", "repo", "v1.0.0")?;
/// if checker.is_update_available().await? {
///     if let Some(release) = checker.last_release().await? {
///         println!("{} is available at {}", release.version(), release.download_page());
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct ReleaseChecker {
    config: CheckerConfig,
    source: Arc<dyn ReleaseSource>,
    runtime: Option<Handle>,
    last_release: Mutex<Option<SharedFetch>>,
}

impl ReleaseChecker {
    /// Creates a checker against GitHub, honoring `RELCHECK_DISABLED` and
    /// `RELCHECK_API_URL`.
    pub fn new(
        account: impl Into<String>,
        repository: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Result<Self, CheckError> {
        Self::from_config(CheckerConfig::from_env(
            account,
            repository,
            current_version,
        ))
    }

    pub fn from_config(config: CheckerConfig) -> Result<Self, CheckError> {
        let http_client = HttpClient::with_defaults()?;
        let source = GitHubSource::from_http_client(http_client, &config.api_url);
        Ok(Self::with_source(config, Arc::new(source)))
    }

    pub fn with_source(config: CheckerConfig, source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            config,
            source,
            runtime: None,
            last_release: Mutex::new(None),
        }
    }

    /// Spawns fetches on `handle` instead of the ambient runtime.
    ///
    /// Without a handle, fetches run on the ambient runtime, or on a shared
    /// background runtime when there is none. The blocking methods reject a
    /// current-thread handle, since nothing would drive the fetch while the
    /// caller blocks.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn account(&self) -> &str {
        &self.config.account
    }

    pub fn repository(&self) -> &str {
        &self.config.repository
    }

    pub fn current_version(&self) -> &str {
        &self.config.current_version
    }

    /// Starts a check, or joins the one already in flight or completed.
    ///
    /// Returns immediately. Configuration errors are returned here, before any
    /// request is made; fetch errors are delivered through the future.
    pub fn check_async(&self) -> Result<ReleaseFuture, CheckError> {
        let mut slot = self
            .last_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(fetch) = slot.as_ref() {
            match fetch.peek() {
                Some(Err(e)) => debug!("Previous release check failed ({}), retrying", e),
                _ => {
                    return Ok(ReleaseFuture {
                        inner: fetch.clone(),
                    });
                }
            }
        }

        let fetch = self.start_fetch()?;
        *slot = Some(fetch.clone());
        Ok(ReleaseFuture { inner: fetch })
    }

    /// Waits for the latest release. `Ok(None)` when checking is disabled.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self) -> CheckResult {
        self.check_async()?.await
    }

    /// Same as [`Self::check`].
    pub async fn last_release(&self) -> CheckResult {
        self.check().await
    }

    /// True iff a release was obtained and its version differs from the current one.
    #[tracing::instrument(skip(self))]
    pub async fn is_update_available(&self) -> Result<bool, CheckError> {
        let release = self.last_release().await?;
        Ok(release.is_some_and(|r| self.is_update(&r)))
    }

    /// Compares `release` against the current version by exact string inequality.
    pub fn is_update(&self, release: &ReleaseInfo) -> bool {
        release.version() != self.config.current_version
    }

    /// Blocks the calling thread until the check resolves.
    ///
    /// Must not be called from inside an async runtime, nor with a
    /// current-thread handle from [`Self::with_runtime`]; both return
    /// [`CheckError::Runtime`].
    pub fn check_blocking(&self) -> CheckResult {
        if Handle::try_current().is_ok() {
            return Err(CheckError::Runtime(
                "blocking check called from within an async runtime, use `check().await`"
                    .to_string(),
            ));
        }
        if self
            .runtime
            .as_ref()
            .is_some_and(|h| h.runtime_flavor() == RuntimeFlavor::CurrentThread)
        {
            return Err(CheckError::Runtime(
                "blocking check needs a multi-threaded runtime handle".to_string(),
            ));
        }
        let fetch = self.check_async()?;
        futures_executor::block_on(fetch)
    }

    /// Same as [`Self::check_blocking`].
    pub fn last_release_blocking(&self) -> CheckResult {
        self.check_blocking()
    }

    /// Blocking form of [`Self::is_update_available`].
    pub fn is_update_available_blocking(&self) -> Result<bool, CheckError> {
        let release = self.last_release_blocking()?;
        Ok(release.is_some_and(|r| self.is_update(&r)))
    }

    fn start_fetch(&self) -> Result<SharedFetch, CheckError> {
        if self.config.disabled {
            debug!(
                "Release checks are disabled, skipping {}/{}",
                self.config.account, self.config.repository
            );
            return Ok(future::ready::<CheckResult>(Ok(None)).boxed().shared());
        }

        let url = self
            .source
            .latest_release_url(&self.config.account, &self.config.repository)?;
        let handle = self.runtime_handle()?;

        debug!("Starting release check against {}", url);
        let source = Arc::clone(&self.source);
        let task = handle.spawn(async move { fetch_latest(source.as_ref(), &url).await });

        let fetch = async move {
            task.await
                .unwrap_or_else(|e| Err(CheckError::Worker(e.to_string())))
        }
        .boxed()
        .shared();

        // Drive the shared future to completion even if every caller drops its
        // handle, so the slot sees a failure and the next check retries.
        handle.spawn(fetch.clone());

        Ok(fetch)
    }

    fn runtime_handle(&self) -> Result<Handle, CheckError> {
        if let Some(handle) = &self.runtime {
            return Ok(handle.clone());
        }
        match Handle::try_current() {
            Ok(handle) => Ok(handle),
            Err(_) => fallback_runtime().map(|rt| rt.handle().clone()),
        }
    }
}

fn fallback_runtime() -> Result<&'static Runtime, CheckError> {
    if let Some(runtime) = FALLBACK_RUNTIME.get() {
        return Ok(runtime);
    }

    debug!("No async runtime available, starting a background runtime for release checks");
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("relcheck-worker")
        .enable_all()
        .build()
        .map_err(|e| CheckError::Runtime(format!("failed to start background runtime: {}", e)))?;

    // A racing thread may have installed its runtime first; ours is dropped
    // here, outside any async context.
    let _ = FALLBACK_RUNTIME.set(runtime);
    FALLBACK_RUNTIME
        .get()
        .ok_or_else(|| CheckError::Runtime("background runtime unavailable".to_string()))
}

impl fmt::Debug for ReleaseChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseChecker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn fetch_latest(source: &dyn ReleaseSource, url: &Url) -> CheckResult {
    let fetched = match source.fetch(url).await {
        Ok(body) => ReleaseInfo::from_json(&body),
        Err(e) => Err(e),
    };

    match fetched {
        Ok(release) => {
            debug!(
                "Latest release is {} (id {}, {})",
                release.version(),
                release.id(),
                release.download_page()
            );
            Ok(Some(release))
        }
        Err(e) => {
            warn!("Release check against {} failed: {}", url, e);
            Err(e)
        }
    }
}
