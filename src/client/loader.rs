//! Page loaders driving the catalog view
//!
//! [`PagedLoader`] replaces its rows on every page change; [`InfiniteLoader`]
//! appends pages as the viewport approaches the end of the held rows. Both
//! send the user to the login surface exactly once on a 401 and stop loading.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::models::{key_rows, CatalogRow, RowIdentity};
use super::source::{FetchError, Navigator, PageSource};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_LOOKAHEAD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Rows left below the viewport that trigger the next fetch
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    #[serde(default)]
    pub row_identity: RowIdentity,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            lookahead: DEFAULT_LOOKAHEAD,
            row_identity: RowIdentity::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    /// Fetch with no rows held yet
    Loading,
    Ready,
    /// Incremental fetch on top of held rows
    LoadingMore,
    /// Last attempt failed; the message is what the user sees
    Error(String),
    /// Sent to the login surface; no further loads
    Redirecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `held` is the row count afterwards
    Loaded { fetched: usize, held: usize },
    /// Another fetch is outstanding
    Busy,
    /// No pages left
    Exhausted,
    /// Nothing to do (not near the end, or unchanged page)
    NotNeeded,
    /// Superseded by a newer page change before it arrived
    Stale,
    Failed(FetchError),
    /// This attempt hit a 401
    Redirected,
    /// An earlier attempt already redirected
    Halted,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fires the login navigation at most once
#[derive(Default)]
struct RedirectLatch(AtomicBool);

impl RedirectLatch {
    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn trip(&self, navigator: &dyn Navigator) {
        if !self.0.swap(true, Ordering::AcqRel) {
            tracing::info!("Session rejected, navigating to login");
            navigator.navigate_to_login();
        }
    }
}

/// Whether another page should exist after this fetch
fn more_available(total: Option<u64>, held: usize, fetched: usize, effective_page_size: usize) -> bool {
    if fetched == 0 {
        return false;
    }
    match total {
        Some(total) => (held as u64) < total,
        None => fetched == effective_page_size,
    }
}

struct PagedInner {
    page: u32,
    page_size: u32,
    rows: Vec<CatalogRow>,
    total: u64,
    state: LoaderState,
}

/// Discrete-page loader: one fetch per page or page size change
pub struct PagedLoader<S, N> {
    source: S,
    navigator: N,
    identity: RowIdentity,
    redirect: RedirectLatch,
    generation: AtomicU64,
    inner: Mutex<PagedInner>,
}

impl<S: PageSource, N: Navigator> PagedLoader<S, N> {
    pub fn new(source: S, navigator: N, config: LoaderConfig) -> Self {
        Self {
            source,
            navigator,
            identity: config.row_identity,
            redirect: RedirectLatch::default(),
            generation: AtomicU64::new(0),
            inner: Mutex::new(PagedInner {
                page: 0,
                page_size: config.page_size.max(1),
                rows: Vec::new(),
                total: 0,
                state: LoaderState::Idle,
            }),
        }
    }

    /// Fetch the current page, replacing the held rows
    pub async fn load(&self) -> LoadOutcome {
        if self.redirect.is_set() {
            return LoadOutcome::Halted;
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let (page, page_size) = {
            let mut inner = lock(&self.inner);
            inner.state = LoaderState::Loading;
            (inner.page, inner.page_size)
        };

        let result = self.source.fetch_page(page + 1, page_size).await;
        let is_current = self.generation.load(Ordering::Acquire) == generation;

        match result {
            Ok(result) => {
                if !is_current {
                    tracing::debug!("Dropping stale page {} response", page);
                    return LoadOutcome::Stale;
                }
                let total = result.valid_total().unwrap_or(0);
                let rows = key_rows(self.identity, page, page_size, result.data);
                let fetched = rows.len();

                let mut inner = lock(&self.inner);
                inner.rows = rows;
                inner.total = total;
                inner.state = LoaderState::Ready;
                LoadOutcome::Loaded { fetched, held: fetched }
            }
            Err(FetchError::Unauthorized) => {
                lock(&self.inner).state = LoaderState::Redirecting;
                self.redirect.trip(&self.navigator);
                LoadOutcome::Redirected
            }
            Err(err) => {
                if !is_current {
                    return LoadOutcome::Stale;
                }
                tracing::error!("Error fetching page {}: {}", page + 1, err);
                lock(&self.inner).state = LoaderState::Error(err.to_string());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Move to a zero-indexed page
    pub async fn set_page(&self, page: u32) -> LoadOutcome {
        {
            let mut inner = lock(&self.inner);
            if inner.page == page {
                return LoadOutcome::NotNeeded;
            }
            inner.page = page;
        }
        self.load().await
    }

    pub async fn set_page_size(&self, page_size: u32) -> LoadOutcome {
        let page_size = page_size.max(1);
        {
            let mut inner = lock(&self.inner);
            if inner.page_size == page_size {
                return LoadOutcome::NotNeeded;
            }
            inner.page_size = page_size;
        }
        self.load().await
    }

    pub fn rows(&self) -> Vec<CatalogRow> {
        lock(&self.inner).rows.clone()
    }

    pub fn total(&self) -> u64 {
        lock(&self.inner).total
    }

    pub fn page(&self) -> u32 {
        lock(&self.inner).page
    }

    pub fn page_size(&self) -> u32 {
        lock(&self.inner).page_size
    }

    pub fn state(&self) -> LoaderState {
        lock(&self.inner).state.clone()
    }
}

struct InfiniteInner {
    next_page: u32,
    rows: Vec<CatalogRow>,
    total: Option<u64>,
    has_more: bool,
    state: LoaderState,
}

/// Infinite-scroll loader: appends the next page near the end of the rows
pub struct InfiniteLoader<S, N> {
    source: S,
    navigator: N,
    config: LoaderConfig,
    in_flight: AtomicBool,
    redirect: RedirectLatch,
    inner: Mutex<InfiniteInner>,
}

impl<S: PageSource, N: Navigator> InfiniteLoader<S, N> {
    pub fn new(source: S, navigator: N, config: LoaderConfig) -> Self {
        Self {
            source,
            navigator,
            config: LoaderConfig {
                page_size: config.page_size.max(1),
                ..config
            },
            in_flight: AtomicBool::new(false),
            redirect: RedirectLatch::default(),
            inner: Mutex::new(InfiniteInner {
                next_page: 0,
                rows: Vec::new(),
                total: None,
                has_more: true,
                state: LoaderState::Idle,
            }),
        }
    }

    /// Initial fetch of page 0
    pub async fn mount(&self) -> LoadOutcome {
        if lock(&self.inner).state != LoaderState::Idle {
            return LoadOutcome::NotNeeded;
        }
        self.load_more().await
    }

    /// Viewport moved; fetch when `last_visible_index` is within the lookahead
    /// of the last held row
    pub async fn on_scroll(&self, last_visible_index: usize) -> LoadOutcome {
        let near_end = {
            let inner = lock(&self.inner);
            let reach = last_visible_index
                .saturating_add(1)
                .saturating_add(self.config.lookahead);
            inner.rows.len() <= reach
        };
        if !near_end {
            return LoadOutcome::NotNeeded;
        }
        self.load_more().await
    }

    /// Fetch and append the next page unless one is already outstanding
    pub async fn load_more(&self) -> LoadOutcome {
        if self.redirect.is_set() {
            return LoadOutcome::Halted;
        }

        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Fetch already in flight, skipping");
            return LoadOutcome::Busy;
        };

        let page = {
            let mut inner = lock(&self.inner);
            if !inner.has_more {
                return LoadOutcome::Exhausted;
            }
            inner.state = if inner.rows.is_empty() {
                LoaderState::Loading
            } else {
                LoaderState::LoadingMore
            };
            inner.next_page
        };
        let page_size = self.config.page_size;

        match self.source.fetch_page(page + 1, page_size).await {
            Ok(result) => {
                let total = result.valid_total();
                let effective_page_size = result.effective_page_size(page_size);
                let rows = key_rows(self.config.row_identity, page, page_size, result.data);
                let fetched = rows.len();

                let mut inner = lock(&self.inner);
                inner.rows.extend(rows);
                inner.total = total;
                inner.next_page = page + 1;
                inner.has_more = more_available(total, inner.rows.len(), fetched, effective_page_size);
                inner.state = LoaderState::Ready;

                tracing::debug!(
                    "Loaded page {} ({} rows, {} held, more: {})",
                    page + 1,
                    fetched,
                    inner.rows.len(),
                    inner.has_more
                );
                LoadOutcome::Loaded {
                    fetched,
                    held: inner.rows.len(),
                }
            }
            Err(FetchError::Unauthorized) => {
                lock(&self.inner).state = LoaderState::Redirecting;
                self.redirect.trip(&self.navigator);
                LoadOutcome::Redirected
            }
            Err(err) => {
                tracing::error!("Error fetching page {}: {}", page + 1, err);
                lock(&self.inner).state = LoaderState::Error(err.to_string());
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn rows(&self) -> Vec<CatalogRow> {
        lock(&self.inner).rows.clone()
    }

    pub fn row_count(&self) -> usize {
        lock(&self.inner).rows.len()
    }

    pub fn total(&self) -> Option<u64> {
        lock(&self.inner).total
    }

    pub fn has_more(&self) -> bool {
        lock(&self.inner).has_more
    }

    pub fn state(&self) -> LoaderState {
        lock(&self.inner).state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}
