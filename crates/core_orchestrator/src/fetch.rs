use std::future::Future;
use std::sync::{Arc, Weak};

use core_types::ApiResult;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::notify::Notifier;

/// What a view renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T> {
    pub data: T,
    pub is_loading: bool,
}

impl<T: Default> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            is_loading: true,
        }
    }
}

impl<T> FetchState<T> {
    pub fn settled(data: T) -> Self {
        Self {
            data,
            is_loading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Loading,
    Empty,
    Populated,
}

pub trait ViewData: Default {
    fn is_empty(&self) -> bool;
}

impl<T> ViewData for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T: ViewData> FetchState<T> {
    pub fn phase(&self) -> ViewPhase {
        if self.is_loading {
            ViewPhase::Loading
        } else if self.data.is_empty() {
            ViewPhase::Empty
        } else {
            ViewPhase::Populated
        }
    }
}

/// Notification raised when a user-triggered fetch fails.
#[derive(Clone, Copy)]
pub struct FailureNotice<'a> {
    pub notifier: &'a dyn Notifier,
    pub message: &'a str,
}

/// Awaits `fetch` and settles the state. Failures are logged, optionally
/// surfaced through `failure`, and resolve to `T::default()` so a view never
/// renders partial data.
pub async fn load_view_data<T, F>(
    view: &str,
    fetch: F,
    failure: Option<FailureNotice<'_>>,
) -> FetchState<T>
where
    T: Default,
    F: Future<Output = ApiResult<T>>,
{
    match fetch.await {
        Ok(data) => FetchState::settled(data),
        Err(err) => {
            warn!(view, error = %err, "view fetch failed, keeping defaults");
            if let Some(notice) = failure {
                notice.notifier.error(notice.message);
            }
            FetchState::settled(T::default())
        }
    }
}

/// State owned by a mounted view. Dropping it unmounts the view.
#[derive(Debug)]
pub struct ViewState<T> {
    shared: Arc<Mutex<FetchState<T>>>,
}

impl<T: Default> ViewState<T> {
    pub fn mount() -> Self {
        Self {
            shared: Arc::new(Mutex::new(FetchState::default())),
        }
    }
}

impl<T> ViewState<T> {
    pub fn with<R>(&self, f: impl FnOnce(&FetchState<T>) -> R) -> R {
        let guard = self.shared.lock();
        f(&*guard)
    }

    pub fn snapshot(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.shared.lock().clone()
    }

    /// Handle for an in-flight fetch. It holds no ownership of the state.
    pub fn updater(&self) -> ViewUpdater<T> {
        ViewUpdater {
            target: Arc::downgrade(&self.shared),
        }
    }

    pub fn unmount(self) {}
}

#[derive(Debug)]
pub struct ViewUpdater<T> {
    target: Weak<Mutex<FetchState<T>>>,
}

impl<T> Clone for ViewUpdater<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T> ViewUpdater<T> {
    /// Writes `state` into the view. Returns `false`, writing nothing, once
    /// the view has been unmounted.
    pub fn apply(&self, state: FetchState<T>) -> bool {
        match self.target.upgrade() {
            Some(shared) => {
                *shared.lock() = state;
                true
            }
            None => {
                debug!("view unmounted before fetch settled, dropping result");
                false
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Awaits `fetch` and applies its result. A view that is already gone
    /// issues no request at all.
    pub async fn settle<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = FetchState<T>>,
    {
        if !self.is_mounted() {
            debug!("view unmounted before fetch started, skipping request");
            return false;
        }
        self.apply(fetch.await)
    }
}
