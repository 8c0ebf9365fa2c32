//! Test utilities for code built on slim-async
//!
//! - [`RecordingStore`]: a [`StoreApi`] that records every dispatched action
//!   and serves a settable state
//! - [`ForwardLog`]: a `next` handler that records what it was given
//! - Assertion macros for verifying dispatched actions by type
//!
//! # Example
//!
//! ```ignore
//! use slim_async::testing::{ForwardLog, RecordingStore};
//! use slim_async::assert_dispatched;
//!
//! let store = RecordingStore::new(AppState::default());
//! let next = ForwardLog::new();
//!
//! let request = middleware
//!     .handle(&store, next.handler(), descriptor.into())?
//!     .into_request()
//!     .unwrap();
//! request.await?;
//!
//! let actions = store.drain_dispatched();
//! assert_dispatched!(actions, "USER_PENDING");
//! assert_dispatched!(actions, "USER_SUCCESS");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::action::FluxAction;
use crate::descriptor::Dispatched;
use crate::middleware::StoreApi;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store stand-in that records dispatched actions.
///
/// Clones share the same state and the same record, so a clone can be handed
/// to the middleware while the test keeps the original.
pub struct RecordingStore<S> {
    state: Arc<Mutex<S>>,
    tx: mpsc::UnboundedSender<FluxAction>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<FluxAction>>>,
    state_reads: Arc<AtomicUsize>,
}

impl<S> Clone for RecordingStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
            state_reads: Arc::clone(&self.state_reads),
        }
    }
}

impl<S: Default> Default for RecordingStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> RecordingStore<S> {
    /// Create a recording store with the given state.
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(Mutex::new(state)),
            tx,
            rx: Arc::new(Mutex::new(rx)),
            state_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the state returned by `get_state`.
    pub fn set_state(&self, state: S) {
        *lock(&self.state) = state;
    }

    /// Drain all dispatched actions, oldest first.
    pub fn drain_dispatched(&self) -> Vec<FluxAction> {
        let mut rx = lock(&self.rx);
        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Drain and return just the action types.
    pub fn drain_types(&self) -> Vec<String> {
        self.drain_dispatched()
            .iter()
            .map(|action| action.kind().unwrap_or_default().to_string())
            .collect()
    }

    /// How many times `get_state` was called.
    pub fn state_reads(&self) -> usize {
        self.state_reads.load(Ordering::SeqCst)
    }
}

impl<S: Clone + Send + 'static> StoreApi<S> for RecordingStore<S> {
    fn dispatch(&self, action: FluxAction) {
        let _ = self.tx.send(action);
    }

    fn get_state(&self) -> S {
        self.state_reads.fetch_add(1, Ordering::SeqCst);
        lock(&self.state).clone()
    }
}

/// Records values handed to `next`.
pub struct ForwardLog<S> {
    forwarded: Arc<Mutex<Vec<Dispatched<S>>>>,
}

impl<S> Clone for ForwardLog<S> {
    fn clone(&self) -> Self {
        Self {
            forwarded: Arc::clone(&self.forwarded),
        }
    }
}

impl<S> Default for ForwardLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ForwardLog<S> {
    pub fn new() -> Self {
        Self {
            forwarded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.forwarded).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything recorded so far.
    pub fn take(&self) -> Vec<Dispatched<S>> {
        std::mem::take(&mut *lock(&self.forwarded))
    }
}

impl<S: 'static> ForwardLog<S> {
    /// A `next` handler that appends to this log.
    pub fn handler(&self) -> impl Fn(Dispatched<S>) + Send + Sync + 'static {
        let forwarded = Arc::clone(&self.forwarded);
        move |action| lock(&forwarded).push(action)
    }
}

/// Assert that an action of the given type was dispatched.
///
/// # Example
///
/// ```ignore
/// let actions = store.drain_dispatched();
/// assert_dispatched!(actions, "USER_PENDING");
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $kind:expr) => {
        assert!(
            $actions.iter().any(|a| a.kind() == Some($kind)),
            "Expected action of type `{}` to be dispatched, but got: {:?}",
            $kind,
            $actions.iter().map(|a| a.kind()).collect::<Vec<_>>()
        );
    };
}

/// Assert that NO action of the given type was dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $kind:expr) => {
        assert!(
            !$actions.iter().any(|a| a.kind() == Some($kind)),
            "Expected action of type `{}` NOT to be dispatched, but it was: {:?}",
            $kind,
            $actions
        );
    };
}

/// Find the first dispatched action of the given type.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $kind:expr) => {
        $actions.iter().find(|a| a.kind() == Some($kind))
    };
}

/// Count dispatched actions of the given type.
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $kind:expr) => {
        $actions.iter().filter(|a| a.kind() == Some($kind)).count()
    };
}
