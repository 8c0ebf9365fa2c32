//! Centralized state store with reducer pattern
//!
//! [`Store`] is the plain reducer-driven container. [`SharedStore`] wraps one
//! in a cloneable handle that implements [`StoreApi`], and [`AsyncStore`]
//! puts an [`AsyncMiddleware`] in front of it.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::action::{Action, FluxAction};
use crate::descriptor::Dispatched;
use crate::error::ValidationError;
use crate::middleware::{AsyncMiddleware, Handled, StoreApi};

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Centralized state store with Redux-like reducer pattern
///
/// # Example
/// ```
/// use serde_json::json;
/// use slim_async_core::{FluxAction, Store};
///
/// #[derive(Default)]
/// struct AppState {
///     loading: bool,
/// }
///
/// fn reducer(state: &mut AppState, action: FluxAction) -> bool {
///     match action.kind() {
///         Some("USER_PENDING") => {
///             state.loading = true;
///             true
///         }
///         _ => false,
///     }
/// }
///
/// let mut store = Store::new(AppState::default(), reducer);
/// store.dispatch(FluxAction::new("USER_PENDING").with_payload(json!({})));
/// assert!(store.state().loading);
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Dispatch an action to the store
    ///
    /// Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(&mut self.state, action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Use this sparingly - prefer dispatching actions for state changes.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// Store with observer hooks around the reducer
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through the hooks and the reducer
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

/// Observer hooks called around each reducer run
///
/// Unlike [`AsyncMiddleware`], observers cannot intercept or replace actions;
/// they see every action that reaches the reducer, including the pending,
/// success and error notifications of async sequences.
pub trait Middleware<A: Action> {
    /// Called before the action is passed to the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer ran
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Cloneable handle to a store, usable from request futures.
///
/// Every call takes the lock for its own duration only, so reducers and
/// observers must not dispatch back into the same handle.
pub struct SharedStore<S, M = NoopMiddleware>
where
    M: Middleware<FluxAction>,
{
    inner: Arc<Mutex<StoreWithMiddleware<S, FluxAction, M>>>,
}

impl<S, M: Middleware<FluxAction>> Clone for SharedStore<S, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedStore<S, NoopMiddleware> {
    /// A shared store without observers.
    pub fn from_reducer(state: S, reducer: Reducer<S, FluxAction>) -> Self {
        Self::new(state, reducer, NoopMiddleware)
    }
}

impl<S, M: Middleware<FluxAction>> SharedStore<S, M> {
    pub fn new(state: S, reducer: Reducer<S, FluxAction>, middleware: M) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreWithMiddleware::new(
                state, reducer, middleware,
            ))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreWithMiddleware<S, FluxAction, M>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run an action through the observers and the reducer.
    pub fn dispatch(&self, action: FluxAction) -> bool {
        self.lock().dispatch(action)
    }

    /// Read the state without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(self.lock().state())
    }

    /// Read the observer middleware, e.g. to inspect an action log.
    pub fn with_middleware<T>(&self, f: impl FnOnce(&M) -> T) -> T {
        f(self.lock().middleware())
    }
}

impl<S, M> StoreApi<S> for SharedStore<S, M>
where
    S: Clone + Send + 'static,
    M: Middleware<FluxAction> + Send + 'static,
{
    fn dispatch(&self, action: FluxAction) {
        SharedStore::dispatch(self, action);
    }

    fn get_state(&self) -> S {
        self.lock().state().clone()
    }
}

/// A shared store with an [`AsyncMiddleware`] in front of the reducer.
///
/// # Example
///
/// ```ignore
/// let store = AsyncStore::new(
///     SharedStore::from_reducer(AppState::default(), reducer),
///     AsyncMiddleware::new(),
/// );
///
/// let handled = store.dispatch(
///     AsyncAction::new()
///         .types(["USER_PENDING", "USER_SUCCESS", "USER_ERROR"])
///         .call_api(|| async { fetch_user().await }),
/// )?;
///
/// if let Some(request) = handled.into_request() {
///     tokio::spawn(request);
/// }
/// ```
pub struct AsyncStore<S, M = NoopMiddleware>
where
    M: Middleware<FluxAction>,
{
    store: SharedStore<S, M>,
    middleware: AsyncMiddleware<S>,
}

impl<S, M: Middleware<FluxAction>> Clone for AsyncStore<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<S, M> AsyncStore<S, M>
where
    S: Clone + Send + 'static,
    M: Middleware<FluxAction> + Send + 'static,
{
    pub fn new(store: SharedStore<S, M>, middleware: AsyncMiddleware<S>) -> Self {
        Self { store, middleware }
    }

    /// Dispatch a plain action or an async descriptor.
    ///
    /// Plain actions and forwarded descriptors reach the reducer through
    /// `next`; a descriptor nobody handles is dropped there.
    pub fn dispatch(
        &self,
        action: impl Into<Dispatched<S>>,
    ) -> Result<Handled<bool, S>, ValidationError> {
        let store = self.store.clone();
        let next = move |action: Dispatched<S>| match action {
            Dispatched::Action(action) => store.dispatch(action),
            Dispatched::Async(action) => {
                tracing::debug!(action = %action.label(), "Dropping unhandled async descriptor");
                false
            }
        };
        self.middleware.handle(&self.store, next, action.into())
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.store.get_state()
    }

    pub fn store(&self) -> &SharedStore<S, M> {
        &self.store
    }

    pub fn middleware(&self) -> &AsyncMiddleware<S> {
        &self.middleware
    }
}
