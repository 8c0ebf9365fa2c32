//! Async action middleware
//!
//! [`AsyncMiddleware`] intercepts [`AsyncAction`] descriptors on their way to
//! the reducer and turns each one into a pending/success/error sequence:
//!
//! 1. Irrelevant values (plain actions, descriptors without `types`, or
//!    without a prefix and `callAPI` in prefix mode) go to `next` untouched.
//! 2. The descriptor is validated; a [`ValidationError`] is returned before
//!    anything is dispatched.
//! 3. The `shouldCallAPI` gate sees the current state. If it declines, the
//!    call ends with [`Handled::Skipped`] and nothing is dispatched.
//! 4. The pending action is dispatched, `callAPI` is invoked, and a
//!    [`Request`] future is returned. When it completes it dispatches the
//!    success action and resolves with the new state, or dispatches the error
//!    action and fails with the original error.
//!
//! # Example
//!
//! ```ignore
//! use slim_async_core::prelude::*;
//!
//! let middleware = AsyncMiddleware::<AppState>::new();
//! let handled = middleware.handle(
//!     &store,
//!     |action| forward(action),
//!     AsyncAction::new()
//!         .types(["USER_PENDING", "USER_SUCCESS", "USER_ERROR"])
//!         .call_api(|| async { fetch_user(7).await })
//!         .into(),
//! )?;
//!
//! if let Some(request) = handled.into_request() {
//!     let state = request.await?;
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{Map, Value};

use crate::action::{Action, FluxAction};
use crate::descriptor::{is_present, AsyncAction, Dispatched, FormatData};
use crate::error::{ApiError, AsyncError, ValidationError};
use crate::options::{Addressing, Emission, MissingCallApi, Options};
use crate::validate::{validate, ActionTypes, Validated};

/// The store capabilities the middleware needs.
///
/// Both calls are synchronous. `dispatch` runs the action through the
/// reducer; `get_state` returns a snapshot.
pub trait StoreApi<S>: Send + Sync + 'static {
    fn dispatch(&self, action: FluxAction);
    fn get_state(&self) -> S;
}

impl<S, T: StoreApi<S>> StoreApi<S> for Arc<T> {
    fn dispatch(&self, action: FluxAction) {
        (**self).dispatch(action)
    }

    fn get_state(&self) -> S {
        (**self).get_state()
    }
}

/// A started request: resolves with the post-success state or fails with
/// the error that was also dispatched as an error action.
pub type Request<S> = BoxFuture<'static, Result<S, AsyncError>>;

/// What the middleware did with a dispatched value.
pub enum Handled<R, S> {
    /// Passed to `next`; carries its return value.
    Forwarded(R),
    /// The `shouldCallAPI` gate declined; carries the state it saw.
    Skipped(S),
    /// The pending action was dispatched and the request is in flight.
    Requested(Request<S>),
}

impl<R, S: Send + 'static> Handled<R, S> {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Handled::Forwarded(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Handled::Skipped(_))
    }

    /// The value returned by `next`, if the action was forwarded.
    pub fn forwarded(self) -> Option<R> {
        match self {
            Handled::Forwarded(value) => Some(value),
            _ => None,
        }
    }

    /// The request future. A skipped call becomes an already-resolved future
    /// with the state the gate saw; a forwarded call has none.
    pub fn into_request(self) -> Option<Request<S>> {
        match self {
            Handled::Forwarded(_) => None,
            Handled::Skipped(state) => Some(future::ready(Ok(state)).boxed()),
            Handled::Requested(request) => Some(request),
        }
    }
}

impl<R: fmt::Debug, S: fmt::Debug> fmt::Debug for Handled<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handled::Forwarded(value) => f.debug_tuple("Forwarded").field(value).finish(),
            Handled::Skipped(state) => f.debug_tuple("Skipped").field(state).finish(),
            Handled::Requested(_) => f.write_str("Requested(..)"),
        }
    }
}

/// Middleware that runs async action descriptors.
///
/// The addressing mode and emission shape are fixed at construction.
pub struct AsyncMiddleware<S> {
    addressing: Addressing,
    emission: Emission,
    missing_call_api: MissingCallApi,
    _state: PhantomData<fn(&S)>,
}

impl<S> Clone for AsyncMiddleware<S> {
    fn clone(&self) -> Self {
        Self {
            addressing: self.addressing.clone(),
            emission: self.emission,
            missing_call_api: self.missing_call_api,
            _state: PhantomData,
        }
    }
}

impl<S> fmt::Debug for AsyncMiddleware<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMiddleware")
            .field("addressing", &self.addressing)
            .field("emission", &self.emission)
            .field("missing_call_api", &self.missing_call_api)
            .finish()
    }
}

impl<S> Default for AsyncMiddleware<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> AsyncMiddleware<S> {
    /// Types-array mode: descriptors carry their own `types`.
    pub fn new() -> Self {
        Self::from_addressing(Addressing::Types)
    }

    /// Prefix mode: types are derived from `typePrefix`/`type` and the
    /// configured suffixes.
    pub fn with_options(options: Options) -> Self {
        Self::from_addressing(Addressing::Prefix(options))
    }

    fn from_addressing(addressing: Addressing) -> Self {
        Self {
            emission: Emission::for_addressing(&addressing),
            addressing,
            missing_call_api: MissingCallApi::default(),
            _state: PhantomData,
        }
    }

    /// Choose what happens to descriptors without a `callAPI`.
    pub fn missing_call_api(mut self, policy: MissingCallApi) -> Self {
        self.missing_call_api = policy;
        self
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    pub fn emission(&self) -> Emission {
        self.emission
    }

    /// Whether a descriptor is meant for this middleware.
    pub fn is_relevant(&self, action: &AsyncAction<S>) -> bool {
        match &self.addressing {
            Addressing::Types => {
                is_present(action.types_value())
                    && (action.has_call_api() || self.missing_call_api == MissingCallApi::Reject)
            }
            Addressing::Prefix(_) => is_present(action.prefix_value()) && action.has_call_api(),
        }
    }
}

impl<S: Send + 'static> AsyncMiddleware<S> {
    /// Handle one dispatched value.
    ///
    /// Returns `Err` synchronously for malformed descriptors. Everything that
    /// can fail after the pending action went out is reported through the
    /// [`Request`] instead.
    pub fn handle<D, N, R>(
        &self,
        store: &D,
        next: N,
        action: Dispatched<S>,
    ) -> Result<Handled<R, S>, ValidationError>
    where
        D: StoreApi<S> + Clone,
        N: Fn(Dispatched<S>) -> R + Send + Sync + 'static,
        R: 'static,
    {
        let action = match action {
            Dispatched::Async(action) if self.is_relevant(&action) => action,
            other => {
                tracing::trace!(action = %other.name(), "Forwarding to next");
                return Ok(Handled::Forwarded(next(other)));
            }
        };

        let Validated {
            types,
            call_api,
            format_data,
            should_call_api,
            payload,
            meta,
        } = validate(&action, &self.addressing)?;

        let state = store.get_state();
        if !should_call_api(&state) {
            tracing::debug!(action = %types.pending, "shouldCallAPI declined, skipping request");
            return Ok(Handled::Skipped(state));
        }

        let sequence = Sequence {
            emission: self.emission,
            store: store.clone(),
            next,
            types,
            payload,
            meta,
            _state: PhantomData,
        };

        sequence.emit(sequence.pending_action());
        let response = call_api();
        Ok(Handled::Requested(sequence.into_request(response, format_data)))
    }
}

/// One running pending/success/error sequence.
struct Sequence<S, D, N> {
    emission: Emission,
    store: D,
    next: N,
    types: ActionTypes,
    payload: Map<String, Value>,
    meta: Map<String, Value>,
    _state: PhantomData<fn() -> S>,
}

impl<S, D, N, R> Sequence<S, D, N>
where
    S: Send + 'static,
    D: StoreApi<S>,
    N: Fn(Dispatched<S>) -> R + Send + Sync + 'static,
    R: 'static,
{
    fn emit(&self, action: FluxAction) {
        if self.emission == Emission::Standard && !action.is_standard() {
            tracing::debug!(action = %action.name(), "Non-standard action, handing to next");
            (self.next)(Dispatched::Action(action));
            return;
        }
        tracing::debug!(action = %action.name(), "Dispatching");
        self.store.dispatch(action);
    }

    fn pending_action(&self) -> FluxAction {
        match self.emission {
            Emission::Standard => FluxAction::new(&self.types.pending)
                .with_payload(Value::Object(self.payload.clone())),
            Emission::Flattened => FluxAction::from_map(self.payload.clone())
                .with("type", Value::String(self.types.pending.clone())),
        }
    }

    fn success_action(&self, data: Map<String, Value>) -> FluxAction {
        let mut merged = self.payload.clone();
        merged.extend(data);
        let meta = Value::Object(self.meta.clone());

        match self.emission {
            Emission::Standard => FluxAction::new(&self.types.success)
                .with_payload(Value::Object(merged))
                .with_meta(meta),
            Emission::Flattened => FluxAction::from_map(merged)
                .with("type", Value::String(self.types.success.clone()))
                .with_meta(meta),
        }
    }

    fn error_action(&self, error: &AsyncError) -> FluxAction {
        let action = FluxAction::new(&self.types.error);
        let action = match self.emission {
            Emission::Standard => action.with_payload(error.to_payload()),
            Emission::Flattened => action.with("message", Value::String(error.message())),
        };
        action
            .with_error(true)
            .with_meta(Value::Object(self.meta.clone()))
    }

    fn into_request(
        self,
        response: BoxFuture<'static, Result<Value, ApiError>>,
        format_data: FormatData,
    ) -> Request<S> {
        async move {
            let outcome = match response.await {
                Ok(response) => match format_data(response) {
                    Value::Object(data) => Ok(data),
                    _ => Err(AsyncError::InvalidFormatDataReturn),
                },
                Err(error) => Err(AsyncError::Api(error)),
            };

            match outcome {
                Ok(data) => {
                    self.emit(self.success_action(data));
                    Ok(self.store.get_state())
                }
                Err(error) => {
                    tracing::warn!(action = %self.types.error, error = %error, "Request failed");
                    self.emit(self.error_action(&error));
                    Err(error)
                }
            }
        }
        .boxed()
    }
}
