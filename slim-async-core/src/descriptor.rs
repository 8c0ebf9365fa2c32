//! Async action descriptors
//!
//! An [`AsyncAction`] describes one asynchronous operation: the three action
//! types it should produce (either spelled out in `types` or derived from a
//! prefix), the `callAPI` function that performs it, and optional
//! `formatData`, `shouldCallAPI`, `payload` and `meta` fields.
//!
//! Descriptors are deliberately loose. Every field may be missing or hold a
//! JSON value of the wrong kind, because descriptors can be assembled from
//! JSON and the middleware validates them at dispatch time. Function slots use
//! [`Field`] so that "`callAPI` is not a function" stays representable.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use slim_async_core::AsyncAction;
//!
//! let action: AsyncAction<()> = AsyncAction::new()
//!     .types(["USER_PENDING", "USER_SUCCESS", "USER_ERROR"])
//!     .call_api(|| async { Ok(json!({ "name": "Ada" })) })
//!     .payload(json!({ "id": 7 }));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};

use crate::action::{Action, FluxAction};
use crate::error::ApiError;

/// Deferred fetch started by the middleware.
pub type CallApi = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, ApiError>> + Send + Sync>;

/// Maps the fetch response to the data merged into the success payload.
pub type FormatData = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Gate evaluated against the current state before anything is dispatched.
pub type ShouldCallApi<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// A function slot of a descriptor: either the function itself or whatever
/// JSON value was put there instead.
pub enum Field<F> {
    Func(F),
    Data(Value),
}

impl<F> Field<F> {
    /// JSON truthiness: functions are truthy, `null`/`false`/`0`/`""` are not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Field::Func(_) => true,
            Field::Data(value) => is_truthy(value),
        }
    }

    pub fn as_func(&self) -> Option<&F> {
        match self {
            Field::Func(f) => Some(f),
            Field::Data(_) => None,
        }
    }
}

impl<F: Clone> Clone for Field<F> {
    fn clone(&self) -> Self {
        match self {
            Field::Func(f) => Field::Func(f.clone()),
            Field::Data(value) => Field::Data(value.clone()),
        }
    }
}

impl<F> fmt::Debug for Field<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Func(_) => f.write_str("Func(..)"),
            Field::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

/// JSON truthiness of an optional value.
pub(crate) fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(is_truthy)
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Descriptor of one asynchronous operation.
///
/// `S` is the store state type seen by the `shouldCallAPI` gate.
pub struct AsyncAction<S> {
    pub(crate) kind: Option<Value>,
    pub(crate) type_prefix: Option<Value>,
    pub(crate) types: Option<Value>,
    pub(crate) call_api: Option<Field<CallApi>>,
    pub(crate) format_data: Option<Field<FormatData>>,
    pub(crate) should_call_api: Option<Field<ShouldCallApi<S>>>,
    pub(crate) payload: Option<Value>,
    pub(crate) meta: Option<Value>,
}

impl<S> Default for AsyncAction<S> {
    fn default() -> Self {
        Self {
            kind: None,
            type_prefix: None,
            types: None,
            call_api: None,
            format_data: None,
            should_call_api: None,
            payload: None,
            meta: None,
        }
    }
}

impl<S> Clone for AsyncAction<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            type_prefix: self.type_prefix.clone(),
            types: self.types.clone(),
            call_api: self.call_api.clone(),
            format_data: self.format_data.clone(),
            should_call_api: self.should_call_api.clone(),
            payload: self.payload.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<S> fmt::Debug for AsyncAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("type", &self.kind)
            .field("typePrefix", &self.type_prefix)
            .field("types", &self.types)
            .field("callAPI", &self.call_api)
            .field("formatData", &self.format_data)
            .field("shouldCallAPI", &self.should_call_api)
            .field("payload", &self.payload)
            .field("meta", &self.meta)
            .finish()
    }
}

impl<S> AsyncAction<S> {
    /// An empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor from a JSON object, field by wire name.
    ///
    /// Function slots can only receive data this way; attach the functions
    /// afterwards with [`call_api`](Self::call_api) and friends.
    pub fn from_value(value: Value) -> Self {
        let mut action = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                action = action.set(&key, value);
            }
        }
        action
    }

    /// Explicit `[pending, success, error]` action types.
    pub fn types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let types = types
            .into_iter()
            .map(|t| Value::String(t.into()))
            .collect();
        self.types = Some(Value::Array(types));
        self
    }

    /// Prefix the configured suffixes are appended to.
    pub fn type_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_prefix = Some(Value::String(prefix.into()));
        self
    }

    /// The `type` field, read as the prefix when `typePrefix` is absent.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(Value::String(kind.into()));
        self
    }

    pub fn call_api<F, Fut>(mut self, call_api: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let call_api: CallApi = Arc::new(move || call_api().boxed());
        self.call_api = Some(Field::Func(call_api));
        self
    }

    pub fn format_data<F>(mut self, format_data: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.format_data = Some(Field::Func(Arc::new(format_data)));
        self
    }

    pub fn should_call_api<F>(mut self, should_call_api: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.should_call_api = Some(Field::Func(Arc::new(should_call_api)));
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Set a field by its wire name to a raw JSON value.
    ///
    /// Unknown keys are ignored. A value placed in a function slot
    /// (`callAPI`, `formatData`, `shouldCallAPI`) fails validation unless it
    /// is falsy and the slot is optional.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        match key {
            "type" => self.kind = Some(value),
            "typePrefix" => self.type_prefix = Some(value),
            "types" => self.types = Some(value),
            "callAPI" => self.call_api = Some(Field::Data(value)),
            "formatData" => self.format_data = Some(Field::Data(value)),
            "shouldCallAPI" => self.should_call_api = Some(Field::Data(value)),
            "payload" => self.payload = Some(value),
            "meta" => self.meta = Some(value),
            _ => tracing::trace!(key, "ignoring unknown descriptor field"),
        }
        self
    }

    /// Remove a field by its wire name.
    pub fn unset(mut self, key: &str) -> Self {
        match key {
            "type" => self.kind = None,
            "typePrefix" => self.type_prefix = None,
            "types" => self.types = None,
            "callAPI" => self.call_api = None,
            "formatData" => self.format_data = None,
            "shouldCallAPI" => self.should_call_api = None,
            "payload" => self.payload = None,
            "meta" => self.meta = None,
            _ => {}
        }
        self
    }

    /// Raw `types` field.
    pub fn types_value(&self) -> Option<&Value> {
        self.types.as_ref()
    }

    /// Raw prefix: `typePrefix`, falling back to `type` when the prefix is
    /// missing or falsy.
    pub fn prefix_value(&self) -> Option<&Value> {
        match &self.type_prefix {
            Some(prefix) if is_truthy(prefix) => Some(prefix),
            _ => self.kind.as_ref(),
        }
    }

    /// Whether `callAPI` is set to something truthy.
    pub fn has_call_api(&self) -> bool {
        self.call_api.as_ref().is_some_and(Field::is_truthy)
    }

    /// Short label for logs: the pending type or the prefix.
    pub fn label(&self) -> &str {
        if let Some(Value::Array(types)) = &self.types {
            if let Some(Value::String(first)) = types.first() {
                return first;
            }
        }
        match self.prefix_value() {
            Some(Value::String(prefix)) => prefix,
            _ => "<async>",
        }
    }
}

/// Anything that can travel down the dispatch chain.
pub enum Dispatched<S> {
    /// A plain action for the reducer.
    Action(FluxAction),
    /// An async action descriptor for the middleware.
    Async(AsyncAction<S>),
}

impl<S> Dispatched<S> {
    pub fn as_action(&self) -> Option<&FluxAction> {
        match self {
            Dispatched::Action(action) => Some(action),
            Dispatched::Async(_) => None,
        }
    }

    pub fn into_action(self) -> Option<FluxAction> {
        match self {
            Dispatched::Action(action) => Some(action),
            Dispatched::Async(_) => None,
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Dispatched::Async(_))
    }
}

impl<S> Clone for Dispatched<S> {
    fn clone(&self) -> Self {
        match self {
            Dispatched::Action(action) => Dispatched::Action(action.clone()),
            Dispatched::Async(action) => Dispatched::Async(action.clone()),
        }
    }
}

impl<S> fmt::Debug for Dispatched<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatched::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Dispatched::Async(action) => f.debug_tuple("Async").field(action).finish(),
        }
    }
}

impl<S: 'static> Action for Dispatched<S> {
    fn name(&self) -> &str {
        match self {
            Dispatched::Action(action) => action.name(),
            Dispatched::Async(action) => action.label(),
        }
    }
}

impl<S> From<FluxAction> for Dispatched<S> {
    fn from(action: FluxAction) -> Self {
        Dispatched::Action(action)
    }
}

impl<S> From<AsyncAction<S>> for Dispatched<S> {
    fn from(action: AsyncAction<S>) -> Self {
        Dispatched::Async(action)
    }
}

impl<S> From<Map<String, Value>> for Dispatched<S> {
    fn from(map: Map<String, Value>) -> Self {
        Dispatched::Action(FluxAction::from_map(map))
    }
}
