//! Action trait and the flux-standard action object

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys a flux-standard action may carry.
pub const STANDARD_KEYS: [&str; 4] = ["type", "payload", "error", "meta"];

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: For async dispatch across threads
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &str;
}

/// Human-readable one-line description of an action, used by the action log.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }

    /// Whether the action reports a failure.
    fn is_error(&self) -> bool {
        false
    }
}

/// A JSON action object as it reaches reducers.
///
/// Emitted pending/success/error notifications are built as `FluxAction`s.
/// In standard mode they carry only `type`, `payload`, `error` and `meta`;
/// in flattened mode payload fields sit next to `type`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use slim_async_core::FluxAction;
///
/// let action = FluxAction::new("USER_LOADED").with_payload(json!({ "id": 7 }));
/// assert_eq!(action.kind(), Some("USER_LOADED"));
/// assert!(action.is_standard());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FluxAction(Map<String, Value>);

impl FluxAction {
    /// Create an action with only a `type` field.
    pub fn new(kind: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(kind.into()));
        Self(map)
    }

    /// Wrap an arbitrary JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Set the `payload` field.
    pub fn with_payload(self, payload: Value) -> Self {
        self.with("payload", payload)
    }

    /// Set the `meta` field.
    pub fn with_meta(self, meta: Value) -> Self {
        self.with("meta", meta)
    }

    /// Set the `error` flag.
    pub fn with_error(self, error: bool) -> Self {
        self.with("error", Value::Bool(error))
    }

    /// Set an arbitrary field.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// The `type` field, if it is a string.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.0.get("payload")
    }

    pub fn meta(&self) -> Option<&Value> {
        self.0.get("meta")
    }

    /// Whether the action is flagged as an error notification.
    pub fn is_error(&self) -> bool {
        matches!(self.0.get("error"), Some(Value::Bool(true)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Check the flux-standard-action shape: a string `type`, and no keys
    /// besides `type`, `payload`, `error` and `meta`.
    pub fn is_standard(&self) -> bool {
        self.kind().is_some() && self.0.keys().all(|key| STANDARD_KEYS.contains(&key.as_str()))
    }
}

impl From<Map<String, Value>> for FluxAction {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Action for FluxAction {
    fn name(&self) -> &str {
        self.kind().unwrap_or("<untyped>")
    }
}

impl ActionSummary for FluxAction {
    fn summary(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    fn is_error(&self) -> bool {
        FluxAction::is_error(self)
    }
}
