//! Core types for slim-async
//!
//! This crate provides a middleware for flux-style stores that turns a single
//! async action descriptor into a pending/success/error sequence of plain
//! actions around one asynchronous call.
//!
//! # Core Concepts
//!
//! - **FluxAction**: A JSON action object (`type`, `payload`, `error`, `meta`)
//! - **AsyncAction**: Descriptor of one async operation (`types` or a prefix,
//!   `callAPI`, optional `formatData`, `shouldCallAPI`, `payload`, `meta`)
//! - **AsyncMiddleware**: Validates descriptors and drives the sequence
//! - **Store**: Centralized state container with reducer pattern
//!
//! # Basic Example
//!
//! ```ignore
//! use serde_json::json;
//! use slim_async_core::prelude::*;
//!
//! fn reducer(state: &mut AppState, action: FluxAction) -> bool {
//!     match action.kind() {
//!         Some("USER_PENDING") => { state.loading = true; true }
//!         Some("USER_SUCCESS") => { state.loading = false; true }
//!         _ => false,
//!     }
//! }
//!
//! let store = AsyncStore::new(
//!     SharedStore::from_reducer(AppState::default(), reducer),
//!     AsyncMiddleware::default(),
//! );
//!
//! let fetch = AsyncAction::new()
//!     .types(["USER_PENDING", "USER_SUCCESS", "USER_ERROR"])
//!     .call_api(|| async { Ok(json!({ "name": "ada" })) });
//!
//! let state = store.dispatch(fetch)?.into_request().unwrap().await?;
//! ```
//!
//! # Addressing
//!
//! In the default mode a descriptor names its three action types explicitly.
//! With [`AsyncMiddleware::with_options`] the types are derived from a prefix
//! (`typePrefix`, falling back to `type`) and the configured suffixes.
//! Emitted actions keep the flux-standard `{type, payload, meta}` shape unless
//! the options are built with `fsa_compliant(false)`, in which case payload
//! fields are flattened next to `type`.

pub mod action;
pub mod descriptor;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod options;
pub mod store;
pub mod testing;
pub mod validate;

// Action exports
pub use action::{Action, ActionSummary, FluxAction, STANDARD_KEYS};
pub use descriptor::{AsyncAction, CallApi, Dispatched, Field, FormatData, ShouldCallApi};

// Error exports
pub use error::{ApiError, AsyncError, ValidationError};

// Middleware exports
pub use middleware::{AsyncMiddleware, Handled, Request, StoreApi};
pub use options::{Addressing, Emission, MissingCallApi, Options};
pub use validate::{validate, ActionTypes, Validated};

// Store exports
pub use store::{
    AsyncStore, Middleware, NoopMiddleware, Reducer, SharedStore, Store, StoreWithMiddleware,
};

// Logger exports
pub use logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware,
};

// Testing exports
pub use testing::{ForwardLog, RecordingStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSummary, FluxAction};
    pub use crate::descriptor::{AsyncAction, Dispatched};
    pub use crate::error::{ApiError, AsyncError, ValidationError};
    pub use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::middleware::{AsyncMiddleware, Handled, StoreApi};
    pub use crate::options::{MissingCallApi, Options};
    pub use crate::store::{
        AsyncStore, Middleware, NoopMiddleware, Reducer, SharedStore, Store, StoreWithMiddleware,
    };
}
