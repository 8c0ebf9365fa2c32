//! slim-async: Pending/success/error sequencing for flux-style stores
//!
//! Dispatch one descriptor, get three actions: a pending notification before
//! the call, then either a success carrying the (formatted) response or an
//! error carrying `{ message, data }`.
//!
//! # Example
//! ```ignore
//! use slim_async::prelude::*;
//!
//! let middleware = AsyncMiddleware::with_options(Options::conventional());
//! let store = AsyncStore::new(SharedStore::from_reducer(AppState::default(), reducer), middleware);
//!
//! store.dispatch(
//!     AsyncAction::new()
//!         .kind("LOAD_USER")
//!         .payload(json!({ "id": 7 }))
//!         .call_api(|| async { fetch_user(7).await }),
//! )?;
//! ```

// Re-export everything from core
pub use slim_async_core::*;

/// Prelude for convenient imports
pub mod prelude {
    // Actions
    pub use slim_async_core::{Action, ActionSummary, AsyncAction, Dispatched, FluxAction};

    // Middleware
    pub use slim_async_core::{
        AsyncMiddleware, Emission, Handled, MissingCallApi, Options, Request, StoreApi,
    };

    // Errors
    pub use slim_async_core::{ApiError, AsyncError, ValidationError};

    // Store
    pub use slim_async_core::{
        AsyncStore, Middleware, NoopMiddleware, Reducer, SharedStore, Store, StoreWithMiddleware,
    };

    // Debug
    pub use slim_async_core::{ActionLog, ActionLoggerConfig, ActionLoggerMiddleware};
}
