//! End-to-end tests for the pending/success/error sequence

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use slim_async::prelude::*;
use slim_async::testing::{ForwardLog, RecordingStore};
use slim_async::{assert_dispatched, assert_not_dispatched, count_dispatched, find_dispatched};

#[derive(Debug, Clone, Default, PartialEq)]
struct AppState {
    ready: bool,
}

fn descriptor() -> AsyncAction<AppState> {
    AsyncAction::new()
        .types(["A_PENDING", "A_SUCCESS", "A_ERROR"])
        .call_api(|| async { Ok(json!({ "value": 1 })) })
        .payload(json!({ "id": 7 }))
}

fn prefixed() -> AsyncAction<AppState> {
    AsyncAction::new()
        .kind("REQUEST_DATA")
        .call_api(|| async { Ok(json!({})) })
}

fn values(actions: Vec<FluxAction>) -> Vec<Value> {
    actions.into_iter().map(FluxAction::into_value).collect()
}

async fn run(
    middleware: &AsyncMiddleware<AppState>,
    store: &RecordingStore<AppState>,
    action: AsyncAction<AppState>,
) -> Result<AppState, AsyncError> {
    let handled = middleware
        .handle(store, ForwardLog::new().handler(), action.into())
        .expect("descriptor should validate");
    handled.into_request().expect("request should start").await
}

#[tokio::test]
async fn test_success_scenario() {
    let store = RecordingStore::new(AppState { ready: true });

    let state = run(&AsyncMiddleware::new(), &store, descriptor()).await.unwrap();

    assert!(state.ready);
    assert_eq!(
        values(store.drain_dispatched()),
        vec![
            json!({ "type": "A_PENDING", "payload": { "id": 7 } }),
            json!({ "type": "A_SUCCESS", "payload": { "id": 7, "value": 1 }, "meta": {} }),
        ]
    );
}

#[tokio::test]
async fn test_error_scenario() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor().call_api(|| async { Err(ApiError::new("boom")) });

    let error = run(&AsyncMiddleware::new(), &store, action).await.unwrap_err();

    assert_eq!(error, AsyncError::Api(ApiError::new("boom")));
    assert_eq!(
        values(store.drain_dispatched()),
        vec![
            json!({ "type": "A_PENDING", "payload": { "id": 7 } }),
            json!({ "type": "A_ERROR", "payload": { "message": "boom" }, "error": true, "meta": {} }),
        ]
    );
}

#[tokio::test]
async fn test_error_data_is_carried_in_payload() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor()
        .call_api(|| async { Err(ApiError::new("not found").with_data(json!({ "status": 404 }))) });

    run(&AsyncMiddleware::new(), &store, action).await.unwrap_err();

    let actions = store.drain_dispatched();
    let error = find_dispatched!(actions, "A_ERROR").unwrap();
    assert!(error.is_error());
    assert_eq!(
        error.payload(),
        Some(&json!({ "message": "not found", "data": { "status": 404 } }))
    );
}

#[tokio::test]
async fn test_prefix_scenario() {
    let store = RecordingStore::new(AppState::default());
    let middleware = AsyncMiddleware::with_options(Options::new("_P", "_S", "_E"));

    run(&middleware, &store, prefixed().type_prefix("FETCH")).await.unwrap();

    assert_eq!(store.drain_types(), vec!["FETCH_P", "FETCH_S"]);

    let action = prefixed()
        .type_prefix("FETCH")
        .call_api(|| async { Err(ApiError::new("boom")) });
    run(&middleware, &store, action).await.unwrap_err();

    assert_eq!(store.drain_types(), vec!["FETCH_P", "FETCH_E"]);
}

#[tokio::test]
async fn test_prefix_mode_with_options_json() {
    let options = Options::from_json(
        r#"{ "pendingSuffix": "_PENDING", "successSuffix": "_SUCCESS", "errorSuffix": "_ERROR" }"#,
    )
    .unwrap();
    let store = RecordingStore::new(AppState::default());

    run(&AsyncMiddleware::with_options(options), &store, prefixed()).await.unwrap();

    let actions = store.drain_dispatched();
    assert_dispatched!(actions, "REQUEST_DATA_PENDING");
    assert_dispatched!(actions, "REQUEST_DATA_SUCCESS");
    assert_not_dispatched!(actions, "REQUEST_DATA_ERROR");
}

#[test]
fn test_irrelevant_descriptors_are_forwarded_unchanged() {
    let store = RecordingStore::new(AppState::default());
    let forwarded = ForwardLog::new();

    let types_mode = AsyncMiddleware::<AppState>::new();
    let prefix_mode = AsyncMiddleware::<AppState>::with_options(Options::conventional());

    let cases = [
        (&types_mode, descriptor().unset("types")),
        (&types_mode, descriptor().unset("callAPI")),
        (&prefix_mode, prefixed().set("type", Value::Null)),
        (&prefix_mode, prefixed().set("callAPI", Value::Null)),
    ];
    let count = cases.len();

    for (middleware, action) in cases {
        let handled = middleware
            .handle(&store, forwarded.handler(), action.into())
            .unwrap();
        assert!(handled.is_forwarded());
    }

    assert_eq!(forwarded.len(), count);
    assert!(forwarded.take().iter().all(Dispatched::is_async));
    assert!(store.drain_dispatched().is_empty());
    assert_eq!(store.state_reads(), 0);
}

#[test]
fn test_plain_action_returns_next_result() {
    let store = RecordingStore::new(AppState::default());
    let middleware = AsyncMiddleware::<AppState>::new();

    let handled = middleware
        .handle(&store, |action: Dispatched<AppState>| action.name().len(), FluxAction::new("PING").into())
        .unwrap();

    assert_eq!(handled.forwarded(), Some(4));
}

#[test]
fn test_validation_errors_surface_before_any_dispatch() {
    let store = RecordingStore::new(AppState::default());
    let types_mode = AsyncMiddleware::<AppState>::new();
    let strict = AsyncMiddleware::<AppState>::new().missing_call_api(MissingCallApi::Reject);

    let cases = [
        (&types_mode, descriptor().types(["A_PENDING", "A_SUCCESS"]), ValidationError::InvalidTypes),
        (
            &types_mode,
            descriptor().set("types", json!(["A_PENDING", "A_SUCCESS", null])),
            ValidationError::InvalidTypes,
        ),
        (&types_mode, descriptor().set("callAPI", json!("url")), ValidationError::InvalidCallApi),
        (&strict, descriptor().set("callAPI", Value::Null), ValidationError::InvalidCallApi),
        (&types_mode, descriptor().set("formatData", Value::Null), ValidationError::InvalidFormatData),
        (
            &types_mode,
            descriptor().set("shouldCallAPI", json!({})),
            ValidationError::InvalidShouldCallApi,
        ),
        (&types_mode, descriptor().payload(Value::Null), ValidationError::InvalidPayload),
        (&types_mode, descriptor().meta(Value::Null), ValidationError::InvalidMeta),
    ];

    for (middleware, action, expected) in cases {
        let error = middleware
            .handle::<_, _, ()>(&store, ForwardLog::new().handler(), action.into())
            .unwrap_err();
        assert_eq!(error, expected);
    }

    assert!(store.drain_dispatched().is_empty());
    assert_eq!(store.state_reads(), 0);
}

#[test]
fn test_prefix_mode_validation() {
    let store = RecordingStore::new(AppState::default());

    let error = AsyncMiddleware::with_options(Options::default())
        .handle::<_, _, ()>(&store, ForwardLog::new().handler(), prefixed().into())
        .unwrap_err();
    assert_eq!(error, ValidationError::InvalidOptions);
    assert_eq!(error.to_string(), "Expected each suffix to be a string");

    let error = AsyncMiddleware::with_options(Options::conventional())
        .handle::<_, _, ()>(
            &store,
            ForwardLog::new().handler(),
            prefixed().set("type", json!({})).into(),
        )
        .unwrap_err();
    assert_eq!(error, ValidationError::InvalidType);
    assert_eq!(error.to_string(), "Expected type to be a string.");
}

#[tokio::test]
async fn test_declined_gate_skips_call() {
    let store = RecordingStore::new(AppState { ready: false });
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let action = descriptor()
        .should_call_api(|state: &AppState| state.ready)
        .call_api(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(json!({})) }
        });

    let handled = AsyncMiddleware::new()
        .handle::<_, _, ()>(&store, ForwardLog::new().handler(), action.into())
        .unwrap();

    assert!(handled.is_skipped());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(store.drain_dispatched().is_empty());

    let state = handled.into_request().unwrap().await.unwrap();
    assert_eq!(state, AppState { ready: false });
}

#[tokio::test]
async fn test_call_api_invoked_once_and_state_read_twice() {
    let store = RecordingStore::new(AppState::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let action = descriptor().call_api(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(json!({ "value": 2 })) }
    });

    let handled = AsyncMiddleware::new()
        .handle::<_, _, ()>(&store, ForwardLog::new().handler(), action.into())
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.state_reads(), 1);
    assert_eq!(store.drain_types(), vec!["A_PENDING"]);

    store.set_state(AppState { ready: true });
    let state = handled.into_request().unwrap().await.unwrap();

    assert_eq!(state, AppState { ready: true });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.state_reads(), 2);
    assert_eq!(store.drain_types(), vec!["A_SUCCESS"]);
}

#[tokio::test]
async fn test_failed_request_reads_state_once() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor().call_api(|| async { Err(ApiError::new("boom")) });

    run(&AsyncMiddleware::new(), &store, action).await.unwrap_err();

    assert_eq!(store.state_reads(), 1);
}

#[tokio::test]
async fn test_format_data_shapes_success_payload() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor()
        .call_api(|| async { Ok(json!({ "data": { "name": "ada" } })) })
        .format_data(|response| response["data"].clone())
        .meta(json!({ "page": 1 }));

    run(&AsyncMiddleware::new(), &store, action).await.unwrap();

    let actions = store.drain_dispatched();
    let success = find_dispatched!(actions, "A_SUCCESS").unwrap();
    assert_eq!(success.payload(), Some(&json!({ "id": 7, "name": "ada" })));
    assert_eq!(success.meta(), Some(&json!({ "page": 1 })));
}

#[tokio::test]
async fn test_formatted_data_overrides_payload_keys() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor().call_api(|| async { Ok(json!({ "id": 8 })) });

    run(&AsyncMiddleware::new(), &store, action).await.unwrap();

    let actions = store.drain_dispatched();
    let success = find_dispatched!(actions, "A_SUCCESS").unwrap();
    assert_eq!(success.payload(), Some(&json!({ "id": 8 })));
}

#[tokio::test]
async fn test_format_data_returning_non_object_rejects() {
    let store = RecordingStore::new(AppState::default());
    let action = descriptor().format_data(|_| Value::Null);

    let error = run(&AsyncMiddleware::new(), &store, action).await.unwrap_err();

    assert_eq!(error, AsyncError::InvalidFormatDataReturn);
    assert_eq!(error.message(), "Expected formatData to return an object.");

    let actions = store.drain_dispatched();
    assert_not_dispatched!(actions, "A_SUCCESS");
    assert_eq!(count_dispatched!(actions, "A_PENDING"), 1);
    assert_eq!(
        find_dispatched!(actions, "A_ERROR").and_then(FluxAction::payload),
        Some(&json!({ "message": "Expected formatData to return an object." }))
    );
}

#[tokio::test]
async fn test_requests_run_independently() {
    let store = RecordingStore::new(AppState::default());
    let middleware = AsyncMiddleware::new();

    let first = middleware
        .handle::<_, _, ()>(&store, ForwardLog::new().handler(), descriptor().into())
        .unwrap()
        .into_request()
        .unwrap();
    let second = middleware
        .handle::<_, _, ()>(
            &store,
            ForwardLog::new().handler(),
            descriptor()
                .types(["B_PENDING", "B_SUCCESS", "B_ERROR"])
                .into(),
        )
        .unwrap()
        .into_request()
        .unwrap();

    let (first, second) = tokio::join!(tokio::spawn(first), tokio::spawn(second));
    assert!(first.unwrap().is_ok());
    assert!(second.unwrap().is_ok());

    let types = store.drain_types();
    assert_eq!(&types[..2], &["A_PENDING", "B_PENDING"]);
    assert_eq!(types.len(), 4);
}

#[tokio::test]
async fn test_async_store_with_action_log() {
    fn reducer(state: &mut AppState, action: FluxAction) -> bool {
        match action.kind() {
            Some("A_SUCCESS") => {
                state.ready = true;
                true
            }
            _ => false,
        }
    }

    let logger = ActionLoggerMiddleware::with_log(slim_async::ActionLogConfig::new(
        10,
        ActionLoggerConfig::new(Some("A_*"), None),
    ));
    let store = AsyncStore::new(
        SharedStore::new(AppState::default(), reducer, logger),
        AsyncMiddleware::new(),
    );

    store.dispatch(FluxAction::new("IGNORED")).unwrap();
    let state = store
        .dispatch(descriptor())
        .unwrap()
        .into_request()
        .unwrap()
        .await
        .unwrap();
    assert!(state.ready);

    let names = store.store().with_middleware(|logger| {
        logger
            .log()
            .map(|log| log.entries().map(|entry| entry.name.clone()).collect::<Vec<_>>())
            .unwrap_or_default()
    });
    assert_eq!(names, vec!["A_PENDING", "A_SUCCESS"]);
}
