mod common;

use common::{FakeContainerApi, Step, init_tracing};
use opcflow_cloud::{LifecycleObserver, PollSpec, ReconcileError, RetrySpec};
use opcflow_cloud_paas::{
    ContainerStatus, Containers, CreateApplicationRequest, Family, LifecycleContext, PaasError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct UnrecognizedLog(Mutex<Vec<String>>);

impl LifecycleObserver for UnrecognizedLog {
    fn unrecognized(&self, _resource: &str, raw: &str) {
        self.0.lock().unwrap().push(raw.to_string());
    }
}

fn request() -> CreateApplicationRequest {
    CreateApplicationRequest::new(
        "shop",
        serde_json::json!({ "runtime": "java", "majorVersion": "8" }),
    )
}

#[tokio::test(start_paused = true)]
async fn test_create_waits_for_running() {
    init_tracing();
    let api = Arc::new(FakeContainerApi::new(vec![
        Step::NotFound,
        Step::Status("NEW"),
        Step::Status("RUNNING"),
    ]));
    let containers = Containers::new(api.clone());
    let started = Instant::now();

    let app = containers
        .create(&request(), PollSpec::default())
        .await
        .unwrap();

    assert_eq!(app.status, ContainerStatus::Running);
    assert_eq!(api.calls.gets(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_failed_application_is_rolled_back() {
    let api = Arc::new(FakeContainerApi::new(vec![
        Step::Status("NEW"),
        Step::Status("FAILED"),
        Step::Status("DESTROY_PENDING"),
        Step::Status("DESTROYED"),
    ]));
    let containers = Containers::new(api.clone());

    let err = containers
        .create(&request(), PollSpec::default())
        .await
        .unwrap_err();

    match err {
        PaasError::Reconcile(e) => {
            assert!(e.was_rolled_back());
            assert!(matches!(
                e.root_cause(),
                ReconcileError::InterpretedFatal { .. }
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(api.calls.deletes(), 1);
    assert_eq!(api.calls.gets(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_delete_waits_through_failed_and_pending() {
    let api = Arc::new(FakeContainerApi::new(vec![
        Step::Status("FAILED"),
        Step::Status("DESTROY_PENDING"),
        Step::NotFound,
    ]));
    let containers = Containers::new(api.clone());

    containers
        .delete("shop", RetrySpec::default(), PollSpec::default())
        .await
        .unwrap();

    assert_eq!(api.calls.deletes(), 1);
    assert_eq!(api.calls.gets(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_delete_retry_bound_uses_family_default() {
    let api = Arc::new(FakeContainerApi::new(vec![Step::Status("RUNNING")]).failing_deletes(100));
    let containers = Containers::new(api.clone());
    let started = Instant::now();

    let err = containers
        .delete("shop", RetrySpec::default(), PollSpec::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PaasError::Reconcile(ReconcileError::DeleteRetryExhausted { attempts: 5, .. })
    ));
    assert_eq!(api.calls.deletes(), 5);
    assert_eq!(api.calls.gets(), 0);
    // four backoffs of one minute between five attempts
    assert_eq!(started.elapsed(), Duration::from_secs(240));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_keeps_polling_and_is_reported() {
    let log = Arc::new(UnrecognizedLog::default());
    let ctx = LifecycleContext::new(Family::Container).with_observer(log.clone());
    let api = Arc::new(FakeContainerApi::new(vec![
        Step::Status("QUIESCING"),
        Step::Status("DESTROYED"),
    ]));
    let containers = Containers::with_context(api.clone(), ctx);

    containers
        .delete("shop", RetrySpec::default(), PollSpec::default())
        .await
        .unwrap();

    assert_eq!(*log.0.lock().unwrap(), vec!["QUIESCING"]);
    assert_eq!(api.calls.gets(), 2);
}

#[tokio::test]
async fn test_read_absent_is_none() {
    let api = Arc::new(FakeContainerApi::new(vec![Step::NotFoundText]));
    let containers = Containers::new(api);

    assert!(containers.read("shop").await.unwrap().is_none());
}
