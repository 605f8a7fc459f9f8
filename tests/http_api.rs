use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use processor_gateway::domain::payment::Payment;
use processor_gateway::http::routes::build_router;
use processor_gateway::service::admission_queue::AdmissionQueue;
use processor_gateway::service::payment_service::PaymentService;
use processor_gateway::service::provider_selector::ProviderSelector;
use processor_gateway::store::store_memory::InMemoryStore;
use processor_gateway::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(capacity: usize) -> (Router, PaymentService) {
    let store = Arc::new(InMemoryStore::new());
    let payment_service = PaymentService {
        queue: AdmissionQueue::new(capacity),
        store: store.clone(),
        selector: ProviderSelector::new(store),
    };
    let router = build_router(AppState {
        payment_service: payment_service.clone(),
    });
    (router, payment_service)
}

fn post_payment(body: &str) -> Request<Body> {
    Request::post("/payments")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accepted_payment_is_queued() {
    let (router, svc) = app(8);
    let resp = router
        .oneshot(post_payment(
            r#"{"correlationId":"4a7901b8-7d26-4d9d-aa19-4dc1c7cf60b3","amount":19.90}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(svc.queue.depth(), 1);
}

#[tokio::test]
async fn full_queue_answers_503() {
    let (router, svc) = app(1);
    svc.queue.try_enqueue(Payment::new("occupant", 1.0)).unwrap();

    let resp = router
        .oneshot(post_payment(r#"{"correlationId":"late","amount":1.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["error"]["code"], "QUEUE_FULL");
    assert_eq!(svc.queue.depth(), 1);
}

#[tokio::test]
async fn negative_amount_is_rejected() {
    let (router, svc) = app(8);
    let resp = router
        .oneshot(post_payment(r#"{"correlationId":"neg","amount":-3.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_PAYMENT");
    assert_eq!(svc.queue.depth(), 0);
}

#[tokio::test]
async fn payment_lookup_statuses() {
    let (router, _) = app(8);

    let resp = router
        .clone()
        .oneshot(Request::get("/payments?correlation_id=nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = router
        .oneshot(Request::get("/payments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_has_both_partitions() {
    let (router, _) = app(8);
    let resp = router
        .oneshot(
            Request::get("/payments-summary?from=2025-07-01T00:00:00Z&to=2025-07-31T23:59:59.999Z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["default"]["totalRequests"], 0);
    assert_eq!(body["default"]["totalAmount"], 0.0);
    assert_eq!(body["fallback"]["totalRequests"], 0);
}

#[tokio::test]
async fn malformed_window_is_400() {
    let (router, _) = app(8);
    let resp = router
        .oneshot(Request::get("/payments-summary?from=yesterday").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_WINDOW");
}

#[tokio::test]
async fn reset_routes_answer_204() {
    let (router, _) = app(8);

    let resp = router
        .clone()
        .oneshot(Request::get("/reset").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = router
        .oneshot(Request::post("/purge-payments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn liveness_and_readiness() {
    let (router, _) = app(8);

    let resp = router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .oneshot(Request::get("/ops/readiness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["queueCapacity"], 8);
    assert_eq!(body["provider"], "unknown");
}
