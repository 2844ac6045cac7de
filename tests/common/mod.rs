//! Shared utilities for integration tests.

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use randstr_gateway::app;
use randstr_gateway::config::GatewayConfig;
use randstr_gateway::generator::Generator;
use randstr_gateway::handler::HandlerError;
use randstr_gateway::{
    CanonicalRequest, CanonicalResponse, Dispatcher, InnerHandler, InvocationContext, RouterHandler,
};

/// Dispatcher over the real application router with default settings.
#[allow(dead_code)]
pub fn app_dispatcher() -> Dispatcher<RouterHandler> {
    let config = GatewayConfig::default();
    let router = app::router(Generator::new(&config.generator));
    Dispatcher::new(
        RouterHandler::new(router, config.gateway.max_response_body),
        config.gateway,
    )
}

#[allow(dead_code)]
pub fn http_api_event(path: &str, query: &str) -> Value {
    json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": path,
        "rawQueryString": query,
        "headers": { "accept": "application/json" },
        "requestContext": {
            "http": { "method": "GET", "path": path, "protocol": "HTTP/1.1", "sourceIp": "10.0.0.1" },
            "requestId": "http-api-req"
        },
        "isBase64Encoded": false
    })
}

#[allow(dead_code)]
pub fn rest_event(path: &str, params: Value) -> Value {
    json!({
        "resource": path,
        "path": path,
        "httpMethod": "GET",
        "headers": null,
        "multiValueHeaders": null,
        "queryStringParameters": params,
        "requestContext": { "requestId": "rest-req", "stage": "prod" },
        "body": null,
        "isBase64Encoded": false
    })
}

/// An event recorded by the mock Runtime API.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Posted {
    Response { request_id: String, body: Value },
    Error { request_id: String, error_type: String, body: Value },
}

#[derive(Clone)]
struct RuntimeState {
    queue: Arc<Mutex<VecDeque<(String, Vec<u8>)>>>,
    posted: mpsc::UnboundedSender<Posted>,
}

/// Start a mock Lambda Runtime API on an ephemeral port.
///
/// Each queued `(request_id, payload)` is handed out once; after that
/// `/invocation/next` hangs, as the real API does between events.
#[allow(dead_code)]
pub async fn start_mock_runtime(
    events: Vec<(String, Vec<u8>)>,
) -> (SocketAddr, mpsc::UnboundedReceiver<Posted>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = RuntimeState {
        queue: Arc::new(Mutex::new(events.into())),
        posted: tx,
    };

    let router = Router::new()
        .route("/2018-06-01/runtime/invocation/next", get(next_invocation))
        .route("/2018-06-01/runtime/invocation/{id}/response", post(post_response))
        .route("/2018-06-01/runtime/invocation/{id}/error", post(post_error))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, rx)
}

async fn next_invocation(State(state): State<RuntimeState>) -> impl IntoResponse {
    let next = state.queue.lock().unwrap().pop_front();
    let Some((request_id, payload)) = next else {
        std::future::pending::<()>().await;
        unreachable!();
    };

    let deadline = SystemTime::now().duration_since(UNIX_EPOCH).unwrap() + Duration::from_secs(30);
    let mut headers = HeaderMap::new();
    headers.insert(
        "lambda-runtime-aws-request-id",
        HeaderValue::from_str(&request_id).unwrap(),
    );
    headers.insert(
        "lambda-runtime-deadline-ms",
        HeaderValue::from_str(&deadline.as_millis().to_string()).unwrap(),
    );
    (StatusCode::OK, headers, payload)
}

async fn post_response(
    State(state): State<RuntimeState>,
    Path(request_id): Path<String>,
    body: Bytes,
) -> StatusCode {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let _ = state.posted.send(Posted::Response { request_id, body });
    StatusCode::ACCEPTED
}

async fn post_error(
    State(state): State<RuntimeState>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let error_type = headers
        .get("lambda-runtime-function-error-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let _ = state.posted.send(Posted::Error { request_id, error_type, body });
    StatusCode::ACCEPTED
}

/// Wait for the next posted result, failing the test after a few seconds.
#[allow(dead_code)]
pub async fn next_posted(rx: &mut mpsc::UnboundedReceiver<Posted>) -> Posted {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("runtime API saw no result in time")
        .expect("mock runtime API stopped")
}

/// Identity handler: reflects the request line as headers and the body as-is.
#[allow(dead_code)]
pub struct Echo;

impl InnerHandler for Echo {
    fn handle(
        &self,
        request: CanonicalRequest,
        _ctx: &InvocationContext,
    ) -> impl Future<Output = Result<CanonicalResponse, HandlerError>> + Send {
        async move {
            let mut headers = request.headers.clone();
            headers.insert("x-echo-method", HeaderValue::from_str(request.method.as_str()).unwrap());
            headers.insert("x-echo-path", HeaderValue::from_str(&request.path).unwrap());
            headers.insert("x-echo-query", HeaderValue::from_str(&request.query_string()).unwrap());

            let body = if request.is_base64_encoded {
                base64::engine::general_purpose::STANDARD.encode(&request.body)
            } else {
                String::from_utf8_lossy(&request.body).into_owned()
            };
            Ok(CanonicalResponse {
                status: StatusCode::OK,
                headers,
                body,
                is_base64_encoded: request.is_base64_encoded,
            })
        }
    }
}
