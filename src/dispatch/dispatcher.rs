//! The universal dispatcher.
//!
//! One pass per payload:
//! `Unclassified → Matched(format) → Converted → HandlerInvoked →
//! ResponseConverted → Sanitized → Serialized`.
//!
//! Classification and conversion misses advance the chain. Once a payload
//! is converted, its branch runs to completion and a handler error is
//! returned to the caller. When nothing matches, the final fallback runs.

use std::fmt;
use std::time::Instant;

use crate::config::DispatchConfig;
use crate::dispatch::fallback;
use crate::envelope::{EnvelopeFormat, ResponseEnvelope, ResponseShape, Sanitize};
use crate::handler::{HandlerError, InnerHandler, InvocationContext};
use crate::http::CanonicalRequest;
use crate::observability::metrics;
use crate::routing::ClassifierChain;

/// How a payload reached the inner handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Matched(EnvelopeFormat),
    Fallback,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Matched(format) => format.as_str(),
            Route::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that cross the dispatcher boundary.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("inner handler failed on {route} request: {source}")]
    Handler {
        route: Route,
        #[source]
        source: HandlerError,
    },
    #[error("could not serialize response envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A finished dispatch, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub route: Route,
    pub response: ResponseEnvelope,
}

impl Outcome {
    pub fn to_vec(&self) -> Result<Vec<u8>, DispatchError> {
        Ok(self.response.to_vec()?)
    }
}

/// Classifies payloads, runs them through the inner handler and shapes the reply.
#[derive(Debug)]
pub struct Dispatcher<H> {
    handler: H,
    chain: ClassifierChain,
    config: DispatchConfig,
}

impl<H: InnerHandler> Dispatcher<H> {
    /// Dispatcher with the standard classifier precedence.
    pub fn new(handler: H, config: DispatchConfig) -> Self {
        Self::with_chain(handler, ClassifierChain::standard(), config)
    }

    pub fn with_chain(handler: H, chain: ClassifierChain, config: DispatchConfig) -> Self {
        Self {
            handler,
            chain,
            config,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Dispatch a payload and serialize the response envelope.
    pub async fn dispatch(
        &self,
        payload: &[u8],
        ctx: &InvocationContext,
    ) -> Result<Vec<u8>, DispatchError> {
        self.dispatch_envelope(payload, ctx).await?.to_vec()
    }

    /// Dispatch a payload, returning the sanitized envelope and the route taken.
    pub async fn dispatch_envelope(
        &self,
        payload: &[u8],
        ctx: &InvocationContext,
    ) -> Result<Outcome, DispatchError> {
        let start = Instant::now();
        let (route, request, shape) = self.classify(payload, ctx);

        tracing::debug!(
            request_id = %ctx.request_id,
            route = %route,
            method = %request.method,
            path = %request.path,
            "Dispatching request"
        );

        let response = match self.handler.handle(request, ctx).await {
            Ok(response) => response,
            Err(source) => {
                tracing::error!(request_id = %ctx.request_id, route = %route, error = %source, "Inner handler failed");
                metrics::record_handler_error(route.as_str());
                return Err(DispatchError::Handler { route, source });
            }
        };

        let mut envelope = shape.render(response);
        envelope.sanitize();

        metrics::record_dispatch(route.as_str(), envelope.status_code(), start);
        tracing::info!(
            request_id = %ctx.request_id,
            route = %route,
            status = envelope.status_code(),
            "Request dispatched"
        );

        Ok(Outcome {
            route,
            response: envelope,
        })
    }

    /// Walk the chain; the first classifier whose envelope also converts wins.
    fn classify(
        &self,
        payload: &[u8],
        ctx: &InvocationContext,
    ) -> (Route, CanonicalRequest, ResponseShape) {
        for classifier in self.chain.iter() {
            let converted = classifier
                .classify(payload)
                .and_then(|envelope| envelope.into_canonical());
            match converted {
                Ok((request, shape)) => {
                    return (Route::Matched(classifier.format()), request, shape);
                }
                Err(miss) => {
                    tracing::debug!(
                        request_id = %ctx.request_id,
                        format = %miss.format(),
                        reason = %miss,
                        "Classifier declined payload"
                    );
                }
            }
        }

        tracing::warn!(
            request_id = %ctx.request_id,
            default_route = %self.config.default_route,
            payload_len = payload.len(),
            "No envelope format matched; using fallback request"
        );
        metrics::record_fallback();
        let request = fallback::synthesize(payload, &self.config);
        (Route::Fallback, request, ResponseShape::RestProxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CanonicalResponse;
    use axum::http::{HeaderValue, StatusCode};
    use std::future::Future;
    use std::sync::Mutex;

    /// Echoes the request line as the body and records what it saw.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<CanonicalRequest>>,
        fail: bool,
    }

    impl InnerHandler for Recorder {
        fn handle(
            &self,
            request: CanonicalRequest,
            _ctx: &InvocationContext,
        ) -> impl Future<Output = Result<CanonicalResponse, HandlerError>> + Send {
            let body = format!("{} {}", request.method, request.path);
            self.seen.lock().unwrap().push(request);
            let fail = self.fail;
            async move {
                if fail {
                    return Err(HandlerError::Timeout);
                }
                let mut response = CanonicalResponse::text(StatusCode::OK, body);
                response
                    .headers
                    .insert("content-type", HeaderValue::from_static("text/plain"));
                Ok(response)
            }
        }
    }

    fn dispatcher() -> Dispatcher<Recorder> {
        Dispatcher::new(Recorder::default(), DispatchConfig::default())
    }

    async fn route_of(payload: &[u8]) -> Route {
        dispatcher()
            .dispatch_envelope(payload, &InvocationContext::new("t"))
            .await
            .unwrap()
            .route
    }

    #[tokio::test]
    async fn test_routes_by_precedence() {
        assert_eq!(
            route_of(br#"{"version":"2.0","rawPath":"/json"}"#).await,
            Route::Matched(EnvelopeFormat::HttpApi)
        );
        assert_eq!(
            route_of(br#"{"rawPath":"/json"}"#).await,
            Route::Matched(EnvelopeFormat::FunctionUrl)
        );
        assert_eq!(
            route_of(br#"{"httpMethod":"GET","path":"/json"}"#).await,
            Route::Matched(EnvelopeFormat::RestProxy)
        );
        assert_eq!(
            route_of(br#"{"resource":"/json","path":7}"#).await,
            Route::Matched(EnvelopeFormat::Generic)
        );
        assert_eq!(route_of(br#"{"foo":"bar"}"#).await, Route::Fallback);
        assert_eq!(route_of(b"\x00\x01garbage").await, Route::Fallback);
    }

    #[tokio::test]
    async fn test_conversion_miss_falls_through() {
        // REST probe accepts on request id alone, but there is no path to convert.
        assert_eq!(
            route_of(br#"{"requestContext":{"requestId":"abc"}}"#).await,
            Route::Fallback
        );
    }

    #[tokio::test]
    async fn test_fallback_sends_raw_payload_to_default_route() {
        let dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch_envelope(br#"{"foo":"bar"}"#, &InvocationContext::new("t"))
            .await
            .unwrap();

        let seen = dispatcher.handler().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/json");
        assert_eq!(seen[0].body, br#"{"foo":"bar"}"#);
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
        match outcome.response {
            ResponseEnvelope::RestProxy(r) => assert_eq!(r.body, "GET /json"),
            other => panic!("expected REST envelope, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handler_invoked_once_and_error_surfaces() {
        let dispatcher = Dispatcher::new(
            Recorder {
                fail: true,
                ..Default::default()
            },
            DispatchConfig::default(),
        );
        let err = dispatcher
            .dispatch(br#"{"httpMethod":"GET","path":"/json"}"#, &InvocationContext::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Handler {
                route: Route::Matched(EnvelopeFormat::RestProxy),
                source: HandlerError::Timeout
            }
        ));
        assert_eq!(dispatcher.handler().seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_every_route_yields_sanitized_envelope() {
        let payloads: [&[u8]; 5] = [
            br#"{"version":"2.0","rawPath":"/json"}"#,
            br#"{"rawPath":"/json"}"#,
            br#"{"httpMethod":"GET","path":"/json"}"#,
            br#"{"resource":"/json"}"#,
            b"???",
        ];
        for payload in payloads {
            let bytes = dispatcher()
                .dispatch(payload, &InvocationContext::new("t"))
                .await
                .unwrap();
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(value["headers"].is_object(), "{value}");
            assert!(value["multiValueHeaders"].is_object(), "{value}");
            assert_eq!(value["isBase64Encoded"], false, "{value}");
            assert_eq!(value["statusCode"], 200);
        }
    }

    #[tokio::test]
    async fn test_fallback_survives_unusable_config() {
        let config = DispatchConfig {
            default_route: String::new(),
            fallback_content_type: "application/json\n".into(),
            ..DispatchConfig::default()
        };
        let dispatcher = Dispatcher::new(Recorder::default(), config);
        let outcome = dispatcher
            .dispatch_envelope(br#"{"foo":"bar"}"#, &InvocationContext::new("t"))
            .await
            .unwrap();
        assert_eq!(outcome.route, Route::Fallback);

        let seen = dispatcher.handler().seen.lock().unwrap();
        assert_eq!(seen[0].method, axum::http::Method::GET);
        assert_eq!(seen[0].path, "/");
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
        match outcome.response {
            ResponseEnvelope::RestProxy(r) => assert_eq!(r.status_code, 200),
            other => panic!("expected REST envelope, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rest_and_http_api_build_the_same_request() {
        let dispatcher = dispatcher();
        let ctx = InvocationContext::new("t");
        let rest = br#"{"httpMethod":"GET","path":"/json","queryStringParameters":{"p":"15","a":"20"}}"#;
        let http_api = br#"{"version":"2.0","rawPath":"/json","rawQueryString":"p=15&a=20","requestContext":{"http":{"method":"GET"}}}"#;

        let first = dispatcher.dispatch_envelope(rest, &ctx).await.unwrap();
        let second = dispatcher.dispatch_envelope(http_api, &ctx).await.unwrap();
        assert_eq!(first.route, Route::Matched(EnvelopeFormat::RestProxy));
        assert_eq!(second.route, Route::Matched(EnvelopeFormat::HttpApi));

        let seen = dispatcher.handler().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let (a, b) = (&seen[0], &seen[1]);
        assert_eq!(a.method, b.method);
        assert_eq!(a.path, b.path);
        assert_eq!(a.query, b.query);
        assert_eq!(a.query.get("p").map(String::as_str), Some("15"));
        assert_eq!(a.query.get("a").map(String::as_str), Some("20"));
        assert_eq!(a.body, b.body);
    }
}
