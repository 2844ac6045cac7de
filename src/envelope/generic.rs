//! Generic (untyped) payloads.
//!
//! A payload that no typed shape accepted, but that still carries one of
//! the marker keys, is coerced into a typed shape: only keys that shape
//! knows are kept, values of the wrong JSON type are dropped and scalar
//! map values are stringified. The result is re-serialized and parsed as
//! the typed envelope, then converted as usual.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::envelope::http_api::PAYLOAD_VERSION;
use crate::envelope::{
    EnvelopeFormat, HttpApiRequest, Miss, ResponseShape, RestProxyRequest,
};
use crate::http::CanonicalRequest;

const FORMAT: EnvelopeFormat = EnvelopeFormat::Generic;

/// Expected JSON type of a field in a coercion schema.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Str,
    Bool,
    Int,
    StrList,
    StrMap,
    StrListMap,
    Object(&'static [(&'static str, Kind)]),
}

const HTTP_DESCRIPTION_FIELDS: &[(&str, Kind)] = &[
    ("method", Kind::Str),
    ("path", Kind::Str),
    ("protocol", Kind::Str),
    ("sourceIp", Kind::Str),
    ("userAgent", Kind::Str),
];

const HTTP_API_CONTEXT_FIELDS: &[(&str, Kind)] = &[
    ("routeKey", Kind::Str),
    ("accountId", Kind::Str),
    ("apiId", Kind::Str),
    ("requestId", Kind::Str),
    ("domainName", Kind::Str),
    ("domainPrefix", Kind::Str),
    ("stage", Kind::Str),
    ("time", Kind::Str),
    ("timeEpoch", Kind::Int),
    ("http", Kind::Object(HTTP_DESCRIPTION_FIELDS)),
];

const HTTP_API_FIELDS: &[(&str, Kind)] = &[
    ("version", Kind::Str),
    ("routeKey", Kind::Str),
    ("rawPath", Kind::Str),
    ("rawQueryString", Kind::Str),
    ("cookies", Kind::StrList),
    ("headers", Kind::StrMap),
    ("queryStringParameters", Kind::StrMap),
    ("pathParameters", Kind::StrMap),
    ("stageVariables", Kind::StrMap),
    ("requestContext", Kind::Object(HTTP_API_CONTEXT_FIELDS)),
    ("body", Kind::Str),
    ("isBase64Encoded", Kind::Bool),
];

const REST_IDENTITY_FIELDS: &[(&str, Kind)] =
    &[("sourceIp", Kind::Str), ("userAgent", Kind::Str)];

const REST_CONTEXT_FIELDS: &[(&str, Kind)] = &[
    ("accountId", Kind::Str),
    ("apiId", Kind::Str),
    ("requestId", Kind::Str),
    ("stage", Kind::Str),
    ("domainName", Kind::Str),
    ("identity", Kind::Object(REST_IDENTITY_FIELDS)),
];

const REST_FIELDS: &[(&str, Kind)] = &[
    ("resource", Kind::Str),
    ("path", Kind::Str),
    ("httpMethod", Kind::Str),
    ("headers", Kind::StrMap),
    ("multiValueHeaders", Kind::StrListMap),
    ("queryStringParameters", Kind::StrMap),
    ("multiValueQueryStringParameters", Kind::StrListMap),
    ("pathParameters", Kind::StrMap),
    ("stageVariables", Kind::StrMap),
    ("requestContext", Kind::Object(REST_CONTEXT_FIELDS)),
    ("body", Kind::Str),
    ("isBase64Encoded", Kind::Bool),
];

/// An untyped JSON object carrying at least one marker key.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericPayload {
    fields: Map<String, Value>,
}

impl GenericPayload {
    /// Accept the mapping if it carries any marker key.
    pub fn probe(fields: Map<String, Value>) -> Option<Self> {
        let payload = Self { fields };
        (payload.is_http_api() || payload.is_rest()).then_some(payload)
    }

    fn is_http_api(&self) -> bool {
        self.fields.get("version").and_then(Value::as_str) == Some(PAYLOAD_VERSION)
    }

    fn is_rest(&self) -> bool {
        self.fields.contains_key("httpMethod")
            || self.fields.get("path").is_some_and(|v| !v.is_null())
            || self.fields.get("resource").is_some_and(|v| !v.is_null())
    }

    /// Try the HTTP-API coercion first, then the REST one.
    pub fn into_canonical(self) -> Result<(CanonicalRequest, ResponseShape), Miss> {
        let mut last_miss = None;

        if self.is_http_api() {
            match coerce::<HttpApiRequest>(&self.fields, HTTP_API_FIELDS)
                .and_then(HttpApiRequest::into_canonical)
            {
                Ok(request) => return Ok((request, ResponseShape::HttpApi)),
                Err(miss) => {
                    tracing::debug!(error = %miss, "HTTP-API coercion of generic payload failed");
                    last_miss = Some(miss);
                }
            }
        }

        if self.is_rest() {
            match coerce::<RestProxyRequest>(&self.fields, REST_FIELDS)
                .and_then(RestProxyRequest::into_canonical)
            {
                Ok(request) => return Ok((request, ResponseShape::RestProxy)),
                Err(miss) => {
                    tracing::debug!(error = %miss, "REST coercion of generic payload failed");
                    last_miss = Some(miss);
                }
            }
        }

        Err(Miss::conversion(
            FORMAT,
            last_miss.map_or_else(
                || "no coercion applies".to_string(),
                |miss| format!("unable to coerce generic payload: {miss}"),
            ),
        ))
    }
}

fn coerce<T: DeserializeOwned>(
    fields: &Map<String, Value>,
    schema: &[(&str, Kind)],
) -> Result<T, Miss> {
    let subset = Value::Object(select(fields, schema));
    let bytes = serde_json::to_vec(&subset).map_err(|source| Miss::Parse {
        format: FORMAT,
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| Miss::Parse {
        format: FORMAT,
        source,
    })
}

fn select(fields: &Map<String, Value>, schema: &[(&str, Kind)]) -> Map<String, Value> {
    schema
        .iter()
        .filter_map(|(key, kind)| {
            let value = fields.get(*key)?;
            coerce_value(value, *kind).map(|v| (key.to_string(), v))
        })
        .collect()
}

fn coerce_value(value: &Value, kind: Kind) -> Option<Value> {
    match (kind, value) {
        (Kind::Str, Value::String(_)) => Some(value.clone()),
        (Kind::Bool, Value::Bool(_)) => Some(value.clone()),
        (Kind::Bool, Value::String(s)) => s.parse::<bool>().ok().map(Value::Bool),
        (Kind::Int, Value::Number(n)) if n.is_i64() => Some(value.clone()),
        (Kind::StrList, Value::Array(items)) => Some(Value::Array(
            items.iter().filter_map(scalar_string).collect(),
        )),
        (Kind::StrMap, Value::Object(map)) => Some(Value::Object(
            map.iter()
                .filter_map(|(k, v)| scalar_string(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        (Kind::StrListMap, Value::Object(map)) => Some(Value::Object(
            map.iter()
                .filter_map(|(k, v)| match v {
                    Value::Array(items) => Some((
                        k.clone(),
                        Value::Array(items.iter().filter_map(scalar_string).collect()),
                    )),
                    other => scalar_string(other).map(|s| (k.clone(), Value::Array(vec![s]))),
                })
                .collect(),
        )),
        (Kind::Object(schema), Value::Object(map)) => Some(Value::Object(select(map, schema))),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn payload(value: Value) -> Option<GenericPayload> {
        match value {
            Value::Object(map) => GenericPayload::probe(map),
            _ => None,
        }
    }

    #[test]
    fn test_probe_markers() {
        assert!(payload(json!({"version": "2.0"})).is_some());
        assert!(payload(json!({"httpMethod": null})).is_some());
        assert!(payload(json!({"resource": "/x"})).is_some());
        assert!(payload(json!({"path": null})).is_none());
        assert!(payload(json!({"version": "1.0"})).is_none());
        assert!(payload(json!({"foo": "bar"})).is_none());
    }

    #[test]
    fn test_rest_coercion_stringifies_scalars() {
        let (request, shape) = payload(json!({
            "httpMethod": "GET",
            "path": "/json",
            "queryStringParameters": {"p": 15, "a": 20, "skip": {"nested": true}},
            "headers": {"X-Flag": true, "X-List": ["nope"]},
            "isBase64Encoded": "false",
            "unknown": [1, 2, 3]
        }))
        .unwrap()
        .into_canonical()
        .unwrap();

        assert_eq!(shape, ResponseShape::RestProxy);
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.query["p"], "15");
        assert_eq!(request.query["a"], "20");
        assert_eq!(request.header("x-flag"), Some("true"));
        assert!(request.header("x-list").is_none());
    }

    #[test]
    fn test_wrong_typed_fields_are_dropped() {
        let (request, _) = payload(json!({
            "resource": "/json",
            "path": 42,
            "requestContext": {"requestId": 7, "stage": "prod"}
        }))
        .unwrap()
        .into_canonical()
        .unwrap();
        assert_eq!(request.path, "/json");
    }

    #[test]
    fn test_http_api_preferred_over_rest() {
        let (request, shape) = payload(json!({
            "version": "2.0",
            "rawPath": "/json",
            "path": "/other",
            "headers": {"x-num": 1},
            "requestContext": {"http": {"method": "GET"}, "timeEpoch": "soon"}
        }))
        .unwrap()
        .into_canonical()
        .unwrap();
        assert_eq!(shape, ResponseShape::HttpApi);
        assert_eq!(request.path, "/json");
        assert_eq!(request.header("x-num"), Some("1"));
    }

    #[test]
    fn test_falls_back_to_rest_when_http_api_cannot_convert() {
        let (request, shape) = payload(json!({"version": "2.0", "path": "/json"}))
            .unwrap()
            .into_canonical()
            .unwrap();
        assert_eq!(shape, ResponseShape::RestProxy);
        assert_eq!(request.path, "/json");
    }

    #[test]
    fn test_no_coercion_is_conversion_miss() {
        let err = payload(json!({"httpMethod": "GET"}))
            .unwrap()
            .into_canonical()
            .unwrap_err();
        assert!(matches!(err, Miss::Conversion { format: EnvelopeFormat::Generic, .. }));
    }
}
