//! `/json` and `/` handlers.

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::app::{agent, page, AppState};
use crate::http::parse_query;

pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomString {
    pub length: usize,
    pub string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringsResponse {
    pub printable: RandomString,
    pub alphanumeric: RandomString,
}

pub async fn generate_strings(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let params = parse_query(query.as_deref().unwrap_or_default());
    let requested = |key: &str| params.get(key).and_then(|v| v.parse::<i64>().ok());

    let generator = &state.generator;
    let printable_length = generator.length(requested("p"));
    let alphanumeric_length = generator.length(requested("a"));
    let strings = StringsResponse {
        printable: RandomString {
            length: printable_length,
            string: generator.printable(printable_length),
        },
        alphanumeric: RandomString {
            length: alphanumeric_length,
            string: generator.alphanumeric(alphanumeric_length),
        },
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if uri.path() == "/json" || agent::is_cli_user_agent(user_agent) {
        return match serde_json::to_string_pretty(&strings) {
            Ok(body) => (
                [
                    (header::CONTENT_TYPE, "application/json; charset=utf-8"),
                    (header::CACHE_CONTROL, CACHE_CONTROL),
                ],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode strings");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error encoding response").into_response()
            }
        };
    }

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        page::render(&strings),
    )
        .into_response()
}
