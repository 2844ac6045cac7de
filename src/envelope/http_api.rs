//! HTTP-API envelope (API Gateway HTTP API, payload format 2.0).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::envelope::{decode_body, nullable, parse_method, EnvelopeFormat, Miss};
use crate::http::request::insert_header;
use crate::http::{parse_query, CanonicalRequest, CanonicalResponse};

const FORMAT: EnvelopeFormat = EnvelopeFormat::HttpApi;

/// The only version tag this shape is recognized by.
pub const PAYLOAD_VERSION: &str = "2.0";

/// Route key used when a request did not come through a named route.
pub const DEFAULT_ROUTE_KEY: &str = "$default";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiRequest {
    #[serde(deserialize_with = "nullable")]
    pub version: String,
    #[serde(deserialize_with = "nullable")]
    pub route_key: String,
    #[serde(deserialize_with = "nullable")]
    pub raw_path: String,
    #[serde(deserialize_with = "nullable")]
    pub raw_query_string: String,
    #[serde(deserialize_with = "nullable")]
    pub cookies: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub stage_variables: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub request_context: HttpApiRequestContext,
    #[serde(deserialize_with = "nullable")]
    pub body: String,
    #[serde(deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpApiRequestContext {
    #[serde(deserialize_with = "nullable")]
    pub route_key: String,
    #[serde(deserialize_with = "nullable")]
    pub account_id: String,
    #[serde(deserialize_with = "nullable")]
    pub api_id: String,
    #[serde(deserialize_with = "nullable")]
    pub request_id: String,
    #[serde(deserialize_with = "nullable")]
    pub domain_name: String,
    #[serde(deserialize_with = "nullable")]
    pub domain_prefix: String,
    #[serde(deserialize_with = "nullable")]
    pub stage: String,
    #[serde(deserialize_with = "nullable")]
    pub time: String,
    #[serde(deserialize_with = "nullable")]
    pub time_epoch: i64,
    #[serde(deserialize_with = "nullable")]
    pub http: HttpDescription,
}

/// The `requestContext.http` object shared by HTTP-API and Function-URL events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpDescription {
    #[serde(deserialize_with = "nullable")]
    pub method: String,
    #[serde(deserialize_with = "nullable")]
    pub path: String,
    #[serde(deserialize_with = "nullable")]
    pub protocol: String,
    #[serde(deserialize_with = "nullable")]
    pub source_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub user_agent: String,
}

impl HttpApiRequest {
    /// The classifier probe: version tag, or an HTTP method under the request context.
    pub fn looks_valid(&self) -> bool {
        self.version == PAYLOAD_VERSION || !self.request_context.http.method.is_empty()
    }

    pub fn into_canonical(self) -> Result<CanonicalRequest, Miss> {
        let http = self.request_context.http;
        let method = parse_method(FORMAT, &http.method)?;
        let path = if !self.raw_path.is_empty() {
            self.raw_path
        } else if !http.path.is_empty() {
            http.path
        } else {
            return Err(Miss::conversion(FORMAT, "neither rawPath nor requestContext.http.path is set"));
        };

        let mut request = CanonicalRequest::new(method, path);
        for (name, value) in &self.headers {
            insert_header(&mut request.headers, name, value);
        }
        if !self.cookies.is_empty() && !request.headers.contains_key("cookie") {
            insert_header(&mut request.headers, "cookie", &self.cookies.join("; "));
        }
        if !http.user_agent.is_empty() && !request.headers.contains_key("user-agent") {
            insert_header(&mut request.headers, "user-agent", &http.user_agent);
        }

        request.query = if self.raw_query_string.is_empty() {
            self.query_string_parameters.into_iter().collect()
        } else {
            parse_query(&self.raw_query_string)
        };

        request.body = decode_body(FORMAT, self.body, self.is_base64_encoded)?;
        request.is_base64_encoded = self.is_base64_encoded;
        Ok(request)
    }
}

/// Optional fields are filled in by [`crate::envelope::Sanitize`] before serialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpApiResponse {
    pub status_code: u16,
    pub headers: Option<HashMap<String, String>>,
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    pub body: String,
    pub is_base64_encoded: Option<bool>,
}

impl From<CanonicalResponse> for HttpApiResponse {
    fn from(response: CanonicalResponse) -> Self {
        Self {
            status_code: response.status.as_u16(),
            headers: Some(response.joined_headers(&["set-cookie"])),
            multi_value_headers: None,
            cookies: response.header_values("set-cookie"),
            body: response.body,
            is_base64_encoded: response.is_base64_encoded.then_some(true),
        }
    }
}
