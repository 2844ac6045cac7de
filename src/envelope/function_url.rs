//! Function-URL envelope.
//!
//! Near-identical to the HTTP-API shape, so conversion goes through
//! [`HttpApiRequest`] rather than duplicating it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::envelope::http_api::{
    HttpApiRequest, HttpApiRequestContext, HttpDescription, DEFAULT_ROUTE_KEY, PAYLOAD_VERSION,
};
use crate::envelope::nullable;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionUrlRequest {
    #[serde(deserialize_with = "nullable")]
    pub version: String,
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
    pub request_context: FunctionUrlRequestContext,
    #[serde(deserialize_with = "nullable")]
    pub body: String,
    #[serde(deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionUrlRequestContext {
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
    pub time: String,
    #[serde(deserialize_with = "nullable")]
    pub time_epoch: i64,
    #[serde(deserialize_with = "nullable")]
    pub http: HttpDescription,
}

impl FunctionUrlRequest {
    /// The classifier probe: a raw path, or an HTTP method under the request context.
    pub fn looks_valid(&self) -> bool {
        !self.raw_path.is_empty() || !self.request_context.http.method.is_empty()
    }

    /// Relabel as an HTTP-API 2.0 request on the default route.
    pub fn into_http_api(self) -> HttpApiRequest {
        let context = self.request_context;
        HttpApiRequest {
            version: PAYLOAD_VERSION.to_string(),
            route_key: DEFAULT_ROUTE_KEY.to_string(),
            raw_path: self.raw_path,
            raw_query_string: self.raw_query_string,
            cookies: self.cookies,
            headers: self.headers,
            query_string_parameters: self.query_string_parameters,
            path_parameters: HashMap::new(),
            stage_variables: HashMap::new(),
            request_context: HttpApiRequestContext {
                route_key: DEFAULT_ROUTE_KEY.to_string(),
                account_id: context.account_id,
                api_id: context.api_id,
                request_id: context.request_id,
                domain_name: context.domain_name,
                domain_prefix: context.domain_prefix,
                stage: String::new(),
                time: context.time,
                time_epoch: context.time_epoch,
                http: context.http,
            },
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
        }
    }
}
