//! REST-proxy envelope (API Gateway REST API, payload format 1.0; also ALB).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::envelope::{decode_body, nullable, parse_method, EnvelopeFormat, Miss};
use crate::http::request::{append_header, insert_header};
use crate::http::{CanonicalRequest, CanonicalResponse};

const FORMAT: EnvelopeFormat = EnvelopeFormat::RestProxy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestProxyRequest {
    #[serde(deserialize_with = "nullable")]
    pub resource: String,
    #[serde(deserialize_with = "nullable")]
    pub path: String,
    #[serde(deserialize_with = "nullable")]
    pub http_method: String,
    #[serde(deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub path_parameters: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub stage_variables: HashMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub request_context: RestRequestContext,
    #[serde(deserialize_with = "nullable")]
    pub body: String,
    #[serde(deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestRequestContext {
    #[serde(deserialize_with = "nullable")]
    pub account_id: String,
    #[serde(deserialize_with = "nullable")]
    pub api_id: String,
    #[serde(deserialize_with = "nullable")]
    pub request_id: String,
    #[serde(deserialize_with = "nullable")]
    pub stage: String,
    #[serde(deserialize_with = "nullable")]
    pub domain_name: String,
    #[serde(deserialize_with = "nullable")]
    pub identity: RestIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestIdentity {
    #[serde(deserialize_with = "nullable")]
    pub source_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub user_agent: String,
}

impl RestProxyRequest {
    /// The classifier probe: any of method, path or request id present.
    pub fn looks_valid(&self) -> bool {
        !self.http_method.is_empty()
            || !self.path.is_empty()
            || !self.request_context.request_id.is_empty()
    }

    pub fn into_canonical(self) -> Result<CanonicalRequest, Miss> {
        let method = parse_method(FORMAT, &self.http_method)?;
        let path = if !self.path.is_empty() {
            self.path
        } else if !self.resource.is_empty() {
            self.resource
        } else {
            return Err(Miss::conversion(FORMAT, "neither path nor resource is set"));
        };

        let mut request = CanonicalRequest::new(method, path);
        for (name, values) in &self.multi_value_headers {
            for value in values {
                append_header(&mut request.headers, name, value);
            }
        }
        for (name, value) in &self.headers {
            if !request.headers.contains_key(name.as_str()) {
                insert_header(&mut request.headers, name, value);
            }
        }

        request.query.extend(self.query_string_parameters);
        for (name, values) in self.multi_value_query_string_parameters {
            if let Some(last) = values.into_iter().last() {
                request.query.insert(name, last);
            }
        }

        request.body = decode_body(FORMAT, self.body, self.is_base64_encoded)?;
        request.is_base64_encoded = self.is_base64_encoded;
        Ok(request)
    }
}

/// Optional fields are filled in by [`crate::envelope::Sanitize`] before serialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestProxyResponse {
    pub status_code: u16,
    pub headers: Option<HashMap<String, String>>,
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    pub body: String,
    pub is_base64_encoded: Option<bool>,
}

impl RestProxyResponse {
    /// Load balancers with multi-value headers disabled only read `headers`,
    /// so the content type has to be there too.
    fn promote_content_type(&mut self) {
        let Some(content_type) = self.multi_value_headers.as_ref().and_then(|multi| {
            multi
                .iter()
                .find(|(name, values)| name.eq_ignore_ascii_case("content-type") && !values.is_empty())
                .map(|(name, values)| (name.clone(), values[0].clone()))
        }) else {
            return;
        };

        let headers = self.headers.get_or_insert_with(HashMap::new);
        if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
            headers.insert(content_type.0, content_type.1);
        }
    }
}

impl From<CanonicalResponse> for RestProxyResponse {
    fn from(response: CanonicalResponse) -> Self {
        let mut envelope = Self {
            status_code: response.status.as_u16(),
            headers: None,
            multi_value_headers: Some(response.multi_value_headers()),
            body: response.body,
            is_base64_encoded: response.is_base64_encoded.then_some(true),
        };
        envelope.promote_content_type();
        envelope
    }
}
