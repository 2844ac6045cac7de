//! Envelope formats and their conversions.
//!
//! # Data Flow
//! ```text
//! payload bytes
//!     → routing (classifier accepts one shape)
//!     → Envelope::into_canonical  → (CanonicalRequest, ResponseShape)
//!     → inner handler             → CanonicalResponse
//!     → ResponseShape::render     → ResponseEnvelope
//!     → sanitize.rs               → serialized bytes
//! ```
//!
//! # Design Decisions
//! - The four inbound shapes form a closed enum; new formats add a variant
//! - Function-URL converts through the HTTP-API shape, both share one response
//! - Generic payloads coerce into a typed shape before conversion
//! - Null and missing fields deserialize to empty values

pub mod function_url;
pub mod generic;
pub mod http_api;
pub mod rest;
pub mod sanitize;

use std::fmt;

use axum::http::Method;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::http::{CanonicalRequest, CanonicalResponse};

pub use function_url::FunctionUrlRequest;
pub use generic::GenericPayload;
pub use http_api::{HttpApiRequest, HttpApiResponse, HttpDescription};
pub use rest::{RestProxyRequest, RestProxyResponse};
pub use sanitize::Sanitize;

/// The inbound envelope shapes, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeFormat {
    /// API Gateway HTTP API, payload format 2.0.
    HttpApi,
    /// Lambda Function URL.
    FunctionUrl,
    /// API Gateway REST API proxy integration (payload format 1.0), also ALB.
    RestProxy,
    /// Untyped mapping recognized by marker keys.
    Generic,
}

impl EnvelopeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeFormat::HttpApi => "http-api",
            EnvelopeFormat::FunctionUrl => "function-url",
            EnvelopeFormat::RestProxy => "rest-proxy",
            EnvelopeFormat::Generic => "generic",
        }
    }
}

impl fmt::Display for EnvelopeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a candidate format did not take a payload. Never fatal to a dispatch.
#[derive(Debug, thiserror::Error)]
pub enum Miss {
    #[error("{format} probe declined: {reason}")]
    Classification {
        format: EnvelopeFormat,
        reason: &'static str,
    },
    #[error("payload does not parse as {format}: {source}")]
    Parse {
        format: EnvelopeFormat,
        #[source]
        source: serde_json::Error,
    },
    #[error("{format} envelope could not be converted: {reason}")]
    Conversion {
        format: EnvelopeFormat,
        reason: String,
    },
}

impl Miss {
    pub fn format(&self) -> EnvelopeFormat {
        match self {
            Miss::Classification { format, .. }
            | Miss::Parse { format, .. }
            | Miss::Conversion { format, .. } => *format,
        }
    }

    pub(crate) fn conversion(format: EnvelopeFormat, reason: impl Into<String>) -> Self {
        Miss::Conversion {
            format,
            reason: reason.into(),
        }
    }
}

/// A payload accepted by exactly one classifier.
#[derive(Debug, Clone)]
pub enum Envelope {
    HttpApi(HttpApiRequest),
    FunctionUrl(FunctionUrlRequest),
    RestProxy(RestProxyRequest),
    Generic(GenericPayload),
}

impl Envelope {
    pub fn format(&self) -> EnvelopeFormat {
        match self {
            Envelope::HttpApi(_) => EnvelopeFormat::HttpApi,
            Envelope::FunctionUrl(_) => EnvelopeFormat::FunctionUrl,
            Envelope::RestProxy(_) => EnvelopeFormat::RestProxy,
            Envelope::Generic(_) => EnvelopeFormat::Generic,
        }
    }

    /// Convert into the canonical request plus the shape the reply must take.
    pub fn into_canonical(self) -> Result<(CanonicalRequest, ResponseShape), Miss> {
        match self {
            Envelope::HttpApi(request) => Ok((request.into_canonical()?, ResponseShape::HttpApi)),
            Envelope::FunctionUrl(request) => Ok((
                request.into_http_api().into_canonical()?,
                ResponseShape::HttpApi,
            )),
            Envelope::RestProxy(request) => {
                Ok((request.into_canonical()?, ResponseShape::RestProxy))
            }
            Envelope::Generic(payload) => payload.into_canonical(),
        }
    }
}

/// Outbound envelope family, fixed by the inbound match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// HTTP API 2.0 response; Function URLs read the same shape.
    HttpApi,
    /// REST proxy / ALB response with multi-value headers.
    RestProxy,
}

impl ResponseShape {
    pub fn render(self, response: CanonicalResponse) -> ResponseEnvelope {
        match self {
            ResponseShape::HttpApi => ResponseEnvelope::HttpApi(HttpApiResponse::from(response)),
            ResponseShape::RestProxy => {
                ResponseEnvelope::RestProxy(RestProxyResponse::from(response))
            }
        }
    }
}

/// A response envelope ready for sanitizing and serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    HttpApi(HttpApiResponse),
    RestProxy(RestProxyResponse),
}

impl ResponseEnvelope {
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseEnvelope::HttpApi(r) => r.status_code,
            ResponseEnvelope::RestProxy(r) => r.status_code,
        }
    }

    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl Sanitize for ResponseEnvelope {
    fn sanitize(&mut self) {
        match self {
            ResponseEnvelope::HttpApi(r) => r.sanitize(),
            ResponseEnvelope::RestProxy(r) => r.sanitize(),
        }
    }
}

/// Deserialize `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Empty means `GET`; anything else must be a valid method token.
pub(crate) fn parse_method(format: EnvelopeFormat, raw: &str) -> Result<Method, Miss> {
    if raw.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| Miss::conversion(format, format!("invalid HTTP method '{raw}'")))
}

pub(crate) fn decode_body(
    format: EnvelopeFormat,
    body: String,
    is_base64_encoded: bool,
) -> Result<Vec<u8>, Miss> {
    if !is_base64_encoded {
        return Ok(body.into_bytes());
    }
    base64::engine::general_purpose::STANDARD
        .decode(body.as_bytes())
        .map_err(|e| Miss::conversion(format, format!("body is not valid base64: {e}")))
}
