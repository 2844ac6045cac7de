//! Envelope classifiers.
//!
//! # Responsibilities
//! - Parse a payload as one candidate shape
//! - Probe a few structural fields to decide whether it plausibly is that shape
//!
//! # Design Decisions
//! - Probes only look at presence/values of fields, never at semantics
//! - A parse failure is a miss like any other
//! - Classifiers are stateless and cheap to share

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::envelope::{
    Envelope, EnvelopeFormat, FunctionUrlRequest, GenericPayload, HttpApiRequest, Miss,
    RestProxyRequest,
};

/// Decides whether a payload belongs to one envelope format.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// The format this classifier recognizes.
    fn format(&self) -> EnvelopeFormat;

    /// Returns the typed envelope if the payload plausibly is this format.
    fn classify(&self, payload: &[u8]) -> Result<Envelope, Miss>;
}

fn parse<T: DeserializeOwned>(format: EnvelopeFormat, payload: &[u8]) -> Result<T, Miss> {
    serde_json::from_slice(payload).map_err(|source| Miss::Parse { format, source })
}

/// `version == "2.0"` or a method under `requestContext.http`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpApiClassifier;

impl Classifier for HttpApiClassifier {
    fn format(&self) -> EnvelopeFormat {
        EnvelopeFormat::HttpApi
    }

    fn classify(&self, payload: &[u8]) -> Result<Envelope, Miss> {
        let request: HttpApiRequest = parse(self.format(), payload)?;
        if request.looks_valid() {
            Ok(Envelope::HttpApi(request))
        } else {
            Err(Miss::Classification {
                format: self.format(),
                reason: "no 2.0 version tag and no requestContext.http.method",
            })
        }
    }
}

/// A raw path or a method under `requestContext.http`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionUrlClassifier;

impl Classifier for FunctionUrlClassifier {
    fn format(&self) -> EnvelopeFormat {
        EnvelopeFormat::FunctionUrl
    }

    fn classify(&self, payload: &[u8]) -> Result<Envelope, Miss> {
        let request: FunctionUrlRequest = parse(self.format(), payload)?;
        if request.looks_valid() {
            Ok(Envelope::FunctionUrl(request))
        } else {
            Err(Miss::Classification {
                format: self.format(),
                reason: "no rawPath and no requestContext.http.method",
            })
        }
    }
}

/// `httpMethod`, `path` or `requestContext.requestId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestProxyClassifier;

impl Classifier for RestProxyClassifier {
    fn format(&self) -> EnvelopeFormat {
        EnvelopeFormat::RestProxy
    }

    fn classify(&self, payload: &[u8]) -> Result<Envelope, Miss> {
        let request: RestProxyRequest = parse(self.format(), payload)?;
        if request.looks_valid() {
            Ok(Envelope::RestProxy(request))
        } else {
            Err(Miss::Classification {
                format: self.format(),
                reason: "no httpMethod, path or requestContext.requestId",
            })
        }
    }
}

/// Any JSON object with a `version: "2.0"`, `httpMethod`, `path` or `resource` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericClassifier;

impl Classifier for GenericClassifier {
    fn format(&self) -> EnvelopeFormat {
        EnvelopeFormat::Generic
    }

    fn classify(&self, payload: &[u8]) -> Result<Envelope, Miss> {
        let fields: Map<String, Value> = parse(self.format(), payload)?;
        GenericPayload::probe(fields)
            .map(Envelope::Generic)
            .ok_or(Miss::Classification {
                format: self.format(),
                reason: "no marker key",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_api_classifier() {
        let c = HttpApiClassifier;
        assert!(c.classify(br#"{"version":"2.0","rawPath":"/"}"#).is_ok());
        assert!(matches!(
            c.classify(br#"{"httpMethod":"GET","path":"/"}"#),
            Err(Miss::Classification { .. })
        ));
        assert!(matches!(c.classify(b"not json"), Err(Miss::Parse { .. })));
    }

    #[test]
    fn test_function_url_classifier() {
        let c = FunctionUrlClassifier;
        assert!(matches!(
            c.classify(br#"{"rawPath":"/json"}"#),
            Ok(Envelope::FunctionUrl(_))
        ));
        assert!(c.classify(br#"{"path":"/json"}"#).is_err());
    }

    #[test]
    fn test_rest_proxy_classifier() {
        let c = RestProxyClassifier;
        assert!(c.classify(br#"{"path":"/json"}"#).is_ok());
        assert!(c.classify(br#"{"requestContext":{"requestId":"r"}}"#).is_ok());
        assert!(c.classify(br#"{"foo":"bar"}"#).is_err());
    }

    #[test]
    fn test_typed_parse_failure_is_a_miss() {
        let c = RestProxyClassifier;
        let err = c.classify(br#"{"path":42}"#).unwrap_err();
        assert!(matches!(err, Miss::Parse { format: EnvelopeFormat::RestProxy, .. }));
    }

    #[test]
    fn test_generic_classifier() {
        let c = GenericClassifier;
        assert!(matches!(
            c.classify(br#"{"resource":"/json"}"#),
            Ok(Envelope::Generic(_))
        ));
        assert!(c.classify(br#"{"foo":"bar"}"#).is_err());
        assert!(matches!(c.classify(b"[1,2]"), Err(Miss::Parse { .. })));
    }
}
