//! Ordered classifier chain.
//!
//! # Responsibilities
//! - Store classifiers in precedence order
//! - Expose the order so it can be inspected and tested
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Ties are broken by position, never by "best match"

use crate::envelope::EnvelopeFormat;
use crate::routing::matcher::{
    Classifier, FunctionUrlClassifier, GenericClassifier, HttpApiClassifier, RestProxyClassifier,
};

/// Classifiers tried in order; the first to accept a payload owns it.
#[derive(Debug)]
pub struct ClassifierChain {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl ClassifierChain {
    /// Build a chain from an explicit order.
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Self {
        Self { classifiers }
    }

    /// HTTP-API, Function-URL, REST-proxy, then Generic.
    ///
    /// The structurally disjoint HTTP-API shape goes before the overlapping
    /// Function-URL shape; a REST payload has neither a version tag nor an
    /// `http` sub-object, so it can only reach the third slot.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(HttpApiClassifier),
            Box::new(FunctionUrlClassifier),
            Box::new(RestProxyClassifier),
            Box::new(GenericClassifier),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Classifier> {
        self.classifiers.iter().map(|c| c.as_ref())
    }

    /// Formats in the order they are tried.
    pub fn formats(&self) -> Vec<EnvelopeFormat> {
        self.iter().map(|c| c.format()).collect()
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_precedence() {
        assert_eq!(
            ClassifierChain::standard().formats(),
            vec![
                EnvelopeFormat::HttpApi,
                EnvelopeFormat::FunctionUrl,
                EnvelopeFormat::RestProxy,
                EnvelopeFormat::Generic,
            ]
        );
    }

    #[test]
    fn test_first_acceptor_wins() {
        // Satisfies both the HTTP-API and Function-URL probes.
        let payload = br#"{"version":"2.0","rawPath":"/json"}"#;
        let chain = ClassifierChain::standard();
        let winner = chain
            .iter()
            .find(|c| c.classify(payload).is_ok())
            .map(|c| c.format());
        assert_eq!(winner, Some(EnvelopeFormat::HttpApi));
    }
}
