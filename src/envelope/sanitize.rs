//! Outbound envelope sanitizing.
//!
//! After sanitizing, both header maps are present (possibly empty) and the
//! base64 flag is explicit. Status code and body are never touched.

use std::collections::HashMap;

use crate::envelope::{HttpApiResponse, RestProxyResponse};

/// Fix up an outbound envelope in place before it is serialized.
pub trait Sanitize {
    fn sanitize(&mut self);
}

impl Sanitize for RestProxyResponse {
    fn sanitize(&mut self) {
        self.headers.get_or_insert_with(HashMap::new);
        self.multi_value_headers.get_or_insert_with(HashMap::new);
        self.is_base64_encoded.get_or_insert(false);
    }
}

impl Sanitize for HttpApiResponse {
    fn sanitize(&mut self) {
        self.headers.get_or_insert_with(HashMap::new);
        self.multi_value_headers.get_or_insert_with(HashMap::new);
        self.is_base64_encoded.get_or_insert(false);
    }
}
