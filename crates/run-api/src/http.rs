//! Network port: the request/response shapes the transport hands to an
//! [`HttpSender`], and the trait infrastructure implements to put them on the
//! wire.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::errors::TransportError;

/// HTTP verbs supported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Upper-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request: defaults and overrides already merged, body
/// already encoded, query string already appended to `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub content_type: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// A response as received, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for statuses in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends a resolved request over the network.
///
/// Implementations return `Ok` for every response that arrives, including
/// error statuses; classifying the status is the transport's job. `Err` is
/// reserved for requests that produced no response at all.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: BTreeMap::new(),
            body: body.to_owned(),
        }
    }

    #[test]
    fn success_range() {
        assert!(response(200, "").is_success());
        assert!(response(204, "").is_success());
        assert!(!response(301, "").is_success());
        assert!(!response(404, "").is_success());
    }

    #[test]
    fn json_decodes_body() {
        let decoded: serde_json::Value = response(200, r#"{"id": "r1"}"#).json().unwrap();
        assert_eq!(decoded["id"], "r1");
        assert!(matches!(
            response(200, "<html>").json::<serde_json::Value>(),
            Err(TransportError::Serialization(_))
        ));
    }

    #[test]
    fn method_wire_names() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Options.as_str(), "OPTIONS");
    }
}
