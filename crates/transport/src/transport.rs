//! Verb-level HTTP wrapper bound to one base URL.

use std::sync::Arc;

use run_api::{
    to_query_format, FilterSet, HttpRequest, HttpResponse, HttpSender, Method, Params,
    TransportError,
};
use tracing::{debug, warn};

use crate::options::{RequestOptions, TransportOptions};

/// Generic HTTP transport.
///
/// Holds the base [`TransportOptions`] and an injected [`HttpSender`]. Every
/// verb method funnels into [`connect`](Self::connect), which encodes the
/// body, merges overrides, sends, runs the status handler table, and
/// classifies the outcome.
#[derive(Clone)]
pub struct Transport {
    options: TransportOptions,
    sender: Arc<dyn HttpSender>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(options: TransportOptions, sender: Arc<dyn HttpSender>) -> Self {
        Self { options, sender }
    }

    /// The defaults this transport was built with.
    pub fn defaults(&self) -> &TransportOptions {
        &self.options
    }

    /// Issues one request.
    ///
    /// Structured JSON params become a JSON text body; raw text passes
    /// through. For `GET` and `HEAD` the encoded params are appended to the URL
    /// as a query string instead of being sent as a body.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Serialization`] if the body cannot be encoded.
    /// - [`TransportError::Network`] / [`TransportError::InvalidRequest`] from
    ///   the sender.
    /// - [`TransportError::Status`] for any non-2xx response (after the
    ///   matching status handler has run).
    pub async fn connect(
        &self,
        method: Method,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let resolved = self.options.resolve(overrides);
        let mut url = resolved.url;
        let mut body = params.encode()?;

        if matches!(method, Method::Get | Method::Head) {
            if let Some(query) = body.take().filter(|q| !q.is_empty()) {
                let separator = if url.contains('?') { '&' } else { '?' };
                url = format!("{url}{separator}{query}");
            }
        }

        let request = HttpRequest {
            method,
            url,
            content_type: resolved.content_type,
            headers: resolved.headers,
            body,
        };
        debug!(method = %request.method, url = %request.url, "sending run API request");

        let url = request.url.clone();
        let response = self.sender.send(request).await?;
        self.options.status_handlers.dispatch(&response);

        if response.is_success() {
            debug!(status = response.status, url = %url, "run API request succeeded");
            Ok(response)
        } else {
            warn!(status = response.status, url = %url, "run API request failed");
            Err(TransportError::Status {
                url,
                status: response.status,
                body: response.body,
            })
        }
    }

    /// `GET` with `filters` encoded as the query string.
    pub async fn get(
        &self,
        filters: &FilterSet,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Get, Params::Raw(to_query_format(filters)), overrides)
            .await
    }

    pub async fn post(
        &self,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Post, params, overrides).await
    }

    pub async fn patch(
        &self,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Patch, params, overrides).await
    }

    pub async fn put(
        &self,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Put, params, overrides).await
    }

    pub async fn delete(
        &self,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Delete, params, overrides).await
    }

    /// `HEAD` with `filters` encoded as the query string.
    pub async fn head(
        &self,
        filters: &FilterSet,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Head, Params::Raw(to_query_format(filters)), overrides)
            .await
    }

    pub async fn options(
        &self,
        params: Params,
        overrides: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.connect(Method::Options, params, overrides).await
    }
}
