//! Default [`HttpSender`] backed by `reqwest`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use run_api::{HttpRequest, HttpResponse, HttpSender, Method, TransportError};
use tracing::trace;

/// Sends requests with a shared [`reqwest::Client`].
///
/// No retries, no timeouts: whatever the client is configured with applies.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    /// Builds a sender with a fresh client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing client (shared pool, custom TLS, proxies, ...).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn classify(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::InvalidRequest {
            message: format!("{url}: {error}"),
        }
    } else {
        TransportError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            content_type,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(to_reqwest_method(method), url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, content_type).body(body);
        }

        let response = builder.send().await.map_err(|e| classify(&url, e))?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response.text().await.map_err(|e| classify(&url, e))?;
        trace!(status, bytes = body.len(), "received run API response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: Method, url: String, body: Option<&str>) -> HttpRequest {
        HttpRequest {
            method,
            url,
            content_type: "application/json".into(),
            headers: BTreeMap::from([("authorization".to_owned(), "Bearer t".to_owned())]),
            body: body.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn post_sends_body_content_type_and_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/run/a/p/"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer t"))
            .and(body_string(r#"{"model":"model.jl"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"r1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let sender = ReqwestSender::new().unwrap();
        let url = format!("{}/run/a/p/", server.uri());
        let response = sender
            .send(request(Method::Post, url, Some(r#"{"model":"model.jl"}"#)))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, r#"{"id":"r1"}"#);
    }

    #[tokio::test]
    async fn get_carries_query_string() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/run/a/p/myfancyrunid/"))
            .and(query_param("include", "score"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-run", "yes"))
            .expect(1)
            .mount(&server)
            .await;

        let sender = ReqwestSender::new().unwrap();
        let url = format!("{}/run/a/p/myfancyrunid/?include=score", server.uri());
        let response = sender.send(request(Method::Get, url, None)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("x-run").map(String::as_str), Some("yes"));
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such run"))
            .mount(&server)
            .await;

        let sender = ReqwestSender::new().unwrap();
        let response = sender
            .send(request(Method::Patch, server.uri(), Some("{}")))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "no such run");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let sender = ReqwestSender::new().unwrap();
        let err = sender
            .send(request(Method::Get, url.clone(), None))
            .await
            .unwrap_err();
        match err {
            TransportError::Network { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_url_is_an_invalid_request() {
        let sender = ReqwestSender::new().unwrap();
        let err = sender
            .send(request(Method::Get, "not a url".into(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest { .. }));
    }
}
