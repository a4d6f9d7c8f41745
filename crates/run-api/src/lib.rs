//! Domain layer of the run API client.
//!
//! This crate contains every identifier, value type, encoding rule, and error
//! type the client works with, plus the port traits infrastructure implements.
//! It performs no I/O: the network and URL layout are reached through
//! [`HttpSender`] and [`UrlResolver`], injected at construction time.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** The `transport` crate supplies the HTTP
//! plumbing; the `run-service` crate sequences run operations on top of it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `AccountName`, `OperationName`, etc.) |
//! | [`types`] | Filter sets, request parameters, operation descriptors |
//! | [`query`] | Matrix and query-string encodings of a filter set |
//! | [`config`] | Client configuration and the `UrlResolver` port |
//! | [`http`] | Request/response shapes and the `HttpSender` port |
//! | [`errors`] | Transport and run client error types |

pub mod config;
pub mod errors;
pub mod http;
pub mod identifiers;
pub mod query;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{
    ApiUrlConfig, RunServiceConfig, UrlResolver, DEFAULT_API_HOST, DEFAULT_MODEL, DEFAULT_PROTOCOL,
};
pub use errors::{RunApiError, TransportError};
pub use http::{HttpRequest, HttpResponse, HttpSender, Method};
pub use identifiers::{AccountName, AuthToken, ModelFile, OperationName, ProjectName, RunId};
pub use query::{to_matrix_format, to_query_format};
pub use types::{
    normalize_operations, FilterSet, FilterValue, Operation, OperationParams, Params,
};
