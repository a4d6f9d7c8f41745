//! HTTP transport for the run API client.
//!
//! [`Transport`] is a thin verb-level wrapper: it encodes request
//! parameters, merges per-call [`RequestOptions`] over its
//! [`TransportOptions`], hands the resolved request to an injected
//! [`run_api::HttpSender`], runs the [`StatusHandlers`] table, and turns
//! non-2xx responses into [`run_api::TransportError::Status`].
//!
//! [`ReqwestSender`] is the production sender.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All `reqwest` usage lives here. The [`run_api`] crate
//! sees only [`run_api::HttpSender`].

pub mod options;
pub mod sender;
mod transport;

pub use options::{
    RequestOptions, StatusHandler, StatusHandlers, TransportOptions, DEFAULT_CONTENT_TYPE,
};
pub use sender::ReqwestSender;
pub use transport::Transport;
