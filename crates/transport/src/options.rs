//! Transport defaults, per-call overrides, and the status handler table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use run_api::HttpResponse;

/// Content type sent when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Callback run when a response arrives with a given status code.
pub type StatusHandler = Arc<dyn Fn(&HttpResponse) + Send + Sync>;

// ---------------------------------------------------------------------------
// Status handlers
// ---------------------------------------------------------------------------

/// Status-code-keyed handler table.
///
/// A handler runs for every response carrying its status, before the outcome
/// is returned to the caller. It observes the response; it cannot change the
/// outcome. The default table holds a no-op handler for `404`.
#[derive(Clone)]
pub struct StatusHandlers {
    handlers: HashMap<u16, StatusHandler>,
}

impl StatusHandlers {
    /// An empty table (not even the default `404` entry).
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `status`, replacing any previous one.
    pub fn insert<F>(&mut self, status: u16, handler: F)
    where
        F: Fn(&HttpResponse) + Send + Sync + 'static,
    {
        self.handlers.insert(status, Arc::new(handler));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn on<F>(mut self, status: u16, handler: F) -> Self
    where
        F: Fn(&HttpResponse) + Send + Sync + 'static,
    {
        self.insert(status, handler);
        self
    }

    /// Returns `true` if a handler is registered for `status`.
    pub fn contains(&self, status: u16) -> bool {
        self.handlers.contains_key(&status)
    }

    /// Runs the handler registered for the response's status, if any.
    pub fn dispatch(&self, response: &HttpResponse) {
        if let Some(handler) = self.handlers.get(&response.status) {
            handler(response);
        }
    }
}

impl Default for StatusHandlers {
    fn default() -> Self {
        Self::empty().on(404, |_| {})
    }
}

impl fmt::Debug for StatusHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.handlers.keys().copied().collect();
        codes.sort_unstable();
        f.debug_struct("StatusHandlers").field("codes", &codes).finish()
    }
}

// ---------------------------------------------------------------------------
// Defaults and overrides
// ---------------------------------------------------------------------------

/// Base configuration a [`Transport`](crate::Transport) is bound to.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// URL used when a call does not override it.
    pub url: String,
    /// `Content-Type` of request bodies.
    pub content_type: String,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Handlers run on matching response statuses.
    pub status_handlers: StatusHandlers,
}

impl TransportOptions {
    /// Options bound to `url` with every other field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            headers: BTreeMap::new(),
            status_handlers: StatusHandlers::default(),
        }
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the status handler table.
    #[must_use]
    pub fn with_status_handlers(mut self, handlers: StatusHandlers) -> Self {
        self.status_handlers = handlers;
        self
    }

    /// Merges `overrides` over these defaults. Override values always win;
    /// headers merge by name.
    pub(crate) fn resolve(&self, overrides: &RequestOptions) -> ResolvedOptions {
        let mut headers = self.headers.clone();
        headers.extend(overrides.headers.clone());
        ResolvedOptions {
            url: overrides.url.clone().unwrap_or_else(|| self.url.clone()),
            content_type: overrides
                .content_type
                .clone()
                .unwrap_or_else(|| self.content_type.clone()),
            headers,
        }
    }
}

/// Per-call overrides. Unset fields fall back to the [`TransportOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    /// Overrides the request URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Overrides the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds or replaces one header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Result of merging overrides over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedOptions {
    pub(crate) url: String,
    pub(crate) content_type: String,
    pub(crate) headers: BTreeMap<String, String>,
}
