//! Client configuration and base-URL resolution.
//!
//! [`RunServiceConfig`] enumerates every recognised setting with an explicit
//! default. It deserialises from JSON with missing fields falling back to
//! those defaults, so an embedding application can keep it in a settings
//! file.
//!
//! Base URLs are produced by a [`UrlResolver`]. [`ApiUrlConfig`] is the
//! default resolver; tests and alternative deployments inject their own.

use serde::{Deserialize, Serialize};

use crate::errors::RunApiError;
use crate::identifiers::{AccountName, AuthToken, ModelFile, ProjectName};
use crate::types::FilterSet;

/// Model file used when none is configured.
pub const DEFAULT_MODEL: &str = "model.eqn";

/// Scheme of the hosted run API.
pub const DEFAULT_PROTOCOL: &str = "https";

/// Host of the hosted run API.
pub const DEFAULT_API_HOST: &str = "api.forio.com";

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

/// Builds the base path of the run API for an account/project namespace.
///
/// The returned string must end with `/`; run ids and matrix segments are
/// appended directly.
pub trait UrlResolver: Send + Sync {
    /// Returns `{scheme}://{host}/run/{account}/{project}/` (or equivalent).
    fn run_api_base(&self, account: &AccountName, project: &ProjectName) -> String;
}

/// Location of the run API server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiUrlConfig {
    /// URL scheme, without `://`.
    pub protocol: String,
    /// Host name, optionally with `:port`.
    pub host: String,
}

impl Default for ApiUrlConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_owned(),
            host: DEFAULT_API_HOST.to_owned(),
        }
    }
}

impl UrlResolver for ApiUrlConfig {
    fn run_api_base(&self, account: &AccountName, project: &ProjectName) -> String {
        format!(
            "{}://{}/run/{account}/{project}/",
            self.protocol,
            self.host.trim_end_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Settings for one run client.
///
/// `account` and `project` are required; everything else has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunServiceConfig {
    /// Bearer token forwarded with every request. `None` sends no
    /// `Authorization` header.
    pub token: Option<AuthToken>,

    /// Model file a new run executes when the caller does not name one.
    pub model: Option<ModelFile>,

    /// Account that owns the project.
    pub account: Option<AccountName>,

    /// Project containing the runs.
    pub project: Option<ProjectName>,

    /// Filter merged underneath caller filters by the `filter` operation.
    pub filter: FilterSet,

    /// Where the run API lives.
    pub api: ApiUrlConfig,
}

impl Default for RunServiceConfig {
    fn default() -> Self {
        Self {
            token: None,
            model: ModelFile::new(DEFAULT_MODEL),
            account: None,
            project: None,
            filter: FilterSet::new(),
            api: ApiUrlConfig::default(),
        }
    }
}

impl RunServiceConfig {
    /// Creates a configuration for `account`/`project` with every other
    /// field at its default.
    pub fn new(account: impl Into<String>, project: impl Into<String>) -> Self {
        Self::default().with_account(account).with_project(project)
    }

    /// Parses a JSON configuration document. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RunApiError> {
        serde_json::from_str(json)
            .map_err(|e| RunApiError::configuration(format!("invalid run client config: {e}")))
    }

    /// Sets the account. An empty value clears it.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = AccountName::new(account);
        self
    }

    /// Sets the project. An empty value clears it.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = ProjectName::new(project);
        self
    }

    /// Sets the bearer token. An empty value clears it.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = AuthToken::new(token);
        self
    }

    /// Sets the model file. An empty value clears it.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = ModelFile::new(model);
        self
    }

    /// Sets the default filter used by the `filter` operation.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterSet) -> Self {
        self.filter = filter;
        self
    }

    /// Points the client at a different API server.
    #[must_use]
    pub fn with_api(mut self, api: ApiUrlConfig) -> Self {
        self.api = api;
        self
    }

    /// Returns the account/project pair, or a configuration error naming the
    /// missing field.
    ///
    /// Values that arrived through deserialisation are checked for emptiness
    /// here, since serde bypasses the identifier constructors.
    pub fn namespace(&self) -> Result<(&AccountName, &ProjectName), RunApiError> {
        let account = self
            .account
            .as_ref()
            .filter(|a| !a.as_str().is_empty())
            .ok_or_else(|| RunApiError::configuration("account is required"))?;
        let project = self
            .project
            .as_ref()
            .filter(|p| !p.as_str().is_empty())
            .ok_or_else(|| RunApiError::configuration("project is required"))?;
        Ok((account, project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolver_builds_hosted_base_url() {
        let api = ApiUrlConfig::default();
        let account = AccountName::new("forio").unwrap();
        let project = ProjectName::new("js-libs").unwrap();
        assert_eq!(
            api.run_api_base(&account, &project),
            "https://api.forio.com/run/forio/js-libs/"
        );
    }

    #[test]
    fn resolver_tolerates_trailing_slash_on_host() {
        let api = ApiUrlConfig {
            protocol: "http".into(),
            host: "localhost:8080/".into(),
        };
        let account = AccountName::new("a").unwrap();
        let project = ProjectName::new("p").unwrap();
        assert_eq!(api.run_api_base(&account, &project), "http://localhost:8080/run/a/p/");
    }

    #[test]
    fn defaults() {
        let config = RunServiceConfig::default();
        assert_eq!(config.model.as_ref().map(ModelFile::as_str), Some(DEFAULT_MODEL));
        assert!(config.token.is_none());
        assert!(config.filter.is_empty());
        assert_eq!(config.api, ApiUrlConfig::default());
    }

    #[test]
    fn namespace_requires_account_and_project() {
        let err = RunServiceConfig::default().with_project("p").namespace().unwrap_err();
        assert!(err.to_string().contains("account is required"));

        let err = RunServiceConfig::default().with_account("a").namespace().unwrap_err();
        assert!(err.to_string().contains("project is required"));

        let config = RunServiceConfig::new("a", "p");
        let (account, project) = config.namespace().unwrap();
        assert_eq!((account.as_str(), project.as_str()), ("a", "p"));
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let config = RunServiceConfig::from_json_str(
            r#"{"account": "forio", "project": "js-libs", "filter": {"saved": true}}"#,
        )
        .unwrap();
        assert_eq!(config.account.unwrap().as_str(), "forio");
        assert_eq!(config.model.unwrap().as_str(), DEFAULT_MODEL);
        assert_eq!(config.filter.len(), 1);
        assert_eq!(config.api.host, DEFAULT_API_HOST);
    }

    #[test]
    fn json_config_with_empty_account_fails_namespace_check() {
        let config = RunServiceConfig::from_json_str(r#"{"account": "", "project": "p"}"#).unwrap();
        assert!(matches!(
            config.namespace(),
            Err(RunApiError::Configuration { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = RunServiceConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, RunApiError::Configuration { .. }));
    }
}
