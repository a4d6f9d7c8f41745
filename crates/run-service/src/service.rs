//! High-level run operations.

use std::sync::Arc;

use futures_util::future::join_all;
use run_api::{
    to_matrix_format, AccountName, FilterSet, FilterValue, HttpResponse, HttpSender, Operation,
    OperationParams, Params, ProjectName, RunApiError, RunId, RunServiceConfig, UrlResolver,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use transport::{ReqwestSender, RequestOptions, StatusHandlers, Transport, TransportOptions};

use crate::progress::{report, OperationProgress};

/// Client for the run resources of one account/project namespace.
///
/// Every method issues exactly one request (except the batch helpers) and
/// returns the raw [`HttpResponse`]; nothing is cached between calls. The
/// only state is the base URL and transport defaults captured at
/// construction.
#[derive(Debug, Clone)]
pub struct RunService {
    config: RunServiceConfig,
    base_url: String,
    transport: Transport,
}

impl RunService {
    /// Builds a client from explicit collaborators.
    ///
    /// The base URL comes from `urls`; requests go out through `sender`. A
    /// configured token becomes an `Authorization: Bearer` default header.
    ///
    /// # Errors
    ///
    /// [`RunApiError::Configuration`] if account or project is missing.
    pub fn new(
        config: RunServiceConfig,
        urls: &dyn UrlResolver,
        sender: Arc<dyn HttpSender>,
    ) -> Result<Self, RunApiError> {
        Self::with_status_handlers(config, urls, sender, StatusHandlers::default())
    }

    /// Like [`new`](Self::new), with a custom status handler table.
    pub fn with_status_handlers(
        config: RunServiceConfig,
        urls: &dyn UrlResolver,
        sender: Arc<dyn HttpSender>,
        handlers: StatusHandlers,
    ) -> Result<Self, RunApiError> {
        let (account, project) = config.namespace()?;
        let base_url = urls.run_api_base(account, project);

        let mut options = TransportOptions::new(base_url.clone()).with_status_handlers(handlers);
        if let Some(token) = &config.token {
            options = options.with_header("Authorization", format!("Bearer {}", token.expose()));
        }

        info!(%account, %project, base_url = %base_url, "run service configured");
        Ok(Self {
            config,
            base_url,
            transport: Transport::new(options, sender),
        })
    }

    /// Builds a client against the server named in `config.api`, sending
    /// with a fresh [`ReqwestSender`].
    pub fn connect(config: RunServiceConfig) -> Result<Self, RunApiError> {
        let sender = Arc::new(ReqwestSender::new()?);
        let api = config.api.clone();
        Self::new(config, &api, sender)
    }

    /// `{scheme}://{host}/run/{account}/{project}/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &RunServiceConfig {
        &self.config
    }

    pub fn account(&self) -> Option<&AccountName> {
        self.config.account.as_ref()
    }

    pub fn project(&self) -> Option<&ProjectName> {
        self.config.project.as_ref()
    }

    // -----------------------------------------------------------------------
    // Resource operations
    // -----------------------------------------------------------------------

    /// Creates a run: `POST {base}` with `body` as JSON.
    #[instrument(skip_all)]
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        body: &T,
    ) -> Result<HttpResponse, RunApiError> {
        let params = Params::json(body)?;
        Ok(self.transport.post(params, &RequestOptions::default()).await?)
    }

    /// Creates a run of the configured model: `POST {base}` with
    /// `{"model": <config.model>}`.
    pub async fn create_default(&self) -> Result<HttpResponse, RunApiError> {
        let model = self.config.model.as_ref().ok_or_else(|| RunApiError::Configuration {
            message: "no model configured".to_owned(),
        })?;
        self.create(&json!({ "model": model.as_str() })).await
    }

    /// Lists runs matching `filters`:
    /// `GET {base};k=v;.../?{output_modifiers}`.
    #[instrument(skip_all, fields(filters = filters.len()))]
    pub async fn query(
        &self,
        filters: &FilterSet,
        output_modifiers: &FilterSet,
    ) -> Result<HttpResponse, RunApiError> {
        let url = format!("{}{}/", self.base_url, to_matrix_format(filters));
        debug!(url = %url, "querying runs");
        let overrides = RequestOptions::default().with_url(url);
        Ok(self.transport.get(output_modifiers, &overrides).await?)
    }

    /// [`query`](Self::query) with the configured default filter merged
    /// underneath `filters`. Keys in `filters` win.
    pub async fn filter(
        &self,
        filters: &FilterSet,
        output_modifiers: &FilterSet,
    ) -> Result<HttpResponse, RunApiError> {
        let mut merged = self.config.filter.clone();
        merged.merge(filters);
        self.query(&merged, output_modifiers).await
    }

    /// Fetches one run: `GET {base}{run_id}/?{filters}`.
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn load(
        &self,
        run_id: &RunId,
        filters: &FilterSet,
    ) -> Result<HttpResponse, RunApiError> {
        let overrides = RequestOptions::default().with_url(self.run_url(run_id));
        Ok(self.transport.get(filters, &overrides).await?)
    }

    /// Fetches variable values of one run:
    /// `GET {base}{run_id}/variables/?include=a,b&{output_modifiers}`.
    ///
    /// An `include` among `output_modifiers` is appended after `names`
    /// rather than replacing them.
    #[instrument(skip_all, fields(run_id = %run_id, variables = names.len()))]
    pub async fn variables<S: AsRef<str>>(
        &self,
        run_id: &RunId,
        names: &[S],
        output_modifiers: &FilterSet,
    ) -> Result<HttpResponse, RunApiError> {
        let mut include: Vec<FilterValue> =
            names.iter().map(|n| FilterValue::from(n.as_ref())).collect();
        match output_modifiers.get("include") {
            Some(FilterValue::List(extra)) => include.extend(extra.iter().cloned()),
            Some(extra) => include.push(extra.clone()),
            None => {}
        }

        let mut query = FilterSet::new();
        if !include.is_empty() {
            query.insert("include", FilterValue::List(include));
        }
        for (key, value) in output_modifiers.iter().filter(|(k, _)| *k != "include") {
            query.insert(key, value.clone());
        }

        let url = format!("{}variables/", self.run_url(run_id));
        let overrides = RequestOptions::default().with_url(url);
        Ok(self.transport.get(&query, &overrides).await?)
    }

    /// Updates run attributes: `PATCH` of `attributes` to the base URL, or to
    /// `options.url` when set.
    #[instrument(skip_all)]
    pub async fn save<T: Serialize + ?Sized>(
        &self,
        attributes: &T,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RunApiError> {
        let params = Params::json(attributes)?;
        Ok(self.transport.patch(params, options).await?)
    }

    /// Updates attributes of one run: `PATCH {base}{run_id}/`.
    pub async fn save_run<T: Serialize + ?Sized>(
        &self,
        run_id: &RunId,
        attributes: &T,
    ) -> Result<HttpResponse, RunApiError> {
        let options = RequestOptions::default().with_url(self.run_url(run_id));
        self.save(attributes, &options).await
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Invokes a named operation:
    /// `POST {base};/operations/{name}/` with `params` as the body.
    ///
    /// # Errors
    ///
    /// [`RunApiError::InvalidOperation`] for an empty name, otherwise any
    /// transport failure.
    pub async fn do_operation(
        &self,
        name: &str,
        params: impl Into<OperationParams>,
    ) -> Result<HttpResponse, RunApiError> {
        let operation = Operation::new(name, params)?;
        self.run_operation(&operation, &RequestOptions::default()).await
    }

    /// Invokes an already normalised operation.
    ///
    /// The request always targets the operation's own URL; `options` can
    /// add headers or change the content type, but its `url` is ignored.
    #[instrument(skip_all, fields(operation = %operation.name))]
    pub async fn run_operation(
        &self,
        operation: &Operation,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RunApiError> {
        let mut overrides = options.clone();
        overrides.url = Some(self.operation_url(operation));
        Ok(self
            .transport
            .post(operation.params.to_params(), &overrides)
            .await?)
    }

    /// Runs `operations` one after another, in the given order.
    ///
    /// Each step is issued only after the previous one succeeded. The first
    /// failure stops the batch and is returned as
    /// [`RunApiError::StepFailed`]; later steps are never sent.
    pub async fn serial(
        &self,
        operations: &[Operation],
    ) -> Result<Vec<HttpResponse>, RunApiError> {
        self.run_serial(operations, None).await
    }

    /// [`serial`](Self::serial), reporting each step on `progress`.
    pub async fn serial_with_progress(
        &self,
        operations: &[Operation],
        progress: &mpsc::Sender<OperationProgress>,
    ) -> Result<Vec<HttpResponse>, RunApiError> {
        self.run_serial(operations, Some(progress)).await
    }

    #[instrument(skip_all, fields(steps = operations.len()))]
    async fn run_serial(
        &self,
        operations: &[Operation],
        progress: Option<&mpsc::Sender<OperationProgress>>,
    ) -> Result<Vec<HttpResponse>, RunApiError> {
        let mut responses = Vec::with_capacity(operations.len());

        for (step, operation) in operations.iter().enumerate() {
            let name = operation.name.clone();
            let started = OperationProgress::Started {
                step,
                operation: name.clone(),
            };
            report(progress, started);

            match self.run_operation(operation, &RequestOptions::default()).await {
                Ok(response) => {
                    let completed = OperationProgress::Completed {
                        step,
                        operation: name,
                        status: response.status,
                    };
                    report(progress, completed);
                    responses.push(response);
                }
                Err(err) => {
                    let failed = OperationProgress::Failed {
                        step,
                        operation: name.clone(),
                        status: err.status(),
                    };
                    report(progress, failed);
                    return Err(match err {
                        RunApiError::Transport(source) => RunApiError::StepFailed {
                            step,
                            operation: name.to_string(),
                            source,
                        },
                        other => other,
                    });
                }
            }
        }

        let finished = OperationProgress::Finished {
            steps: responses.len(),
        };
        report(progress, finished);
        Ok(responses)
    }

    /// Issues every operation at once and waits for all of them.
    ///
    /// Results come back in input order, one per operation; a failed call
    /// does not affect the others. `options` applies to every call as in
    /// [`run_operation`](Self::run_operation).
    #[instrument(skip_all, fields(operations = operations.len()))]
    pub async fn parallel(
        &self,
        operations: &[Operation],
        options: &RequestOptions,
    ) -> Vec<Result<HttpResponse, RunApiError>> {
        join_all(operations.iter().map(|op| self.run_operation(op, options))).await
    }

    // -----------------------------------------------------------------------
    // URL helpers
    // -----------------------------------------------------------------------

    fn run_url(&self, run_id: &RunId) -> String {
        format!("{}{run_id}/", self.base_url)
    }

    fn operation_url(&self, operation: &Operation) -> String {
        format!("{};/operations/{}/", self.base_url, operation.name)
    }
}
