//! Run API client.
//!
//! [`RunService`] exposes the operations available on the run resources of
//! one account/project namespace:
//!
//! | Method | Request |
//! |--------|---------|
//! | `create` | `POST {base}` |
//! | `query` / `filter` | `GET {base};k=v;.../?{modifiers}` |
//! | `load` | `GET {base}{run_id}/?{filters}` |
//! | `variables` | `GET {base}{run_id}/variables/?include=...` |
//! | `save` / `save_run` | `PATCH {base}` / `PATCH {base}{run_id}/` |
//! | `do_operation` | `POST {base};/operations/{name}/` |
//! | `serial` / `parallel` | batches of `do_operation` |
//!
//! Outcomes are plain `Result`s. Serial batches can additionally report
//! per-step [`OperationProgress`] on a channel.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Formats inputs with [`run_api`] and delegates every
//! request to a [`transport::Transport`]. Contains no transport details of
//! its own.

pub mod progress;
mod service;

pub use progress::OperationProgress;
pub use service::RunService;
