//! Step notifications emitted by serial operation batches.

use run_api::OperationName;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

/// One event in the life of a serial batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationProgress {
    /// Step `step` is about to be issued.
    Started { step: usize, operation: OperationName },
    /// Step `step` succeeded with `status`.
    Completed {
        step: usize,
        operation: OperationName,
        status: u16,
    },
    /// Step `step` failed; no later step will be issued.
    Failed {
        step: usize,
        operation: OperationName,
        /// HTTP status, when the failure was a response.
        status: Option<u16>,
    },
    /// Every step succeeded.
    Finished { steps: usize },
}

/// Delivers `event` without waiting for the receiver.
///
/// A full channel or a dropped receiver loses the event; the batch never
/// blocks on progress delivery.
pub(crate) fn report(
    progress: Option<&mpsc::Sender<OperationProgress>>,
    event: OperationProgress,
) {
    let Some(tx) = progress else {
        return;
    };
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            trace!(?event, "progress channel full, event dropped");
        }
        Err(TrySendError::Closed(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished() -> OperationProgress {
        OperationProgress::Finished { steps: 1 }
    }

    #[test]
    fn report_delivers_when_there_is_room() {
        let (tx, mut rx) = mpsc::channel(1);
        report(Some(&tx), finished());
        assert_eq!(rx.try_recv().unwrap(), finished());
    }

    #[test]
    fn report_drops_events_on_a_full_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        report(Some(&tx), OperationProgress::Finished { steps: 0 });
        report(Some(&tx), finished());
        assert_eq!(rx.try_recv().unwrap(), OperationProgress::Finished { steps: 0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn report_ignores_a_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        report(Some(&tx), finished());
        report(None, finished());
    }
}
