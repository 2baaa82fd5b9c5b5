//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the worker. Returns a status line for the banner when the
/// queue refuses it.
pub fn dispatch_backend_command(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand) -> Option<String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            None
        }
        Err(TrySendError::Full(_)) => Some("UI command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => Some(
            "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::TodoId;

    #[test]
    fn queued_command_reaches_worker() {
        let (tx, rx) = bounded(4);
        assert!(dispatch_backend_command(&tx, BackendCommand::Toggle { id: TodoId(3) }).is_none());
        assert_eq!(rx.try_recv().ok(), Some(BackendCommand::Toggle { id: TodoId(3) }));
    }

    #[test]
    fn full_queue_reports_status() {
        let (tx, _rx) = bounded(1);
        assert!(dispatch_backend_command(&tx, BackendCommand::Refresh).is_none());
        let status = dispatch_backend_command(&tx, BackendCommand::Refresh).expect("full");
        assert!(status.contains("full"));
    }

    #[test]
    fn dropped_worker_reports_disconnect() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let status = dispatch_backend_command(&tx, BackendCommand::ClearError).expect("gone");
        assert!(status.contains("disconnected"));
    }
}
