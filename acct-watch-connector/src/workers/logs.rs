use crate::{records::LogEvent, workers::WorkerContext};
use tokio::sync::mpsc;

/// Receives log events and handles each one on its own task.
pub struct LogsWorker {
    ctx: WorkerContext,
    rx: mpsc::Receiver<LogEvent>,
}

impl LogsWorker {
    pub fn new(ctx: WorkerContext, rx: mpsc::Receiver<LogEvent>) -> Self {
        Self { ctx, rx }
    }

    pub async fn run(mut self) {
        tracing::info!("Logs worker started, listening for logs...");
        while let Some(event) = self.rx.recv().await {
            tracing::debug!(slot = event.slot, signature = %event.signature, "Log event received");
            let dispatcher = self.ctx.dispatcher.clone();
            tokio::spawn(async move { dispatcher.handle_logs(event).await });
        }
        tracing::info!("LogsWorker: stream closed, exiting.");
    }
}
