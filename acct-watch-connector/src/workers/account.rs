use crate::{records::AccountSnapshot, workers::WorkerContext};
use tokio::sync::mpsc;

pub struct AccountWorker {
    ctx: WorkerContext,
    rx: mpsc::Receiver<AccountSnapshot>,
}

impl AccountWorker {
    pub fn new(ctx: WorkerContext, rx: mpsc::Receiver<AccountSnapshot>) -> Self {
        Self { ctx, rx }
    }

    pub async fn run(mut self) {
        tracing::info!("Account worker started, waiting for account changes...");
        while let Some(snapshot) = self.rx.recv().await {
            self.ctx.dispatcher.handle_account_change(snapshot).await;
        }
        tracing::info!("AccountWorker: stream closed, exiting.");
    }
}
