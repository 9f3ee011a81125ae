use crate::{records::SlotTransition, workers::WorkerContext};
use tokio::sync::mpsc;

pub struct SlotWorker {
    ctx: WorkerContext,
    rx: mpsc::Receiver<SlotTransition>,
}

impl SlotWorker {
    pub fn new(ctx: WorkerContext, rx: mpsc::Receiver<SlotTransition>) -> Self {
        Self { ctx, rx }
    }

    pub async fn run(mut self) {
        while let Some(transition) = self.rx.recv().await {
            self.ctx.dispatcher.handle_slot_change(transition).await;
        }
        tracing::info!("SlotWorker: stream closed, exiting.");
    }
}
