//! The stream pump: drives one session's chunks through the classifier and
//! onto an ordered delivery channel.

use oibridge_classifier::Classifier;
use oibridge_core::{ProcessingError, RawChunk, StreamItem, UIInstruction};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::source::ChunkSource;

/// How a pump run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Source exhausted; sentinel delivered.
    #[default]
    Completed,
    /// Source failed; error instruction and sentinel delivered.
    UpstreamFailed,
    /// Consumer went away; nothing more was delivered.
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Instructions delivered, excluding the upstream error and sentinel.
    pub delivered: u64,
    /// Chunks that fell back to a passthrough instruction.
    pub degraded: u64,
    pub outcome: PumpOutcome,
}

/// Pump `source` into `out` until the source ends, fails, or the receiver
/// is dropped.
///
/// Order is preserved exactly: one instruction per chunk, followed by a
/// single [`StreamItem::End`]. An upstream failure adds one `error`
/// instruction before the sentinel.
pub async fn run<S: ChunkSource>(source: S, out: mpsc::Sender<StreamItem>) -> PumpReport {
    let mut classifier = Classifier::new();
    run_with(source, out, move |raw: &RawChunk| classifier.process(raw)).await
}

/// Like [`run`], with a caller-supplied per-chunk processor.
///
/// A chunk the processor rejects is forwarded as a raw-content `message`
/// fallback and counted in [`PumpReport::degraded`]; the session goes on.
pub async fn run_with<S, P>(
    mut source: S,
    out: mpsc::Sender<StreamItem>,
    mut process: P,
) -> PumpReport
where
    S: ChunkSource,
    P: FnMut(&RawChunk) -> Result<UIInstruction, ProcessingError>,
{
    let mut report = PumpReport::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = out.closed() => {
                return cancelled(report);
            }
            next = source.next_chunk() => next,
        };

        let instruction = match next {
            None => break,
            Some(Err(e)) => {
                error!("agent stream failed: {e}");
                report.outcome = PumpOutcome::UpstreamFailed;
                if out
                    .send(StreamItem::Instruction(UIInstruction::upstream_error(&e)))
                    .await
                    .is_err()
                {
                    return cancelled(report);
                }
                break;
            }
            Some(Ok(raw)) => match process(&raw) {
                Ok(instruction) => instruction,
                Err(e) => {
                    warn!("error processing {} chunk: {e}", raw.shape());
                    report.degraded += 1;
                    UIInstruction::fallback(&raw)
                }
            },
        };

        if out.send(StreamItem::Instruction(instruction)).await.is_err() {
            return cancelled(report);
        }
        report.delivered += 1;
    }

    if out.send(StreamItem::End).await.is_err() {
        return cancelled(report);
    }
    debug!(
        delivered = report.delivered,
        degraded = report.degraded,
        "stream finished"
    );
    report
}

fn cancelled(mut report: PumpReport) -> PumpReport {
    info!(delivered = report.delivered, "consumer disconnected, stopping pump");
    report.outcome = PumpOutcome::Cancelled;
    report
}

/// Consumer side of one chat session.
///
/// Every session gets its own channel and producer task, so a new chat can
/// never observe items left over from a previous one. Dropping the stream
/// cancels the producer.
pub struct SessionStream {
    id: String,
    rx: mpsc::Receiver<StreamItem>,
    producer: JoinHandle<PumpReport>,
}

/// Spawn a producer task for `source` on the current tokio runtime.
pub fn spawn_session<S>(source: S, capacity: usize) -> SessionStream
where
    S: ChunkSource + 'static,
{
    let id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let span = info_span!("session", id = %id);
    let producer = tokio::spawn(
        async move {
            info!("session started");
            let report = run(source, tx).await;
            info!(outcome = ?report.outcome, delivered = report.delivered, "session ended");
            report
        }
        .instrument(span),
    );
    SessionStream { id, rx, producer }
}

impl SessionStream {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next item in delivery order; `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<StreamItem> {
        self.rx.recv().await
    }

    /// Drain every remaining item, through and including the sentinel.
    pub async fn collect(mut self) -> (Vec<StreamItem>, Option<PumpReport>) {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            let end = item.is_end();
            items.push(item);
            if end {
                break;
            }
        }
        let report = self.finish().await;
        (items, report)
    }

    /// Split into the raw receiver and the producer handle, e.g. to hand the
    /// receiver to a transport.
    pub fn into_parts(self) -> (String, mpsc::Receiver<StreamItem>, JoinHandle<PumpReport>) {
        (self.id, self.rx, self.producer)
    }

    /// Stop consuming and wait for the producer to wind down.
    pub async fn finish(self) -> Option<PumpReport> {
        let Self { rx, producer, .. } = self;
        drop(rx);
        match producer.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("session producer task failed: {e}");
                None
            }
        }
    }
}
