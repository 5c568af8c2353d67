//! The dual-stage pipeline.
//!
//! Two tasks per side, connected by a bounded message channel and a
//! buffer-return channel:
//!
//! - **Stage A (ingress)** waits on the line source and the sync detector
//!   concurrently, takes a buffer from the pool for each line, encrypts in
//!   place on the transmitter, and enqueues. A frame-sync pulse enqueues a
//!   `FrameSync` marker instead — on the transmitter *after* resyncing, so
//!   the resync sits at the same position in the stream on both sides.
//! - **Stage B (egress)** dequeues in order, decrypts on the receiver,
//!   hands each line to the sink and waits for the transfer to complete
//!   before touching the next message, then returns the buffer to the
//!   pool.
//!
//! All line buffers are allocated up front; the steady state moves them
//! around without allocating. A full message channel blocks stage A — the
//! system's only back-pressure mechanism, throttling acquisition to the
//! rate the output path sustains.

use crate::config::LinkConfig;
use crate::io::{LineSink, LineSource, SyncDetector};
use scanlock_core::{
    apply_keystream_in_place, DriftMonitor, FrameOutcome, SyncController, SyncStats,
};
use scanlock_types::{LineBuffer, LinkError, PipelineMessage, Role};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One side of a scanlock link, ready to run.
pub struct Pipeline {
    config: LinkConfig,
}

impl Pipeline {
    /// Build a pipeline for the given link configuration.
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// Run both stages until the collaborators close.
    ///
    /// On the embedded target this never returns (the collaborators block
    /// forever); in tests and loopback harnesses the source/detector
    /// eventually report [`LinkError::Closed`], the pipeline drains, and
    /// the final diagnostics come back.
    pub async fn run<S, D, K>(self, source: S, detector: D, sink: K) -> Result<SyncStats, LinkError>
    where
        S: LineSource + 'static,
        D: SyncDetector + 'static,
        K: LineSink + 'static,
    {
        self.config.validate()?;
        let LinkConfig {
            role,
            preshared_key,
            line_width,
            channel_depth,
        } = self.config;

        tracing::info!(
            "scanlock {} pipeline starting (width {}, channel depth {})",
            role,
            line_width,
            channel_depth
        );

        let (msg_tx, msg_rx) = mpsc::channel::<PipelineMessage>(channel_depth);
        // Buffer pool: every line buffer the pipeline will ever use. One
        // per channel slot plus one in flight per stage.
        let pool_size = channel_depth + 2;
        let (pool_tx, pool_rx) = mpsc::channel::<LineBuffer>(pool_size);
        for _ in 0..pool_size {
            pool_tx
                .try_send(LineBuffer::new(line_width))
                .map_err(|_| LinkError::Internal("buffer pool overflow at startup".into()))?;
        }

        let controller = SyncController::new(preshared_key);
        let (ingress_cipher, egress_cipher) = match role {
            Role::Transmitter => (Some(controller), None),
            Role::Receiver => (None, Some(controller)),
        };

        let ingress = tokio::spawn(stage_a(source, detector, msg_tx, pool_rx, ingress_cipher));
        let egress = tokio::spawn(stage_b(sink, msg_rx, pool_tx, egress_cipher, role));

        ingress
            .await
            .map_err(|e| LinkError::Internal(format!("ingress stage: {e}")))?;
        let stats = egress
            .await
            .map_err(|e| LinkError::Internal(format!("egress stage: {e}")))?;

        tracing::info!(
            "scanlock {} pipeline stopped after {} lines / {} frames ({} sync errors)",
            role,
            stats.line_count,
            stats.frame_count,
            stats.sync_error_count
        );
        Ok(stats)
    }
}

/// Ingress: acquisition, transmitter-side encryption, enqueue.
async fn stage_a<S, D>(
    mut source: S,
    mut detector: D,
    msg_tx: mpsc::Sender<PipelineMessage>,
    mut pool_rx: mpsc::Receiver<LineBuffer>,
    mut cipher: Option<SyncController>,
) where
    S: LineSource,
    D: SyncDetector,
{
    loop {
        tokio::select! {
            // Sync pulses take priority when both signals are pending: the
            // marker must precede the first line of the frame it opens.
            biased;

            pulse = detector.await_frame_sync() => {
                match pulse {
                    Ok(()) => {
                        // Transmitter resyncs before the marker becomes
                        // observable downstream.
                        if let Some(controller) = cipher.as_mut() {
                            controller.resync(Role::Transmitter);
                        }
                        if msg_tx.send(PipelineMessage::FrameSync).await.is_err() {
                            tracing::debug!("egress stage gone; stopping ingress");
                            return;
                        }
                    }
                    Err(LinkError::Closed) => {
                        tracing::debug!("sync detector closed; stopping ingress");
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("sync detector error: {}", e);
                        return;
                    }
                }
            }

            ready = source.await_line_ready() => {
                match ready {
                    Ok(()) => {
                        let Some(mut line) = pool_rx.recv().await else {
                            tracing::debug!("buffer pool gone; stopping ingress");
                            return;
                        };
                        if let Err(e) = source.read_line(&mut line).await {
                            // A failed read is a skipped line, not a halt.
                            // The buffer is dropped rather than recycled
                            // (stage A cannot push into its own pool end);
                            // the pool carries slack for exactly this.
                            tracing::warn!("line read failed: {}", e);
                            continue;
                        }
                        if let Some(controller) = cipher.as_mut() {
                            apply_keystream_in_place(line.as_mut_slice(), controller);
                        }
                        if msg_tx.send(PipelineMessage::Line(line)).await.is_err() {
                            tracing::debug!("egress stage gone; stopping ingress");
                            return;
                        }
                    }
                    Err(LinkError::Closed) => {
                        tracing::debug!("line source closed; stopping ingress");
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("line source error: {}", e);
                        return;
                    }
                }
            }
        }
    }
}

/// Egress: dequeue, receiver-side decryption, drift bookkeeping, emit.
async fn stage_b<K>(
    mut sink: K,
    mut msg_rx: mpsc::Receiver<PipelineMessage>,
    pool_tx: mpsc::Sender<LineBuffer>,
    mut cipher: Option<SyncController>,
    role: Role,
) -> SyncStats
where
    K: LineSink,
{
    let mut monitor = DriftMonitor::new();
    let mut stats = SyncStats::default();

    while let Some(message) = msg_rx.recv().await {
        match message {
            PipelineMessage::FrameSync => {
                monitor.begin_frame();
                let outcome = match cipher.as_mut() {
                    Some(controller) => monitor.frame_sync(controller, role),
                    // Transmitter: the resync already ran on ingress.
                    None => monitor.frame_boundary(),
                };
                match outcome {
                    FrameOutcome::Synced => {}
                    FrameOutcome::Recovered { persistent_fault } => {
                        tracing::warn!(
                            "frame boundary drift; hard recovery (error {} of {} tolerated)",
                            monitor.sync_error_count(),
                            scanlock_core::SYNC_ERROR_THRESHOLD
                        );
                        if persistent_fault {
                            tracing::warn!(
                                "persistent sync fault: check signal quality and key/width settings"
                            );
                        }
                    }
                }
                stats.record_frame();
                if let Err(e) = sink.write_frame_sync_marker().await {
                    tracing::warn!("sink rejected frame marker: {}", e);
                    break;
                }
            }
            PipelineMessage::Line(mut line) => {
                let started = Instant::now();
                monitor.line_processed();
                if let Some(controller) = cipher.as_mut() {
                    apply_keystream_in_place(line.as_mut_slice(), controller);
                }
                if let Err(e) = sink.write_line(&line).await {
                    tracing::warn!("sink rejected line: {}", e);
                    break;
                }
                let latency_us = started.elapsed().as_micros() as u64;
                if let Some(mean_us) = stats.record_line(latency_us) {
                    tracing::debug!(
                        "line {}: mean latency {} us, max {} us",
                        stats.line_count,
                        mean_us,
                        stats.max_latency_us
                    );
                }
                // Hand the buffer back for reuse; if the pool is gone the
                // run is over anyway.
                let _ = pool_tx.send(line).await;
            }
        }
    }

    stats.sync_error_count = monitor.sync_error_count();
    stats
}
