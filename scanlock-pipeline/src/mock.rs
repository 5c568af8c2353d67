//! In-memory collaborators for testing and software loopback.
//!
//! A mock ingress presents one shared timeline of line and frame-sync
//! events through the two separate collaborator traits, so tests control
//! exactly how the two signals interleave: `await_line_ready` is ready
//! only while a line is at the front of the timeline, `await_frame_sync`
//! only while a sync pulse is. Events can be scripted up front or fed
//! live through an [`IngressFeed`] (the loopback harness feeds a
//! receiver's ingress from a transmitter's sink).

use crate::io::{LineSink, LineSource, SyncDetector};
use async_trait::async_trait;
use scanlock_types::{LineBuffer, LinkError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One event on a mock ingress timeline, or one captured sink emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A scanline's worth of samples.
    Line(Vec<u8>),
    /// A frame boundary pulse.
    FrameSync,
}

#[derive(Debug, Default)]
struct IngressState {
    queue: VecDeque<FeedEvent>,
    closed: bool,
}

#[derive(Debug)]
struct IngressShared {
    state: Mutex<IngressState>,
    notify: Notify,
}

/// Live handle for pushing events into a mock ingress.
#[derive(Debug, Clone)]
pub struct IngressFeed {
    shared: Arc<IngressShared>,
}

impl IngressFeed {
    /// Append a line event to the timeline.
    pub fn push_line(&self, samples: Vec<u8>) {
        self.push(FeedEvent::Line(samples));
    }

    /// Append a frame-sync pulse to the timeline.
    pub fn push_frame_sync(&self) {
        self.push(FeedEvent::FrameSync);
    }

    /// Append any event to the timeline.
    pub fn push(&self, event: FeedEvent) {
        let mut state = self.shared.state.lock().unwrap();
        state.queue.push_back(event);
        drop(state);
        self.shared.notify.notify_waiters();
    }

    /// Close the timeline; once drained, both collaborators report
    /// [`LinkError::Closed`].
    pub fn close(&self) {
        self.shared.state.lock().unwrap().closed = true;
        self.shared.notify.notify_waiters();
    }
}

/// Mock [`LineSource`] half of an ingress timeline.
#[derive(Debug)]
pub struct MockLineSource {
    shared: Arc<IngressShared>,
}

/// Mock [`SyncDetector`] half of an ingress timeline.
#[derive(Debug)]
pub struct MockSyncDetector {
    shared: Arc<IngressShared>,
}

/// Create a connected feed/source/detector triple with an empty timeline.
pub fn ingress() -> (IngressFeed, MockLineSource, MockSyncDetector) {
    let shared = Arc::new(IngressShared {
        state: Mutex::new(IngressState::default()),
        notify: Notify::new(),
    });
    (
        IngressFeed {
            shared: Arc::clone(&shared),
        },
        MockLineSource {
            shared: Arc::clone(&shared),
        },
        MockSyncDetector { shared },
    )
}

/// Create an ingress pre-loaded with `events` and already closed.
pub fn scripted_ingress(
    events: impl IntoIterator<Item = FeedEvent>,
) -> (MockLineSource, MockSyncDetector) {
    let (feed, source, detector) = ingress();
    for event in events {
        feed.push(event);
    }
    feed.close();
    (source, detector)
}

/// Wait until `ready` says the front of the timeline is ours.
///
/// Returns `Err(Closed)` once the timeline is drained and closed. The
/// wait is cancel-safe: nothing is consumed until the caller follows up
/// (`read_line` pops, `await_frame_sync` pops inline).
async fn await_front(
    shared: &IngressShared,
    ready: impl Fn(&FeedEvent) -> bool,
) -> Result<(), LinkError> {
    loop {
        let notified = shared.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        {
            let state = shared.state.lock().unwrap();
            match state.queue.front() {
                Some(event) if ready(event) => return Ok(()),
                Some(_) => {}
                None if state.closed => return Err(LinkError::Closed),
                None => {}
            }
        }
        notified.await;
    }
}

#[async_trait]
impl LineSource for MockLineSource {
    async fn await_line_ready(&mut self) -> Result<(), LinkError> {
        await_front(&self.shared, |e| matches!(e, FeedEvent::Line(_))).await
    }

    async fn read_line(&mut self, line: &mut LineBuffer) -> Result<(), LinkError> {
        let samples = {
            let mut state = self.shared.state.lock().unwrap();
            let front_is_line = matches!(state.queue.front(), Some(FeedEvent::Line(_)));
            if !front_is_line {
                return Err(LinkError::Source("read_line without a pending line".into()));
            }
            let Some(FeedEvent::Line(samples)) = state.queue.pop_front() else {
                return Err(LinkError::Source("read_line without a pending line".into()));
            };
            samples
        };
        self.shared.notify.notify_waiters();
        line.copy_from(&samples)
    }
}

#[async_trait]
impl SyncDetector for MockSyncDetector {
    async fn await_frame_sync(&mut self) -> Result<(), LinkError> {
        await_front(&self.shared, |e| matches!(e, FeedEvent::FrameSync)).await?;
        let mut state = self.shared.state.lock().unwrap();
        // Still at the front: only this detector consumes sync pulses.
        state.queue.pop_front();
        drop(state);
        self.shared.notify.notify_waiters();
        Ok(())
    }
}

/// Mock [`LineSink`] that records everything it is handed, optionally
/// forwarding each emission into another ingress (software loopback).
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<FeedEvent>>>,
    forward: Option<IngressFeed>,
}

impl CollectingSink {
    /// New sink that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// New sink that records and forwards into `feed`.
    pub fn forwarding_to(feed: IngressFeed) -> Self {
        Self {
            events: Arc::default(),
            forward: Some(feed),
        }
    }

    /// Everything written so far, in emission order.
    pub fn events(&self) -> Vec<FeedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Just the line payloads, in emission order.
    pub fn lines(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FeedEvent::Line(samples) => Some(samples),
                FeedEvent::FrameSync => None,
            })
            .collect()
    }
}

#[async_trait]
impl LineSink for CollectingSink {
    async fn write_line(&mut self, line: &LineBuffer) -> Result<(), LinkError> {
        let samples = line.as_slice().to_vec();
        self.events
            .lock()
            .unwrap()
            .push(FeedEvent::Line(samples.clone()));
        if let Some(feed) = &self.forward {
            feed.push_line(samples);
        }
        Ok(())
    }

    async fn write_frame_sync_marker(&mut self) -> Result<(), LinkError> {
        self.events.lock().unwrap().push(FeedEvent::FrameSync);
        if let Some(feed) = &self.forward {
            feed.push_frame_sync();
        }
        Ok(())
    }
}
