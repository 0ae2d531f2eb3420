// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection worker — runs the pipeline on its own thread. The capture side
// submits frames at camera pace; the worker holds at most one waiting frame
// and a newer submission replaces it, so results never lag behind the
// preview by more than the frame currently in flight.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use kantwerk_core::error::Result;
use kantwerk_core::types::{DetectionResult, Frame, ScaledPolygon, SessionId};
use kantwerk_detect::Detector;

/// One completed pipeline run, published for the preview side.
#[derive(Debug, Clone)]
pub struct DetectionUpdate {
    /// Position in processing order, starting at 1.
    pub sequence: u64,
    /// Working-resolution result.
    pub result: DetectionResult,
    /// Frame-space boundary when a document was found.
    pub polygon: Option<ScaledPolygon>,
    /// Dimensions of the processed frame.
    pub frame_width: u32,
    pub frame_height: u32,
    /// When the frame was captured.
    pub captured_at: DateTime<Utc>,
    /// Wall-clock time the pipeline spent on this frame.
    pub latency: Duration,
}

/// Counters accumulated over the life of one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames handed to `submit` before `stop`.
    pub submitted: u64,
    /// Frames that ran through the pipeline.
    pub processed: u64,
    /// Frames replaced while still waiting for the thread.
    pub dropped: u64,
    /// Frames whose pipeline run returned an error.
    pub failed: u64,
}

#[derive(Default)]
struct WorkerState {
    pending: Option<Frame>,
    latest: Option<DetectionUpdate>,
    stats: WorkerStats,
    stopping: bool,
}

struct Shared {
    state: Mutex<WorkerState>,
    wake: Condvar,
}

/// Owns the detection thread for one capture session.
///
/// Dropping the worker stops the thread; the in-flight frame finishes, a
/// still-waiting frame is discarded.
pub struct DetectionWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    session: SessionId,
}

impl DetectionWorker {
    /// Start the processing thread around `detector`.
    #[instrument(skip_all)]
    pub fn spawn(detector: Detector) -> Result<Self> {
        let session = SessionId::new();
        let shared = Arc::new(Shared {
            state: Mutex::new(WorkerState::default()),
            wake: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("kantwerk-detect".to_string())
            .spawn(move || worker_loop(thread_shared, detector, session))?;
        info!(session = %session, "Detection worker started");
        Ok(Self {
            shared,
            handle: Some(handle),
            session,
        })
    }

    /// Session tag carried by every log line of this worker.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Hand a frame to the worker.
    ///
    /// A frame still waiting for the thread is replaced and counted as
    /// dropped; the frame already in flight is never interrupted.
    /// Submissions after `stop` are ignored.
    pub fn submit(&self, frame: Frame) {
        let mut state = self
            .shared
            .state
            .lock()
            .expect("worker state lock poisoned");
        if state.stopping {
            debug!(session = %self.session, "Submission after stop ignored");
            return;
        }
        state.stats.submitted += 1;
        if state.pending.replace(frame).is_some() {
            state.stats.dropped += 1;
        }
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Most recent completed update, if any. Newer results overwrite older
    /// ones; there is no backlog to drain.
    pub fn latest(&self) -> Option<DetectionUpdate> {
        self.shared
            .state
            .lock()
            .expect("worker state lock poisoned")
            .latest
            .clone()
    }

    /// Snapshot of the frame counters.
    pub fn stats(&self) -> WorkerStats {
        self.shared
            .state
            .lock()
            .expect("worker state lock poisoned")
            .stats
    }

    /// Ask the thread to exit after its current frame and join it.
    ///
    /// Calling `stop` again is harmless.
    #[instrument(skip(self), fields(session = %self.session))]
    pub fn stop(&mut self) {
        {
            let mut state = self
                .shared
                .state
                .lock()
                .expect("worker state lock poisoned");
            state.stopping = true;
        }
        self.shared.wake.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(session = %self.session, "Detection worker thread panicked");
            } else {
                info!(session = %self.session, "Detection worker stopped");
            }
        }
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Thread body: wait for a frame, run the pipeline, publish the update.
fn worker_loop(shared: Arc<Shared>, detector: Detector, session: SessionId) {
    let mut sequence = 0u64;
    loop {
        let frame = {
            let mut state = shared.state.lock().expect("worker state lock poisoned");
            loop {
                if state.stopping {
                    return;
                }
                if let Some(frame) = state.pending.take() {
                    break frame;
                }
                state = shared
                    .wake
                    .wait(state)
                    .expect("worker state lock poisoned");
            }
        };

        let started = Instant::now();
        let outcome = detector.detect_with_mapping(&frame.view());
        let latency = started.elapsed();

        let mut state = shared.state.lock().expect("worker state lock poisoned");
        match outcome {
            Ok((result, polygon)) => {
                sequence += 1;
                state.stats.processed += 1;
                debug!(
                    session = %session,
                    sequence,
                    document = result.is_document(),
                    latency_ms = latency.as_millis() as u64,
                    "Frame processed"
                );
                state.latest = Some(DetectionUpdate {
                    sequence,
                    result,
                    polygon,
                    frame_width: frame.width,
                    frame_height: frame.height,
                    captured_at: frame.captured_at,
                    latency,
                });
            }
            Err(error) => {
                // One bad frame must not take the session down.
                state.stats.failed += 1;
                warn!(session = %session, error = %error, "Frame processing failed");
            }
        }
    }
}
