// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Render: off-thread rasterization with generation-checked delivery.
//!
//! ## Overview
//!
//! [`RenderScheduler`] owns a single worker thread that rasterizes
//! [`SceneDocument`]s one job at a time. The interactive context submits a
//! document and later polls for the outcome; the worker never touches widget
//! state. Every submission bumps a monotonically increasing *generation*, and a
//! job's result is delivered only while its generation is still current:
//!
//! - submitting a new document supersedes any outstanding job (even a
//!   resubmission of the same document instance — last write wins);
//! - a superseded job is never interrupted mid-paint, only its result is
//!   discarded, silently;
//! - the generation counter is the sole cross-thread signal: the interactive
//!   side increments it, the worker reads it once per decision point. No locks.
//!
//! Delivery happens on whichever thread calls [`RenderScheduler::poll`] — by
//! contract the interactive one — so the displayed image can be swapped without
//! races or tearing: at most one outcome per job, and never one for a stale
//! generation.
//!
//! ## Minimal example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use canopy_render::{RenderOutcome, RenderScheduler};
//! use canopy_scene::{RenderError, SceneDocument, Surface};
//! use kurbo::{Point, Size};
//!
//! struct Blank;
//!
//! impl SceneDocument for Blank {
//!     type Object = u32;
//!     fn size(&self) -> Size {
//!         Size::new(8.0, 8.0)
//!     }
//!     fn objects_at(&self, _point: Point) -> Vec<u32> {
//!         Vec::new()
//!     }
//!     fn render(&self, surface: &mut Surface) -> Result<(), RenderError> {
//!         surface.data_mut().fill(0xFF);
//!         Ok(())
//!     }
//! }
//!
//! let mut scheduler = RenderScheduler::default();
//! let generation = scheduler.submit(Arc::new(Blank));
//! let outcome = scheduler.poll_timeout(Duration::from_secs(5)).unwrap();
//! match outcome {
//!     RenderOutcome::Completed { generation: g, surface } => {
//!         assert_eq!(g, generation);
//!         assert_eq!(surface.width(), 8);
//!     }
//!     RenderOutcome::Failed { error, .. } => panic!("render failed: {error}"),
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use canopy_scene::{BufferAllocator, RenderError, SceneDocument, Surface, SurfaceAllocator};
use crossbeam_channel::{Receiver, Sender};
use kurbo::Size;

/// Lifecycle of one rasterization attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Queued for the worker, not yet picked up.
    Pending,
    /// The worker is painting it.
    Running,
    /// A newer submission replaced it; its result, if any, is discarded.
    Superseded,
    /// Its surface was delivered through [`RenderScheduler::poll`].
    Completed,
    /// It failed; the error was delivered through [`RenderScheduler::poll`].
    Failed,
}

/// Outcome of the current render job, as observed by the interactive thread.
///
/// Only the most recent generation's outcome is ever produced; superseded
/// jobs vanish without a trace (spec'd "last write wins").
#[derive(Debug)]
pub enum RenderOutcome {
    /// Rasterization finished; the surface is ready to swap in.
    Completed {
        /// Generation of the job that produced the surface.
        generation: u64,
        /// The finished raster.
        surface: Surface,
    },
    /// Rasterization failed. The previously displayed image, if any, should
    /// stay untouched; retry is the consumer's call.
    Failed {
        /// Generation of the failed job.
        generation: u64,
        /// What went wrong.
        error: RenderError,
    },
}

/// One unit of work for the render worker: a document snapshot and the
/// generation it was submitted under.
struct RenderJob<D> {
    generation: u64,
    document: Arc<D>,
}

enum WorkerMessage {
    Started(u64),
    Finished {
        generation: u64,
        result: Result<Surface, RenderError>,
    },
}

/// Schedules at most one authoritative rasterization job at a time.
///
/// Owned and driven by the interactive thread. See the crate docs for the
/// concurrency contract.
pub struct RenderScheduler<D, A = BufferAllocator>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    /// Shared with the worker; the only cross-thread signal.
    generation: Arc<AtomicU64>,
    jobs: Sender<RenderJob<D>>,
    results: Receiver<WorkerMessage>,
    /// Most recent generation handed out by `submit`; 0 before any submission.
    submitted: u64,
    /// Interactive-side view of the most recent job's state.
    current_state: Option<JobState>,
    _allocator: core::marker::PhantomData<A>,
}

impl<D, A> core::fmt::Debug for RenderScheduler<D, A>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("submitted", &self.submitted)
            .field("current_state", &self.current_state)
            .finish_non_exhaustive()
    }
}

impl<D> Default for RenderScheduler<D>
where
    D: SceneDocument + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(BufferAllocator)
    }
}

impl<D, A> RenderScheduler<D, A>
where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator + Send + 'static,
{
    /// Creates a scheduler and spawns its worker thread.
    ///
    /// The worker allocates each job's surface through `allocator` and exits
    /// when the scheduler is dropped, after finishing whatever job it is on.
    pub fn new(allocator: A) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<RenderJob<D>>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let counter = Arc::clone(&generation);
        std::thread::spawn(move || worker_loop(&job_rx, &result_tx, &counter, &allocator));
        Self {
            generation,
            jobs: job_tx,
            results: result_rx,
            submitted: 0,
            current_state: None,
            _allocator: core::marker::PhantomData,
        }
    }

    /// Submits a document for rasterization and returns its generation.
    ///
    /// Any outstanding job is immediately superseded, including one for the
    /// same document instance: there is deliberately no identity
    /// short-circuit, so repeated submissions behave as "last write wins".
    pub fn submit(&mut self, document: Arc<D>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if matches!(
            self.current_state,
            Some(JobState::Pending | JobState::Running)
        ) {
            log::trace!(
                "render generation {} superseded by {generation}",
                self.submitted
            );
        }
        self.submitted = generation;
        self.current_state = Some(JobState::Pending);
        if self.jobs.send(RenderJob {
            generation,
            document,
        })
        .is_err()
        {
            // The worker is gone; only possible if a document panicked it.
            log::error!("render worker is unavailable; generation {generation} will never finish");
            self.current_state = Some(JobState::Failed);
        }
        generation
    }

    /// Non-blocking check for the current job's outcome.
    ///
    /// Drains completion messages, silently discarding superseded results, and
    /// returns the current generation's outcome if it has arrived. Call this
    /// from the interactive thread; consumer callbacks are then invoked there,
    /// never on the worker.
    pub fn poll(&mut self) -> Option<RenderOutcome> {
        while let Ok(message) = self.results.try_recv() {
            if let Some(outcome) = self.integrate(message) {
                return Some(outcome);
            }
        }
        None
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for an outcome.
    ///
    /// Useful for hosts without a render wakeup hook, and for tests.
    pub fn poll_timeout(&mut self, timeout: Duration) -> Option<RenderOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(outcome) = self.poll() {
                return Some(outcome);
            }
            let Some(remaining) = deadline.checked_duration_since(Instant::now()).filter(|d| !d.is_zero()) else {
                return None;
            };
            match self.results.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(outcome) = self.integrate(message) {
                        return Some(outcome);
                    }
                }
                Err(_) => return None,
            }
        }
    }

    /// Generation of the most recent submission; 0 before any.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.submitted
    }

    /// Whether `generation` is still the authoritative job.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        generation != 0 && generation == self.submitted
    }

    /// State of the job submitted as `generation`, if the scheduler has seen
    /// it.
    ///
    /// Superseded predecessors all report [`JobState::Superseded`]; the
    /// scheduler keeps detailed state only for the authoritative job.
    #[must_use]
    pub fn job_state(&self, generation: u64) -> Option<JobState> {
        if generation == 0 || generation > self.submitted {
            None
        } else if generation < self.submitted {
            Some(JobState::Superseded)
        } else {
            self.current_state
        }
    }

    /// Whether the authoritative job is still pending or painting.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        matches!(
            self.current_state,
            Some(JobState::Pending | JobState::Running)
        )
    }

    fn integrate(&mut self, message: WorkerMessage) -> Option<RenderOutcome> {
        match message {
            WorkerMessage::Started(generation) => {
                if generation == self.submitted {
                    self.current_state = Some(JobState::Running);
                }
                None
            }
            WorkerMessage::Finished { generation, result } => {
                // The worker already checked once at completion; re-check here
                // because a submission may have raced the message in flight.
                if generation != self.submitted {
                    log::trace!("discarding superseded render result (generation {generation})");
                    return None;
                }
                match result {
                    Ok(surface) => {
                        self.current_state = Some(JobState::Completed);
                        Some(RenderOutcome::Completed {
                            generation,
                            surface,
                        })
                    }
                    Err(error) => {
                        self.current_state = Some(JobState::Failed);
                        Some(RenderOutcome::Failed { generation, error })
                    }
                }
            }
        }
    }
}

fn worker_loop<D, A>(
    jobs: &Receiver<RenderJob<D>>,
    results: &Sender<WorkerMessage>,
    generation: &AtomicU64,
    allocator: &A,
) where
    D: SceneDocument + Send + Sync + 'static,
    A: SurfaceAllocator,
{
    while let Ok(job) = jobs.recv() {
        // Already stale at dequeue: skip without painting at all.
        if generation.load(Ordering::Acquire) != job.generation {
            log::trace!("skipping superseded render job (generation {})", job.generation);
            continue;
        }
        if results.send(WorkerMessage::Started(job.generation)).is_err() {
            break;
        }
        let result = render_document(&*job.document, allocator);
        // One read at completion decides delivery; a stale result is dropped
        // here and never crosses back to the interactive side.
        if generation.load(Ordering::Acquire) != job.generation {
            log::trace!(
                "dropping superseded render result (generation {})",
                job.generation
            );
            continue;
        }
        let message = WorkerMessage::Finished {
            generation: job.generation,
            result,
        };
        if results.send(message).is_err() {
            break;
        }
    }
}

fn render_document<D, A>(document: &D, allocator: &A) -> Result<Surface, RenderError>
where
    D: SceneDocument,
    A: SurfaceAllocator,
{
    let size = document.size();
    let (width, height) = raster_dimensions(size)?;
    let mut surface = allocator.allocate(width, height)?;
    document.render(&mut surface)?;
    Ok(surface)
}

/// Validates document dimensions and rounds them up to whole pixels.
#[allow(
    clippy::cast_possible_truncation,
    reason = "both values are checked to be positive and at most u32::MAX"
)]
fn raster_dimensions(size: Size) -> Result<(u32, u32), RenderError> {
    let invalid = RenderError::InvalidDimensions {
        width: size.width,
        height: size.height,
    };
    if !size.width.is_finite() || !size.height.is_finite() {
        return Err(invalid);
    }
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(invalid);
    }
    let width = size.width.ceil();
    let height = size.height.ceil();
    if width > f64::from(u32::MAX) || height > f64::from(u32::MAX) {
        return Err(invalid);
    }
    Ok((width as u32, height as u32))
}
