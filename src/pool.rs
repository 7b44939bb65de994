// src/pool.rs

//! Shared render state and the worker thread pool.
//!
//! Workers write concurrently into the current frame, but never to the same
//! cell: the driver partitions each frame into disjoint row bands, and each
//! pixel is an [`UnsafeCell`] slot so disjoint stores need no lock. The
//! previous frame and the frame-global uniforms are mutated by the driver
//! only while the job queue is fully drained; workers read them without
//! synchronisation during the frame. That time separation is the entire
//! locking story - every unsafe block in this module leans on it.

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use log::{debug, error, trace};

use crate::color::Color;
use crate::error::FrameError;
use crate::frame::Framebuffer;
use crate::queue::{Job, JobQueue, Span};

/// Frame-global values, written by the driver between frames and visible to
/// every worker without a lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniforms {
    /// Current frame index, monotonically increasing from zero.
    pub frame: u64,
    /// Accumulated wall-clock nanoseconds at the start of this frame.
    pub clock_ns: u64,
    /// A constant random value in `[0, 1)`, fixed at process start.
    pub const_rand: f32,
}

/// The read-only view handed to every shader invocation: the uniforms plus
/// the previous frame's final state.
pub struct FrameContext<'a> {
    pub frame: u64,
    pub clock_ns: u64,
    pub const_rand: f32,
    /// The previous frame, a stable snapshot for the whole frame.
    pub previous: &'a Framebuffer,
}

/// A per-pixel colour function.
///
/// Must be a pure function of its coordinate and the context: no state may
/// be retained between invocations except through the previous-frame
/// buffer, and it is called concurrently from every worker thread. The
/// framework performs the store of the returned colour; the shader never
/// writes into a buffer itself.
pub trait Shader: Send + Sync {
    fn eval(&self, x: u32, y: u32, ctx: &FrameContext<'_>) -> Color;
}

impl<F> Shader for F
where
    F: Fn(u32, u32, &FrameContext<'_>) -> Color + Send + Sync,
{
    fn eval(&self, x: u32, y: u32, ctx: &FrameContext<'_>) -> Color {
        self(x, y, ctx)
    }
}

/// The write target for in-flight render jobs. Each cell is independently
/// mutable through a shared reference, so workers with disjoint spans can
/// store results in parallel.
struct PixelGrid {
    width: u32,
    height: u32,
    cells: Box<[UnsafeCell<Color>]>,
}

// SAFETY: concurrent access is governed by the partition discipline (no two
// jobs share a cell) and the drain barrier (the driver reads the grid only
// while no job is outstanding). Both are upheld by RenderShared's callers.
unsafe impl Sync for PixelGrid {}

impl PixelGrid {
    fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        let len = width as usize * height as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| FrameError::Allocation { width, height })?;
        cells.resize_with(len, || UnsafeCell::new(Color::BLACK));
        Ok(PixelGrid {
            width,
            height,
            cells: cells.into_boxed_slice(),
        })
    }

    /// Stores a colour at `(x, y)`.
    ///
    /// # Safety
    /// No other thread may store to the same cell or read the grid
    /// concurrently.
    unsafe fn store(&self, x: u32, y: u32, colour: Color) -> Result<(), FrameError> {
        if x >= self.width || y >= self.height {
            return Err(FrameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = x as usize + y as usize * self.width as usize;
        *self.cells[idx].get() = colour;
        Ok(())
    }

    /// Copies every cell into `dest`.
    ///
    /// # Safety
    /// No store may be in flight.
    unsafe fn copy_into(&self, dest: &mut Framebuffer) {
        debug_assert_eq!(self.width, dest.width());
        debug_assert_eq!(self.height, dest.height());
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = x as usize + y as usize * self.width as usize;
                let colour = *self.cells[idx].get();
                // In-bounds by construction; both grids share dimensions.
                let _ = dest.write(x, y, colour);
            }
        }
    }
}

/// Everything the driver and the workers share: the job queue, the current
/// frame being written, the previous frame, and the uniforms.
pub(crate) struct RenderShared {
    queue: JobQueue,
    current: PixelGrid,
    previous: UnsafeCell<Framebuffer>,
    uniforms: UnsafeCell<Uniforms>,
}

// SAFETY: `previous` and `uniforms` are written only during the quiescent
// period between frames (queue drained, no worker holds a frame context)
// and read only while a job is outstanding. The two phases never overlap.
unsafe impl Sync for RenderShared {}

impl RenderShared {
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        Ok(RenderShared {
            queue: JobQueue::new(),
            current: PixelGrid::new(width, height)?,
            previous: UnsafeCell::new(Framebuffer::new(width, height)?),
            uniforms: UnsafeCell::new(Uniforms::default()),
        })
    }

    pub(crate) fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Evaluates the shader over every coordinate of `span`, storing the
    /// results into the current frame. Called from worker threads while
    /// their job is outstanding; all borrows end before the worker reports
    /// completion.
    fn render_span(&self, span: Span, shader: &dyn Shader) {
        // SAFETY: the driver mutates uniforms and the previous frame only
        // while the queue is drained; this job is still outstanding, so
        // those writes cannot be concurrent with these reads.
        let uniforms = unsafe { *self.uniforms.get() };
        let previous = unsafe { &*self.previous.get() };
        let ctx = FrameContext {
            frame: uniforms.frame,
            clock_ns: uniforms.clock_ns,
            const_rand: uniforms.const_rand,
            previous,
        };
        for y in span.y_start..span.y_end {
            for x in span.x_start..span.x_end {
                let colour = shader.eval(x, y, &ctx);
                // SAFETY: jobs partition the frame into disjoint spans, so
                // no other worker stores to (x, y); the driver does not read
                // the grid while this job is outstanding.
                if let Err(err) = unsafe { self.current.store(x, y, colour) } {
                    // The partition keeps every job inside the frame; a miss
                    // here is a driver bug, not a shader error.
                    error!("render job wrote outside the frame: {err}");
                }
            }
        }
    }

    /// Publishes the uniforms for the next frame.
    ///
    /// # Safety
    /// The queue must be fully drained: no job outstanding, no worker
    /// holding a frame context.
    pub(crate) unsafe fn publish_uniforms(&self, uniforms: Uniforms) {
        *self.uniforms.get() = uniforms;
    }

    /// Deep-copies the current frame into the previous-frame buffer, giving
    /// the next frame's shader invocations a stable snapshot.
    ///
    /// # Safety
    /// The queue must be fully drained: no job outstanding, no worker
    /// holding a frame context.
    pub(crate) unsafe fn snapshot(&self) {
        self.current.copy_into(&mut *self.previous.get());
    }

    /// The previous-frame buffer.
    ///
    /// # Safety
    /// The queue must be fully drained for the lifetime of the returned
    /// borrow.
    pub(crate) unsafe fn previous_frame(&self) -> &Framebuffer {
        &*self.previous.get()
    }
}

/// A fixed pool of long-lived worker threads draining the shared queue.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `threads` workers, each looping over the shared queue until it
    /// dequeues a quit job.
    pub(crate) fn spawn(
        shared: &Arc<RenderShared>,
        shader: &Arc<dyn Shader>,
        threads: usize,
    ) -> anyhow::Result<Self> {
        let mut handles = Vec::with_capacity(threads);
        for i in 0..threads {
            let shared = Arc::clone(shared);
            let shader = Arc::clone(shader);
            let handle = thread::Builder::new()
                .name(format!("fragforge-worker-{i}"))
                .spawn(move || worker_main(&shared, shader.as_ref()))
                .with_context(|| format!("failed to spawn worker thread {i}"))?;
            handles.push(handle);
        }
        debug!("spawned {threads} worker threads");
        Ok(WorkerPool { handles })
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Enqueues one quit job per worker and joins every thread. The queue
    /// stays usable for the quit broadcast; nothing waits on quit jobs.
    pub(crate) fn shutdown(self, queue: &JobQueue) -> anyhow::Result<()> {
        for _ in 0..self.handles.len() {
            queue.enqueue(Job::Quit);
        }
        for handle in self.handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("a worker thread panicked"))?;
        }
        debug!("all worker threads joined");
        Ok(())
    }
}

fn worker_main(shared: &RenderShared, shader: &dyn Shader) {
    loop {
        match shared.queue().dequeue() {
            Job::Render(span) => {
                trace!(
                    "rendering span x [{}, {}) y [{}, {})",
                    span.x_start,
                    span.x_end,
                    span.y_start,
                    span.y_end
                );
                shared.render_span(span, shader);
                // Exactly one report per dequeued render job, after every
                // borrow of the shared state has ended.
                shared.queue().report_complete();
            }
            Job::Quit => {
                debug!("worker received quit job, terminating");
                break;
            }
        }
    }
}
