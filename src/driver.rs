// src/driver.rs

//! The frame driver: per-frame partitioning, the completion barrier, the
//! buffer swap, and pool shutdown.
//!
//! One driver thread and a fixed pool of workers run in parallel. Per frame
//! the driver updates the running clock, publishes the uniforms, splits the
//! framebuffer into horizontal bands, enqueues one render job per band, and
//! blocks on the queue's completion barrier. Only then - with every worker
//! quiescent - does it snapshot the finished frame into the previous-frame
//! buffer, save it, and start the next frame. After the last frame it
//! broadcasts one quit job per worker and joins them all.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use rand::Rng;

use crate::config::RenderConfig;
use crate::output::FrameOutput;
use crate::pool::{RenderShared, Shader, Uniforms, WorkerPool};
use crate::queue::{Job, Span};

/// Splits a `width x height` frame into at most `jobs` horizontal bands.
///
/// Band height is `ceil(height / jobs)`; the final band is clipped to the
/// remaining rows. The bands cover every row exactly once.
pub(crate) fn partition(width: u32, height: u32, jobs: u32) -> Vec<Span> {
    let band = height / jobs + u32::from(height % jobs != 0);
    let mut spans = Vec::new();
    let mut y = 0;
    while y < height {
        let end = height.min(y + band);
        spans.push(Span {
            x_start: 0,
            x_end: width,
            y_start: y,
            y_end: end,
        });
        y = end;
    }
    spans
}

/// Drives the render loop: owns the shared state, the worker pool, the
/// frame counter and clock, and the optional output sink.
pub struct FrameDriver {
    config: RenderConfig,
    shared: Arc<RenderShared>,
    pool: Option<WorkerPool>,
    output: Option<FrameOutput>,
    frame: u64,
    clock_ns: u64,
    const_rand: f32,
    prev_instant: Instant,
}

impl FrameDriver {
    /// Validates the configuration, allocates both framebuffers, and spawns
    /// the worker pool. Any failure here is fatal to the run; no worker is
    /// left behind.
    pub fn new(
        config: RenderConfig,
        shader: impl Shader + 'static,
        output: Option<FrameOutput>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let shared = Arc::new(RenderShared::new(config.width, config.height)?);
        let shader: Arc<dyn Shader> = Arc::new(shader);
        let pool = WorkerPool::spawn(&shared, &shader, config.threads)?;
        let const_rand = rand::thread_rng().gen();
        info!(
            "driver ready: {}x{} frame, {} workers, {} jobs/frame, {} frames",
            config.width, config.height, config.threads, config.jobs, config.frames
        );
        Ok(FrameDriver {
            config,
            shared,
            pool: Some(pool),
            output,
            frame: 0,
            clock_ns: 0,
            const_rand,
            prev_instant: Instant::now(),
        })
    }

    /// Renders every configured frame, then shuts the pool down. The quit
    /// broadcast and join run even when a frame fails, so no worker thread
    /// outlives the driver.
    pub fn run(mut self) -> anyhow::Result<()> {
        let result = self.run_frames();
        let shutdown = match self.pool.take() {
            Some(pool) => pool.shutdown(self.shared.queue()),
            None => Ok(()),
        };
        result.and(shutdown)
    }

    fn run_frames(&mut self) -> anyhow::Result<()> {
        while self.render_frame()? {}
        Ok(())
    }

    /// Renders one frame; returns whether another frame remains.
    fn render_frame(&mut self) -> anyhow::Result<bool> {
        let now = Instant::now();
        self.clock_ns += now.duration_since(self.prev_instant).as_nanos() as u64;
        self.prev_instant = now;

        // The queue is drained here (initially, or via the previous frame's
        // barrier), so no worker can observe this write mid-frame.
        unsafe {
            self.shared.publish_uniforms(Uniforms {
                frame: self.frame,
                clock_ns: self.clock_ns,
                const_rand: self.const_rand,
            });
        }

        let spans = partition(self.config.width, self.config.height, self.config.jobs);
        debug!("frame {}: enqueueing {} jobs", self.frame, spans.len());
        for span in spans {
            self.shared.queue().enqueue(Job::Render(span));
        }

        // The barrier: no swap, no save, no next frame until every job of
        // this frame has been reported done.
        self.shared.queue().wait_complete();

        // SAFETY: the barrier above drained the queue; every worker is
        // parked in dequeue with no borrow of the shared buffers.
        unsafe {
            self.shared.snapshot();
            if let Some(output) = &self.output {
                output.save_frame(self.shared.previous_frame(), self.frame)?;
            }
        }

        self.frame += 1;
        debug!("frame {} complete (clock {} ns)", self.frame - 1, self.clock_ns);
        Ok(self.frame < self.config.frames)
    }
}

/// Renders `config.frames` frames of `shader` and returns once every worker
/// has terminated. The convenience entry point over [`FrameDriver`].
pub fn render(
    config: &RenderConfig,
    shader: impl Shader + 'static,
    output: Option<FrameOutput>,
) -> anyhow::Result<()> {
    FrameDriver::new(config.clone(), shader, output)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::ConfigError;
    use crate::pool::FrameContext;
    use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
    use test_log::test;

    #[test]
    fn partition_covers_every_row_exactly_once() {
        for (height, jobs) in [(10, 4), (1, 8), (8, 8), (9, 2), (100, 7), (3, 64)] {
            let spans = partition(16, height, jobs);
            let band = height / jobs + u32::from(height % jobs != 0);
            assert!(spans.len() as u32 <= jobs, "h={height} t={jobs}");
            assert_eq!(spans.len() as u32, height / band + u32::from(height % band != 0));

            let mut expected_start = 0;
            for (i, span) in spans.iter().enumerate() {
                assert_eq!(span.x_start, 0);
                assert_eq!(span.x_end, 16);
                assert_eq!(span.y_start, expected_start, "gap or overlap at band {i}");
                if i + 1 < spans.len() {
                    assert_eq!(span.y_end - span.y_start, band);
                }
                expected_start = span.y_end;
            }
            assert_eq!(expected_start, height, "rows not fully covered");
        }
    }

    #[test]
    fn partition_band_height_is_ceiling_division() {
        // 10 rows over 4 jobs: bands of 3, 3, 3, 1.
        let spans = partition(4, 10, 4);
        let heights: Vec<u32> = spans.iter().map(|s| s.y_end - s.y_start).collect();
        assert_eq!(heights, [3, 3, 3, 1]);
    }

    struct BlackShader;

    impl Shader for BlackShader {
        fn eval(&self, _x: u32, _y: u32, _ctx: &FrameContext<'_>) -> Color {
            Color::BLACK
        }
    }

    #[test]
    fn invalid_config_is_fatal_before_spawn() {
        let config = RenderConfig { threads: 0, ..RenderConfig::default() };
        let err = FrameDriver::new(config, BlackShader, None)
            .err()
            .expect("zero threads must be rejected");
        assert_eq!(err.downcast::<ConfigError>().unwrap(), ConfigError::Threads);
    }

    struct CountingShader(AtomicUsize);

    impl Shader for CountingShader {
        fn eval(&self, _x: u32, _y: u32, _ctx: &FrameContext<'_>) -> Color {
            self.0.fetch_add(1, Ordering::Relaxed);
            Color::BLACK
        }
    }

    #[test]
    fn every_pixel_is_evaluated_once_per_frame() {
        static EVALS: AtomicUsize = AtomicUsize::new(0);

        struct TallyShader;
        impl Shader for TallyShader {
            fn eval(&self, _x: u32, _y: u32, _ctx: &FrameContext<'_>) -> Color {
                EVALS.fetch_add(1, Ordering::Relaxed);
                Color::BLACK
            }
        }

        let config = RenderConfig { width: 6, height: 5, threads: 2, jobs: 3, frames: 4 };
        render(&config, TallyShader, None).unwrap();
        assert_eq!(EVALS.load(Ordering::Relaxed), 6 * 5 * 4);
    }

    #[test]
    fn uniforms_reach_the_shader() {
        static LAST_FRAME: AtomicU64 = AtomicU64::new(0);
        static CONST_RAND_BITS: AtomicU32 = AtomicU32::new(0);

        struct UniformProbe;
        impl Shader for UniformProbe {
            fn eval(&self, _x: u32, _y: u32, ctx: &FrameContext<'_>) -> Color {
                LAST_FRAME.fetch_max(ctx.frame, Ordering::Relaxed);
                CONST_RAND_BITS.store(ctx.const_rand.to_bits(), Ordering::Relaxed);
                Color::BLACK
            }
        }

        let config = RenderConfig { width: 4, height: 4, threads: 2, jobs: 2, frames: 3 };
        render(&config, UniformProbe, None).unwrap();
        assert_eq!(LAST_FRAME.load(Ordering::Relaxed), 2);
        let const_rand = f32::from_bits(CONST_RAND_BITS.load(Ordering::Relaxed));
        assert!((0.0..1.0).contains(&const_rand));
    }

    #[test]
    fn counting_shader_via_driver_struct() {
        let config = RenderConfig { width: 8, height: 8, threads: 3, jobs: 8, frames: 1 };
        // Shader ownership moves into the pool; observe through the count
        // after the run by leaking a reference first.
        let shader = std::sync::Arc::new(CountingShader(AtomicUsize::new(0)));
        let probe = std::sync::Arc::clone(&shader);

        struct ArcShader(std::sync::Arc<CountingShader>);
        impl Shader for ArcShader {
            fn eval(&self, x: u32, y: u32, ctx: &FrameContext<'_>) -> Color {
                self.0.eval(x, y, ctx)
            }
        }

        FrameDriver::new(config, ArcShader(shader), None)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(probe.0.load(Ordering::Relaxed), 64);
    }
}
