//! fragforge - a multithreaded CPU fragment-shader framework.
//!
//! A user supplies a [`Shader`]: a pure function from pixel coordinates (plus
//! read-only access to the previous frame and a few frame-global uniforms) to
//! a colour. The framework evaluates it over every pixel of a fixed-size
//! framebuffer, frame after frame, on a pool of long-lived worker threads.
//!
//! Per frame, the driver splits the framebuffer into horizontal bands, pushes
//! one render job per band onto a shared FIFO [`queue::JobQueue`], blocks
//! until every job has been reported complete, snapshots the finished frame
//! into the previous-frame buffer, and optionally saves it through a
//! [`FrameSink`]. Workers drain the queue until they receive a quit job.
//!
//! ```no_run
//! use fragforge::{render, Color, FrameContext, RenderConfig, Shader};
//!
//! struct Gradient;
//!
//! impl Shader for Gradient {
//!     fn eval(&self, x: u32, y: u32, _ctx: &FrameContext<'_>) -> Color {
//!         Color::color(x as f32 / 1920.0, y as f32 / 1080.0, 0.0)
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     render(&RenderConfig::default(), Gradient, None)
//! }
//! ```

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod output;
pub mod pool;
pub mod queue;

pub use color::{Color, Tuple};
pub use config::RenderConfig;
pub use driver::{render, FrameDriver};
pub use error::{ConfigError, FrameError};
pub use frame::Framebuffer;
pub use output::{FrameOutput, FrameSink, PngSink};
pub use pool::{FrameContext, Shader, Uniforms};
pub use queue::{Job, JobQueue, Span};
