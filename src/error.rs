// src/error.rs

//! Error types for the framework.
//!
//! Every failure here is non-transient: allocation failure and invalid
//! configuration are fatal, and an out-of-bounds access is a caller bug
//! surfaced as an error rather than clamped.

use thiserror::Error;

/// Errors raised by framebuffer operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("not enough memory for a {width}x{height} framebuffer")]
    Allocation { width: u32, height: u32 },
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} framebuffer")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    #[error("cannot copy a {src_width}x{src_height} framebuffer into a {dest_width}x{dest_height} one")]
    SizeMismatch {
        dest_width: u32,
        dest_height: u32,
        src_width: u32,
        src_height: u32,
    },
}

/// Startup-time configuration violations, raised before any worker is
/// spawned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("framebuffer dimensions must be at least 1x1 (got {width}x{height})")]
    Dimensions { width: u32, height: u32 },
    #[error("worker thread count must be at least 1")]
    Threads,
    #[error("per-frame job count must be at least 1")]
    Jobs,
    #[error("frame count must be at least 1")]
    Frames,
}
