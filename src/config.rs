// src/config.rs

//! Render configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings consumed by the frame driver.
///
/// All counts must be at least one; [`validate`](Self::validate) enforces
/// this before any worker is spawned. Ideally `jobs` is a multiple of
/// `threads` so the bands divide evenly across the pool, but any positive
/// value works.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Framebuffer width in pixels.
    pub width: u32,
    /// Framebuffer height in pixels.
    pub height: u32,
    /// Number of worker threads to dispatch.
    pub threads: usize,
    /// Target number of render jobs per frame. Frames are split into
    /// horizontal bands, so a very short frame may yield fewer jobs.
    pub jobs: u32,
    /// Number of frames to render.
    pub frames: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 1920,
            height: 1080,
            threads: 4,
            jobs: 8,
            frames: 1,
        }
    }
}

impl RenderConfig {
    /// Checks that every dimension and count is at least one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }
        if self.jobs == 0 {
            return Err(ConfigError::Jobs);
        }
        if self.frames == 0 {
            return Err(ConfigError::Frames);
        }
        Ok(())
    }

    /// Loads a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: RenderConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}
