// src/output.rs

//! Saving finished frames to disk.
//!
//! The driver hands each completed frame to a [`FrameSink`] through a
//! [`FrameOutput`], which derives the file path from a configured base path,
//! the frame index, and an optional extension: frame `N` of base `./frag`
//! with extension `png` lands at `./frag_N.png`.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::frame::Framebuffer;

/// Writes a framebuffer to a file in some image format.
pub trait FrameSink: Send {
    fn save(&self, path: &Path, frame: &Framebuffer) -> anyhow::Result<()>;
}

/// Where and how each frame is saved.
pub struct FrameOutput {
    base: PathBuf,
    ext: Option<String>,
    sink: Box<dyn FrameSink>,
}

impl FrameOutput {
    /// Creates an output configuration, checking up front that the directory
    /// containing `base` exists. Catching a bad path here beats discovering
    /// it after an hour of rendering.
    pub fn new(
        base: impl Into<PathBuf>,
        ext: Option<&str>,
        sink: Box<dyn FrameSink>,
    ) -> anyhow::Result<Self> {
        let base = base.into();
        let dir = match base.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        anyhow::ensure!(
            dir.is_dir(),
            "output directory {} does not exist",
            dir.display()
        );
        Ok(FrameOutput {
            base,
            ext: ext.map(str::to_owned),
            sink,
        })
    }

    /// The full path for frame `index`: `<base>_<index>[.<ext>]`.
    pub(crate) fn frame_path(&self, index: u64) -> PathBuf {
        let mut name = self.base.as_os_str().to_os_string();
        name.push(format!("_{index}"));
        if let Some(ext) = &self.ext {
            name.push(".");
            name.push(ext);
        }
        PathBuf::from(name)
    }

    /// Saves `frame` as frame number `index` through the configured sink.
    pub(crate) fn save_frame(&self, frame: &Framebuffer, index: u64) -> anyhow::Result<()> {
        let path = self.frame_path(index);
        self.sink
            .save(&path, frame)
            .with_context(|| format!("failed to save frame {index} to {}", path.display()))?;
        info!("saved frame {index} to {}", path.display());
        Ok(())
    }
}

/// Saves frames as 8-bit RGBA PNG files. Channels are clamped to `[0, 1]`
/// and scaled to `0..=255`.
pub struct PngSink;

impl FrameSink for PngSink {
    fn save(&self, path: &Path, frame: &Framebuffer) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("cannot open {} for writing", path.display()))?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width(), frame.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().context("failed to write PNG header")?;

        let mut bytes = Vec::with_capacity(frame.pixels().len() * 4);
        for pixel in frame.pixels() {
            bytes.push(channel_to_byte(pixel.x));
            bytes.push(channel_to_byte(pixel.y));
            bytes.push(channel_to_byte(pixel.z));
            bytes.push(channel_to_byte(pixel.w));
        }
        writer
            .write_image_data(&bytes)
            .context("failed to write PNG image data")?;
        Ok(())
    }
}

#[inline]
fn channel_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
