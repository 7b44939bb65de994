// src/frame.rs

//! The framebuffer: a fixed-size 2D grid of colour tuples.
//!
//! Cells are stored row-major (`x + y * width`) with the origin at the
//! top-left corner. Dimensions are fixed at creation; every access is
//! bounds-checked. The buffer itself provides no synchronisation - callers
//! that share one across threads must guarantee non-overlapping writes.

use crate::color::Color;
use crate::error::FrameError;

/// A `width x height` grid of colour tuples.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Box<[Color]>,
}

impl Framebuffer {
    /// Creates a framebuffer with every cell initialised to opaque black.
    ///
    /// Fails with [`FrameError::Allocation`] if the backing store cannot be
    /// obtained; no partial buffer is ever returned.
    pub fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        let len = width as usize * height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| FrameError::Allocation { width, height })?;
        data.resize(len, Color::BLACK);
        Ok(Framebuffer {
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` lies inside the buffer. The validate-only variant
    /// of [`read`](Self::read).
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Result<usize, FrameError> {
        if self.contains(x, y) {
            Ok(x as usize + y as usize * self.width as usize)
        } else {
            Err(FrameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Stores a colour at `(x, y)`. Last writer wins; out-of-bounds
    /// coordinates are rejected without touching memory.
    pub fn write(&mut self, x: u32, y: u32, colour: Color) -> Result<(), FrameError> {
        let idx = self.index(x, y)?;
        self.data[idx] = colour;
        Ok(())
    }

    /// Reads the colour at `(x, y)`.
    pub fn read(&self, x: u32, y: u32) -> Result<Color, FrameError> {
        let idx = self.index(x, y)?;
        Ok(self.data[idx])
    }

    /// Copies every cell of `src` into `self`.
    ///
    /// Fails with [`FrameError::SizeMismatch`] (mutating nothing) when the
    /// dimensions differ. Copying a buffer into itself cannot be expressed:
    /// the exclusive borrow of the destination rules out aliasing.
    pub fn copy_from(&mut self, src: &Framebuffer) -> Result<(), FrameError> {
        if self.width != src.width || self.height != src.height {
            return Err(FrameError::SizeMismatch {
                dest_width: self.width,
                dest_height: self.height,
                src_width: src.width,
                src_height: src.height,
            });
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    /// The raw cells, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.data
    }
}
