// src/bin/pixsort.rs

//! Pixel-sort demo: frame 0 seeds greyscale noise, every later frame runs
//! one pass of odd-even transposition sort down each column, reading the
//! previous frame through the context. Brighter pixels bubble upward over
//! the course of the run.
//!
//! Usage: `pixsort [config.json]` - frames land at `./sort_<n>.png`.

use std::path::Path;

use anyhow::Result;
use log::info;

use fragforge::{render, Color, FrameContext, FrameOutput, PngSink, RenderConfig, Shader, Tuple};

fn hash_noise(x: f32, y: f32, salt: f32) -> f32 {
    let st = Tuple::vector(x + salt, y - salt, 0.0);
    let basis = Tuple::vector(12.9898, 78.233, 0.0);
    (st.dot(basis).sin() * 43758.543123).fract().abs()
}

/// Greyscale brightness used for the sort comparison.
fn brightness(c: Color) -> f32 {
    (c.x + c.y + c.z) / 3.0
}

struct PixSortShader;

impl Shader for PixSortShader {
    fn eval(&self, x: u32, y: u32, ctx: &FrameContext<'_>) -> Color {
        if ctx.frame == 0 {
            let n = hash_noise(x as f32, y as f32, ctx.const_rand);
            return Tuple::color(n, n, n);
        }

        let own = match ctx.previous.read(x, y) {
            Ok(c) => c,
            Err(_) => return Color::BLACK,
        };

        // Alternate pairings per frame: rows whose parity matches the pass
        // are the upper half of their pair and take the brighter pixel;
        // their partners take the dimmer one. Edge rows without a partner
        // keep their own pixel.
        let upper_parity = ((ctx.frame + 1) % 2) as u32;
        let (partner, take_max) = if y % 2 == upper_parity {
            (y.checked_add(1), true)
        } else {
            (y.checked_sub(1), false)
        };

        let other = match partner.and_then(|py| ctx.previous.read(x, py).ok()) {
            Some(c) => c,
            None => return own,
        };

        let swap = if take_max {
            brightness(own) < brightness(other)
        } else {
            brightness(other) <= brightness(own)
        };
        if swap {
            other
        } else {
            own
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(Path::new(&path))?,
        None => RenderConfig {
            width: 192,
            height: 108,
            frames: 240,
            ..RenderConfig::default()
        },
    };
    info!(
        "rendering {} pixel-sort frame(s) at {}x{}",
        config.frames, config.width, config.height
    );

    let output = FrameOutput::new("./sort", Some("png"), Box::new(PngSink))?;
    render(&config, PixSortShader, Some(output))
}
