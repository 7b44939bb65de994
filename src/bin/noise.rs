// src/bin/noise.rs

//! Hash-noise demo: greyscale noise from the classic sine-dot scramble.
//!
//! Usage: `noise [config.json]` - frames land at `./frag_<n>.png`.

use std::path::Path;

use anyhow::Result;
use log::info;

use fragforge::{render, Color, FrameContext, FrameOutput, PngSink, RenderConfig, Shader, Tuple};

/// Scrambles a coordinate into a pseudo-random value in `[0, 1)`.
fn hash_noise(x: f32, y: f32) -> f32 {
    let st = Tuple::vector(x, y, 0.0);
    let basis = Tuple::vector(12.9898, 78.233, 0.0);
    (st.dot(basis).sin() * 43758.543123).fract().abs()
}

struct NoiseShader;

impl Shader for NoiseShader {
    fn eval(&self, x: u32, y: u32, _ctx: &FrameContext<'_>) -> Color {
        let n = hash_noise(x as f32, y as f32);
        Tuple::color(n, n, n)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(Path::new(&path))?,
        None => RenderConfig {
            width: 192,
            height: 108,
            ..RenderConfig::default()
        },
    };
    info!("rendering {} noise frame(s) at {}x{}", config.frames, config.width, config.height);

    let output = FrameOutput::new("./frag", Some("png"), Box::new(PngSink))?;
    render(&config, NoiseShader, Some(output))
}
