// src/bin/uv.rs

//! UV gradient demo: each pixel's red and green channels are its normalized
//! coordinates, with a gamma correction pass.
//!
//! Usage: `uv [config.json]` - frames land at `./frag_<n>.png`.

use std::path::Path;

use anyhow::Result;
use log::info;

use fragforge::{render, Color, FrameContext, FrameOutput, PngSink, RenderConfig, Shader, Tuple};

const GAMMA: f32 = 1.7;

fn gamma_correct(c: Tuple, gamma: f32) -> Tuple {
    let recip = 1.0 / gamma;
    Tuple::new(c.x.powf(recip), c.y.powf(recip), c.z.powf(recip), c.w)
}

struct UvShader {
    width: f32,
    height: f32,
}

impl Shader for UvShader {
    fn eval(&self, x: u32, y: u32, _ctx: &FrameContext<'_>) -> Color {
        let norm = Tuple::color(x as f32 / self.width, y as f32 / self.height, 0.0);
        gamma_correct(norm, GAMMA)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(Path::new(&path))?,
        None => RenderConfig::default(),
    };
    info!("rendering {} uv frame(s) at {}x{}", config.frames, config.width, config.height);

    let shader = UvShader {
        width: config.width as f32,
        height: config.height as f32,
    };
    let output = FrameOutput::new("./frag", Some("png"), Box::new(PngSink))?;
    render(&config, shader, Some(output))
}
