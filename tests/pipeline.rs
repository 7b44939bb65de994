// tests/pipeline.rs

//! End-to-end pipeline tests: a full render through the public API, with a
//! capturing sink standing in for the PNG encoder.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use test_log::test;

use fragforge::{
    render, Color, Framebuffer, FrameContext, FrameOutput, FrameSink, RenderConfig, Shader, Tuple,
};

/// Records every saved frame instead of encoding it.
struct CaptureSink(Arc<Mutex<Vec<(PathBuf, Framebuffer)>>>);

impl FrameSink for CaptureSink {
    fn save(&self, path: &Path, frame: &Framebuffer) -> anyhow::Result<()> {
        self.0.lock().unwrap().push((path.to_path_buf(), frame.clone()));
        Ok(())
    }
}

fn gradient(x: u32, y: u32) -> Color {
    Tuple::color(x as f32 / 10.0, y as f32 / 10.0, 0.0)
}

/// Frame 0 writes a gradient; frame 1 checks that the previous-frame buffer
/// is exactly frame 0's output and echoes it forward.
struct GradientThenEcho {
    mismatch: Arc<AtomicBool>,
}

impl Shader for GradientThenEcho {
    fn eval(&self, x: u32, y: u32, ctx: &FrameContext<'_>) -> Color {
        if ctx.frame == 0 {
            return gradient(x, y);
        }
        let previous = ctx.previous.read(x, y).unwrap();
        if previous != gradient(x, y) {
            self.mismatch.store(true, Ordering::SeqCst);
        }
        previous
    }
}

#[test]
fn full_render_produces_exact_pixels_and_stable_snapshots() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let mismatch = Arc::new(AtomicBool::new(false));

    let base = std::env::temp_dir().join("fragforge_pipeline_e2e");
    let output = FrameOutput::new(
        &base,
        Some("png"),
        Box::new(CaptureSink(Arc::clone(&captured))),
    )
    .unwrap();

    let config = RenderConfig { width: 10, height: 10, threads: 2, jobs: 4, frames: 2 };
    render(
        &config,
        GradientThenEcho { mismatch: Arc::clone(&mismatch) },
        Some(output),
    )
    .unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 2, "one save per frame");

    // Derived paths carry the base, the frame index, and the extension.
    let mut expected_0 = base.as_os_str().to_os_string();
    expected_0.push("_0.png");
    assert_eq!(captured[0].0, PathBuf::from(expected_0));

    // Frame 0: every output cell is exactly the shader's value.
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(captured[0].1.read(x, y).unwrap(), gradient(x, y), "cell ({x}, {y})");
        }
    }

    // Frame 1 saw frame 0's final state through the previous-frame buffer.
    assert!(!mismatch.load(Ordering::SeqCst), "previous-frame snapshot drifted");

    // And echoed it forward unchanged.
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(captured[1].1.read(x, y).unwrap(), captured[0].1.read(x, y).unwrap());
        }
    }
}

struct BlackShader;

impl Shader for BlackShader {
    fn eval(&self, _x: u32, _y: u32, _ctx: &FrameContext<'_>) -> Color {
        Color::BLACK
    }
}

#[test]
fn short_frames_yield_fewer_jobs_than_requested() {
    // Height 3 with 64 requested jobs: at most one band per row.
    let config = RenderConfig { width: 16, height: 3, threads: 4, jobs: 64, frames: 2 };
    render(&config, BlackShader, None).unwrap();
}

#[test]
fn more_threads_than_jobs_still_drains() {
    let config = RenderConfig { width: 8, height: 8, threads: 8, jobs: 1, frames: 3 };
    render(&config, BlackShader, None).unwrap();
}

#[test]
fn single_threaded_run_completes() {
    let config = RenderConfig { width: 32, height: 16, threads: 1, jobs: 8, frames: 2 };
    render(&config, BlackShader, None).unwrap();
}
