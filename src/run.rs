use std::error::Error;

use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use swirl_fluids::{InputEvent, Simulation};

/// Splats injected per burst.
const BURST: usize = 12;

/// Steps `sim` for `frames` frames at `fps`, injecting bursts of random splats, then logs
/// statistics of the final fields.
pub fn run(
    mut sim: Simulation,
    frames: u64,
    fps: u32,
    splat_every: u64,
) -> Result<(), Box<dyn Error>> {
    let dt = 1.0 / fps.max(1) as f32;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)?
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(frames).with_style(style);

    for frame in (0..frames).progress_with(progress) {
        let burst = match splat_every {
            0 => frame == 0,
            n => frame % n == 0,
        };
        if burst {
            sim.inject(InputEvent::RandomSplats(BURST));
        }

        sim.step(dt);
    }

    let (u, v) = sim.velocity();
    log::info!(
        "after {} frames: max dye {:.4}, max |u| {:.4}, max |v| {:.4}, max |curl| {:.4}, max |p| {:.4}",
        sim.frame(),
        sim.dye().max_channel(),
        u.max_abs(),
        v.max_abs(),
        sim.curl().max_abs(),
        sim.pressure().max_abs(),
    );

    Ok(())
}
