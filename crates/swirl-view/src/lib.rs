use std::time::Instant;

use glam::{UVec2, Vec2};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rand::Rng;
use swirl_fluids::{InputEvent, PointerEvent, Simulation, SimulationError};
use thiserror::Error;

pub mod render;

pub use render::{render, RenderOptions};

/// Pointer id used for the mouse.
const MOUSE: i64 = 0;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Window(#[from] minifb::Error),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("pixel buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub title: String,
    /// Initial window size in pixels.
    pub size: UVec2,
    pub fps: usize,
    pub render: RenderOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            title: String::from("swirl"),
            size: UVec2::new(1280, 720),
            fps: 60,
            render: RenderOptions::default(),
        }
    }
}

/// Number of splats in a burst of random splats.
fn burst_size<R: Rng>(rng: &mut R) -> usize {
    rng.random_range(5..25)
}

/// Resizes `sim` and `buffer` to `target`, updating `size` on success. A failed resize leaves
/// the simulation intact, so the view keeps running at the old size.
fn resize_view(
    sim: &mut Simulation,
    buffer: &mut Vec<u32>,
    size: &mut (usize, usize),
    target: (usize, usize),
) -> bool {
    let (w, h) = target;
    match sim.resize(UVec2::new(w as u32, h as u32)) {
        Ok(()) => {
            *size = target;
            buffer.resize(w * h, 0);
            true
        }
        Err(err) => {
            log::warn!("failed to resize to {w}x{h}, keeping {}x{}: {err}", size.0, size.1);
            false
        }
    }
}

/// Opens a window and runs `sim` interactively until the window is closed or Escape is pressed.
///
/// Dragging with the left mouse button stirs the fluid, `P` toggles pause and `Space` injects a
/// burst of random splats.
pub fn view(mut sim: Simulation, options: ViewOptions) -> Result<(), ViewError> {
    let (mut width, mut height) = (options.size.x as usize, options.size.y as usize);

    let mut window = Window::new(
        &options.title,
        width,
        height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(options.fps);

    sim.resize(UVec2::new(width as u32, height as u32))?;

    let mut buffer = vec![0u32; width * height];
    let mut rng = rand::rng();
    let mut pointer_down = false;
    // Window size whose resize last failed, retried only once the window changes again.
    let mut failed_size = None;
    let mut last_frame = Instant::now();

    sim.inject(InputEvent::RandomSplats(burst_size(&mut rng)));

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let (w, h) = window.get_size();
        if w > 0 && h > 0 && (w, h) != (width, height) && Some((w, h)) != failed_size {
            let mut size = (width, height);
            failed_size = if resize_view(&mut sim, &mut buffer, &mut size, (w, h)) {
                None
            } else {
                Some((w, h))
            };
            (width, height) = size;
        }

        if window.is_key_pressed(Key::P, KeyRepeat::No) {
            let paused = sim.toggle_paused();
            log::info!("{}", if paused { "paused" } else { "resumed" });
        }
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            sim.inject(InputEvent::RandomSplats(burst_size(&mut rng)));
        }

        // Window coordinates grow downwards, the grid grows upwards.
        let position = window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Vec2::new(x / width as f32, 1.0 - y / height as f32));

        match (window.get_mouse_down(MouseButton::Left), position) {
            (true, Some(p)) if pointer_down => sim.inject(PointerEvent::moved(MOUSE, p)),
            (true, Some(p)) => {
                sim.inject(PointerEvent::down(MOUSE, p));
                pointer_down = true;
            }
            (false, _) if pointer_down => {
                sim.inject(PointerEvent::up(MOUSE));
                pointer_down = false;
            }
            _ => {}
        }

        let now = Instant::now();
        sim.step((now - last_frame).as_secs_f32());
        last_frame = now;

        render(sim.dye(), &mut buffer, width, height, &options.render)?;
        window.update_with_buffer(&buffer, width, height)?;
    }

    log::info!("closed viewer after {} frames", sim.frame());
    Ok(())
}
