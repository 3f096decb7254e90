use glam::{UVec2, Vec3};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    boundary::Boundary,
    error::SimulationError,
    field::Field,
    grid::Grid,
    input::{EventQueue, InputEvent, PointerTracker},
    params::{FluidParams, Resolution},
    solver::{advect, advect_velocity, compute_curl, confine, diffuse, project, warm_start},
    splat::Splat,
};

/// A 2D incompressible fluid carrying dye, advanced one frame at a time.
///
/// Input is queued with [`inject`](Self::inject) and applied at the start of the next
/// [`step`](Self::step). Fields may be read freely between steps.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: FluidParams,
    /// Viewport size in pixels, used for grid proportions and splat shapes.
    viewport: UVec2,
    grid: Grid,
    pointers: PointerTracker,
    events: EventQueue,
    rng: StdRng,
    /// Advances towards 1, at which point pointers are recolored.
    color_timer: f32,
    /// Steps taken since creation.
    frame: u64,
}

impl Simulation {
    pub fn new(params: FluidParams, viewport: UVec2) -> Result<Self, SimulationError> {
        params.validate()?;
        check_viewport(viewport)?;

        let (sim, dye) = resolutions(&params, viewport);
        let grid = Grid::new(sim, dye)?;

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        log::info!(
            "created simulation for {}x{} viewport: velocity {}x{}, dye {}x{}",
            viewport.x,
            viewport.y,
            sim.width,
            sim.height,
            dye.width,
            dye.height,
        );

        Ok(Self {
            events: EventQueue::new(params.event_capacity),
            params,
            viewport,
            grid,
            pointers: PointerTracker::new(),
            rng,
            color_timer: 0.0,
            frame: 0,
        })
    }

    /// Queues an input event for the next step. The oldest pending event is dropped when the queue
    /// is full. Each step applies at most one [`InputEvent::RandomSplats`] burst, clamped to
    /// `max_random_splats`.
    pub fn inject(&mut self, event: impl Into<InputEvent>) {
        if let Some(dropped) = self.events.push(event.into()) {
            log::warn!("input queue full, dropping {dropped:?}");
        }
    }

    /// Applies a splat immediately. Non-finite splats are discarded and the velocity is clamped to
    /// `max_splat_velocity`.
    pub fn splat(&mut self, splat: Splat) {
        if !splat.is_finite() {
            log::warn!("dropping non-finite splat {splat:?}");
            return;
        }

        let max = self.params.max_splat_velocity;
        let mut splat = splat;
        if splat.velocity.length_squared() > max * max {
            log::debug!("clamping splat velocity {} to {max}", splat.velocity);
            splat.velocity = splat.velocity.clamp_length_max(max);
        }

        self.grid
            .apply_splat(&splat, self.params.splat_radius, self.aspect());
    }

    /// Advances the simulation by `dt`, clamped to `[0, max_dt]`.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.params.max_dt)
        } else {
            log::warn!("non-finite timestep {dt}, using 0");
            0.0
        };

        self.update_colors(dt);
        self.apply_inputs();

        if !self.params.paused {
            self.advance(dt);
        }

        self.frame += 1;

        if self.params.reset_on_non_finite && !self.grid.is_finite() {
            log::error!(
                "non-finite values in fluid fields at frame {}, resetting",
                self.frame,
            );
            self.grid.reset();
        }
    }

    fn update_colors(&mut self, dt: f32) {
        if !self.params.colorful {
            return;
        }

        self.color_timer += dt * self.params.color_update_speed;
        if self.color_timer >= 1.0 {
            self.color_timer = 0.0;
            self.pointers.recolor(&mut self.rng);
        }
    }

    fn apply_inputs(&mut self) {
        let aspect = self.aspect();
        let events: Vec<_> = self.events.drain().collect();

        // One burst per step; later bursts wait for the following steps.
        let mut burst = None;
        let mut deferred = Vec::new();
        for event in events {
            match event {
                InputEvent::Pointer(pointer) => {
                    self.pointers.handle(&pointer, aspect, &mut self.rng);
                }
                InputEvent::RandomSplats(count) if burst.is_none() => burst = Some(count),
                InputEvent::RandomSplats(_) => deferred.push(event),
            }
        }

        // The queue was just drained and `deferred` came out of it, so nothing is evicted.
        for event in deferred {
            self.events.push(event);
        }

        if let Some(count) = burst {
            let max = self.params.max_random_splats;
            if count > max {
                log::warn!("clamping burst of {count} random splats to {max}");
            }

            let count = count.min(max);
            log::debug!("injecting {count} random splats");
            for _ in 0..count {
                let splat = Splat::random(&mut self.rng);
                self.splat(splat);
            }
        }

        for splat in self.pointers.take_splats(self.params.splat_force) {
            self.splat(splat);
        }
    }

    fn advance(&mut self, dt: f32) {
        let params = &self.params;
        let Grid {
            u,
            v,
            dye,
            pressure,
            divergence,
            curl,
        } = &mut self.grid;

        if params.viscosity > 0.0 {
            let iterations = params.diffusion_iterations;
            diffuse(u, Boundary::VelocityX, params.viscosity, dt, iterations);
            diffuse(v, Boundary::VelocityY, params.viscosity, dt, iterations);
        }

        compute_curl(curl, u.read(), v.read());
        confine(u, v, curl, params.curl, dt);

        warm_start(pressure, params.pressure_retention);
        project(u, v, pressure, divergence, params.pressure_iterations);

        advect_velocity(u, v, dt, params.velocity_dissipation);

        if params.diffusion > 0.0 {
            diffuse(
                dye,
                Boundary::Scalar,
                params.diffusion,
                dt,
                params.diffusion_iterations,
            );
        }

        let (source, target) = dye.split();
        advect(
            target,
            source,
            u.read(),
            v.read(),
            dt,
            params.density_dissipation,
            Boundary::Scalar,
        );
        dye.swap();
    }

    /// Changes the viewport, resampling the fields to the derived resolutions. On error the
    /// simulation is unchanged.
    pub fn resize(&mut self, viewport: UVec2) -> Result<(), SimulationError> {
        check_viewport(viewport)?;
        if viewport == self.viewport {
            return Ok(());
        }

        let (sim, dye) = resolutions(&self.params, viewport);
        self.grid.resize(sim, dye)?;
        self.viewport = viewport;

        Ok(())
    }

    /// Replaces the parameters, resizing the grid when a resolution changed. On error the
    /// simulation is unchanged.
    pub fn set_params(&mut self, params: FluidParams) -> Result<(), SimulationError> {
        params.validate()?;

        let (sim, dye) = resolutions(&params, self.viewport);
        self.grid.resize(sim, dye)?;

        if params.seed != self.params.seed {
            if let Some(seed) = params.seed {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }

        self.events.set_capacity(params.event_capacity);
        self.params = params;

        Ok(())
    }

    /// Zeroes every field and forgets all pointers and pending input.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.pointers.clear();
        self.events.clear();
        self.color_timer = 0.0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.params.paused = paused;
    }

    pub fn toggle_paused(&mut self) -> bool {
        self.params.paused = !self.params.paused;
        self.params.paused
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.params.paused
    }

    /// Viewport width over height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.viewport.x as f32 / self.viewport.y as f32
    }

    pub fn dye(&self) -> &Field<Vec3> {
        self.grid.dye()
    }

    pub fn velocity(&self) -> (&Field<f32>, &Field<f32>) {
        self.grid.velocity()
    }

    pub fn pressure(&self) -> &Field<f32> {
        self.grid.pressure()
    }

    pub fn curl(&self) -> &Field<f32> {
        self.grid.curl()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct access to the fields between steps.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn pointers(&self) -> &PointerTracker {
        &self.pointers
    }

    /// Number of queued events not yet applied.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

fn check_viewport(viewport: UVec2) -> Result<(), SimulationError> {
    if viewport.x == 0 || viewport.y == 0 {
        return Err(SimulationError::ZeroViewport {
            width: viewport.x,
            height: viewport.y,
        });
    }
    Ok(())
}

fn resolutions(params: &FluidParams, viewport: UVec2) -> (Resolution, Resolution) {
    (
        Resolution::from_viewport(params.sim_resolution, viewport),
        Resolution::from_viewport(params.dye_resolution, viewport),
    )
}
