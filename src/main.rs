use std::error::Error;

use clap::{Args, Parser, Subcommand};
use glam::{UVec2, Vec3};
use swirl_fluids::{FluidParams, Simulation};
use swirl_view::{RenderOptions, ViewOptions};

mod run;

#[derive(Parser)]
#[command(version, about = "Real-time 2D fluid simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open an interactive window.
    View {
        #[command(flatten)]
        sim: SimArgs,
        /// Disable dye shading.
        #[arg(long)]
        no_shading: bool,
    },
    /// Simulate without a window and report field statistics.
    Run {
        #[command(flatten)]
        sim: SimArgs,
        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,
        /// Frames per second of simulated time.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Inject a burst of random splats every this many frames. Zero injects only at the start.
        #[arg(long, default_value_t = 120)]
        splat_every: u64,
    },
}

#[derive(Args)]
struct SimArgs {
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,
    /// Viewport height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Velocity grid cells along the short axis.
    #[arg(long, default_value_t = 128)]
    sim_resolution: u32,
    /// Dye grid cells along the short axis.
    #[arg(long, default_value_t = 512)]
    dye_resolution: u32,
    /// Fraction of dye kept per step.
    #[arg(long, default_value_t = 1.0)]
    density_dissipation: f32,
    /// Fraction of velocity kept per step.
    #[arg(long, default_value_t = 0.2)]
    velocity_dissipation: f32,
    /// Pressure relaxation sweeps per step.
    #[arg(long, default_value_t = 20)]
    pressure_iterations: usize,
    /// Vorticity confinement strength.
    #[arg(long, default_value_t = 30.0)]
    curl: f32,
    /// Velocity diffusion rate.
    #[arg(long, default_value_t = 0.0)]
    viscosity: f32,
    /// Dye diffusion rate.
    #[arg(long, default_value_t = 0.0)]
    diffusion: f32,
    /// Splat radius as a fraction of the viewport.
    #[arg(long, default_value_t = 0.05)]
    splat_radius: f32,
    /// Seed for random splats and colors.
    #[arg(long)]
    seed: Option<u64>,
}

impl SimArgs {
    fn viewport(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn params(&self) -> FluidParams {
        FluidParams {
            sim_resolution: self.sim_resolution,
            dye_resolution: self.dye_resolution,
            density_dissipation: self.density_dissipation,
            velocity_dissipation: self.velocity_dissipation,
            pressure_iterations: self.pressure_iterations,
            curl: self.curl,
            viscosity: self.viscosity,
            diffusion: self.diffusion,
            splat_radius: self.splat_radius,
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::View { sim, no_shading } => {
            let simulation = Simulation::new(sim.params(), sim.viewport())?;
            let options = ViewOptions {
                size: sim.viewport(),
                render: RenderOptions {
                    shading: !no_shading,
                    background: Vec3::ZERO,
                },
                ..Default::default()
            };

            swirl_view::view(simulation, options)?;
        }
        Command::Run {
            sim,
            frames,
            fps,
            splat_every,
        } => {
            let simulation = Simulation::new(sim.params(), sim.viewport())?;
            run::run(simulation, frames, fps, splat_every)?;
        }
    }

    Ok(())
}
