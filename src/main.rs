use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

mod physics;
mod rendering;
mod scene;

use physics::constants::{DEFAULT_ORBIT_K, DEFAULT_PHI_STEP, MAX_INTEGRATION_STEPS};
use physics::Vec3;
use rendering::{render, ProgressFn, RenderStats, SkyTexture};
use scene::Scene;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Gravitational lensing renderer: backward geodesic ray tracing around a compact mass"
)]
struct Cli {
    #[arg(long, default_value_t = 200)]
    width: u32,
    #[arg(long, default_value_t = 200)]
    height: u32,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 60.0)]
    fov_deg: f64,
    /// Black hole position in camera coordinates "x,y,z"
    /// (the camera sits at the origin looking down -Z).
    #[arg(long, default_value = "0,0,-30", value_parser = parse_vec3)]
    black_hole: Vec3,
    /// Relativistic correction constant of the orbit equation.
    #[arg(long, default_value_t = DEFAULT_ORBIT_K)]
    orbit_k: f64,
    /// Orbital angle step in radians.
    #[arg(long, default_value_t = DEFAULT_PHI_STEP)]
    phi_step: f64,
    /// Per-ray integration step cap.
    #[arg(long, default_value_t = MAX_INTEGRATION_STEPS)]
    max_steps: usize,
    /// Equirectangular sky texture.
    #[arg(long, default_value = "textures/sky_bg.jpg")]
    sky: String,
    #[arg(long, default_value = "blackhole.png")]
    output: String,
    /// Write a JSON render report (configuration echo + tallies) here.
    #[arg(long)]
    report: Option<String>,
    /// Suppress the progress/ETA line.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected \"x,y,z\", got {s:?}"));
    }
    let mut v = [0.0f64; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad component {part:?}: {e}"))?;
    }
    Ok(Vec3::new(v[0], v[1], v[2]))
}

#[derive(Serialize)]
struct RenderReport<'a> {
    config: ConfigEcho<'a>,
    stats: &'a RenderStats,
}

#[derive(Serialize)]
struct ConfigEcho<'a> {
    width: u32,
    height: u32,
    fov_deg: f64,
    black_hole: [f64; 3],
    orbit_k: f64,
    phi_step: f64,
    max_steps: usize,
    sky: &'a str,
    output: &'a str,
}

fn write_report(path: &str, cli: &Cli, stats: &RenderStats) -> Result<()> {
    let report = RenderReport {
        config: ConfigEcho {
            width: cli.width,
            height: cli.height,
            fov_deg: cli.fov_deg,
            black_hole: [cli.black_hole.x, cli.black_hole.y, cli.black_hole.z],
            orbit_k: cli.orbit_k,
            phi_step: cli.phi_step,
            max_steps: cli.max_steps,
            sky: &cli.sky,
            output: &cli.output,
        },
        stats,
    };
    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("failed to write {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let scene = Scene::new(
        cli.width,
        cli.height,
        cli.fov_deg,
        cli.black_hole,
        cli.orbit_k,
        cli.phi_step,
        cli.max_steps,
    )?;
    let sky_image = image::open(&cli.sky)
        .with_context(|| format!("failed to load sky texture {}", cli.sky))?
        .to_rgb8();
    let sky = SkyTexture::from_image(&sky_image)?;
    info!(
        "camera at ({:.2}, {:.2}, {:.2}), fov {:.1} deg",
        scene.camera_pos.x,
        scene.camera_pos.y,
        scene.camera_pos.z,
        scene.fov.to_degrees()
    );
    info!(
        "sky texture {}x{}, rendering {}x{}",
        sky.width(),
        sky.height(),
        scene.width,
        scene.height
    );

    let total = u64::from(scene.width) * u64::from(scene.height);
    let stride = (total / 500).max(1);
    let started = Instant::now();
    let eta_line = move |done: u64, total: u64| {
        if done % stride != 0 && done != total {
            return;
        }
        let elapsed = started.elapsed().as_secs_f64();
        let eta_min = (total - done) as f64 * elapsed / done as f64 / 60.0;
        eprint!("\rraytraced {done} of {total}  ETA {eta_min:.1} min   ");
        let _ = std::io::stderr().flush();
    };
    let progress: Option<&ProgressFn> = if cli.quiet { None } else { Some(&eta_line) };

    let (frame, stats) = render(&scene, &sky, progress)?;
    if !cli.quiet {
        eprintln!();
    }

    frame
        .save(&cli.output)
        .with_context(|| format!("failed to save {}", cli.output))?;
    if let Some(path) = &cli.report {
        write_report(path, &cli, &stats)?;
    }

    println!(
        "saved {} ({}x{}) in {:.1}s  escaped {} captured {} undetermined {}",
        cli.output,
        scene.width,
        scene.height,
        stats.elapsed_secs,
        stats.escaped,
        stats.captured,
        stats.undetermined
    );
    Ok(())
}
